#![warn(clippy::all, clippy::pedantic)]

pub mod config_loader_tests;
pub mod config_tests;
pub mod density_tests;
pub mod grid_tests;
pub mod queue_tests;
pub mod unleash_tests;
