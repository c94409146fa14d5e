#![warn(clippy::all, clippy::pedantic)]

pub mod attack;
pub mod cell;
pub mod config;
pub mod connectivity;
pub mod density;
pub mod game;
pub mod grid;
pub mod piece;
pub mod progress;
pub mod queue;
pub mod routing;
pub mod snapshot;
pub mod state;
pub mod system;
pub mod versus;

pub use attack::{Attack, TargetCode};
pub use config::BehaviorConfig;
pub use grid::Grid;
pub use progress::{Displacement, GameInfo, GameProgress};
pub use system::{AttackSystem, ClearEvent};

#[cfg(test)]
mod tests;
