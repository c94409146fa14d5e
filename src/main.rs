#![warn(clippy::all, clippy::pedantic)]

use anyhow::{Context, Result};
use attack_engine::config::{self, Config, presets};
use attack_engine::versus;
use log::{error, info};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .format_module_path(false)
        .init();

    info!("Starting attack engine versus match");

    let mut config = match config::loader::load_config_from_file() {
        Ok(config) => {
            info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            error!("Failed to load configuration: {e}");
            // Continue with default configuration
            Config::default()
        }
    };

    // A preset named on the command line replaces the configured behavior
    if let Some(arg) = std::env::args().nth(1) {
        if arg == "--presets" {
            for name in presets::names() {
                println!("{name}");
            }
            return Ok(());
        }
        config.preset = Some(arg);
        config.behavior = None;
    }

    let behavior = config
        .resolve_behavior()
        .context("Failed to resolve attack behavior")?;
    let report = versus::run_match(&config.versus, &behavior);

    println!("Match over after {} cycles", report.cycles);
    for player in &report.players {
        println!(
            "Player {}: level {}, {} lines, {} blocks, sent {}, received {}, displaced {}{}",
            player.index,
            player.level,
            player.lines,
            player.blocks,
            player.attacks_sent,
            player.attacks_received,
            player.displaced_rows,
            if player.topped_out { ", topped out" } else { "" }
        );
    }
    match report.winner() {
        Some(index) => println!("Player {index} wins"),
        None => println!("No winner"),
    }

    Ok(())
}
