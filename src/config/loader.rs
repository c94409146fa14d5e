#![warn(clippy::all, clippy::pedantic)]

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};

use super::Config;

// Fallback config file path
const CONFIG_FILE_PATH: &str = "config/attack_engine.toml";

// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "ATTACK_ENGINE_CONFIG";

// Load the configuration from the default location
pub fn load_config_from_file() -> Result<Config, ConfigError> {
    load_config_from(&get_config_file_path())
}

// Load the configuration from `path`, writing a default file if none exists
pub fn load_config_from(config_path: &Path) -> Result<Config, ConfigError> {
    // Create default config file if it doesn't exist
    if !config_path.exists() {
        info!(
            "No configuration at {}, writing defaults",
            config_path.display()
        );
        let default_config = Config::default();
        save_config_to(&default_config, config_path)?;
        return Ok(default_config);
    }

    let contents = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&contents)?;

    // Surface unknown presets at load time rather than at engine setup
    config.resolve_behavior()?;
    debug!("Loaded configuration from {}", config_path.display());
    Ok(config)
}

// Save the configuration to the default location
pub fn save_config_to_file(config: &Config) -> Result<(), ConfigError> {
    save_config_to(config, &get_config_file_path())
}

pub fn save_config_to(config: &Config, config_path: &Path) -> Result<(), ConfigError> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }
    }

    let toml_string = toml::to_string_pretty(config)?;
    fs::write(config_path, toml_string)?;
    Ok(())
}

// Get the path to the config file
#[must_use]
pub fn get_config_file_path() -> PathBuf {
    // Check for environment variable override
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(path);
    }

    // Otherwise use default path in user's config directory
    if let Some(config_dir) = dirs::config_dir() {
        config_dir.join("attack_engine").join("config.toml")
    } else {
        // Fallback to local directory
        PathBuf::from(CONFIG_FILE_PATH)
    }
}

// Custom error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
    UnknownPreset(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config i/o error: {err}"),
            ConfigError::Parse(err) => write!(f, "config parse error: {err}"),
            ConfigError::Serialize(err) => write!(f, "config serialize error: {err}"),
            ConfigError::UnknownPreset(name) => write!(f, "unknown behavior preset '{name}'"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err)
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Serialize(err)
    }
}
