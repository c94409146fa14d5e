pub mod behavior;
pub mod loader;
pub mod presets;

pub use behavior::{
    AttackBehavior, BehaviorConfig, Composition, Density, Include, Number, Queue,
    StartingTerrain, Target,
};
pub use loader::ConfigError;

use serde::{Deserialize, Serialize};

use crate::game::{DEFAULT_COLS, DEFAULT_MATCH_CYCLES, DEFAULT_ROWS};

// Contents of the configuration file: a named preset, or a full behavior
// table that takes precedence over it, plus the versus host settings.
// A file without a preset key has no preset; only a freshly written
// default file names one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(default)]
    pub preset: Option<String>,
    pub behavior: Option<BehaviorConfig>,
    pub versus: VersusConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            preset: Some("versus".to_string()),
            behavior: None,
            versus: VersusConfig::default(),
        }
    }
}

impl Config {
    /// The behavior the engines should be finalized with.
    pub fn resolve_behavior(&self) -> Result<BehaviorConfig, ConfigError> {
        if let Some(behavior) = &self.behavior {
            return Ok(behavior.clone());
        }
        match &self.preset {
            Some(name) => {
                presets::get(name).ok_or_else(|| ConfigError::UnknownPreset(name.clone()))
            }
            None => Ok(BehaviorConfig::default()),
        }
    }
}

// Headless match settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersusConfig {
    pub players: usize,
    pub rows: usize,
    pub cols: usize,
    pub cycles: u32,
    pub seed: u64,
    pub first_level: u32,
    pub first_garbage: u32,
    pub garbage_per_level: u32,
}

impl Default for VersusConfig {
    fn default() -> Self {
        Self {
            players: 2,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            cycles: DEFAULT_MATCH_CYCLES,
            seed: 7,
            first_level: 1,
            first_garbage: 0,
            garbage_per_level: 0,
        }
    }
}
