#![warn(clippy::all, clippy::pedantic)]

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::config::loader::{ConfigError, load_config_from, save_config_to};
    use std::fs;
    use std::path::PathBuf;
    use tempfile::tempdir;

    // Helper function to create a test config path
    fn create_test_config_path() -> (tempfile::TempDir, PathBuf) {
        let temp_dir = tempdir().expect("Failed to create temp directory");
        let config_path = temp_dir.path().join("nested").join("test_config.toml");
        (temp_dir, config_path)
    }

    #[test]
    fn test_load_nonexistent_config() {
        let (_temp_dir, config_path) = create_test_config_path();

        // Loading a non-existent config should create a default one
        let config = load_config_from(&config_path).expect("Failed to load default config");

        assert!(config_path.exists(), "Config file should have been created");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_and_load_config() {
        let (_temp_dir, config_path) = create_test_config_path();

        let mut config = Config::default();
        config.preset = Some("level_race".to_string());
        config.versus.players = 3;
        config.versus.seed = 1234;

        save_config_to(&config, &config_path).expect("Failed to save config");
        let loaded = load_config_from(&config_path).expect("Failed to load config");

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_config() {
        let (_temp_dir, config_path) = create_test_config_path();
        fs::create_dir_all(config_path.parent().expect("parent")).expect("create dir");
        fs::write(&config_path, "invalid toml content ! @ #")
            .expect("Failed to write invalid config");

        match load_config_from(&config_path) {
            Err(ConfigError::Parse(_)) => {}
            Ok(_) => panic!("Expected error when loading invalid config"),
            Err(e) => panic!("Unexpected error type: {e:?}"),
        }
    }

    #[test]
    fn test_unknown_preset_is_rejected_at_load() {
        let (_temp_dir, config_path) = create_test_config_path();
        fs::create_dir_all(config_path.parent().expect("parent")).expect("create dir");
        fs::write(&config_path, "preset = \"does_not_exist\"\n").expect("write config");

        match load_config_from(&config_path) {
            Err(ConfigError::UnknownPreset(name)) => assert_eq!(name, "does_not_exist"),
            other => panic!("Expected UnknownPreset, got {other:?}"),
        }
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::UnknownPreset("x".to_string());
        assert_eq!(err.to_string(), "unknown behavior preset 'x'");
    }
}
