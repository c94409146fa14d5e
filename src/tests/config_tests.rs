#![warn(clippy::all, clippy::pedantic)]

#[cfg(test)]
mod tests {
    use crate::cell;
    use crate::config::{
        AttackBehavior, BehaviorConfig, Composition, Config, ConfigError, Include, Target,
        presets,
    };
    use crate::game::DEFAULT_LEVEL_UP_ROWS;

    #[test]
    fn test_default_behavior_is_fully_disabled() {
        let behavior = BehaviorConfig::default();
        for category in [
            behavior.cleared,
            behavior.level_up,
            behavior.penalty,
            behavior.push,
            behavior.displace,
            behavior.level_sync,
            behavior.drop_blocks,
        ] {
            assert!(!category.is_enabled());
        }
        assert_eq!(behavior.default_level_up_rows, DEFAULT_LEVEL_UP_ROWS);
        assert_eq!(behavior.terrain.total(), 0);
    }

    #[test]
    fn test_category_needs_composition_and_include() {
        let only_composition = AttackBehavior {
            composition: Composition::Standard,
            ..AttackBehavior::default()
        };
        let only_include = AttackBehavior {
            include: Include::Everything,
            ..AttackBehavior::default()
        };
        assert!(!only_composition.is_enabled());
        assert!(!only_include.is_enabled());
        assert!(
            AttackBehavior {
                include: Include::Everything,
                ..only_composition
            }
            .is_enabled()
        );
    }

    #[test]
    fn test_include_flags() {
        assert!(Include::LockedClears.clears());
        assert!(!Include::LockedClears.clears_before_lock());
        assert!(Include::AllClears.clears_before_lock());
        assert!(!Include::Metamorphosis.clears());
        assert!(Include::Everything.metamorphosis());
    }

    #[test]
    fn test_presets_are_listed_and_resolvable() {
        let names: Vec<&str> = presets::names().collect();
        assert!(names.contains(&"none"));
        assert!(names.contains(&"versus"));
        for name in names {
            assert!(presets::get(name).is_some(), "{name} should resolve");
        }
        assert_eq!(presets::get("none"), Some(BehaviorConfig::default()));
        assert!(presets::get("marathon").is_none());
    }

    #[test]
    fn test_versus_preset_sends_cleared_rows_to_next_player() {
        let versus = presets::get("versus").expect("versus preset");
        assert!(versus.cleared.is_enabled());
        assert_eq!(versus.cleared.target, Target::CycleNext);
        assert_eq!(versus.cleared.composition, Composition::ClearResult);
    }

    #[test]
    fn test_resolve_prefers_explicit_behavior() {
        let explicit = BehaviorConfig {
            default_level_up_rows: 9,
            ..BehaviorConfig::default()
        };
        let config = Config {
            preset: Some("versus".to_string()),
            behavior: Some(explicit.clone()),
            ..Config::default()
        };
        assert_eq!(config.resolve_behavior().expect("resolves"), explicit);
    }

    #[test]
    fn test_resolve_unknown_preset() {
        let config = Config {
            preset: Some("nonsense".to_string()),
            ..Config::default()
        };
        match config.resolve_behavior() {
            Err(ConfigError::UnknownPreset(name)) => assert_eq!(name, "nonsense"),
            other => panic!("expected UnknownPreset, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_without_preset_is_disabled() {
        let config = Config {
            preset: None,
            ..Config::default()
        };
        assert_eq!(
            config.resolve_behavior().expect("resolves"),
            BehaviorConfig::default()
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let mut behavior = presets::get("push_battle").expect("push_battle preset");
        behavior.level_up.composition = Composition::Uniform(cell::ST);
        let config = Config {
            preset: None,
            behavior: Some(behavior),
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).expect("serializes");
        let parsed: Config = toml::from_str(&text).expect("parses");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_missing_preset_disables_behavior() {
        let config: Config = toml::from_str("[versus]\nplayers = 3\n").expect("parses");
        assert_eq!(config.preset, None);
        assert_eq!(config.versus.players, 3);
        assert_eq!(
            config.resolve_behavior().expect("resolves"),
            BehaviorConfig::default()
        );

        let written = toml::to_string_pretty(&Config::default()).expect("serializes");
        let reloaded: Config = toml::from_str(&written).expect("parses");
        assert_eq!(reloaded, Config::default());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let text = r#"
            preset = "versus_retro"

            [versus]
            players = 4
        "#;
        let config: Config = toml::from_str(text).expect("parses");
        assert_eq!(config.versus.players, 4);
        assert_eq!(config.versus.cols, Config::default().versus.cols);
        assert_eq!(
            config.resolve_behavior().expect("resolves"),
            presets::get("versus_retro").expect("preset")
        );
    }

    #[test]
    fn test_behavior_table_in_toml() {
        let text = r#"
            [behavior.cleared]
            composition = "clear_majority"
            density = "swiss_cheese"
            number = "at_least_two"
            include = "all_clears"
            target = "alternating"
        "#;
        let config: Config = toml::from_str(text).expect("parses");
        let behavior = config.resolve_behavior().expect("resolves");
        assert_eq!(behavior.cleared.composition, Composition::ClearMajority);
        assert_eq!(behavior.cleared.target, Target::Alternating);
        assert!(!behavior.penalty.is_enabled());
    }
}
