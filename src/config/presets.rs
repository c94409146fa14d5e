use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use super::behavior::{
    AttackBehavior, BehaviorConfig, Composition, Density, Include, Number, Queue,
    StartingTerrain, Target,
};

// Factory presets, looked up by game mode name
static PRESETS: Lazy<BTreeMap<&'static str, BehaviorConfig>> = Lazy::new(|| {
    let mut presets = BTreeMap::new();
    presets.insert("none", BehaviorConfig::default());
    presets.insert("versus", versus());
    presets.insert("versus_retro", versus_retro());
    presets.insert("progression", progression());
    presets.insert("push_battle", push_battle());
    presets.insert("level_race", level_race());
    presets
});

#[must_use]
pub fn get(name: &str) -> Option<BehaviorConfig> {
    PRESETS.get(name).cloned()
}

pub fn names() -> impl Iterator<Item = &'static str> {
    PRESETS.keys().copied()
}

fn versus() -> BehaviorConfig {
    BehaviorConfig {
        cleared: AttackBehavior {
            composition: Composition::ClearResult,
            density: Density::PieceNegative,
            number: Number::LessOne,
            queue: Queue::PerCycle,
            include: Include::LockedClears,
            target: Target::CycleNext,
        },
        penalty: AttackBehavior {
            composition: Composition::Standard,
            include: Include::LockedClears,
            ..AttackBehavior::default()
        },
        push: AttackBehavior {
            composition: Composition::Standard,
            include: Include::Everything,
            target: Target::CycleNext,
            ..AttackBehavior::default()
        },
        ..BehaviorConfig::default()
    }
}

// Retro modes are single pane, so pairs of rows count as one clear
fn versus_retro() -> BehaviorConfig {
    BehaviorConfig {
        cleared: AttackBehavior {
            composition: Composition::ClearMajority,
            density: Density::SwissCheese,
            number: Number::AtLeastTwoDualPane,
            queue: Queue::PerCascade,
            include: Include::LockedClears,
            target: Target::Alternating,
        },
        displace: AttackBehavior {
            composition: Composition::Standard,
            number: Number::AtLeastTwo,
            include: Include::LockedClears,
            target: Target::AllOthers,
            ..AttackBehavior::default()
        },
        ..BehaviorConfig::default()
    }
}

fn progression() -> BehaviorConfig {
    BehaviorConfig {
        level_up: AttackBehavior {
            composition: Composition::Standard,
            density: Density::QuantumCheese,
            include: Include::Everything,
            target: Target::Incoming,
            ..AttackBehavior::default()
        },
        default_level_up_rows: 2,
        terrain: StartingTerrain {
            st: 1,
            ss: 1,
            s0: 1,
            s1: 1,
        },
        ..BehaviorConfig::default()
    }
}

fn push_battle() -> BehaviorConfig {
    BehaviorConfig {
        push: AttackBehavior {
            composition: Composition::Standard,
            include: Include::Everything,
            target: Target::Alternating,
            ..AttackBehavior::default()
        },
        drop_blocks: AttackBehavior {
            composition: Composition::LockedPiece,
            number: Number::LessOnePerCascade,
            include: Include::AllClears,
            target: Target::AllOthersDivided,
            ..AttackBehavior::default()
        },
        ..versus()
    }
}

fn level_race() -> BehaviorConfig {
    BehaviorConfig {
        level_sync: AttackBehavior {
            composition: Composition::Standard,
            include: Include::Everything,
            target: Target::AllOthers,
            ..AttackBehavior::default()
        },
        cleared: AttackBehavior {
            composition: Composition::LockedPiece,
            density: Density::PieceNegativeMirrored,
            number: Number::LessOnePerCascade,
            queue: Queue::PerCascade,
            include: Include::AllClears,
            target: Target::AllDivided,
        },
        ..BehaviorConfig::default()
    }
}
