use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::game::DEFAULT_LEVEL_UP_ROWS;

// What the rows or effects of an attack are made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Composition {
    #[default]
    None, // Category disabled
    Standard,      // The category's usual content
    ClearResult,   // Classification reported for each cleared row
    ClearMajority, // Most common classification across the whole clear
    LockedPiece,   // The locking piece's own classification
    Uniform(Cell), // Always this classification
}

// How garbage rows choose their empty columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Density {
    #[default]
    SingleGap,
    SwissCheese,
    QuantumCheese,
    PieceNegative,
    PieceNegativeMirrored,
}

impl Density {
    #[must_use]
    pub fn is_piece_negative(self) -> bool {
        matches!(self, Density::PieceNegative | Density::PieceNegativeMirrored)
    }
}

// Which cleared rows turn into attack rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Number {
    #[default]
    All,
    LessOne,           // Drop the first cleared row of the cycle
    LessOnePerCascade, // Drop the first row of every cascade set
    AtLeastTwo,        // Nothing unless at least two rows were cleared
    AtLeastTwoDualPane, // As AtLeastTwo, ignoring single-pane cascade sets
}

// When collected rows are flushed into the outgoing queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Queue {
    PerCascade,
    #[default]
    PerCycle,
}

// Which game events feed a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Include {
    #[default]
    Nothing,
    LockedClears, // Clears caused by the locked piece and its cascades
    AllClears,    // Also clears observed before the piece locked
    Metamorphosis,
    Everything,
}

impl Include {
    #[must_use]
    pub fn clears_before_lock(self) -> bool {
        matches!(self, Include::AllClears | Include::Everything)
    }

    #[must_use]
    pub fn clears(self) -> bool {
        matches!(
            self,
            Include::LockedClears | Include::AllClears | Include::Everything
        )
    }

    #[must_use]
    pub fn metamorphosis(self) -> bool {
        matches!(self, Include::Metamorphosis | Include::Everything)
    }
}

// Routing policy; every variant but Alternating maps to one fixed target code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    #[default]
    Incoming,
    CycleNext,
    CyclePrevious,
    CycleAlternate,
    All,
    AllOthers,
    AllDivided,
    AllOthersDivided,
    Alternating,
}

// Behavior of one attack category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackBehavior {
    pub composition: Composition,
    pub density: Density,
    pub number: Number,
    pub queue: Queue,
    pub include: Include,
    pub target: Target,
}

impl AttackBehavior {
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.composition != Composition::None && self.include != Include::Nothing
    }
}

// Rows of each terrain category laid down at the start of a game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StartingTerrain {
    pub st: u32,
    pub ss: u32,
    pub s0: u32,
    pub s1: u32,
}

impl StartingTerrain {
    #[must_use]
    pub fn total(&self) -> u32 {
        self.st + self.ss + self.s0 + self.s1
    }
}

// Complete engine behavior; fixed once the engine is finalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    pub cleared: AttackBehavior,
    pub level_up: AttackBehavior,
    pub penalty: AttackBehavior,
    pub push: AttackBehavior,
    pub displace: AttackBehavior,
    pub level_sync: AttackBehavior,
    pub drop_blocks: AttackBehavior,
    pub default_level_up_rows: u32,
    pub terrain: StartingTerrain,
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            cleared: AttackBehavior::disabled(),
            level_up: AttackBehavior::disabled(),
            penalty: AttackBehavior::disabled(),
            push: AttackBehavior::disabled(),
            displace: AttackBehavior::disabled(),
            level_sync: AttackBehavior::disabled(),
            drop_blocks: AttackBehavior::disabled(),
            default_level_up_rows: DEFAULT_LEVEL_UP_ROWS,
            terrain: StartingTerrain::default(),
        }
    }
}
