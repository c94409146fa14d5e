#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Row counts are bounded by the field capacity and always fit in u32
    clippy::cast_possible_truncation
)]

use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::grid::PaneRow;

/// Which player(s) an outgoing attack is delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetCode {
    #[default]
    Incoming,
    CycleNext,
    CyclePrevious,
    All,
    AllOthers,
    AllDivided,
    AllOthersDivided,
    CycleAlternate,
}

impl TargetCode {
    pub const ALL: [TargetCode; 8] = [
        TargetCode::Incoming,
        TargetCode::CycleNext,
        TargetCode::CyclePrevious,
        TargetCode::All,
        TargetCode::AllOthers,
        TargetCode::AllDivided,
        TargetCode::AllOthersDivided,
        TargetCode::CycleAlternate,
    ];

    /// Stable wire value used by snapshots.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            TargetCode::Incoming => 0,
            TargetCode::CycleNext => 1,
            TargetCode::CyclePrevious => 2,
            TargetCode::All => 3,
            TargetCode::AllOthers => 4,
            TargetCode::AllDivided => 5,
            TargetCode::AllOthersDivided => 6,
            TargetCode::CycleAlternate => 7,
        }
    }

    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.code() == code)
    }

    #[must_use]
    pub fn is_divided(self) -> bool {
        matches!(self, TargetCode::AllDivided | TargetCode::AllOthersDivided)
    }
}

/// One garbage row: what it is made of and the inputs its density is derived
/// from on the receiving side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GarbageRow {
    pub classification: Cell,
    pub cascade: u32,
    pub piece_type: i32,
    pub piece_column: i32,
    /// Explicit filled-column masks per pane, set by piece-negative density.
    pub preferred: Option<[u64; 2]>,
}

impl GarbageRow {
    #[must_use]
    pub fn new(classification: Cell, cascade: u32, piece_type: i32, piece_column: i32) -> Self {
        Self {
            classification,
            cascade,
            piece_type,
            piece_column,
            preferred: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropBlock {
    pub classification: Cell,
    pub cascade: u32,
}

/// Synchronized level-up: the sender's new level and how far it is above
/// the sender's starting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    pub level: u32,
    pub difference: i32,
}

impl LevelChange {
    /// The larger of two synchronized level-ups; ties go to the higher level.
    #[must_use]
    pub fn max_by_difference(self, other: LevelChange) -> LevelChange {
        if (other.difference, other.level) > (self.difference, self.level) {
            other
        } else {
            self
        }
    }
}

/// Attack descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attack {
    pub target: TargetCode,
    pub clear_rows: Vec<GarbageRow>,
    pub level_up_rows: Vec<GarbageRow>,
    pub penalty_rows: u32,
    /// Rows arriving from another field, in the order they were pushed.
    pub push_in_rows: Vec<PaneRow>,
    pub push_out_rows: u32,
    pub displace_rows: u32,
    pub level_change: Option<LevelChange>,
    pub drop_blocks: Vec<DropBlock>,
}

impl Attack {
    #[must_use]
    pub fn new(target: TargetCode) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clear_rows.is_empty()
            && self.level_up_rows.is_empty()
            && self.penalty_rows == 0
            && self.push_in_rows.is_empty()
            && self.push_out_rows == 0
            && self.displace_rows == 0
            && self.level_change.is_none()
            && self.drop_blocks.is_empty()
    }

    #[must_use]
    pub fn garbage_row_count(&self) -> usize {
        self.clear_rows.len() + self.level_up_rows.len()
    }

    #[must_use]
    pub fn has_push_rows(&self) -> bool {
        !self.push_in_rows.is_empty() || self.push_out_rows > 0
    }

    /// Resets every kind while keeping allocations and the target.
    pub fn clear(&mut self) {
        self.clear_rows.clear();
        self.level_up_rows.clear();
        self.penalty_rows = 0;
        self.push_in_rows.clear();
        self.push_out_rows = 0;
        self.displace_rows = 0;
        self.level_change = None;
        self.drop_blocks.clear();
    }

    /// Whether `other` can be folded into this descriptor without exceeding
    /// `capacity` rows in any table.
    #[must_use]
    pub fn can_merge(&self, other: &Attack, capacity: usize) -> bool {
        if self.target != other.target {
            return false;
        }
        self.garbage_row_count() + other.garbage_row_count() <= capacity
            && self.push_in_rows.len() + other.push_in_rows.len() <= capacity
            && self.drop_blocks.len() + other.drop_blocks.len() <= capacity
            && (self.penalty_rows + other.penalty_rows) as usize <= capacity
            && (self.push_out_rows + other.push_out_rows) as usize <= capacity
    }

    /// Appends `other` after this descriptor's contents. Returns false, and
    /// changes nothing, when the result would not fit.
    pub fn merge(&mut self, other: &Attack, capacity: usize) -> bool {
        if !self.can_merge(other, capacity) {
            return false;
        }
        self.clear_rows.extend(other.clear_rows.iter().cloned());
        self.level_up_rows.extend(other.level_up_rows.iter().cloned());
        self.penalty_rows += other.penalty_rows;
        self.push_in_rows.extend(other.push_in_rows.iter().cloned());
        self.push_out_rows += other.push_out_rows;
        self.displace_rows += other.displace_rows;
        self.level_change = match (self.level_change, other.level_change) {
            (Some(ours), Some(theirs)) => Some(ours.max_by_difference(theirs)),
            (ours, theirs) => ours.or(theirs),
        };
        self.drop_blocks.extend(other.drop_blocks.iter().copied());
        true
    }

    /// Splits rows and counts between `parts` recipients for the divided
    /// targets. Rows are dealt round-robin; count remainders go to the first
    /// recipients. Pushed rows are dealt like the other row tables. Level
    /// changes are not divisible and are copied to every part.
    #[must_use]
    pub fn divide(&self, parts: usize) -> Vec<Attack> {
        if parts <= 1 {
            return vec![self.clone()];
        }
        let share = |total: u32, index: usize| {
            let parts = parts as u32;
            let index = index as u32;
            total / parts + u32::from(index < total % parts)
        };
        (0..parts)
            .map(|index| Attack {
                target: self.target,
                clear_rows: deal(&self.clear_rows, index, parts),
                level_up_rows: deal(&self.level_up_rows, index, parts),
                penalty_rows: share(self.penalty_rows, index),
                push_in_rows: deal(&self.push_in_rows, index, parts),
                push_out_rows: share(self.push_out_rows, index),
                displace_rows: share(self.displace_rows, index),
                level_change: self.level_change,
                drop_blocks: deal(&self.drop_blocks, index, parts),
            })
            .collect()
    }
}

fn deal<T: Clone>(items: &[T], index: usize, parts: usize) -> Vec<T> {
    items.iter().skip(index).step_by(parts).cloned().collect()
}
