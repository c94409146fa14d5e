#![warn(clippy::all, clippy::pedantic)]

//! Cell classification codes.
//!
//! A grid stores one `u8` per `[pane][row][column]`. Codes that belong to a
//! single pane only ever appear in that pane; codes that span both panes are
//! written into both at the same position.

pub type Cell = u8;

pub const NO: Cell = 0;
pub const S0: Cell = 1;
pub const S1: Cell = 2;
pub const SS: Cell = 3;
pub const ST: Cell = 4;
pub const ST_INACTIVE: Cell = 5;
pub const UL: Cell = 6;
pub const SL: Cell = 7;
pub const SL_ACTIVE: Cell = 8;
pub const SL_INACTIVE: Cell = 9;
pub const F0: Cell = 10;
pub const F1: Cell = 11;
pub const U0: Cell = 12;
pub const U1: Cell = 13;
pub const R0: Cell = 14;
pub const R1: Cell = 15;
pub const R2: Cell = 16;
pub const R3: Cell = 17;
pub const R4: Cell = 18;
pub const R5: Cell = 19;
pub const R6: Cell = 20;
pub const RAINBOW_BLAND: Cell = 21;
pub const PUSH_DOWN: Cell = 22;
pub const PUSH_DOWN_ACTIVE: Cell = 23;
pub const PUSH_UP: Cell = 24;
pub const PUSH_UP_ACTIVE: Cell = 25;

pub const NUM_CODES: usize = 26;

/// Rule revision the current codes belong to.
pub const CURRENT_REVISION: i32 = 1;

#[must_use]
pub fn is_valid(code: Cell) -> bool {
    usize::from(code) < NUM_CODES
}

#[must_use]
pub fn is_block(code: Cell) -> bool {
    code != NO
}

/// Which panes a block of this classification occupies.
#[must_use]
pub fn panes(code: Cell) -> [bool; 2] {
    match code {
        NO => [false, false],
        S0 | F0 | U0 | R0..=RAINBOW_BLAND => [true, false],
        S1 | F1 | U1 => [false, true],
        _ => [true, true],
    }
}

#[must_use]
pub fn spans_both_panes(code: Cell) -> bool {
    panes(code) == [true, true]
}

/// Single-pane classifications; used when a cascade is all one pane.
#[must_use]
pub fn is_single_pane(code: Cell) -> bool {
    let [p0, p1] = panes(code);
    p0 != p1
}

/// The pane-0 / pane-1 counterpart of a both-pane classification, used when
/// the two pane masks of a garbage row disagree at a column.
#[must_use]
pub fn pane_component(code: Cell, pane: usize) -> Cell {
    if !spans_both_panes(code) {
        return code;
    }
    if pane == 0 { S0 } else { S1 }
}

/// Per-cell transformation applied to a row moved from one player's field
/// into another's. Pane-specific codes trade places (the row's panes are
/// swapped by the caller) and triggered push markers go back to rest.
#[must_use]
pub fn push_flip(code: Cell) -> Cell {
    match code {
        S0 => S1,
        S1 => S0,
        F0 => F1,
        F1 => F0,
        U0 => U1,
        U1 => U0,
        PUSH_DOWN_ACTIVE => PUSH_DOWN,
        PUSH_UP_ACTIVE => PUSH_UP,
        SL_ACTIVE => SL_INACTIVE,
        other => other,
    }
}

/// Migrates a classification saved under an older rule revision.
///
/// Revision 0 reserved 14 and 15 for edge pieces (now drawn as bland rainbow
/// blocks), stored the retro codes two higher than today, and had no push
/// markers. Returns `None` for codes that never existed in `revision`.
#[must_use]
pub fn upgrade_classification(code: Cell, revision: i32) -> Option<Cell> {
    match revision {
        0 => match code {
            NO..=U1 => Some(code),
            14 | 15 | 23 => Some(RAINBOW_BLAND),
            16..=22 => Some(code - 2),
            _ => None,
        },
        CURRENT_REVISION => is_valid(code).then_some(code),
        _ => None,
    }
}

#[must_use]
pub fn name(code: Cell) -> &'static str {
    const NAMES: [&str; NUM_CODES] = [
        "NO",
        "S0",
        "S1",
        "SS",
        "ST",
        "ST_INACTIVE",
        "UL",
        "SL",
        "SL_ACTIVE",
        "SL_INACTIVE",
        "F0",
        "F1",
        "U0",
        "U1",
        "R0",
        "R1",
        "R2",
        "R3",
        "R4",
        "R5",
        "R6",
        "RAINBOW_BLAND",
        "PUSH_DOWN",
        "PUSH_DOWN_ACTIVE",
        "PUSH_UP",
        "PUSH_UP_ACTIVE",
    ];
    NAMES.get(usize::from(code)).copied().unwrap_or("INVALID")
}
