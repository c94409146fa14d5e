#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Table indices come from rem_euclid and are always non-negative and small
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

//! Deterministic garbage density.
//!
//! Nothing here uses a random number generator. Every pattern is read out of
//! two fixed tables at positions derived from game-state integers, so every
//! peer that sees the same attack computes the same rows.

use crate::config::Density;
use crate::grid::full_mask;

/// A permutation of `0..32`, used to pick single gaps.
pub const PERMUTATION: [u8; 32] = [
    17, 4, 29, 11, 0, 23, 8, 31, 14, 2, 26, 19, 6, 21, 12, 28, 1, 16, 9, 25, 3, 30, 13, 7, 22, 18,
    5, 27, 10, 24, 15, 20,
];

/// Hole pattern read circularly; 1 marks an empty column.
pub const HOLES: [u8; 61] = [
    0, 0, 1, 0, 0, 0, 0, 1, 0, 1, 1, 0, 0, 0, 0, 1, 1, 1, 1, 0, 0, 1, 0, 0, 0, 1, 0, 1, 0, 0, 0, 0,
    1, 0, 0, 0, 1, 0, 1, 1, 0, 0, 1, 0, 1, 0, 1, 0, 0, 0, 1, 0, 1, 1, 0, 1, 1, 0, 1, 0, 1,
];

/// Offset between the two panes' starting points in quantum cheese.
pub const QUANTUM_PANE_OFFSET: usize = 17;

/// Everything a garbage row's pattern may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DensityKey {
    pub row: i64,
    pub cascade: i64,
    pub piece_type: i64,
    pub piece_column: i64,
    pub level: i64,
    pub first_level: i64,
    pub first_garbage: i64,
    pub seed: i64,
}

impl DensityKey {
    #[must_use]
    pub fn primary(&self) -> i64 {
        self.combine([7, 13, 17, 19, 23, 29, 31, 37])
    }

    #[must_use]
    pub fn secondary(&self) -> i64 {
        self.combine([41, 43, 47, 53, 3, 5, 11, 59])
    }

    fn combine(&self, primes: [i64; 8]) -> i64 {
        [
            self.row,
            self.cascade,
            self.piece_type,
            self.piece_column,
            self.level,
            self.first_level,
            self.first_garbage,
            self.seed,
        ]
        .iter()
        .zip(primes)
        .fold(0i64, |acc, (value, prime)| {
            acc.wrapping_add(value.wrapping_mul(prime))
        })
    }
}

/// Column left empty by a single-gap row.
#[must_use]
pub fn single_gap_column(key: &DensityKey, cols: usize) -> usize {
    let index = key.primary().rem_euclid(PERMUTATION.len() as i64) as usize;
    usize::from(PERMUTATION[index]) % cols
}

#[must_use]
pub fn single_gap_mask(key: &DensityKey, cols: usize) -> u64 {
    full_mask(cols) & !(1u64 << single_gap_column(key, cols))
}

/// Filled columns of a swiss-cheese row, reading [`HOLES`] from a start
/// derived from the key and shifted by `pane_offset`. Narrow fields can read
/// a stretch with no hole; those rows get the single-gap hole instead.
#[must_use]
pub fn swiss_cheese_mask(key: &DensityKey, cols: usize, pane_offset: usize) -> u64 {
    let start = key.secondary().rem_euclid(HOLES.len() as i64) as usize + pane_offset;
    let mask = (0..cols)
        .filter(|col| HOLES[(start + col) % HOLES.len()] == 0)
        .fold(0, |mask, col| mask | (1u64 << col));
    if mask == full_mask(cols) {
        mask & !(1u64 << single_gap_column(key, cols))
    } else {
        mask
    }
}

/// Filled-column masks for both panes of one garbage row. `preferred`
/// masks, when present, are used as given.
#[must_use]
pub fn row_masks(
    density: Density,
    key: &DensityKey,
    cols: usize,
    preferred: Option<[u64; 2]>,
) -> [u64; 2] {
    let full = full_mask(cols);
    if let Some([p0, p1]) = preferred {
        return [p0 & full, p1 & full];
    }
    match density {
        Density::SingleGap | Density::PieceNegative | Density::PieceNegativeMirrored => {
            let mask = single_gap_mask(key, cols);
            [mask, mask]
        }
        Density::SwissCheese => {
            let mask = swiss_cheese_mask(key, cols, 0);
            [mask, mask]
        }
        Density::QuantumCheese => [
            swiss_cheese_mask(key, cols, 0),
            swiss_cheese_mask(key, cols, QUANTUM_PANE_OFFSET),
        ],
    }
}

/// One row spanned by the locked piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceRow {
    pub masks: [u64; 2],
    pub cleared: bool,
}

/// Preferred filled masks derived from the negative of the locked piece,
/// bottom row first, for each pane.
///
/// Uses the piece rows that were part of the clear, or every piece row in
/// the pane if none of them were. A pane the piece never touched gets one
/// pattern with a single gap under `piece_column`.
#[must_use]
pub fn piece_negative_patterns(
    rows: &[PieceRow],
    cols: usize,
    piece_column: i32,
    mirrored: bool,
) -> [Vec<u64>; 2] {
    let full = full_mask(cols);
    let gap_column = piece_column.clamp(0, cols as i32 - 1) as u32;
    let pattern = |pane: usize| {
        let occupied: Vec<&PieceRow> = rows.iter().filter(|r| r.masks[pane] != 0).collect();
        let cleared: Vec<&PieceRow> = occupied.iter().copied().filter(|r| r.cleared).collect();
        let source = if cleared.is_empty() { occupied } else { cleared };
        let mut out: Vec<u64> = source.iter().map(|r| full & !r.masks[pane]).collect();
        if out.is_empty() {
            out.push(full & !(1u64 << gap_column));
        }
        if mirrored {
            out.reverse();
        }
        out
    };
    [pattern(0), pattern(1)]
}

/// Tiles the patterns over a block of rows; `from_bottom` is the row's
/// position counted from the bottom of the block.
#[must_use]
pub fn tiled(patterns: &[Vec<u64>; 2], from_bottom: usize) -> [u64; 2] {
    let pick = |pattern: &Vec<u64>| pattern[from_bottom % pattern.len()];
    [pick(&patterns[0]), pick(&patterns[1])]
}
