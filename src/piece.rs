#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Piece coordinates are tiny and checked against the grid before casting
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

use crate::cell::{self, Cell};
use crate::game::PANES;
use crate::grid::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    #[must_use]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// One block of a piece, relative to the piece origin (row grows upward).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PieceBlock {
    pub pane: usize,
    pub row: i32,
    pub col: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tetromino {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl Tetromino {
    pub const ALL: [Tetromino; 7] = [
        Tetromino::I,
        Tetromino::J,
        Tetromino::L,
        Tetromino::O,
        Tetromino::S,
        Tetromino::T,
        Tetromino::Z,
    ];

    #[must_use]
    pub fn index(self) -> i32 {
        match self {
            Tetromino::I => 0,
            Tetromino::J => 1,
            Tetromino::L => 2,
            Tetromino::O => 3,
            Tetromino::S => 4,
            Tetromino::T => 5,
            Tetromino::Z => 6,
        }
    }

    /// Spawn orientation as (col, row) pairs, lowest row first.
    #[must_use]
    pub fn blocks(self) -> &'static [(i32, i32)] {
        match self {
            Tetromino::I => &[(0, 0), (1, 0), (2, 0), (3, 0)],
            Tetromino::J => &[(0, 0), (1, 0), (2, 0), (0, 1)],
            Tetromino::L => &[(0, 0), (1, 0), (2, 0), (2, 1)],
            Tetromino::O => &[(0, 0), (1, 0), (0, 1), (1, 1)],
            Tetromino::S => &[(0, 0), (1, 0), (1, 1), (2, 1)],
            Tetromino::T => &[(0, 0), (1, 0), (2, 0), (1, 1)],
            Tetromino::Z => &[(1, 0), (2, 0), (0, 1), (1, 1)],
        }
    }
}

/// Piece geometry as the attack engine sees it: a type code, the piece's own
/// classification and its blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    pub piece_type: i32,
    pub classification: Cell,
    pub blocks: Vec<PieceBlock>,
}

impl Piece {
    #[must_use]
    pub fn new(piece_type: i32, classification: Cell, blocks: Vec<PieceBlock>) -> Self {
        Self {
            piece_type,
            classification,
            blocks,
        }
    }

    /// A tetromino placed in every pane its classification occupies.
    #[must_use]
    pub fn tetromino(kind: Tetromino, classification: Cell) -> Self {
        let occupied = cell::panes(classification);
        let blocks = (0..PANES)
            .filter(|&pane| occupied[pane])
            .flat_map(|pane| {
                kind.blocks()
                    .iter()
                    .map(move |&(col, row)| PieceBlock { pane, row, col })
            })
            .collect();
        Self::new(kind.index(), classification, blocks)
    }

    #[must_use]
    pub fn width(&self) -> i32 {
        let min = self.blocks.iter().map(|b| b.col).min().unwrap_or(0);
        let max = self.blocks.iter().map(|b| b.col).max().unwrap_or(-1);
        max - min + 1
    }

    fn cell_at(&self, block: &PieceBlock, offset: Offset) -> Option<(usize, usize, usize)> {
        let row = offset.y + block.row;
        let col = offset.x + block.col;
        (row >= 0 && col >= 0).then_some((block.pane, row as usize, col as usize))
    }

    /// Grid positions covered at `offset`, skipping anything below or left of
    /// the origin.
    pub fn cells(&self, offset: Offset) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.blocks.iter().filter_map(move |b| self.cell_at(b, offset))
    }

    /// Per grid row spanned, the occupied columns of each pane.
    #[must_use]
    pub fn occupancy(&self, offset: Offset) -> Vec<(usize, [u64; 2])> {
        let mut rows: Vec<(usize, [u64; 2])> = Vec::new();
        for (pane, row, col) in self.cells(offset) {
            if col >= 64 {
                continue;
            }
            match rows.iter_mut().find(|(r, _)| *r == row) {
                Some((_, masks)) => masks[pane] |= 1 << col,
                None => {
                    let mut masks = [0u64; 2];
                    masks[pane] = 1 << col;
                    rows.push((row, masks));
                }
            }
        }
        rows.sort_by_key(|(row, _)| *row);
        rows
    }

    #[must_use]
    pub fn fits(&self, grid: &Grid, offset: Offset) -> bool {
        self.blocks.iter().all(|b| match self.cell_at(b, offset) {
            Some((pane, row, col)) => {
                row < grid.rows() && col < grid.cols() && !grid.is_filled(pane, row, col)
            }
            None => false,
        })
    }

    pub fn lock_into(&self, grid: &mut Grid, offset: Offset) {
        for (pane, row, col) in self.cells(offset) {
            if row < grid.rows() && col < grid.cols() {
                grid.set(pane, row, col, self.classification);
            }
        }
    }
}
