#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Column indices are bounded by MAX_COLS so shifting a u64 by them is always in range
    clippy::cast_possible_truncation
)]

use crate::cell::{self, Cell, NO};
use crate::game::{MAX_COLS, PANES};

/// Mask with the lowest `cols` bits set.
#[must_use]
pub fn full_mask(cols: usize) -> u64 {
    if cols >= 64 { u64::MAX } else { (1u64 << cols) - 1 }
}

/// Two-pane playfield indexed `[pane][row][column]`, row 0 at the bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        assert!(
            cols > 0 && cols <= MAX_COLS,
            "grid must have between 1 and {MAX_COLS} columns, got {cols}"
        );
        Self {
            rows,
            cols,
            cells: vec![NO; PANES * rows * cols],
        }
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    fn index(&self, pane: usize, row: usize, col: usize) -> usize {
        debug_assert!(pane < PANES && row < self.rows && col < self.cols);
        (pane * self.rows + row) * self.cols + col
    }

    #[must_use]
    pub fn get(&self, pane: usize, row: usize, col: usize) -> Cell {
        self.cells[self.index(pane, row, col)]
    }

    pub fn set(&mut self, pane: usize, row: usize, col: usize, cell: Cell) {
        let index = self.index(pane, row, col);
        self.cells[index] = cell;
    }

    #[must_use]
    pub fn is_filled(&self, pane: usize, row: usize, col: usize) -> bool {
        cell::is_block(self.get(pane, row, col))
    }

    /// Bit `c` is set when column `c` of the row is filled in `pane`.
    #[must_use]
    pub fn row_mask(&self, pane: usize, row: usize) -> u64 {
        (0..self.cols)
            .filter(|&col| self.is_filled(pane, row, col))
            .fold(0, |mask, col| mask | (1 << col))
    }

    #[must_use]
    pub fn is_row_full(&self, pane: usize, row: usize) -> bool {
        self.row_mask(pane, row) == full_mask(self.cols)
    }

    #[must_use]
    pub fn is_row_empty(&self, row: usize) -> bool {
        (0..PANES).all(|pane| self.row_mask(pane, row) == 0)
    }

    pub fn clear(&mut self) {
        self.cells.fill(NO);
    }

    #[must_use]
    pub fn row(&self, row: usize) -> PaneRow {
        let mut out = PaneRow::new(self.cols);
        for pane in 0..PANES {
            for col in 0..self.cols {
                out.set(pane, col, self.get(pane, row, col));
            }
        }
        out
    }

    pub fn set_row(&mut self, row: usize, cells: &PaneRow) {
        for pane in 0..PANES {
            for col in 0..self.cols {
                self.set(pane, row, col, cells.get(pane, col));
            }
        }
    }

    fn clear_row(&mut self, row: usize) {
        for pane in 0..PANES {
            for col in 0..self.cols {
                self.set(pane, row, col, NO);
            }
        }
    }

    /// Moves everything up by `count` rows, leaving empty rows at the bottom.
    /// Returns true if any block was pushed off the top.
    pub fn shift_up(&mut self, count: usize) -> bool {
        if count == 0 {
            return false;
        }
        let lost_from = self.rows.saturating_sub(count);
        let overflow = (lost_from..self.rows).any(|row| !self.is_row_empty(row));
        for row in (0..self.rows).rev() {
            if row >= count {
                let below = self.row(row - count);
                self.set_row(row, &below);
            } else {
                self.clear_row(row);
            }
        }
        overflow
    }

    /// Moves everything down by `count` rows and returns the rows that fell
    /// out of the bottom, bottom row first.
    pub fn shift_down(&mut self, count: usize) -> Vec<PaneRow> {
        let count = count.min(self.rows);
        let removed = (0..count).map(|row| self.row(row)).collect();
        for row in 0..self.rows {
            if row + count < self.rows {
                let above = self.row(row + count);
                self.set_row(row, &above);
            } else {
                self.clear_row(row);
            }
        }
        removed
    }

    /// Writes one garbage row of `classification`. `masks[pane]` selects the
    /// filled columns per pane; a both-pane classification whose masks
    /// disagree at a column degrades to the single-pane code there.
    pub fn place_row(&mut self, row: usize, classification: Cell, masks: [u64; 2]) {
        let occupied = cell::panes(classification);
        for col in 0..self.cols {
            let bit = 1u64 << col;
            let filled = [
                occupied[0] && masks[0] & bit != 0,
                occupied[1] && masks[1] & bit != 0,
            ];
            for pane in 0..PANES {
                let value = match (filled[pane], filled[1 - pane]) {
                    (false, _) => NO,
                    (true, true) => classification,
                    (true, false) => cell::pane_component(classification, pane),
                };
                self.set(pane, row, col, value);
            }
        }
    }

    /// Removes the block at a position, from both panes if it spans them.
    pub fn remove_block(&mut self, pane: usize, row: usize, col: usize) {
        let code = self.get(pane, row, col);
        if cell::spans_both_panes(code) {
            for p in 0..PANES {
                if self.get(p, row, col) == code {
                    self.set(p, row, col, NO);
                }
            }
        } else {
            self.set(pane, row, col, NO);
        }
    }

    /// Highest filled row in a column across the given panes.
    #[must_use]
    pub fn column_height(&self, col: usize, panes: [bool; 2]) -> usize {
        (0..self.rows)
            .rev()
            .find(|&row| (0..PANES).any(|pane| panes[pane] && self.is_filled(pane, row, col)))
            .map_or(0, |row| row + 1)
    }

    #[must_use]
    pub fn count_blocks(&self) -> usize {
        self.cells.iter().filter(|&&c| cell::is_block(c)).count()
    }
}

/// A single row across both panes, used for pushed rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaneRow {
    cells: [Vec<Cell>; 2],
}

impl PaneRow {
    #[must_use]
    pub fn new(cols: usize) -> Self {
        Self {
            cells: [vec![NO; cols], vec![NO; cols]],
        }
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cells[0].len()
    }

    #[must_use]
    pub fn get(&self, pane: usize, col: usize) -> Cell {
        self.cells[pane][col]
    }

    pub fn set(&mut self, pane: usize, col: usize, cell: Cell) {
        self.cells[pane][col] = cell;
    }

    #[must_use]
    pub fn pane(&self, pane: usize) -> &[Cell] {
        &self.cells[pane]
    }

    /// The row as seen from the receiving field: panes swapped and every
    /// cell passed through [`cell::push_flip`].
    #[must_use]
    pub fn push_flipped(&self) -> Self {
        let flip = |pane: &Vec<Cell>| pane.iter().map(|&c| cell::push_flip(c)).collect();
        Self {
            cells: [flip(&self.cells[1]), flip(&self.cells[0])],
        }
    }

    pub fn map_cells(&mut self, mut f: impl FnMut(Cell) -> Cell) {
        for pane in &mut self.cells {
            for c in pane.iter_mut() {
                *c = f(*c);
            }
        }
    }
}
