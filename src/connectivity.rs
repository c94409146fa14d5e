#![warn(clippy::all, clippy::pedantic)]

//! Connectivity repair for freshly inserted garbage.
//!
//! A block of garbage sits at rows `0..height` of a grid. Every filled cell
//! in it must be reachable from row 0 through neighbours the separation
//! predicate does not split, and no pane row may be completely filled.

use log::{error, trace};

use crate::cell::{self, Cell};
use crate::game::PANES;
use crate::grid::{Grid, full_mask};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
    Cross,
}

/// Whether two adjacent blocks are separate pieces of terrain. Blocks in the
/// same pane always hold together; across panes only blocks that span both
/// panes are joined.
#[must_use]
pub fn default_separates(from: Cell, to: Cell, direction: Direction) -> bool {
    match direction {
        Direction::Cross => !(cell::spans_both_panes(from) && cell::spans_both_panes(to)),
        Direction::Left | Direction::Right | Direction::Up | Direction::Down => false,
    }
}

/// Game state logged when repair hits an impossible block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairContext {
    pub level: u32,
    pub first_level: u32,
    pub first_garbage: u32,
    pub hard: bool,
}

/// Cells reachable from the bottom row.
#[derive(Debug, Clone)]
pub struct Reach {
    height: usize,
    cols: usize,
    marks: Vec<bool>,
}

impl Reach {
    #[must_use]
    pub fn is_marked(&self, pane: usize, row: usize, col: usize) -> bool {
        self.marks[(pane * self.height + row) * self.cols + col]
    }

    fn mark(&mut self, pane: usize, row: usize, col: usize) -> bool {
        let index = (pane * self.height + row) * self.cols + col;
        let fresh = !self.marks[index];
        self.marks[index] = true;
        fresh
    }
}

fn neighbours(
    pane: usize,
    row: usize,
    col: usize,
    height: usize,
    cols: usize,
) -> impl Iterator<Item = (usize, usize, usize, Direction)> {
    [
        (col > 0).then(|| (pane, row, col - 1, Direction::Left)),
        (col + 1 < cols).then(|| (pane, row, col + 1, Direction::Right)),
        (row + 1 < height).then(|| (pane, row + 1, col, Direction::Up)),
        (row > 0).then(|| (pane, row - 1, col, Direction::Down)),
        Some((1 - pane, row, col, Direction::Cross)),
    ]
    .into_iter()
    .flatten()
}

/// Flood fill over rows `0..height` starting from every filled cell of row 0.
pub fn reach_from_bottom<F>(grid: &Grid, height: usize, separates: &F) -> Reach
where
    F: Fn(Cell, Cell, Direction) -> bool,
{
    let cols = grid.cols();
    let mut reach = Reach {
        height,
        cols,
        marks: vec![false; PANES * height * cols],
    };
    if height == 0 {
        return reach;
    }
    let mut stack: Vec<(usize, usize, usize)> = Vec::new();
    for pane in 0..PANES {
        for col in 0..cols {
            if grid.is_filled(pane, 0, col) && reach.mark(pane, 0, col) {
                stack.push((pane, 0, col));
            }
        }
    }
    while let Some((pane, row, col)) = stack.pop() {
        let from = grid.get(pane, row, col);
        for (p, r, c, direction) in neighbours(pane, row, col, height, cols) {
            let to = grid.get(p, r, c);
            if cell::is_block(to) && !separates(from, to, direction) && reach.mark(p, r, c) {
                stack.push((p, r, c));
            }
        }
    }
    reach
}

/// True when every filled cell in rows `0..height` is reachable.
pub fn is_connected<F>(grid: &Grid, height: usize, separates: &F) -> bool
where
    F: Fn(Cell, Cell, Direction) -> bool,
{
    let reach = reach_from_bottom(grid, height, separates);
    (0..PANES).all(|pane| {
        (0..height).all(|row| {
            (0..grid.cols()).all(|col| !grid.is_filled(pane, row, col) || reach.is_marked(pane, row, col))
        })
    })
}

/// True when some pane row in `0..height` has no empty cell.
#[must_use]
pub fn has_sealed_row(grid: &Grid, height: usize) -> bool {
    (0..height).any(|row| (0..PANES).any(|pane| grid.is_row_full(pane, row)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    LeftToRight,
    RightToLeft,
}

/// Makes rows `0..height` connected to the bottom and unsealed.
///
/// Row by row, from the bottom up, every run of filled cells that cannot be
/// reached is extended into the empty space beside it until it touches
/// reachable terrain, first sweeping left to right and then right to left.
/// Runs that neither sweep can connect are removed. Finally any sealed pane
/// row gets a hole at the first column that keeps the block connected.
///
/// # Panics
///
/// If a sealed row has no column whose removal keeps the block connected.
pub fn repair<F>(grid: &mut Grid, height: usize, separates: &F, context: &RepairContext)
where
    F: Fn(Cell, Cell, Direction) -> bool,
{
    let height = height.min(grid.rows());
    for row in 1..height {
        for pane in 0..PANES {
            for sweep in [Sweep::LeftToRight, Sweep::RightToLeft] {
                connect_runs(grid, row, pane, sweep, separates);
            }
            remove_unreachable_runs(grid, row, pane, separates);
        }
    }
    // Removing a both-pane block can strand cells already visited
    remove_unreachable(grid, height, separates);
    for row in 0..height {
        for pane in 0..PANES {
            if grid.is_row_full(pane, row) {
                punch_hole(grid, height, row, pane, separates, context);
            }
        }
    }
}

// Columns of unreachable filled runs in one pane row, in sweep order
fn unreachable_runs(reach: &Reach, grid: &Grid, row: usize, pane: usize) -> Vec<(usize, usize)> {
    let cols = grid.cols();
    let mut runs = Vec::new();
    let mut col = 0;
    while col < cols {
        if grid.is_filled(pane, row, col) && !reach.is_marked(pane, row, col) {
            let start = col;
            while col < cols && grid.is_filled(pane, row, col) && !reach.is_marked(pane, row, col) {
                col += 1;
            }
            runs.push((start, col));
        } else {
            col += 1;
        }
    }
    runs
}

fn connect_runs<F>(grid: &mut Grid, row: usize, pane: usize, sweep: Sweep, separates: &F)
where
    F: Fn(Cell, Cell, Direction) -> bool,
{
    loop {
        let reach = reach_from_bottom(grid, row + 1, separates);
        let mut runs = unreachable_runs(&reach, grid, row, pane);
        if sweep == Sweep::RightToLeft {
            runs.reverse();
        }
        let mut changed = false;
        for (start, end) in runs {
            if extend_run(grid, &reach, row, pane, (start, end), sweep, separates) {
                changed = true;
                break;
            }
        }
        if !changed {
            return;
        }
    }
}

// Grows a run into the empty cells after it (before it when sweeping right to
// left) until a new cell touches reachable terrain; undoes the growth if it
// never does or if it would fill the pane row
fn extend_run<F>(
    grid: &mut Grid,
    reach: &Reach,
    row: usize,
    pane: usize,
    (start, end): (usize, usize),
    sweep: Sweep,
    separates: &F,
) -> bool
where
    F: Fn(Cell, Cell, Direction) -> bool,
{
    let cols = grid.cols();
    let step = |col: usize| match sweep {
        Sweep::LeftToRight => (col + 1 < cols).then_some(col + 1),
        Sweep::RightToLeft => col.checked_sub(1),
    };
    let anchor = match sweep {
        Sweep::LeftToRight => end - 1,
        Sweep::RightToLeft => start,
    };
    let fill = cell::pane_component(grid.get(pane, row, anchor), pane);
    let full = full_mask(cols);
    let mut cursor = step(anchor);
    let mut added = Vec::new();
    while let Some(col) = cursor {
        // Never seal the row; a sealed row may have no hole that keeps the
        // block connected
        if grid.is_filled(pane, row, col) || (grid.row_mask(pane, row) | (1u64 << col)) == full {
            break;
        }
        grid.set(pane, row, col, fill);
        added.push(col);
        if touches_reach(grid, reach, row, pane, col, separates) {
            trace!("Connected island in pane {pane} row {row} through column {col}");
            return true;
        }
        cursor = step(col);
    }
    for col in added {
        grid.set(pane, row, col, cell::NO);
    }
    false
}

fn touches_reach<F>(grid: &Grid, reach: &Reach, row: usize, pane: usize, col: usize, separates: &F) -> bool
where
    F: Fn(Cell, Cell, Direction) -> bool,
{
    let from = grid.get(pane, row, col);
    let joins = |p: usize, r: usize, c: usize, direction: Direction| {
        reach.is_marked(p, r, c) && !separates(from, grid.get(p, r, c), direction)
    };
    let below = row > 0 && joins(pane, row - 1, col, Direction::Down);
    let left = col > 0 && joins(pane, row, col - 1, Direction::Left);
    let right = col + 1 < grid.cols() && joins(pane, row, col + 1, Direction::Right);
    let across = joins(1 - pane, row, col, Direction::Cross);
    below || left || right || across
}

fn remove_unreachable_runs<F>(grid: &mut Grid, row: usize, pane: usize, separates: &F)
where
    F: Fn(Cell, Cell, Direction) -> bool,
{
    let reach = reach_from_bottom(grid, row + 1, separates);
    for (start, end) in unreachable_runs(&reach, grid, row, pane) {
        trace!("Removing island in pane {pane} row {row} columns {start}..{end}");
        for col in start..end {
            grid.remove_block(pane, row, col);
        }
    }
}

fn remove_unreachable<F>(grid: &mut Grid, height: usize, separates: &F)
where
    F: Fn(Cell, Cell, Direction) -> bool,
{
    let reach = reach_from_bottom(grid, height, separates);
    for pane in 0..PANES {
        for row in 0..height {
            for col in 0..grid.cols() {
                if grid.is_filled(pane, row, col) && !reach.is_marked(pane, row, col) {
                    grid.set(pane, row, col, cell::NO);
                }
            }
        }
    }
}

fn punch_hole<F>(
    grid: &mut Grid,
    height: usize,
    row: usize,
    pane: usize,
    separates: &F,
    context: &RepairContext,
) where
    F: Fn(Cell, Cell, Direction) -> bool,
{
    for col in 0..grid.cols() {
        let saved = [grid.get(0, row, col), grid.get(1, row, col)];
        grid.remove_block(pane, row, col);
        if is_connected(grid, height, separates) {
            trace!("Punched hole in sealed pane {pane} row {row} at column {col}");
            return;
        }
        grid.set(0, row, col, saved[0]);
        grid.set(1, row, col, saved[1]);
    }
    error!(
        "No hole keeps garbage connected: pane {pane} row {row} of {height}, level {}, first level {}, first garbage {}, hard {}",
        context.level, context.first_level, context.first_garbage, context.hard
    );
    panic!("sealed garbage row {row} in pane {pane} cannot be opened");
}
