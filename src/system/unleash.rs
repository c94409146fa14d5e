#![warn(clippy::all, clippy::pedantic)]

use std::mem;

use log::{debug, trace};

use super::AttackSystem;
use crate::attack::{Attack, GarbageRow, TargetCode};
use crate::cell::{self, Cell};
use crate::config::Density;
use crate::connectivity::{self, default_separates, Direction, RepairContext};
use crate::density::{self, DensityKey};
use crate::game::{PANES, UNSET};
use crate::grid::{full_mask, Grid, PaneRow};
use crate::progress::{Displacement, GameProgress};
use crate::routing::Category;

/// Rows written into a field by one apply call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Unleashed {
    pub rows: usize,
    /// Blocks were pushed off the top, or rows did not fit at all.
    pub overflow: bool,
}

/// What one push transfer did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PushOutcome {
    /// Incoming rows that entered the field.
    pub pushed_in: usize,
    /// Field rows that left through the bottom.
    pub pushed_out: usize,
    /// Incoming rows passed straight on without touching the field.
    pub cross_wired: usize,
    /// Rows carried by the outgoing descriptor.
    pub sent: usize,
    pub overflow: bool,
}

fn repair_context<G: GameProgress>(info: &G) -> RepairContext {
    RepairContext {
        level: info.level(),
        first_level: info.first_level(),
        first_garbage: info.first_garbage(),
        hard: info.is_hard(),
    }
}

impl AttackSystem {
    /// Moves pending incoming descriptors into the active slot, merging
    /// while the tables have room. Returns true if anything is active.
    pub fn dequeue_incoming_attacks_this_cycle(&mut self) -> bool {
        self.require_finalized("dequeue_incoming_attacks_this_cycle");
        let capacity = self.state.capacity();
        while let Some(mut next) = self.state.incoming.pop_front() {
            next.target = TargetCode::Incoming;
            if !self.state.active.merge(&next, capacity) {
                self.state.incoming.push_front(next);
                break;
            }
        }
        if !self.state.active.is_empty() {
            debug!(
                "Active attack: {} garbage rows, {} penalty rows, {} pending",
                self.state.active.garbage_row_count(),
                self.state.active.penalty_rows,
                self.state.incoming.len()
            );
        }
        !self.state.active.is_empty()
    }

    #[must_use]
    pub fn has_garbage_rows(&self) -> bool {
        self.state.active.garbage_row_count() > 0
    }

    #[must_use]
    pub fn has_penalty_rows(&self) -> bool {
        self.state.active.penalty_rows > 0
    }

    #[must_use]
    pub fn has_push_rows(&self) -> bool {
        self.state.active.has_push_rows()
    }

    #[must_use]
    pub fn has_displace_rows(&self) -> bool {
        self.state.active.displace_rows > 0
    }

    #[must_use]
    pub fn has_level_change(&self) -> bool {
        self.state.active.level_change.is_some()
    }

    #[must_use]
    pub fn has_drop_blocks(&self) -> bool {
        !self.state.active.drop_blocks.is_empty()
    }

    fn density_key<G: GameProgress>(&self, row: usize, garbage: &GarbageRow, info: &G) -> DensityKey {
        DensityKey {
            row: row as i64,
            cascade: i64::from(garbage.cascade),
            piece_type: i64::from(garbage.piece_type),
            piece_column: i64::from(garbage.piece_column),
            level: i64::from(info.level()),
            first_level: i64::from(info.first_level()),
            first_garbage: i64::from(info.first_garbage()),
            seed: self.state.seed,
        }
    }

    fn advance_seed(&mut self, rows: usize) {
        self.state.seed = self.state.seed.wrapping_add(rows as i64);
    }

    /// Inserts the active garbage rows at the bottom of `grid` using the
    /// default separation rule.
    pub fn unleash_garbage_rows<G: GameProgress>(&mut self, grid: &mut Grid, info: &G) -> Unleashed {
        self.unleash_garbage_rows_with(grid, info, &default_separates)
    }

    /// Inserts the active garbage rows at the bottom of `grid`: clear rows
    /// first, then level-up rows. The block is repaired so that everything
    /// in it rests on the bottom row and no pane row is sealed.
    ///
    /// # Panics
    ///
    /// If the grid is not as wide as the engine, or repair finds no hole for
    /// a sealed row.
    pub fn unleash_garbage_rows_with<G, F>(&mut self, grid: &mut Grid, info: &G, separates: &F) -> Unleashed
    where
        G: GameProgress,
        F: Fn(Cell, Cell, Direction) -> bool,
    {
        self.require_finalized("unleash_garbage_rows");
        assert_eq!(grid.cols(), self.state.cols, "grid width differs from the attack system");
        let cleared = self.behavior.cleared.density;
        let level_up = self.behavior.level_up.density;
        let rows: Vec<(GarbageRow, Density)> = mem::take(&mut self.state.active.clear_rows)
            .into_iter()
            .map(|row| (row, cleared))
            .chain(
                mem::take(&mut self.state.active.level_up_rows)
                    .into_iter()
                    .map(|row| (row, level_up)),
            )
            .collect();
        if rows.is_empty() {
            return Unleashed::default();
        }
        let height = rows.len().min(grid.rows());
        let mut overflow = rows.len() > height;
        overflow |= grid.shift_up(height);
        for (index, (garbage, density)) in rows.iter().take(height).enumerate() {
            let key = self.density_key(index, garbage, info);
            let masks = density::row_masks(*density, &key, grid.cols(), garbage.preferred);
            grid.place_row(height - 1 - index, garbage.classification, masks);
        }
        connectivity::repair(grid, height, separates, &repair_context(info));
        self.advance_seed(height);
        debug!("Unleashed {height} garbage rows (overflow: {overflow})");
        Unleashed { rows: height, overflow }
    }

    /// Inserts the active penalty rows: stone with a gap alternating between
    /// the first and last column.
    pub fn unleash_penalty_rows<G: GameProgress>(&mut self, grid: &mut Grid, info: &G) -> Unleashed {
        self.require_finalized("unleash_penalty_rows");
        assert_eq!(grid.cols(), self.state.cols, "grid width differs from the attack system");
        let count = mem::take(&mut self.state.active.penalty_rows) as usize;
        if count == 0 {
            return Unleashed::default();
        }
        let height = count.min(grid.rows());
        let mut overflow = count > height;
        overflow |= grid.shift_up(height);
        let full = full_mask(grid.cols());
        for row in 0..height {
            let gap = if row % 2 == 0 { 0 } else { grid.cols() - 1 };
            let mask = full & !(1u64 << gap);
            grid.place_row(row, cell::ST, [mask; PANES]);
        }
        connectivity::repair(grid, height, &default_separates, &repair_context(info));
        debug!("Unleashed {height} penalty rows (overflow: {overflow})");
        Unleashed { rows: height, overflow }
    }

    /// Trades rows with the other fields.
    ///
    /// Incoming rows matched by a pending push-out are taken last-in first
    /// and passed straight on, flipped. Unmatched incoming rows enter at the
    /// bottom of the field; unmatched push-outs take rows off the bottom and
    /// send them on flipped. Everything sent goes in one descriptor.
    pub fn unleash_push_rows(&mut self, grid: &mut Grid) -> PushOutcome {
        self.require_finalized("unleash_push_rows");
        assert_eq!(grid.cols(), self.state.cols, "grid width differs from the attack system");
        let mut incoming = mem::take(&mut self.state.active.push_in_rows);
        let push_out = mem::take(&mut self.state.active.push_out_rows) as usize;
        let mut outcome = PushOutcome::default();
        let mut sent: Vec<PaneRow> = Vec::new();

        let crossed = incoming.len().min(push_out);
        for _ in 0..crossed {
            if let Some(row) = incoming.pop() {
                sent.push(row.push_flipped());
            }
        }
        outcome.cross_wired = crossed;

        for row in &incoming {
            outcome.overflow |= grid.shift_up(1);
            grid.set_row(0, row);
        }
        outcome.pushed_in = incoming.len();

        let excess = push_out - crossed;
        if excess > 0 {
            let removed = grid.shift_down(excess);
            outcome.pushed_out = removed.len();
            sent.extend(removed.iter().map(PaneRow::push_flipped));
        }

        outcome.sent = sent.len();
        if !sent.is_empty() {
            let target = self.state.last_targets.next(Category::Push, self.behavior.push.target);
            let mut attack = Attack::new(target);
            attack.push_in_rows = sent;
            self.route(attack);
        }
        trace!("Push transfer: {outcome:?}");
        outcome
    }

    /// Hands the active displacement to the fall-rate controller.
    pub fn unleash_displace_rows<D: Displacement>(&mut self, displacement: &mut D) -> u32 {
        self.require_finalized("unleash_displace_rows");
        let rows = mem::take(&mut self.state.active.displace_rows);
        if rows > 0 {
            displacement.accelerate(rows);
        }
        rows
    }

    /// Raises the level to match the sender's progress. Never lowers it.
    /// Returns the new level when it changed.
    pub fn unleash_level_change<G: GameProgress>(&mut self, info: &mut G) -> Option<u32> {
        self.require_finalized("unleash_level_change");
        let change = self.state.active.level_change.take()?;
        let target = i64::from(info.first_level()) + i64::from(change.difference);
        let target = u32::try_from(target.max(0)).unwrap_or(u32::MAX);
        if target > info.level() {
            debug!("Level synchronized from {} to {target}", info.level());
            info.set_level(target);
            Some(target)
        } else {
            None
        }
    }

    /// Drops the active blocks onto their columns. Returns how many landed;
    /// blocks over a full column are lost.
    pub fn unleash_drop_blocks<G: GameProgress>(&mut self, grid: &mut Grid, info: &G) -> usize {
        self.require_finalized("unleash_drop_blocks");
        assert_eq!(grid.cols(), self.state.cols, "grid width differs from the attack system");
        let blocks = mem::take(&mut self.state.active.drop_blocks);
        let mut landed = 0;
        for (index, block) in blocks.iter().enumerate() {
            let garbage = GarbageRow::new(block.classification, block.cascade, UNSET, UNSET);
            let key = self.density_key(index, &garbage, info);
            let col = density::single_gap_column(&key, grid.cols());
            let occupied = cell::panes(block.classification);
            let row = grid.column_height(col, occupied);
            if row >= grid.rows() {
                trace!("Drop block lost over full column {col}");
                continue;
            }
            for pane in 0..PANES {
                if occupied[pane] {
                    grid.set(pane, row, col, block.classification);
                }
            }
            landed += 1;
        }
        self.advance_seed(blocks.len());
        landed
    }

    /// Lays the configured starting terrain at the bottom of a fresh field:
    /// stone rows first, then shared, then each pane's own rows. With no
    /// terrain configured, `first_garbage` rows of shared blocks are used.
    pub fn generate_starting_terrain<G: GameProgress>(&mut self, grid: &mut Grid, info: &G) -> Unleashed {
        self.require_finalized("generate_starting_terrain");
        assert_eq!(grid.cols(), self.state.cols, "grid width differs from the attack system");
        let terrain = self.behavior.terrain;
        let mut codes: Vec<Cell> = [
            (cell::ST, terrain.st),
            (cell::SS, terrain.ss),
            (cell::S0, terrain.s0),
            (cell::S1, terrain.s1),
        ]
        .into_iter()
        .flat_map(|(code, rows)| std::iter::repeat_n(code, rows as usize))
        .collect();
        if codes.is_empty() {
            codes = vec![cell::SS; info.first_garbage() as usize];
        }
        if codes.is_empty() {
            return Unleashed::default();
        }
        let height = codes.len().min(grid.rows());
        let mut overflow = codes.len() > height;
        overflow |= grid.shift_up(height);
        for (row, &code) in codes.iter().take(height).enumerate() {
            let garbage = GarbageRow::new(code, 0, UNSET, UNSET);
            let key = self.density_key(row, &garbage, info);
            let masks = density::row_masks(Density::SwissCheese, &key, grid.cols(), None);
            grid.place_row(row, code, masks);
        }
        connectivity::repair(grid, height, &default_separates, &repair_context(info));
        self.advance_seed(height);
        debug!("Generated {height} rows of starting terrain");
        Unleashed { rows: height, overflow }
    }
}
