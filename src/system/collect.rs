#![warn(clippy::all, clippy::pedantic)]

use log::{debug, trace, warn};

use super::AttackSystem;
use crate::attack::{Attack, DropBlock, GarbageRow, LevelChange, TargetCode};
use crate::cell::{self, Cell};
use crate::config::{AttackBehavior, Composition, Density, Number, Queue};
use crate::density::{self, PieceRow};
use crate::game::PANES;
use crate::grid::Grid;
use crate::piece::{Offset, Piece};
use crate::progress::GameProgress;
use crate::routing::{next_target_code, Category};
use crate::state::ClearedRow;

/// Everything the host knows about one clear.
///
/// `chromatic[row]` holds the classification of a row cleared in a single
/// pane, `monochromatic[row]` marks a row cleared identically in both panes.
/// A row is cleared if either says so.
#[derive(Debug, Clone, Copy)]
pub struct ClearEvent<'a> {
    pub before: &'a Grid,
    pub after: &'a Grid,
    /// Only the cleared cells, everything else empty.
    pub inverted: &'a Grid,
    pub chromatic: &'a [Option<Cell>],
    pub monochromatic: &'a [bool],
}

impl ClearEvent<'_> {
    #[must_use]
    pub fn is_cleared(&self, row: usize) -> bool {
        self.chromatic.get(row).copied().flatten().is_some()
            || self.monochromatic.get(row).copied().unwrap_or(false)
    }

    pub fn cleared_rows(&self) -> impl Iterator<Item = usize> + '_ {
        let rows = self.chromatic.len().max(self.monochromatic.len());
        (0..rows).filter(|&row| self.is_cleared(row))
    }

    /// The classification the clear reported for `row`.
    #[must_use]
    pub fn result(&self, row: usize) -> Cell {
        match self.chromatic.get(row).copied().flatten() {
            Some(code) if !self.monochromatic.get(row).copied().unwrap_or(false) => code,
            _ => cell::SS,
        }
    }

    #[must_use]
    pub fn spans_both_panes(&self, row: usize) -> bool {
        self.monochromatic.get(row).copied().unwrap_or(false)
            || self
                .chromatic
                .get(row)
                .copied()
                .flatten()
                .is_some_and(cell::spans_both_panes)
    }

    /// Most common block code among the cleared cells; ties go to the
    /// smaller code.
    #[must_use]
    pub fn majority(&self) -> Option<Cell> {
        let mut counts = [0usize; cell::NUM_CODES];
        for pane in 0..PANES {
            for row in 0..self.inverted.rows() {
                for col in 0..self.inverted.cols() {
                    let code = self.inverted.get(pane, row, col);
                    if cell::is_block(code) {
                        counts[usize::from(code)] += 1;
                    }
                }
            }
        }
        let (code, count) = counts
            .iter()
            .enumerate()
            .fold((0, 0), |best, (code, &count)| if count > best.1 { (code, count) } else { best });
        (count > 0).then_some(code as Cell)
    }
}

// Rows of one grid that changed from `from` to `to` in either pane
fn transition_rows(before: &Grid, after: &Grid, rows: &[usize], from: Cell, to: Cell) -> u32 {
    let count = rows
        .iter()
        .filter(|&&row| row < before.rows() && row < after.rows())
        .filter(|&&row| {
            (0..PANES).any(|pane| {
                (0..before.cols().min(after.cols()))
                    .any(|col| before.get(pane, row, col) == from && after.get(pane, row, col) == to)
            })
        })
        .count();
    count as u32
}

// Consecutive rows sharing a cascade index and lock phase
fn cascade_sets(rows: &[ClearedRow]) -> Vec<&[ClearedRow]> {
    let mut sets = Vec::new();
    let mut start = 0;
    for index in 1..=rows.len() {
        let boundary = index == rows.len()
            || rows[index].cascade != rows[start].cascade
            || rows[index].after_lock != rows[start].after_lock;
        if boundary {
            if start < index {
                sets.push(&rows[start..index]);
            }
            start = index;
        }
    }
    sets
}

fn is_single_pane_set(set: &[ClearedRow]) -> bool {
    let Some(first) = set.first() else {
        return false;
    };
    cell::is_single_pane(first.classification)
        && set
            .iter()
            .all(|row| !row.both_panes && row.classification == first.classification)
}

/// Applies a `Number` policy to the rows a category considered.
#[must_use]
pub fn select_rows(rows: &[ClearedRow], number: Number) -> Vec<ClearedRow> {
    match number {
        Number::All => rows.to_vec(),
        Number::LessOne => rows.iter().skip(1).copied().collect(),
        Number::LessOnePerCascade => cascade_sets(rows)
            .into_iter()
            .flat_map(|set| set.iter().skip(1).copied())
            .collect(),
        Number::AtLeastTwo => {
            if rows.len() >= 2 {
                rows.to_vec()
            } else {
                Vec::new()
            }
        }
        Number::AtLeastTwoDualPane => {
            let kept: Vec<ClearedRow> = cascade_sets(rows)
                .into_iter()
                .filter(|set| !is_single_pane_set(set))
                .flat_map(|set| set.iter().copied())
                .collect();
            if kept.len() >= 2 { kept } else { Vec::new() }
        }
    }
}

fn flush_groups(rows: Vec<ClearedRow>, queue: Queue) -> Vec<Vec<ClearedRow>> {
    if rows.is_empty() {
        return Vec::new();
    }
    match queue {
        Queue::PerCycle => vec![rows],
        Queue::PerCascade => cascade_sets(&rows).into_iter().map(<[ClearedRow]>::to_vec).collect(),
    }
}

impl AttackSystem {
    /// Records the type and column of the piece starting this cycle.
    pub fn on_piece_about_to_enter(&mut self, piece: &Piece, offset: Offset) {
        self.require_finalized("on_piece_about_to_enter");
        let cycle = &mut self.state.cycle;
        cycle.piece_type = piece.piece_type;
        cycle.piece_column = offset.x;
        trace!("Piece {} entering at column {}", piece.piece_type, offset.x);
    }

    /// Records the piece's footprint and how many rows had cleared before it
    /// locked.
    pub fn on_piece_about_to_lock(&mut self, grid: &Grid, piece: &Piece, offset: Offset) {
        self.require_finalized("on_piece_about_to_lock");
        let capacity = self.state.capacity();
        let cycle = &mut self.state.cycle;
        cycle.piece_type = piece.piece_type;
        cycle.piece_column = offset.x;
        cycle.piece_locked = true;
        cycle.clears_before_lock = cycle.cleared.len();
        cycle.piece_rows.fill([0; 2]);
        for (row, masks) in piece.occupancy(offset) {
            if row < grid.rows() && row < capacity {
                cycle.piece_rows[row] = masks;
            }
        }
    }

    /// Appends one entry per cleared row and enqueues any self-directed
    /// push or penalty triggered by the clear.
    pub fn on_about_to_clear(&mut self, piece: Option<&Piece>, clear: &ClearEvent) {
        self.require_finalized("on_about_to_clear");
        let rows: Vec<usize> = clear.cleared_rows().collect();
        if rows.is_empty() {
            return;
        }
        let composition = self.behavior.cleared.composition;
        let majority = match composition {
            Composition::ClearMajority => clear.majority(),
            _ => None,
        };
        let capacity = self.state.capacity();
        let cycle = &mut self.state.cycle;
        for &row in &rows {
            let result = clear.result(row);
            let classification = match composition {
                Composition::Uniform(code) => code,
                Composition::ClearMajority => majority.unwrap_or(result),
                Composition::LockedPiece => piece.map_or(result, |p| p.classification),
                Composition::None | Composition::Standard | Composition::ClearResult => result,
            };
            if cycle.cleared.len() >= capacity {
                warn!("Cleared row table is full, row {row} not recorded");
                continue;
            }
            cycle.cleared.push(ClearedRow {
                classification,
                cascade: cycle.cascade,
                both_panes: clear.spans_both_panes(row),
                after_lock: cycle.piece_locked,
            });
        }
        if piece.is_some() && cycle.piece_locked && !cycle.piece_rows_recorded {
            for &row in &rows {
                if row < capacity {
                    cycle.piece_row_cleared[row] = true;
                }
            }
            cycle.piece_rows_recorded = true;
        }
        debug!(
            "Recorded {} cleared rows at cascade {}",
            rows.len(),
            cycle.cascade
        );
        if cycle.piece_locked {
            cycle.cascade += 1;
        }

        let push = self.behavior.push;
        if push.is_enabled() && push.include.clears() {
            let pushed = transition_rows(
                clear.before,
                clear.after,
                &rows,
                cell::PUSH_DOWN,
                cell::PUSH_DOWN_ACTIVE,
            );
            if pushed > 0 {
                let mut attack = Attack::new(TargetCode::Incoming);
                attack.push_out_rows = pushed;
                self.route(attack);
            }
        }
        let penalty = self.behavior.penalty;
        if penalty.is_enabled() && penalty.include.clears() {
            let raised =
                transition_rows(clear.before, clear.after, &rows, cell::PUSH_UP, cell::PUSH_UP_ACTIVE);
            if raised > 0 {
                let mut attack = Attack::new(TargetCode::Incoming);
                attack.penalty_rows = raised;
                self.route(attack);
            }
        }
    }

    /// Sleeper blocks woken by a metamorphosis push rows out of the field.
    pub fn on_metamorphosis(&mut self, before: &Grid, after: &Grid) {
        self.require_finalized("on_metamorphosis");
        let push = self.behavior.push;
        if !push.is_enabled() || !push.include.metamorphosis() {
            return;
        }
        let rows: Vec<usize> = (0..before.rows().min(after.rows())).collect();
        let woken = transition_rows(before, after, &rows, cell::SL_INACTIVE, cell::SL_ACTIVE);
        if woken > 0 {
            trace!("Metamorphosis woke sleepers in {woken} rows");
            let mut attack = Attack::new(TargetCode::Incoming);
            attack.push_out_rows = woken;
            self.route(attack);
        }
    }

    /// Queues level-up garbage and the synchronized level change.
    pub fn on_about_to_level_up<G: GameProgress>(&mut self, info: &G, levels_gained: u32) {
        self.require_finalized("on_about_to_level_up");
        if levels_gained == 0 {
            return;
        }
        let level_up = self.behavior.level_up;
        if level_up.is_enabled() {
            let per_level = match info.garbage_per_level() {
                0 => self.behavior.default_level_up_rows,
                rows => rows,
            };
            let count = ((per_level * levels_gained) as usize).min(self.state.capacity());
            let cycle = &self.state.cycle;
            let rows: Vec<GarbageRow> = (0..count)
                .map(|index| {
                    let classification = match level_up.composition {
                        Composition::Uniform(code) => code,
                        _ if index % 2 == 0 => cell::S0,
                        _ => cell::S1,
                    };
                    GarbageRow::new(classification, index as u32, cycle.piece_type, cycle.piece_column)
                })
                .collect();
            let target = self.state.last_targets.next(Category::Garbage, level_up.target);
            let mut attack = Attack::new(target);
            attack.level_up_rows = rows;
            self.route(attack);
        }
        let sync = self.behavior.level_sync;
        if sync.is_enabled() {
            let level = info.level() + levels_gained;
            let difference = i64::from(level) - i64::from(info.first_level());
            let mut attack = Attack::new(next_target_code(sync.target, None));
            attack.level_change = Some(LevelChange {
                level,
                difference: i32::try_from(difference).unwrap_or(i32::MAX),
            });
            self.route(attack);
        }
    }

    /// Turns this cycle's observations into descriptors and resets the
    /// cycle.
    pub fn end_cycle(&mut self) {
        self.require_finalized("end_cycle");
        self.flush_garbage();
        self.flush_displacement();
        self.flush_drop_blocks();
        self.state.cycle.reset();
    }

    fn considered_rows(&self, behavior: AttackBehavior) -> Vec<ClearedRow> {
        if !behavior.is_enabled() || !behavior.include.clears() {
            return Vec::new();
        }
        let cycle = &self.state.cycle;
        // Without a lock every clear this cycle came before it
        let before_lock = if cycle.piece_locked {
            cycle.clears_before_lock
        } else {
            cycle.cleared.len()
        };
        let skipped = if behavior.include.clears_before_lock() { 0 } else { before_lock };
        select_rows(&cycle.cleared[skipped.min(cycle.cleared.len())..], behavior.number)
    }

    fn flush_garbage(&mut self) {
        let behavior = self.behavior.cleared;
        let selected = self.considered_rows(behavior);
        let patterns = behavior
            .density
            .is_piece_negative()
            .then(|| self.piece_negative_patterns(behavior.density == Density::PieceNegativeMirrored));
        let (piece_type, piece_column) = (self.state.cycle.piece_type, self.state.cycle.piece_column);
        for group in flush_groups(selected, behavior.queue) {
            let mut rows: Vec<GarbageRow> = group
                .iter()
                .map(|row| GarbageRow::new(row.classification, row.cascade, piece_type, piece_column))
                .collect();
            if let Some(patterns) = &patterns {
                set_preferred_blocks(&mut rows, patterns);
            }
            let target = self.state.last_targets.next(Category::Garbage, behavior.target);
            let mut attack = Attack::new(target);
            attack.clear_rows = rows;
            self.route(attack);
        }
    }

    fn flush_displacement(&mut self) {
        let behavior = self.behavior.displace;
        let selected = self.considered_rows(behavior);
        for group in flush_groups(selected, behavior.queue) {
            let target = self.state.last_targets.next(Category::Displace, behavior.target);
            let mut attack = Attack::new(target);
            attack.displace_rows = group.len() as u32;
            self.route(attack);
        }
    }

    fn flush_drop_blocks(&mut self) {
        let behavior = self.behavior.drop_blocks;
        let selected = self.considered_rows(behavior);
        for group in flush_groups(selected, behavior.queue) {
            let blocks = group
                .iter()
                .map(|row| DropBlock {
                    classification: match behavior.composition {
                        Composition::Uniform(code) => code,
                        _ => row.classification,
                    },
                    cascade: row.cascade,
                })
                .collect();
            let target = self.state.last_targets.next(Category::Drop, behavior.target);
            let mut attack = Attack::new(target);
            attack.drop_blocks = blocks;
            self.route(attack);
        }
    }

    // Pattern gaps for panes the piece never touched sit under the middle of
    // its footprint
    fn piece_negative_patterns(&self, mirrored: bool) -> [Vec<u64>; 2] {
        let cycle = &self.state.cycle;
        let rows: Vec<PieceRow> = cycle
            .piece_rows
            .iter()
            .zip(&cycle.piece_row_cleared)
            .filter(|(masks, _)| masks[0] | masks[1] != 0)
            .map(|(&masks, &cleared)| PieceRow { masks, cleared })
            .collect();
        let footprint = rows.iter().fold(0u64, |acc, row| acc | row.masks[0] | row.masks[1]);
        let gap_column = if footprint == 0 {
            cycle.piece_column
        } else {
            let low = footprint.trailing_zeros() as i32;
            let high = 63 - footprint.leading_zeros() as i32;
            (low + high) / 2
        };
        density::piece_negative_patterns(&rows, self.state.cols, gap_column, mirrored)
    }
}

/// Descriptor row `i` of `n` lands `n - 1 - i` rows above the bottom of the
/// garbage block.
fn set_preferred_blocks(rows: &mut [GarbageRow], patterns: &[Vec<u64>; 2]) {
    let count = rows.len();
    for (index, row) in rows.iter_mut().enumerate() {
        row.preferred = Some(density::tiled(patterns, count - 1 - index));
    }
}
