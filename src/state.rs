#![warn(clippy::all, clippy::pedantic)]

use crate::attack::Attack;
use crate::cell::Cell;
use crate::game::{ROW_CAPACITY_FACTOR, UNSET};
use crate::queue::AttackQueue;
use crate::routing::LastTargets;

/// One row cleared since the last cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearedRow {
    pub classification: Cell,
    pub cascade: u32,
    pub both_panes: bool,
    /// Cleared after the cycle's piece locked, rather than before it.
    pub after_lock: bool,
}

/// Observations collected during one piece cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleState {
    pub piece_type: i32,
    pub piece_column: i32,
    pub cascade: u32,
    pub piece_locked: bool,
    pub clears_before_lock: usize,
    /// Indexed by grid row: the locked piece's occupied columns per pane.
    pub piece_rows: Vec<[u64; 2]>,
    /// Indexed by grid row: the piece's first clear included this row.
    pub piece_row_cleared: Vec<bool>,
    pub piece_rows_recorded: bool,
    pub cleared: Vec<ClearedRow>,
}

impl CycleState {
    #[must_use]
    pub fn new(rows: usize) -> Self {
        let capacity = rows * ROW_CAPACITY_FACTOR;
        Self {
            piece_type: UNSET,
            piece_column: UNSET,
            cascade: 0,
            piece_locked: false,
            clears_before_lock: 0,
            piece_rows: vec![[0; 2]; capacity],
            piece_row_cleared: vec![false; capacity],
            piece_rows_recorded: false,
            cleared: Vec::with_capacity(capacity),
        }
    }

    /// Clears everything scoped to a cycle. The piece type and column stay
    /// until the next piece enters.
    pub fn reset(&mut self) {
        self.cascade = 0;
        self.piece_locked = false;
        self.clears_before_lock = 0;
        self.piece_rows.fill([0; 2]);
        self.piece_row_cleared.fill(false);
        self.piece_rows_recorded = false;
        self.cleared.clear();
    }
}

/// The engine's complete mutable state; what a snapshot saves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackState {
    pub rows: usize,
    pub cols: usize,
    pub seed: i64,
    pub active: Attack,
    pub incoming: AttackQueue,
    pub outgoing: AttackQueue,
    pub cycle: CycleState,
    pub last_targets: LastTargets,
}

impl AttackState {
    #[must_use]
    pub fn new(rows: usize, cols: usize, seed: i64) -> Self {
        Self {
            rows,
            cols,
            seed,
            active: Attack::default(),
            incoming: AttackQueue::new(),
            outgoing: AttackQueue::new(),
            cycle: CycleState::new(rows),
            last_targets: LastTargets::default(),
        }
    }

    /// Row capacity of every descriptor table.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.rows * ROW_CAPACITY_FACTOR
    }

    /// Applies `f` to every stored classification code; `None` aborts with
    /// the offending code.
    pub fn try_map_classifications(
        &mut self,
        mut f: impl FnMut(Cell) -> Option<Cell>,
    ) -> Result<(), Cell> {
        let mut map = |code: Cell| f(code).ok_or(code);
        let mut map_attack = |attack: &mut Attack| -> Result<(), Cell> {
            for row in attack.clear_rows.iter_mut().chain(attack.level_up_rows.iter_mut()) {
                row.classification = map(row.classification)?;
            }
            for block in &mut attack.drop_blocks {
                block.classification = map(block.classification)?;
            }
            for pushed in &mut attack.push_in_rows {
                let mut failed = None;
                pushed.map_cells(|c| match map(c) {
                    Ok(c) => c,
                    Err(bad) => {
                        failed.get_or_insert(bad);
                        c
                    }
                });
                if let Some(bad) = failed {
                    return Err(bad);
                }
            }
            Ok(())
        };
        map_attack(&mut self.active)?;
        let mut incoming: Vec<Attack> = Vec::new();
        self.incoming.drain_into(&mut incoming);
        for attack in &mut incoming {
            map_attack(attack)?;
        }
        self.incoming.replace(incoming);
        let mut outgoing: Vec<Attack> = Vec::new();
        self.outgoing.drain_into(&mut outgoing);
        for attack in &mut outgoing {
            map_attack(attack)?;
        }
        self.outgoing.replace(outgoing);
        for row in &mut self.cycle.cleared {
            row.classification = f(row.classification).ok_or(row.classification)?;
        }
        Ok(())
    }
}
