#![warn(clippy::all, clippy::pedantic)]
#![allow(
    // Lengths are bounded by the field capacity or by the bytes remaining
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]

//! Versioned binary snapshot of an engine's state.
//!
//! Big-endian layout: version, rows, cols, seed, active attack, incoming
//! queue (count then attacks), outgoing queue, cycle accumulators, then a
//! boolean "more data" flag per extension. Version 1 adds the four last
//! target codes (`-1` for unset) behind the first extension flag.

use std::fmt;

use bytes::{Buf, BufMut};

use crate::attack::{Attack, DropBlock, GarbageRow, LevelChange, TargetCode};
use crate::cell::{self, Cell};
use crate::game::{
    MAX_COLS, ROW_CAPACITY_FACTOR, SNAPSHOT_VERSION_LAST_TARGETS, SNAPSHOT_VERSION_ORIGINAL,
    UNSET,
};
use crate::grid::PaneRow;
use crate::routing::LastTargets;
use crate::state::{AttackState, ClearedRow, CycleState};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    Truncated { needed: usize, remaining: usize },
    UnknownVersion(i32),
    UnknownTarget(i32),
    UnknownClassification(Cell),
    Malformed(&'static str),
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Truncated { needed, remaining } => {
                write!(f, "snapshot truncated: needed {needed} bytes, {remaining} left")
            }
            SnapshotError::UnknownVersion(version) => {
                write!(f, "unknown snapshot version {version}")
            }
            SnapshotError::UnknownTarget(code) => write!(f, "unknown target code {code}"),
            SnapshotError::UnknownClassification(code) => {
                write!(f, "unknown classification code {code}")
            }
            SnapshotError::Malformed(what) => write!(f, "malformed snapshot: bad {what}"),
            SnapshotError::DimensionMismatch { expected, found } => write!(
                f,
                "snapshot is for a {}x{} field, engine is {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
        }
    }
}

impl std::error::Error for SnapshotError {}

/// Snapshot in the first format version: no last targets, and
/// classifications from rule revision 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotV0 {
    pub state: AttackState,
}

/// Current snapshot format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotV1 {
    pub state: AttackState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    V0(SnapshotV0),
    V1(SnapshotV1),
}

impl Snapshot {
    #[must_use]
    pub fn current(state: &AttackState) -> Self {
        Snapshot::V1(SnapshotV1 {
            state: state.clone(),
        })
    }

    #[must_use]
    pub fn version(&self) -> i32 {
        match self {
            Snapshot::V0(_) => SNAPSHOT_VERSION_ORIGINAL,
            Snapshot::V1(_) => SNAPSHOT_VERSION_LAST_TARGETS,
        }
    }

    #[must_use]
    pub fn state(&self) -> &AttackState {
        match self {
            Snapshot::V0(s) => &s.state,
            Snapshot::V1(s) => &s.state,
        }
    }

    /// Migrates to the current version. Version 0 classifications go through
    /// [`cell::upgrade_classification`] and the last targets start unset.
    pub fn upgrade(self) -> Result<SnapshotV1, SnapshotError> {
        match self {
            Snapshot::V0(SnapshotV0 { mut state }) => {
                state
                    .try_map_classifications(|code| {
                        cell::upgrade_classification(code, SNAPSHOT_VERSION_ORIGINAL)
                    })
                    .map_err(SnapshotError::UnknownClassification)?;
                state.last_targets = LastTargets::default();
                Ok(SnapshotV1 { state })
            }
            Snapshot::V1(snapshot) => Ok(snapshot),
        }
    }

    pub fn write<B: BufMut>(&self, buf: &mut B) {
        let state = self.state();
        buf.put_i32(self.version());
        put_len(buf, state.rows);
        put_len(buf, state.cols);
        buf.put_i64(state.seed);
        put_attack(buf, &state.active);
        put_len(buf, state.incoming.len());
        for attack in state.incoming.iter() {
            put_attack(buf, attack);
        }
        put_len(buf, state.outgoing.len());
        for attack in state.outgoing.iter() {
            put_attack(buf, attack);
        }
        put_cycle(buf, &state.cycle);
        match self {
            Snapshot::V0(_) => put_bool(buf, false),
            Snapshot::V1(_) => {
                put_bool(buf, true);
                for last in state.last_targets.as_array() {
                    buf.put_i32(last.map_or(UNSET, TargetCode::code));
                }
                put_bool(buf, false);
            }
        }
    }

    pub fn read<B: Buf>(buf: &mut B) -> Result<Self, SnapshotError> {
        let mut r = Reader { buf };
        let version = r.i32()?;
        if version != SNAPSHOT_VERSION_ORIGINAL && version != SNAPSHOT_VERSION_LAST_TARGETS {
            return Err(SnapshotError::UnknownVersion(version));
        }
        let rows = r.len()?;
        let cols = r.len()?;
        if rows == 0 || cols == 0 || cols > MAX_COLS {
            return Err(SnapshotError::Malformed("dimensions"));
        }
        let seed = r.i64()?;
        let mut state = AttackState::new(rows, cols, seed);
        state.active = r.attack(cols)?;
        let incoming = r.len()?;
        for _ in 0..incoming {
            let attack = r.attack(cols)?;
            state.incoming.push(attack);
        }
        let outgoing = r.len()?;
        for _ in 0..outgoing {
            let attack = r.attack(cols)?;
            state.outgoing.push(attack);
        }
        state.cycle = r.cycle(rows)?;

        let mut more = r.bool()?;
        if version >= SNAPSHOT_VERSION_LAST_TARGETS {
            if !more {
                return Err(SnapshotError::Malformed("extension flag"));
            }
            let mut codes = [None; 4];
            for code in &mut codes {
                *code = r.target_or_unset()?;
            }
            state.last_targets = LastTargets::from_array(codes);
            more = r.bool()?;
        }
        if more {
            return Err(SnapshotError::Malformed("extension flag"));
        }

        Ok(match version {
            SNAPSHOT_VERSION_ORIGINAL => Snapshot::V0(SnapshotV0 { state }),
            _ => {
                state
                    .try_map_classifications(|c| cell::is_valid(c).then_some(c))
                    .map_err(SnapshotError::UnknownClassification)?;
                Snapshot::V1(SnapshotV1 { state })
            }
        })
    }
}

fn put_bool<B: BufMut>(buf: &mut B, value: bool) {
    buf.put_u8(u8::from(value));
}

fn put_len<B: BufMut>(buf: &mut B, len: usize) {
    buf.put_i32(i32::try_from(len).unwrap_or(i32::MAX));
}

fn put_rows<B: BufMut>(buf: &mut B, rows: &[GarbageRow]) {
    put_len(buf, rows.len());
    for row in rows {
        buf.put_u8(row.classification);
        buf.put_u32(row.cascade);
        buf.put_i32(row.piece_type);
        buf.put_i32(row.piece_column);
        put_bool(buf, row.preferred.is_some());
        if let Some([p0, p1]) = row.preferred {
            buf.put_u64(p0);
            buf.put_u64(p1);
        }
    }
}

fn put_attack<B: BufMut>(buf: &mut B, attack: &Attack) {
    buf.put_i32(attack.target.code());
    put_rows(buf, &attack.clear_rows);
    put_rows(buf, &attack.level_up_rows);
    buf.put_u32(attack.penalty_rows);
    buf.put_u32(attack.push_out_rows);
    put_len(buf, attack.push_in_rows.len());
    for row in &attack.push_in_rows {
        buf.put_slice(row.pane(0));
        buf.put_slice(row.pane(1));
    }
    buf.put_u32(attack.displace_rows);
    put_bool(buf, attack.level_change.is_some());
    if let Some(change) = attack.level_change {
        buf.put_u32(change.level);
        buf.put_i32(change.difference);
    }
    put_len(buf, attack.drop_blocks.len());
    for block in &attack.drop_blocks {
        buf.put_u8(block.classification);
        buf.put_u32(block.cascade);
    }
}

fn put_cycle<B: BufMut>(buf: &mut B, cycle: &CycleState) {
    buf.put_i32(cycle.piece_type);
    buf.put_i32(cycle.piece_column);
    buf.put_u32(cycle.cascade);
    put_bool(buf, cycle.piece_locked);
    put_len(buf, cycle.clears_before_lock);
    put_len(buf, cycle.piece_rows.len());
    for (masks, cleared) in cycle.piece_rows.iter().zip(&cycle.piece_row_cleared) {
        buf.put_u64(masks[0]);
        buf.put_u64(masks[1]);
        put_bool(buf, *cleared);
    }
    put_bool(buf, cycle.piece_rows_recorded);
    put_len(buf, cycle.cleared.len());
    for row in &cycle.cleared {
        buf.put_u8(row.classification);
        buf.put_u32(row.cascade);
        put_bool(buf, row.both_panes);
        put_bool(buf, row.after_lock);
    }
}

struct Reader<'a, B: Buf> {
    buf: &'a mut B,
}

impl<B: Buf> Reader<'_, B> {
    fn need(&self, needed: usize) -> Result<(), SnapshotError> {
        let remaining = self.buf.remaining();
        if remaining < needed {
            return Err(SnapshotError::Truncated { needed, remaining });
        }
        Ok(())
    }

    fn u8(&mut self) -> Result<u8, SnapshotError> {
        self.need(1)?;
        Ok(self.buf.get_u8())
    }

    fn i32(&mut self) -> Result<i32, SnapshotError> {
        self.need(4)?;
        Ok(self.buf.get_i32())
    }

    fn u32(&mut self) -> Result<u32, SnapshotError> {
        self.need(4)?;
        Ok(self.buf.get_u32())
    }

    fn i64(&mut self) -> Result<i64, SnapshotError> {
        self.need(8)?;
        Ok(self.buf.get_i64())
    }

    fn u64(&mut self) -> Result<u64, SnapshotError> {
        self.need(8)?;
        Ok(self.buf.get_u64())
    }

    fn bool(&mut self) -> Result<bool, SnapshotError> {
        match self.u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(SnapshotError::Malformed("boolean")),
        }
    }

    // Element counts; every element takes at least one byte
    fn len(&mut self) -> Result<usize, SnapshotError> {
        let len = self.i32()?;
        let len = usize::try_from(len).map_err(|_| SnapshotError::Malformed("length"))?;
        if len > self.buf.remaining() && len > 0 {
            return Err(SnapshotError::Truncated {
                needed: len,
                remaining: self.buf.remaining(),
            });
        }
        Ok(len)
    }

    fn target(&mut self) -> Result<TargetCode, SnapshotError> {
        let code = self.i32()?;
        TargetCode::from_code(code).ok_or(SnapshotError::UnknownTarget(code))
    }

    fn target_or_unset(&mut self) -> Result<Option<TargetCode>, SnapshotError> {
        let code = self.i32()?;
        if code == UNSET {
            return Ok(None);
        }
        TargetCode::from_code(code)
            .map(Some)
            .ok_or(SnapshotError::UnknownTarget(code))
    }

    fn rows(&mut self) -> Result<Vec<GarbageRow>, SnapshotError> {
        let count = self.len()?;
        let mut rows = Vec::with_capacity(count);
        for _ in 0..count {
            let mut row = GarbageRow::new(self.u8()?, self.u32()?, self.i32()?, self.i32()?);
            if self.bool()? {
                row.preferred = Some([self.u64()?, self.u64()?]);
            }
            rows.push(row);
        }
        Ok(rows)
    }

    fn attack(&mut self, cols: usize) -> Result<Attack, SnapshotError> {
        let mut attack = Attack::new(self.target()?);
        attack.clear_rows = self.rows()?;
        attack.level_up_rows = self.rows()?;
        attack.penalty_rows = self.u32()?;
        attack.push_out_rows = self.u32()?;
        let pushed = self.len()?;
        for _ in 0..pushed {
            let mut row = PaneRow::new(cols);
            for pane in 0..2 {
                for col in 0..cols {
                    row.set(pane, col, self.u8()?);
                }
            }
            attack.push_in_rows.push(row);
        }
        attack.displace_rows = self.u32()?;
        if self.bool()? {
            attack.level_change = Some(LevelChange {
                level: self.u32()?,
                difference: self.i32()?,
            });
        }
        let drops = self.len()?;
        for _ in 0..drops {
            attack.drop_blocks.push(DropBlock {
                classification: self.u8()?,
                cascade: self.u32()?,
            });
        }
        Ok(attack)
    }

    fn cycle(&mut self, rows: usize) -> Result<CycleState, SnapshotError> {
        let mut cycle = CycleState::new(rows);
        cycle.piece_type = self.i32()?;
        cycle.piece_column = self.i32()?;
        cycle.cascade = self.u32()?;
        cycle.piece_locked = self.bool()?;
        cycle.clears_before_lock = self.len()?;
        let piece_rows = self.len()?;
        if piece_rows != rows * ROW_CAPACITY_FACTOR {
            return Err(SnapshotError::Malformed("piece row table"));
        }
        for index in 0..piece_rows {
            cycle.piece_rows[index] = [self.u64()?, self.u64()?];
            cycle.piece_row_cleared[index] = self.bool()?;
        }
        cycle.piece_rows_recorded = self.bool()?;
        let cleared = self.len()?;
        for _ in 0..cleared {
            cycle.cleared.push(ClearedRow {
                classification: self.u8()?,
                cascade: self.u32()?,
                both_panes: self.bool()?,
                after_lock: self.bool()?,
            });
        }
        Ok(cycle)
    }
}
