#![warn(clippy::all, clippy::pedantic)]

//! The attack system engine.
//!
//! An engine is created unconfigured, given its [`BehaviorConfig`], and
//! finalized once. From then on the host reports piece entry, locks, clears,
//! metamorphoses and level-ups; [`AttackSystem::end_cycle`] turns what was
//! seen into attack descriptors. A transport moves outgoing descriptors to
//! other engines' incoming queues, and the host applies incoming attacks to
//! its field through the `unleash_*` methods.

mod collect;
mod unleash;

pub use collect::ClearEvent;
pub use unleash::{PushOutcome, Unleashed};

use bytes::{Buf, BufMut};
use log::{debug, error, info};

use crate::attack::{Attack, TargetCode};
use crate::config::BehaviorConfig;
use crate::game::MAX_COLS;
use crate::snapshot::{Snapshot, SnapshotError};
use crate::state::AttackState;

#[derive(Debug, Clone)]
pub struct AttackSystem {
    behavior: BehaviorConfig,
    finalized: bool,
    state: AttackState,
}

impl AttackSystem {
    #[must_use]
    pub fn new(rows: usize, cols: usize, seed: i64) -> Self {
        assert!(rows > 0, "attack system needs at least one row");
        assert!(
            cols > 0 && cols <= MAX_COLS,
            "attack system supports 1 to {MAX_COLS} columns, got {cols}"
        );
        Self {
            behavior: BehaviorConfig::default(),
            finalized: false,
            state: AttackState::new(rows, cols, seed),
        }
    }

    /// Replaces the behavior.
    ///
    /// # Panics
    ///
    /// If the configuration has already been finalized.
    pub fn set_behavior(&mut self, behavior: BehaviorConfig) {
        self.require_configurable("set_behavior");
        self.behavior = behavior;
    }

    /// Ends the configuration phase.
    ///
    /// # Panics
    ///
    /// If called twice.
    pub fn finalize_configuration(&mut self) {
        self.require_configurable("finalize_configuration");
        self.finalized = true;
        info!(
            "Attack system finalized for a {}x{} field",
            self.state.rows, self.state.cols
        );
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    #[must_use]
    pub fn behavior(&self) -> &BehaviorConfig {
        &self.behavior
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.state.rows
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.state.cols
    }

    #[must_use]
    pub fn seed(&self) -> i64 {
        self.state.seed
    }

    #[must_use]
    pub fn state(&self) -> &AttackState {
        &self.state
    }

    /// The descriptor currently being applied.
    #[must_use]
    pub fn active(&self) -> &Attack {
        &self.state.active
    }

    fn require_configurable(&self, operation: &str) {
        if self.finalized {
            error!("{operation} called after the attack system was finalized");
            panic!("{operation}: attack system configuration is already finalized");
        }
    }

    fn require_finalized(&self, operation: &str) {
        if !self.finalized {
            error!("{operation} called before the attack system was finalized");
            panic!("{operation}: attack system configuration is not finalized");
        }
    }

    // Self-directed descriptors go straight to the incoming queue
    fn route(&mut self, attack: Attack) {
        if attack.is_empty() {
            return;
        }
        if attack.target == TargetCode::Incoming {
            debug!("Queueing incoming attack: {attack:?}");
            self.state.incoming.push(attack);
        } else {
            debug!("Queueing outgoing attack for {:?}", attack.target);
            self.state.outgoing.push(attack);
        }
    }

    #[must_use]
    pub fn has_outgoing_attacks(&self) -> bool {
        self.require_finalized("has_outgoing_attacks");
        !self.state.outgoing.is_empty()
    }

    #[must_use]
    pub fn outgoing_len(&self) -> usize {
        self.state.outgoing.len()
    }

    #[must_use]
    pub fn incoming_len(&self) -> usize {
        self.state.incoming.len()
    }

    /// Moves every outgoing descriptor to `dest` unchanged.
    pub fn copy_and_clear_outgoing_queue(&mut self, dest: &mut Vec<Attack>) {
        self.require_finalized("copy_and_clear_outgoing_queue");
        self.state.outgoing.drain_into(dest);
    }

    /// Moves every outgoing descriptor to `dest`, merging consecutive
    /// descriptors with the same target where capacity allows.
    pub fn aggregate_and_clear_outgoing_queue(&mut self, dest: &mut Vec<Attack>) {
        self.require_finalized("aggregate_and_clear_outgoing_queue");
        let capacity = self.state.capacity();
        self.state.outgoing.aggregate_into(dest, capacity);
    }

    pub fn enqueue_incoming_attack(&mut self, attack: Attack) {
        self.require_finalized("enqueue_incoming_attack");
        self.state.incoming.push(attack);
    }

    pub fn enqueue_incoming_attacks<I: IntoIterator<Item = Attack>>(&mut self, attacks: I) {
        self.require_finalized("enqueue_incoming_attacks");
        for attack in attacks {
            self.state.incoming.push(attack);
        }
    }

    pub fn set_incoming_queue<I: IntoIterator<Item = Attack>>(&mut self, attacks: I) {
        self.require_finalized("set_incoming_queue");
        self.state.incoming.replace(attacks);
    }

    pub fn copy_incoming_queue(&self, dest: &mut Vec<Attack>) {
        self.require_finalized("copy_incoming_queue");
        self.state.incoming.copy_into(dest);
    }

    /// Writes a current-version snapshot of the state.
    pub fn write_snapshot<B: BufMut>(&self, buf: &mut B) {
        self.require_finalized("write_snapshot");
        Snapshot::current(&self.state).write(buf);
    }

    /// Replaces the state with a snapshot, upgrading older versions. On error
    /// the engine is left unchanged. Returns the version that was read.
    pub fn restore_snapshot<B: Buf>(&mut self, buf: &mut B) -> Result<i32, SnapshotError> {
        self.require_finalized("restore_snapshot");
        let snapshot = Snapshot::read(buf)?;
        let version = snapshot.version();
        let upgraded = snapshot.upgrade()?;
        let found = (upgraded.state.rows, upgraded.state.cols);
        let expected = (self.state.rows, self.state.cols);
        if found != expected {
            return Err(SnapshotError::DimensionMismatch { expected, found });
        }
        self.state = upgraded.state;
        debug!("Restored attack system snapshot version {version}");
        Ok(version)
    }
}
