#![warn(clippy::all, clippy::pedantic)]

use std::collections::VecDeque;

use log::trace;

use crate::attack::Attack;

/// Ordered attack queue. The logical length is the number of queued
/// descriptors; draining keeps the allocation for reuse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttackQueue {
    attacks: VecDeque<Attack>,
}

impl AttackQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.attacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.attacks.is_empty()
    }

    /// Queues a descriptor; empty descriptors are ignored.
    pub fn push(&mut self, attack: Attack) {
        if attack.is_empty() {
            trace!("Ignoring empty attack");
            return;
        }
        self.attacks.push_back(attack);
    }

    pub fn pop_front(&mut self) -> Option<Attack> {
        self.attacks.pop_front()
    }

    pub fn push_front(&mut self, attack: Attack) {
        self.attacks.push_front(attack);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attack> {
        self.attacks.iter()
    }

    pub fn clear(&mut self) {
        self.attacks.clear();
    }

    /// Replaces the contents with `attacks`, dropping empty descriptors.
    pub fn replace<I: IntoIterator<Item = Attack>>(&mut self, attacks: I) {
        self.attacks.clear();
        for attack in attacks {
            self.push(attack);
        }
    }

    /// Appends copies of every queued descriptor to `dest`.
    pub fn copy_into(&self, dest: &mut Vec<Attack>) {
        dest.extend(self.attacks.iter().cloned());
    }

    /// Moves every queued descriptor to `dest`, leaving this queue empty.
    pub fn drain_into(&mut self, dest: &mut Vec<Attack>) {
        dest.extend(self.attacks.drain(..));
    }

    /// Moves every queued descriptor to `dest`, folding each into the last
    /// entry of `dest` when the targets match and the result fits within
    /// `capacity`; otherwise it is appended.
    pub fn aggregate_into(&mut self, dest: &mut Vec<Attack>, capacity: usize) {
        for attack in self.attacks.drain(..) {
            if attack.is_empty() {
                continue;
            }
            let merged = dest
                .last_mut()
                .is_some_and(|last| last.merge(&attack, capacity));
            if !merged {
                dest.push(attack);
            }
        }
    }
}
