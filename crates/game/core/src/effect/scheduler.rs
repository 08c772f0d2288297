//! One-shot delayed steps.
//!
//! Steps run on the engine's single tick domain, ordered by due time and then
//! by scheduling order. A step never assumes the world still looks the way it
//! did when it was scheduled: reversions carry an [`ActivationToken`] and are
//! checked against the capability registry when they come due.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use crate::capability::ActivationToken;
use crate::types::{EntityId, Location, Timestamp};

/// Work deferred to a later tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Step {
    /// End the flagged effect identified by the token, if it is still current.
    Revert(ActivationToken),
    /// Second phase of a strike: lightning at the marked location. Lands
    /// only while `owner` is still registered under `tenure`.
    Strike {
        owner: EntityId,
        tenure: u64,
        at: Location,
    },
}

impl Step {
    pub fn actor(&self) -> EntityId {
        match self {
            Step::Revert(token) => token.actor,
            Step::Strike { owner, .. } => *owner,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Scheduled {
    due: Timestamp,
    seq: u64,
    step: Step,
}

impl PartialEq for Scheduled {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scheduled {}

impl PartialOrd for Scheduled {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Scheduled {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

/// Min-queue of pending steps.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    queue: BinaryHeap<Reverse<Scheduled>>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Timestamp, step: Step) {
        self.next_seq += 1;
        self.queue.push(Reverse(Scheduled {
            due,
            seq: self.next_seq,
            step,
        }));
    }

    /// Removes and returns the earliest step due at or before `now`.
    pub fn pop_due(&mut self, now: Timestamp) -> Option<(Timestamp, Step)> {
        if self.queue.peek()?.0.due > now {
            return None;
        }
        self.queue.pop().map(|Reverse(s)| (s.due, s.step))
    }

    pub fn next_due(&self) -> Option<Timestamp> {
        self.queue.peek().map(|Reverse(s)| s.due)
    }

    /// Keeps only steps matching `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Step) -> bool) {
        self.queue.retain(|Reverse(s)| keep(&s.step));
    }

    pub fn pending(&self) -> impl Iterator<Item = &Step> {
        self.queue.iter().map(|Reverse(s)| &s.step)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
