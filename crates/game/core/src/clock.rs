//! Run clock.

use crate::types::Timestamp;

/// Instant the current run began, or unset before the first run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GameClock {
    started_at: Option<Timestamp>,
}

impl GameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, now: Timestamp) {
        self.started_at = Some(now);
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whole seconds since the run began, or `None` before it began.
    pub fn elapsed_secs(&self, now: Timestamp) -> Option<u64> {
        self.started_at.map(|start| now.secs_since(start))
    }
}
