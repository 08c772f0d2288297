//! Unlock and cooldown tracker.
//!
//! Gate checks are pure reads. The only mutator is [`CooldownTracker::record_trigger`],
//! which the engine calls strictly after an effect executed successfully, so
//! aborted triggers never consume cooldown.

use std::collections::HashMap;

use strum::{EnumCount, IntoEnumIterator};

use crate::ability::AbilityId;
use crate::clock::GameClock;
use crate::config::{AbilityTiming, EngineConfig};
use crate::error::AbilityError;
use crate::types::{EntityId, Timestamp};

/// Result of a gate check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Gate {
    /// The run has not started, or the unlock delay has not elapsed.
    Locked { remaining_secs: u64 },
    OnCooldown { remaining_secs: u64 },
    Ready,
}

impl Gate {
    pub fn is_ready(&self) -> bool {
        matches!(self, Gate::Ready)
    }

    /// Converts a non-ready gate into the matching request error.
    pub fn into_result(self, ability: AbilityId) -> Result<(), AbilityError> {
        match self {
            Gate::Ready => Ok(()),
            Gate::Locked { remaining_secs } => Err(AbilityError::Locked {
                ability,
                remaining_secs,
            }),
            Gate::OnCooldown { remaining_secs } => Err(AbilityError::OnCooldown {
                ability,
                remaining_secs,
            }),
        }
    }
}

type LastUse = [Option<Timestamp>; AbilityId::COUNT];

/// Per-actor, per-ability last-trigger timestamps plus resolved timings.
#[derive(Clone, Debug)]
pub struct CooldownTracker {
    timings: [AbilityTiming; AbilityId::COUNT],
    last_use: HashMap<EntityId, LastUse>,
}

impl CooldownTracker {
    pub fn new(config: &EngineConfig) -> Self {
        let mut timings = [AbilityTiming {
            unlock_secs: EngineConfig::MIN_UNLOCK_SECS,
            cooldown_secs: 0,
        }; AbilityId::COUNT];
        for ability in AbilityId::iter() {
            timings[ability as usize] = config.timing(ability);
        }

        Self {
            timings,
            last_use: HashMap::new(),
        }
    }

    pub fn timing(&self, ability: AbilityId) -> AbilityTiming {
        self.timings[ability as usize]
    }

    pub fn check_gate(
        &self,
        clock: &GameClock,
        actor: EntityId,
        ability: AbilityId,
        now: Timestamp,
    ) -> Gate {
        let timing = self.timing(ability);
        let elapsed = clock.elapsed_secs(now).unwrap_or(0);
        if !clock.is_started() || elapsed < timing.unlock_secs {
            return Gate::Locked {
                remaining_secs: timing.unlock_secs - elapsed,
            };
        }

        let Some(last) = self.last_use(actor, ability) else {
            return Gate::Ready;
        };
        let since = now.secs_since(last);
        match timing.cooldown_secs.checked_sub(since) {
            Some(remaining) if remaining > 0 => Gate::OnCooldown {
                remaining_secs: remaining,
            },
            _ => Gate::Ready,
        }
    }

    pub fn last_use(&self, actor: EntityId, ability: AbilityId) -> Option<Timestamp> {
        self.last_use
            .get(&actor)
            .and_then(|uses| uses[ability as usize])
    }

    pub fn record_trigger(&mut self, actor: EntityId, ability: AbilityId, now: Timestamp) {
        self.last_use
            .entry(actor)
            .or_insert([None; AbilityId::COUNT])[ability as usize] = Some(now);
    }

    /// Forgets all usage history of `actor`.
    pub fn clear_actor(&mut self, actor: EntityId) {
        self.last_use.remove(&actor);
    }

    /// Forgets all usage history.
    pub fn reset(&mut self) {
        self.last_use.clear();
    }

    pub fn has_history(&self, actor: EntityId) -> bool {
        self.last_use.contains_key(&actor)
    }
}
