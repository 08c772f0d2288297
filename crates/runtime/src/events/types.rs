//! Event types for different topics.

use hunter_core::{
    AbilityId, ActivationToken, Capabilities, EffectReport, EntityId, ErrorSeverity, Location,
    Timestamp, TrapTrigger,
};
use serde::{Deserialize, Serialize};

/// Events about ability requests and their delayed steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AbilityEvent {
    /// A click recorded a pending choice.
    Selected { actor: EntityId, ability: AbilityId },

    /// An ability fired.
    Triggered {
        actor: EntityId,
        ability: AbilityId,
        at: Timestamp,
        report: EffectReport,
        /// When the scheduled second step comes due, if any.
        completes_at: Option<Timestamp>,
    },

    /// A request was refused; nothing changed.
    Rejected {
        actor: EntityId,
        ability: Option<AbilityId>,
        severity: ErrorSeverity,
        reason: String,
    },

    /// A timed effect ended and its flag was cleared.
    Reverted {
        token: ActivationToken,
        applied: bool,
        at: Timestamp,
    },

    /// A reversion came due after its activation was already torn down.
    StaleStep { token: ActivationToken, at: Timestamp },

    StrikeLanded {
        owner: EntityId,
        location: Location,
        at: Timestamp,
    },

    StrikeDropped { owner: EntityId, at: Timestamp },
}

/// Events from the proximity trap field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TrapEvent {
    Triggered {
        marker: u64,
        owner: EntityId,
        target: EntityId,
        location: Location,
        at: Timestamp,
    },
}

impl From<TrapTrigger> for TrapEvent {
    fn from(trigger: TrapTrigger) -> Self {
        TrapEvent::Triggered {
            marker: trigger.marker.id,
            owner: trigger.marker.owner,
            target: trigger.target,
            location: trigger.marker.location,
            at: trigger.at,
        }
    }
}

/// Events about hunters, the runner and the run itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LifecycleEvent {
    HunterRegistered {
        actor: EntityId,
        /// The registration started the run clock.
        run_started: bool,
    },

    /// A hunter was removed; `reverted` lists the effects undone.
    HunterRemoved {
        actor: EntityId,
        reverted: Capabilities,
        /// The hunter went offline rather than being removed by command.
        disconnected: bool,
    },

    RunStarted {
        at: Timestamp,
        reverted: Vec<(EntityId, Capabilities)>,
    },

    RunnerSet { runner: Option<EntityId> },
}
