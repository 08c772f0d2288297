//! Error taxonomy for ability requests.
//!
//! Every rejection is recoverable from the engine's point of view: it is
//! reported to the requesting hunter and nothing else changes. Failures inside
//! delayed steps never surface as errors at all (see
//! [`StepOutcome::Stale`](crate::StepOutcome::Stale)).

use crate::ability::AbilityId;
use crate::types::EntityId;

/// Severity level of an error, used for categorization and reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Temporary condition; the same request may succeed later.
    ///
    /// Examples: ability still locked, on cooldown, runner out of range
    Recoverable,

    /// Request is invalid as issued and should not be retried unchanged.
    ///
    /// Examples: requester is not a hunter, no runner designated
    Validation,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Why an ability request was refused.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityError {
    #[error("{ability} is locked for {remaining_secs}s")]
    Locked {
        ability: AbilityId,
        remaining_secs: u64,
    },

    #[error("{ability} is on cooldown for {remaining_secs}s")]
    OnCooldown {
        ability: AbilityId,
        remaining_secs: u64,
    },

    #[error("{ability} is already active")]
    AlreadyActive { ability: AbilityId },

    #[error("{ability} has no valid target: {reason}")]
    InvalidTarget {
        ability: AbilityId,
        reason: TargetError,
    },

    #[error("{actor} is not a hunter")]
    NotRegistered { actor: EntityId },
}

impl AbilityError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Locked { .. } | Self::OnCooldown { .. } | Self::AlreadyActive { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::InvalidTarget { reason, .. } => reason.severity(),
            Self::NotRegistered { .. } => ErrorSeverity::Validation,
        }
    }

    /// True for unlock/cooldown refusals.
    pub const fn is_gate(&self) -> bool {
        matches!(self, Self::Locked { .. } | Self::OnCooldown { .. })
    }
}

/// Why a secondary target was rejected.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TargetError {
    #[error("no runner is designated")]
    NoRunner,

    #[error("runner {0} is offline")]
    RunnerOffline(EntityId),

    #[error("hunter {0} is offline")]
    ActorOffline(EntityId),

    #[error("runner is in a different world")]
    DifferentWorld,

    #[error("runner is {distance:.1} away (max {max:.1})")]
    OutOfRange { distance: f64, max: f64 },
}

impl TargetError {
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoRunner => ErrorSeverity::Validation,
            _ => ErrorSeverity::Recoverable,
        }
    }
}
