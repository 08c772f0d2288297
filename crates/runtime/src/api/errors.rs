//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination and engine rejections so clients
//! can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use hunter_core::{AbilityError, ErrorSeverity};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("engine worker command channel closed")]
    CommandChannelClosed,

    #[error("engine worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("engine worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires a world to be configured before building")]
    MissingWorld,

    #[error("tick interval must be non-zero")]
    InvalidTickInterval,

    #[error(transparent)]
    Ability(#[from] AbilityError),
}

impl RuntimeError {
    /// Engine rejection carried by this error, if any.
    pub fn as_ability(&self) -> Option<&AbilityError> {
        match self {
            RuntimeError::Ability(err) => Some(err),
            _ => None,
        }
    }

    /// Severity for reporting. Infrastructure failures are never recoverable.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            RuntimeError::Ability(err) => err.severity(),
            _ => ErrorSeverity::Validation,
        }
    }
}
