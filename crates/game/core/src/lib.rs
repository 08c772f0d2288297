//! Deterministic ability timing and effect-lifecycle rules for the hunter role.
//!
//! `hunter-core` decides whether an ability may fire (unlock, cooldown and
//! exclusion gates), executes it as a sequence of immediate and delayed
//! steps, and reverts transient state when the sequence ends or its owner
//! leaves. It performs no I/O: the world is reached through the [`World`]
//! trait and time arrives as [`Timestamp`] arguments. All state mutation
//! flows through [`AbilityEngine`].
pub mod ability;
pub mod capability;
pub mod clock;
pub mod config;
pub mod cooldown;
pub mod effect;
pub mod error;
pub mod gateway;
pub mod trap;
pub mod types;
pub mod world;

pub use ability::{AbilityDef, AbilityId, CATALOG, EffectShape, TargetRequirement};
pub use capability::{ActivationToken, Capabilities, CapabilityRegistry, Reversion};
pub use clock::GameClock;
pub use config::{AbilityTiming, EngineConfig, SelectionMode, TimingOverride, TrapConfig};
pub use cooldown::{CooldownTracker, Gate};
pub use effect::{Activation, EffectReport, Step};
pub use error::{AbilityError, ErrorSeverity, TargetError};
pub use gateway::{
    AbilityEngine, AbilityStatus, AbilityStatusLine, SelectionOutcome, StepOutcome, Teardown,
    TickReport,
};
pub use trap::{TrapField, TrapMarker, TrapTrigger};
pub use types::{EntityId, Location, Timestamp, Vector, WorldId};
pub use world::{ActorBody, ActorMode, InMemoryWorld, StatusEffect, StatusKind, World};
