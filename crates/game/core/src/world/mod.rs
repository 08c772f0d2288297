//! World collaborator interface.
//!
//! The engine never owns world state. Everything it does to actors (statuses,
//! movement, damage) goes through [`World`], which the embedding server
//! implements. All methods must tolerate actors that are absent or offline:
//! reads return `None`, writes do nothing and return `false`.

mod memory;

pub use memory::{ActorBody, InMemoryWorld};

use crate::types::{EntityId, Location, Vector};

/// Status effects the engine applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StatusKind {
    Speed,
    Slowness,
    Resistance,
    Zoom,
    Glowing,
    Blindness,
}

/// A status effect with strength and optional duration.
///
/// `duration_ms: None` lasts until explicitly removed; the engine uses that
/// for every effect it reverts itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusEffect {
    pub kind: StatusKind,
    pub amplifier: u8,
    pub duration_ms: Option<u64>,
}

impl StatusEffect {
    pub const fn until_removed(kind: StatusKind, amplifier: u8) -> Self {
        Self {
            kind,
            amplifier,
            duration_ms: None,
        }
    }

    pub const fn timed(kind: StatusKind, amplifier: u8, duration_ms: u64) -> Self {
        Self {
            kind,
            amplifier,
            duration_ms: Some(duration_ms),
        }
    }
}

/// Interaction mode of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActorMode {
    #[default]
    Survival,
    Adventure,
    Spectator,
}

/// Mutable access to the game world.
pub trait World {
    fn is_online(&self, actor: EntityId) -> bool;

    fn location(&self, actor: EntityId) -> Option<Location>;

    /// Unit vector the actor is looking along.
    fn facing(&self, actor: EntityId) -> Option<Vector>;

    fn mode(&self, actor: EntityId) -> Option<ActorMode>;

    fn apply_status(&mut self, actor: EntityId, effect: StatusEffect) -> bool;

    fn remove_status(&mut self, actor: EntityId, kind: StatusKind) -> bool;

    fn set_velocity(&mut self, actor: EntityId, velocity: Vector) -> bool;

    fn teleport(&mut self, actor: EntityId, to: Location) -> bool;

    fn set_mode(&mut self, actor: EntityId, mode: ActorMode) -> bool;

    fn damage(&mut self, actor: EntityId, amount: f64) -> bool;

    fn strike_lightning(&mut self, at: Location);
}
