//! In-memory [`World`] used by tests and the console client.

use std::collections::HashMap;

use super::{ActorMode, StatusEffect, StatusKind, World};
use crate::types::{EntityId, Location, Vector};

/// Radius around a lightning strike that takes damage.
const LIGHTNING_RADIUS: f64 = 3.0;
const LIGHTNING_DAMAGE: f64 = 5.0;

/// Simulated state of one actor.
#[derive(Clone, Debug, PartialEq)]
pub struct ActorBody {
    pub online: bool,
    pub location: Location,
    pub facing: Vector,
    pub mode: ActorMode,
    pub velocity: Vector,
    pub health: f64,
    pub statuses: Vec<StatusEffect>,
}

impl ActorBody {
    pub const MAX_HEALTH: f64 = 20.0;

    pub fn new(location: Location) -> Self {
        Self {
            online: true,
            location,
            facing: Vector::new(0.0, 0.0, 1.0),
            mode: ActorMode::default(),
            velocity: Vector::ZERO,
            health: Self::MAX_HEALTH,
            statuses: Vec::new(),
        }
    }

    pub fn status(&self, kind: StatusKind) -> Option<&StatusEffect> {
        self.statuses.iter().find(|s| s.kind == kind)
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.status(kind).is_some()
    }
}

/// Map-backed world. Statuses never expire on their own here.
#[derive(Clone, Debug, Default)]
pub struct InMemoryWorld {
    actors: HashMap<EntityId, ActorBody>,
    lightning: Vec<Location>,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an online actor at `location`.
    pub fn spawn(&mut self, actor: EntityId, location: Location) -> &mut ActorBody {
        self.actors
            .entry(actor)
            .insert_entry(ActorBody::new(location))
            .into_mut()
    }

    pub fn set_online(&mut self, actor: EntityId, online: bool) {
        if let Some(body) = self.actors.get_mut(&actor) {
            body.online = online;
        }
    }

    pub fn despawn(&mut self, actor: EntityId) -> Option<ActorBody> {
        self.actors.remove(&actor)
    }

    pub fn move_to(&mut self, actor: EntityId, location: Location) -> bool {
        match self.actors.get_mut(&actor) {
            Some(body) => {
                body.location = location;
                true
            }
            None => false,
        }
    }

    pub fn body(&self, actor: EntityId) -> Option<&ActorBody> {
        self.actors.get(&actor)
    }

    pub fn has_status(&self, actor: EntityId, kind: StatusKind) -> bool {
        self.body(actor).is_some_and(|b| b.has_status(kind))
    }

    pub fn lightning_strikes(&self) -> &[Location] {
        &self.lightning
    }

    fn online_mut(&mut self, actor: EntityId) -> Option<&mut ActorBody> {
        self.actors.get_mut(&actor).filter(|b| b.online)
    }
}

impl World for InMemoryWorld {
    fn is_online(&self, actor: EntityId) -> bool {
        self.actors.get(&actor).is_some_and(|b| b.online)
    }

    fn location(&self, actor: EntityId) -> Option<Location> {
        self.actors
            .get(&actor)
            .filter(|b| b.online)
            .map(|b| b.location)
    }

    fn facing(&self, actor: EntityId) -> Option<Vector> {
        self.actors.get(&actor).filter(|b| b.online).map(|b| b.facing)
    }

    fn mode(&self, actor: EntityId) -> Option<ActorMode> {
        self.actors.get(&actor).filter(|b| b.online).map(|b| b.mode)
    }

    fn apply_status(&mut self, actor: EntityId, effect: StatusEffect) -> bool {
        let Some(body) = self.online_mut(actor) else {
            return false;
        };
        body.statuses.retain(|s| s.kind != effect.kind);
        body.statuses.push(effect);
        true
    }

    fn remove_status(&mut self, actor: EntityId, kind: StatusKind) -> bool {
        let Some(body) = self.online_mut(actor) else {
            return false;
        };
        let before = body.statuses.len();
        body.statuses.retain(|s| s.kind != kind);
        body.statuses.len() != before
    }

    fn set_velocity(&mut self, actor: EntityId, velocity: Vector) -> bool {
        let Some(body) = self.online_mut(actor) else {
            return false;
        };
        body.velocity = velocity;
        true
    }

    fn teleport(&mut self, actor: EntityId, to: Location) -> bool {
        let Some(body) = self.online_mut(actor) else {
            return false;
        };
        body.location = to;
        true
    }

    fn set_mode(&mut self, actor: EntityId, mode: ActorMode) -> bool {
        let Some(body) = self.online_mut(actor) else {
            return false;
        };
        body.mode = mode;
        true
    }

    fn damage(&mut self, actor: EntityId, amount: f64) -> bool {
        let Some(body) = self.online_mut(actor) else {
            return false;
        };
        body.health = (body.health - amount).max(0.0);
        true
    }

    fn strike_lightning(&mut self, at: Location) {
        self.lightning.push(at);
        let radius_sq = LIGHTNING_RADIUS * LIGHTNING_RADIUS;
        for body in self.actors.values_mut().filter(|b| b.online) {
            if body
                .location
                .distance_squared(&at)
                .is_some_and(|d| d <= radius_sq)
            {
                body.health = (body.health - LIGHTNING_DAMAGE).max(0.0);
            }
        }
    }
}
