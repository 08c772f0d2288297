//! Hunter state registry: per-actor capability flags.
//!
//! A flag is present iff the effect it names is currently live. Every set
//! flag carries the [`ActivationToken`] minted when it was set and the
//! [`Reversion`] needed to undo its world effect, so both the scheduled
//! reversion step and an early teardown (`clear_all`) revert exactly once.

use std::collections::HashMap;

use bitflags::bitflags;

use crate::types::{EntityId, Location};
use crate::world::{ActorMode, StatusKind};

bitflags! {
    /// In-flight or toggled effect states of a hunter.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Capabilities: u8 {
        const OVERDRIVE = 1 << 0;
        const ZOOM = 1 << 1;
        const SHIELD = 1 << 2;
        const OBSERVATION = 1 << 3;
        const VISION = 1 << 4;
    }
}

/// Identifies one activation of one flag on one actor.
///
/// Generations come from a registry-wide counter, so a token never matches a
/// later activation of the same flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivationToken {
    pub actor: EntityId,
    pub flag: Capabilities,
    pub generation: u64,
}

/// World-state change that undoes a flagged effect.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Reversion {
    /// Remove a status applied by the ability from `target`.
    EndStatus { target: EntityId, status: StatusKind },
    /// Put the hunter back where it was before observation mode.
    RestoreVantage { location: Location, mode: ActorMode },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct ActiveEffect {
    flag: Capabilities,
    generation: u64,
    reversion: Reversion,
}

/// Registry of set capability flags, keyed by actor.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    actors: HashMap<EntityId, Vec<ActiveEffect>>,
    next_generation: u64,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of all flags currently set on `actor`.
    pub fn flags(&self, actor: EntityId) -> Capabilities {
        self.actors
            .get(&actor)
            .map(|effects| {
                effects
                    .iter()
                    .fold(Capabilities::empty(), |acc, e| acc | e.flag)
            })
            .unwrap_or_default()
    }

    pub fn is_set(&self, actor: EntityId, flag: Capabilities) -> bool {
        self.flags(actor).contains(flag)
    }

    /// Sets `flag` unless it is already set.
    ///
    /// Returns the token of the new activation, or `None` when the flag was
    /// already live (the caller must refuse to re-trigger).
    pub fn try_set_exclusive(
        &mut self,
        actor: EntityId,
        flag: Capabilities,
        reversion: Reversion,
    ) -> Option<ActivationToken> {
        if self.is_set(actor, flag) {
            return None;
        }

        self.next_generation += 1;
        let generation = self.next_generation;
        self.actors.entry(actor).or_default().push(ActiveEffect {
            flag,
            generation,
            reversion,
        });

        Some(ActivationToken {
            actor,
            flag,
            generation,
        })
    }

    /// Clears `flag` regardless of which activation set it.
    pub fn clear(&mut self, actor: EntityId, flag: Capabilities) -> Option<Reversion> {
        self.remove_where(actor, |e| e.flag == flag)
    }

    /// Clears the flag only if it still belongs to the activation `token`
    /// names. Returns `None` for stale tokens.
    pub fn take_if_current(&mut self, token: ActivationToken) -> Option<Reversion> {
        self.remove_where(token.actor, |e| {
            e.flag == token.flag && e.generation == token.generation
        })
    }

    /// Clears every flag of `actor` and drops its entry.
    ///
    /// The returned reversions must be applied by the caller. Calling this
    /// again returns an empty list.
    pub fn clear_all(&mut self, actor: EntityId) -> Vec<(Capabilities, Reversion)> {
        self.actors
            .remove(&actor)
            .unwrap_or_default()
            .into_iter()
            .map(|e| (e.flag, e.reversion))
            .collect()
    }

    /// Whether any live activation will end `status` on `target`.
    ///
    /// Several hunters may hold the same status on the runner; it is only
    /// removed from the world once the last holder lets go.
    pub fn holds_status(&self, target: EntityId, status: StatusKind) -> bool {
        self.actors.values().flatten().any(|e| {
            e.reversion
                == Reversion::EndStatus {
                    target,
                    status,
                }
        })
    }

    /// Actors with at least one flag set.
    pub fn actors(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.actors.keys().copied()
    }

    fn remove_where(
        &mut self,
        actor: EntityId,
        pred: impl Fn(&ActiveEffect) -> bool,
    ) -> Option<Reversion> {
        let effects = self.actors.get_mut(&actor)?;
        let index = effects.iter().position(pred)?;
        let removed = effects.swap_remove(index);
        if effects.is_empty() {
            self.actors.remove(&actor);
        }
        Some(removed.reversion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HUNTER: EntityId = EntityId(1);

    fn end_speed() -> Reversion {
        Reversion::EndStatus {
            target: HUNTER,
            status: StatusKind::Speed,
        }
    }

    #[test]
    fn second_set_is_refused() {
        let mut registry = CapabilityRegistry::new();

        assert!(
            registry
                .try_set_exclusive(HUNTER, Capabilities::OVERDRIVE, end_speed())
                .is_some()
        );
        assert!(
            registry
                .try_set_exclusive(HUNTER, Capabilities::OVERDRIVE, end_speed())
                .is_none()
        );
        assert!(
            registry
                .try_set_exclusive(HUNTER, Capabilities::SHIELD, end_speed())
                .is_some()
        );
        assert_eq!(
            registry.flags(HUNTER),
            Capabilities::OVERDRIVE | Capabilities::SHIELD
        );
    }

    #[test]
    fn stale_token_does_not_clear_later_activation() {
        let mut registry = CapabilityRegistry::new();

        let first = registry
            .try_set_exclusive(HUNTER, Capabilities::OVERDRIVE, end_speed())
            .unwrap();
        registry.clear(HUNTER, Capabilities::OVERDRIVE);
        let second = registry
            .try_set_exclusive(HUNTER, Capabilities::OVERDRIVE, end_speed())
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(registry.take_if_current(first), None);
        assert!(registry.is_set(HUNTER, Capabilities::OVERDRIVE));
        assert_eq!(registry.take_if_current(second), Some(end_speed()));
        assert!(!registry.is_set(HUNTER, Capabilities::OVERDRIVE));
    }

    #[test]
    fn shared_status_is_held_until_last_holder_clears() {
        let mut registry = CapabilityRegistry::new();
        let runner = EntityId(9);
        let blind = Reversion::EndStatus {
            target: runner,
            status: StatusKind::Blindness,
        };
        let first = registry
            .try_set_exclusive(HUNTER, Capabilities::VISION, blind)
            .unwrap();
        let second = registry
            .try_set_exclusive(EntityId(2), Capabilities::VISION, blind)
            .unwrap();

        registry.take_if_current(first);
        assert!(registry.holds_status(runner, StatusKind::Blindness));
        registry.take_if_current(second);
        assert!(!registry.holds_status(runner, StatusKind::Blindness));
    }

    #[test]
    fn clear_all_is_idempotent() {
        let mut registry = CapabilityRegistry::new();
        registry.try_set_exclusive(HUNTER, Capabilities::ZOOM, end_speed());
        registry.try_set_exclusive(HUNTER, Capabilities::SHIELD, end_speed());

        assert_eq!(registry.clear_all(HUNTER).len(), 2);
        assert!(registry.clear_all(HUNTER).is_empty());
        assert_eq!(registry.flags(HUNTER), Capabilities::empty());
        assert_eq!(registry.actors().count(), 0);
    }
}
