//! Proximity trap field.
//!
//! Markers are consumed on their first proximity match against the runner.
//! There is no expiry: an untriggered marker stays until a run reset.

use crate::config::TrapConfig;
use crate::types::{EntityId, Location, Timestamp};
use crate::world::{StatusEffect, StatusKind, World};

/// A placed, location-bound trap.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrapMarker {
    pub id: u64,
    pub owner: EntityId,
    pub location: Location,
    pub placed_at: Timestamp,
}

/// A marker that fired during a tick.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrapTrigger {
    pub marker: TrapMarker,
    pub target: EntityId,
    pub at: Timestamp,
}

#[derive(Clone, Debug, Default)]
pub struct TrapField {
    markers: Vec<TrapMarker>,
    next_id: u64,
}

impl TrapField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn place(&mut self, owner: EntityId, location: Location, now: Timestamp) -> TrapMarker {
        self.next_id += 1;
        let marker = TrapMarker {
            id: self.next_id,
            owner,
            location,
            placed_at: now,
        };
        self.markers.push(marker);
        marker
    }

    /// Fires every marker within the trigger radius of `target`.
    ///
    /// Each fired marker is removed before its effect is applied, so one pass
    /// can never fire the same marker twice. Markers in another world are
    /// skipped and kept. An absent or offline target fires nothing.
    pub fn tick<W: World + ?Sized>(
        &mut self,
        target: EntityId,
        now: Timestamp,
        config: &TrapConfig,
        world: &mut W,
    ) -> Vec<TrapTrigger> {
        let Some(position) = world.location(target) else {
            return Vec::new();
        };

        let radius_sq = config.radius_squared();
        let mut fired = Vec::new();
        self.markers.retain(|marker| {
            let in_range = marker
                .location
                .distance_squared(&position)
                .is_some_and(|d| d <= radius_sq);
            if in_range {
                fired.push(TrapTrigger {
                    marker: *marker,
                    target,
                    at: now,
                });
            }
            !in_range
        });

        for _ in &fired {
            world.apply_status(
                target,
                StatusEffect::timed(StatusKind::Slowness, config.slow_amplifier, config.slow_ms),
            );
            world.damage(target, config.damage);
        }

        fired
    }

    pub fn markers(&self) -> &[TrapMarker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }
}
