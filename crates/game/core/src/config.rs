//! Engine configuration and tunable parameters.
//!
//! Values here arrive already parsed (see the `hunter-content` loaders); the
//! engine only resolves them. The unlock floor is enforced during resolution
//! so no configuration can make an ability usable earlier than
//! [`EngineConfig::MIN_UNLOCK_SECS`] into a run.

use std::collections::BTreeMap;

use crate::ability::AbilityId;

/// Unlock and cooldown durations for one ability, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbilityTiming {
    pub unlock_secs: u64,
    pub cooldown_secs: u64,
}

/// Per-ability override. Absent fields fall back to the catalog default.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TimingOverride {
    pub unlock_secs: Option<u64>,
    pub cooldown_secs: Option<u64>,
}

/// How the selection surface turns clicks into triggers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SelectionMode {
    /// A click triggers the ability at once.
    Immediate,
    /// A click only selects; closing the surface confirms the selection.
    ConfirmOnClose,
    /// A click only selects; an explicit confirm triggers, closing discards.
    #[default]
    Explicit,
}

/// Proximity trap tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct TrapConfig {
    /// Trigger radius around a marker.
    pub radius: f64,
    pub damage: f64,
    pub slow_ms: u64,
    pub slow_amplifier: u8,
    /// Markers placed per use of the mines ability.
    pub mines_per_use: usize,
    /// Maximum horizontal scatter of placed markers around the hunter.
    pub scatter_radius: f64,
}

impl TrapConfig {
    pub const DEFAULT_RADIUS: f64 = 1.5;
    pub const DEFAULT_DAMAGE: f64 = 4.0;
    pub const DEFAULT_SLOW_MS: u64 = 3_000;
    pub const DEFAULT_SLOW_AMPLIFIER: u8 = 1;
    pub const DEFAULT_MINES_PER_USE: usize = 3;
    pub const DEFAULT_SCATTER_RADIUS: f64 = 3.0;

    pub fn radius_squared(&self) -> f64 {
        self.radius * self.radius
    }
}

impl Default for TrapConfig {
    fn default() -> Self {
        Self {
            radius: Self::DEFAULT_RADIUS,
            damage: Self::DEFAULT_DAMAGE,
            slow_ms: Self::DEFAULT_SLOW_MS,
            slow_amplifier: Self::DEFAULT_SLOW_AMPLIFIER,
            mines_per_use: Self::DEFAULT_MINES_PER_USE,
            scatter_radius: Self::DEFAULT_SCATTER_RADIUS,
        }
    }
}

/// Engine configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct EngineConfig {
    /// Timing overrides keyed by ability.
    pub abilities: BTreeMap<AbilityId, TimingOverride>,
    pub selection_mode: SelectionMode,
    /// Start the run clock when the first hunter registers.
    pub auto_start_on_first_hunter: bool,
    pub traps: TrapConfig,
    /// Maximum hunter-runner distance for target-in-range abilities.
    pub pull_max_distance: f64,
    /// Seed for trap scatter.
    pub rng_seed: u64,
}

impl EngineConfig {
    /// Unlock floor applied to every ability, whatever the configuration says.
    pub const MIN_UNLOCK_SECS: u64 = 300;
    pub const DEFAULT_PULL_MAX_DISTANCE: f64 = 30.0;

    pub fn new() -> Self {
        Self {
            abilities: BTreeMap::new(),
            selection_mode: SelectionMode::default(),
            auto_start_on_first_hunter: false,
            traps: TrapConfig::default(),
            pull_max_distance: Self::DEFAULT_PULL_MAX_DISTANCE,
            rng_seed: 0,
        }
    }

    /// Overrides both timings of `ability`.
    pub fn with_timing(mut self, ability: AbilityId, unlock_secs: u64, cooldown_secs: u64) -> Self {
        self.abilities.insert(
            ability,
            TimingOverride {
                unlock_secs: Some(unlock_secs),
                cooldown_secs: Some(cooldown_secs),
            },
        );
        self
    }

    pub fn with_selection_mode(mut self, mode: SelectionMode) -> Self {
        self.selection_mode = mode;
        self
    }

    /// Resolved timing for `ability`, with the unlock floor applied.
    pub fn timing(&self, ability: AbilityId) -> AbilityTiming {
        let def = ability.def();
        let overrides = self.abilities.get(&ability).copied().unwrap_or_default();

        AbilityTiming {
            unlock_secs: overrides
                .unlock_secs
                .unwrap_or(def.unlock_secs)
                .max(Self::MIN_UNLOCK_SECS),
            cooldown_secs: overrides.cooldown_secs.unwrap_or(def.cooldown_secs),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_catalog() {
        let config = EngineConfig::default();
        assert_eq!(
            config.timing(AbilityId::Strike),
            AbilityTiming {
                unlock_secs: 1200,
                cooldown_secs: 90
            }
        );
    }

    #[test]
    fn unlock_floor_is_enforced() {
        let config = EngineConfig::default().with_timing(AbilityId::Jump, 10, 5);
        assert_eq!(
            config.timing(AbilityId::Jump),
            AbilityTiming {
                unlock_secs: EngineConfig::MIN_UNLOCK_SECS,
                cooldown_secs: 5
            }
        );
    }

    #[test]
    fn partial_override_keeps_other_default() {
        let mut config = EngineConfig::default();
        config.abilities.insert(
            AbilityId::Scan,
            TimingOverride {
                unlock_secs: None,
                cooldown_secs: Some(0),
            },
        );
        assert_eq!(config.timing(AbilityId::Scan).unlock_secs, 480);
        assert_eq!(config.timing(AbilityId::Scan).cooldown_secs, 0);
    }
}
