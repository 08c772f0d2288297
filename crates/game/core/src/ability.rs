//! Static ability catalog.
//!
//! The catalog is a closed enumeration: every ability the engine knows about
//! is an [`AbilityId`] variant with one [`AbilityDef`] entry. Configuration may
//! override timings but can never introduce new abilities.

use strum::{Display, EnumCount, EnumIter, EnumString, IntoStaticStr};

use crate::capability::Capabilities;

/// Identifier for one hunter ability.
///
/// Declaration order is the display order used by
/// [`AbilityEngine::render_state`](crate::AbilityEngine::render_state).
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumCount,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AbilityId {
    Overdrive,
    Jump,
    Zoom,
    Scan,
    Mines,
    Shield,
    Observation,
    Pull,
    Strike,
    Vision,
}

impl AbilityId {
    /// Returns the catalog entry for this ability.
    pub fn def(self) -> &'static AbilityDef {
        &CATALOG[self as usize]
    }

    pub fn label(self) -> &'static str {
        self.def().label
    }

    /// Capability flag guarding this ability, if it is non-reentrant.
    pub fn flag(self) -> Option<Capabilities> {
        match self.def().shape {
            EffectShape::Instant | EffectShape::TwoPhase { flag: None, .. } => None,
            EffectShape::Timed { flag, .. } | EffectShape::TwoPhase { flag: Some(flag), .. } => {
                Some(flag)
            }
        }
    }
}

/// How an ability's effect unfolds over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectShape {
    /// Applied and finished within the triggering call.
    Instant,
    /// Applied now and reverted by exactly one delayed step.
    Timed {
        flag: Capabilities,
        duration_ms: u64,
    },
    /// Moves the world into an intermediate state now and completes after
    /// `delay_ms`. Flagged variants restore the prior state on completion.
    TwoPhase {
        flag: Option<Capabilities>,
        delay_ms: u64,
    },
}

/// Secondary target an ability needs at trigger time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetRequirement {
    None,
    /// The designated runner, online and in the hunter's world.
    Runner,
    /// As `Runner`, additionally within the configured pull distance.
    RunnerInRange,
}

/// Immutable catalog entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AbilityDef {
    pub id: AbilityId,
    pub label: &'static str,
    pub lore: &'static [&'static str],
    /// Default seconds from run start before the ability may be used.
    pub unlock_secs: u64,
    /// Default seconds between successive uses by one hunter.
    pub cooldown_secs: u64,
    pub shape: EffectShape,
    pub target: TargetRequirement,
}

const fn def(
    id: AbilityId,
    label: &'static str,
    lore: &'static [&'static str],
    unlock_secs: u64,
    cooldown_secs: u64,
    shape: EffectShape,
    target: TargetRequirement,
) -> AbilityDef {
    AbilityDef {
        id,
        label,
        lore,
        unlock_secs,
        cooldown_secs,
        shape,
        target,
    }
}

/// Catalog indexed by `AbilityId as usize`.
pub static CATALOG: [AbilityDef; AbilityId::COUNT] = [
    def(
        AbilityId::Overdrive,
        "Overdrive",
        &["Surge of speed for 8 seconds."],
        300,
        45,
        EffectShape::Timed {
            flag: Capabilities::OVERDRIVE,
            duration_ms: 8_000,
        },
        TargetRequirement::None,
    ),
    def(
        AbilityId::Jump,
        "Rocket Jump",
        &["Launch yourself up and forward."],
        360,
        45,
        EffectShape::Instant,
        TargetRequirement::None,
    ),
    def(
        AbilityId::Zoom,
        "Zoom Lens",
        &["Magnified view for 6 seconds."],
        420,
        30,
        EffectShape::Timed {
            flag: Capabilities::ZOOM,
            duration_ms: 6_000,
        },
        TargetRequirement::None,
    ),
    def(
        AbilityId::Scan,
        "Scan",
        &["Reveal the runner and report", "their distance."],
        480,
        60,
        EffectShape::Instant,
        TargetRequirement::Runner,
    ),
    def(
        AbilityId::Mines,
        "Proximity Mines",
        &["Scatter mines around you.", "They slow and damage the runner."],
        600,
        90,
        EffectShape::Instant,
        TargetRequirement::None,
    ),
    def(
        AbilityId::Shield,
        "Shield",
        &["Damage resistance for 6 seconds."],
        720,
        60,
        EffectShape::Timed {
            flag: Capabilities::SHIELD,
            duration_ms: 6_000,
        },
        TargetRequirement::None,
    ),
    def(
        AbilityId::Observation,
        "Observation Mode",
        &["Rise above the field as a spectator", "for 10 seconds, then return."],
        900,
        70,
        EffectShape::TwoPhase {
            flag: Some(Capabilities::OBSERVATION),
            delay_ms: 10_000,
        },
        TargetRequirement::None,
    ),
    def(
        AbilityId::Pull,
        "Grapple Pull",
        &["Yank a nearby runner toward you."],
        1020,
        60,
        EffectShape::Instant,
        TargetRequirement::RunnerInRange,
    ),
    def(
        AbilityId::Strike,
        "Orbital Strike",
        &["Mark the runner's position;", "lightning follows shortly."],
        1200,
        90,
        EffectShape::TwoPhase {
            flag: None,
            delay_ms: 1_500,
        },
        TargetRequirement::Runner,
    ),
    def(
        AbilityId::Vision,
        "Blackout",
        &["Blind the runner for 7 seconds."],
        1320,
        90,
        EffectShape::Timed {
            flag: Capabilities::VISION,
            duration_ms: 7_000,
        },
        TargetRequirement::Runner,
    ),
];

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn catalog_is_indexed_by_declaration_order() {
        for id in AbilityId::iter() {
            assert_eq!(id.def().id, id);
        }
    }

    #[test]
    fn catalog_matches_reference_timings() {
        let timings: Vec<_> = AbilityId::iter()
            .map(|id| (id.def().unlock_secs, id.def().cooldown_secs))
            .collect();
        assert_eq!(
            timings,
            vec![
                (300, 45),
                (360, 45),
                (420, 30),
                (480, 60),
                (600, 90),
                (720, 60),
                (900, 70),
                (1020, 60),
                (1200, 90),
                (1320, 90),
            ]
        );
    }

    #[test]
    fn names_parse_in_snake_case() {
        assert_eq!("observation".parse::<AbilityId>(), Ok(AbilityId::Observation));
        assert_eq!(AbilityId::Pull.to_string(), "pull");
        assert!("teleport".parse::<AbilityId>().is_err());
    }

    #[test]
    fn flagged_abilities_use_distinct_flags() {
        let flags: Vec<_> = AbilityId::iter().filter_map(AbilityId::flag).collect();
        assert_eq!(flags.len(), 5);
        let union = flags.iter().fold(Capabilities::empty(), |acc, f| acc | *f);
        assert_eq!(union.bits().count_ones(), 5);
    }

    #[test]
    fn config_keys_are_snake_case() {
        let key: &'static str = AbilityId::Observation.into();
        assert_eq!(key, "observation");
        assert_eq!(AbilityId::Overdrive.to_string(), "overdrive");
    }
}
