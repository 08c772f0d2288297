//! The ten ability behaviours.

use std::f64::consts::TAU;

use rand::Rng;

use super::{AbilityEffect, EffectContext, EffectReport, Phase, Step, Targets};
use crate::ability::{AbilityId, EffectShape};
use crate::capability::{Capabilities, Reversion};
use crate::error::TargetError;
use crate::types::Vector;
use crate::world::{ActorMode, StatusEffect, StatusKind};

const OVERDRIVE_AMPLIFIER: u8 = 1;
const SHIELD_AMPLIFIER: u8 = 1;
const JUMP_FORWARD: f64 = 1.2;
const JUMP_UP: f64 = 1.0;
const SCAN_GLOW_MS: u64 = 5_000;
const OBSERVATION_RISE: f64 = 20.0;
const PULL_STRENGTH: f64 = 1.5;
const PULL_LIFT: f64 = 0.4;
const STRIKE_WARNING_MS: u64 = 2_000;
/// Inner radius of the mine scatter ring, so no mine lands under the hunter.
const MINE_MIN_SCATTER: f64 = 0.5;

/// Returns the behaviour implementing `ability`.
pub fn effect_for(ability: AbilityId) -> &'static dyn AbilityEffect {
    match ability {
        AbilityId::Overdrive => &Overdrive,
        AbilityId::Jump => &Jump,
        AbilityId::Zoom => &Zoom,
        AbilityId::Scan => &Scan,
        AbilityId::Mines => &Mines,
        AbilityId::Shield => &Shield,
        AbilityId::Observation => &Observation,
        AbilityId::Pull => &Pull,
        AbilityId::Strike => &Strike,
        AbilityId::Vision => &Vision,
    }
}

/// Delay of the second phase as recorded in the catalog.
fn phase_delay(ability: AbilityId) -> u64 {
    match ability.def().shape {
        EffectShape::Instant => 0,
        EffectShape::Timed { duration_ms, .. } => duration_ms,
        EffectShape::TwoPhase { delay_ms, .. } => delay_ms,
    }
}

/// Timed self-buff: status until removed, reverted after the catalog duration.
fn self_status_phase(
    ability: AbilityId,
    flag: Capabilities,
    ctx: &EffectContext<'_>,
    status: StatusKind,
) -> Phase {
    Phase::Revert {
        flag,
        reversion: Reversion::EndStatus {
            target: ctx.actor,
            status,
        },
        after_ms: phase_delay(ability),
    }
}

struct Overdrive;

impl AbilityEffect for Overdrive {
    fn ability(&self) -> AbilityId {
        AbilityId::Overdrive
    }

    fn plan(&self, ctx: &EffectContext<'_>, _targets: &Targets) -> Result<Phase, TargetError> {
        Ok(self_status_phase(
            self.ability(),
            Capabilities::OVERDRIVE,
            ctx,
            StatusKind::Speed,
        ))
    }

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        _targets: &Targets,
    ) -> Result<EffectReport, TargetError> {
        ctx.world.apply_status(
            ctx.actor,
            StatusEffect::until_removed(StatusKind::Speed, OVERDRIVE_AMPLIFIER),
        );
        Ok(EffectReport::StatusApplied { target: ctx.actor })
    }
}

struct Jump;

impl AbilityEffect for Jump {
    fn ability(&self) -> AbilityId {
        AbilityId::Jump
    }

    fn plan(&self, _ctx: &EffectContext<'_>, _targets: &Targets) -> Result<Phase, TargetError> {
        Ok(Phase::Instant)
    }

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        _targets: &Targets,
    ) -> Result<EffectReport, TargetError> {
        let facing = ctx.world.facing(ctx.actor).unwrap_or(Vector::ZERO);
        let forward = Vector::new(facing.x, 0.0, facing.z)
            .normalize_or_zero()
            .scale(JUMP_FORWARD);
        let velocity = forward + Vector::UP.scale(JUMP_UP);

        ctx.world.set_velocity(ctx.actor, velocity);
        Ok(EffectReport::Launched { velocity })
    }
}

struct Zoom;

impl AbilityEffect for Zoom {
    fn ability(&self) -> AbilityId {
        AbilityId::Zoom
    }

    fn plan(&self, ctx: &EffectContext<'_>, _targets: &Targets) -> Result<Phase, TargetError> {
        Ok(self_status_phase(
            self.ability(),
            Capabilities::ZOOM,
            ctx,
            StatusKind::Zoom,
        ))
    }

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        _targets: &Targets,
    ) -> Result<EffectReport, TargetError> {
        ctx.world
            .apply_status(ctx.actor, StatusEffect::until_removed(StatusKind::Zoom, 0));
        Ok(EffectReport::StatusApplied { target: ctx.actor })
    }
}

struct Scan;

impl AbilityEffect for Scan {
    fn ability(&self) -> AbilityId {
        AbilityId::Scan
    }

    fn plan(&self, _ctx: &EffectContext<'_>, targets: &Targets) -> Result<Phase, TargetError> {
        targets.runner()?;
        Ok(Phase::Instant)
    }

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        targets: &Targets,
    ) -> Result<EffectReport, TargetError> {
        let (runner, runner_at) = targets.runner()?;
        ctx.world.apply_status(
            runner,
            StatusEffect::timed(StatusKind::Glowing, 0, SCAN_GLOW_MS),
        );
        Ok(EffectReport::Scanned {
            runner,
            distance: targets.hunter.distance(&runner_at).unwrap_or_default(),
        })
    }
}

struct Mines;

impl AbilityEffect for Mines {
    fn ability(&self) -> AbilityId {
        AbilityId::Mines
    }

    fn plan(&self, _ctx: &EffectContext<'_>, _targets: &Targets) -> Result<Phase, TargetError> {
        Ok(Phase::Instant)
    }

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        targets: &Targets,
    ) -> Result<EffectReport, TargetError> {
        let traps = ctx.config.traps;
        let max_scatter = traps.scatter_radius.max(MINE_MIN_SCATTER);

        let markers = (0..traps.mines_per_use)
            .map(|_| {
                let angle = ctx.rng.gen_range(0.0..TAU);
                let radius = ctx.rng.gen_range(MINE_MIN_SCATTER..=max_scatter);
                let offset = Vector::new(angle.cos() * radius, 0.0, angle.sin() * radius);
                ctx.traps
                    .place(ctx.actor, targets.hunter.translated(offset), ctx.now)
                    .id
            })
            .collect();

        Ok(EffectReport::MinesPlaced { markers })
    }
}

struct Shield;

impl AbilityEffect for Shield {
    fn ability(&self) -> AbilityId {
        AbilityId::Shield
    }

    fn plan(&self, ctx: &EffectContext<'_>, _targets: &Targets) -> Result<Phase, TargetError> {
        Ok(self_status_phase(
            self.ability(),
            Capabilities::SHIELD,
            ctx,
            StatusKind::Resistance,
        ))
    }

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        _targets: &Targets,
    ) -> Result<EffectReport, TargetError> {
        ctx.world.apply_status(
            ctx.actor,
            StatusEffect::until_removed(StatusKind::Resistance, SHIELD_AMPLIFIER),
        );
        Ok(EffectReport::StatusApplied { target: ctx.actor })
    }
}

struct Observation;

impl AbilityEffect for Observation {
    fn ability(&self) -> AbilityId {
        AbilityId::Observation
    }

    fn plan(&self, ctx: &EffectContext<'_>, targets: &Targets) -> Result<Phase, TargetError> {
        Ok(Phase::Revert {
            flag: Capabilities::OBSERVATION,
            reversion: Reversion::RestoreVantage {
                location: targets.hunter,
                mode: ctx.world.mode(ctx.actor).unwrap_or_default(),
            },
            after_ms: phase_delay(self.ability()),
        })
    }

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        targets: &Targets,
    ) -> Result<EffectReport, TargetError> {
        let to = targets.hunter.translated(Vector::UP.scale(OBSERVATION_RISE));
        ctx.world.set_mode(ctx.actor, ActorMode::Spectator);
        ctx.world.teleport(ctx.actor, to);
        Ok(EffectReport::Raised { to })
    }
}

struct Pull;

impl AbilityEffect for Pull {
    fn ability(&self) -> AbilityId {
        AbilityId::Pull
    }

    fn plan(&self, _ctx: &EffectContext<'_>, targets: &Targets) -> Result<Phase, TargetError> {
        targets.runner()?;
        Ok(Phase::Instant)
    }

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        targets: &Targets,
    ) -> Result<EffectReport, TargetError> {
        let (runner, runner_at) = targets.runner()?;
        let velocity = runner_at
            .offset_to(&targets.hunter)
            .normalize_or_zero()
            .scale(PULL_STRENGTH)
            + Vector::UP.scale(PULL_LIFT);

        ctx.world.set_velocity(runner, velocity);
        Ok(EffectReport::Pulled { runner, velocity })
    }
}

struct Strike;

impl AbilityEffect for Strike {
    fn ability(&self) -> AbilityId {
        AbilityId::Strike
    }

    fn plan(&self, ctx: &EffectContext<'_>, targets: &Targets) -> Result<Phase, TargetError> {
        let (_, runner_at) = targets.runner()?;
        Ok(Phase::FollowUp {
            step: Step::Strike {
                owner: ctx.actor,
                tenure: ctx.tenure,
                at: runner_at,
            },
            after_ms: phase_delay(self.ability()),
        })
    }

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        targets: &Targets,
    ) -> Result<EffectReport, TargetError> {
        let (runner, runner_at) = targets.runner()?;
        ctx.world.apply_status(
            runner,
            StatusEffect::timed(StatusKind::Glowing, 0, STRIKE_WARNING_MS),
        );
        Ok(EffectReport::Marked {
            runner,
            at: runner_at,
        })
    }
}

struct Vision;

impl AbilityEffect for Vision {
    fn ability(&self) -> AbilityId {
        AbilityId::Vision
    }

    fn plan(&self, _ctx: &EffectContext<'_>, targets: &Targets) -> Result<Phase, TargetError> {
        let (runner, _) = targets.runner()?;
        Ok(Phase::Revert {
            flag: Capabilities::VISION,
            reversion: Reversion::EndStatus {
                target: runner,
                status: StatusKind::Blindness,
            },
            after_ms: phase_delay(self.ability()),
        })
    }

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        targets: &Targets,
    ) -> Result<EffectReport, TargetError> {
        let (runner, _) = targets.runner()?;
        ctx.world
            .apply_status(runner, StatusEffect::until_removed(StatusKind::Blindness, 0));
        Ok(EffectReport::StatusApplied { target: runner })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::capability::CapabilityRegistry;
    use crate::config::EngineConfig;
    use crate::effect::{Activation, Scheduler, execute};
    use crate::error::{AbilityError, TargetError};
    use crate::trap::TrapField;
    use crate::types::{EntityId, Location, Timestamp, WorldId};
    use crate::world::{InMemoryWorld, World};

    const HUNTER: EntityId = EntityId(1);
    const RUNNER: EntityId = EntityId(2);

    struct Fixture {
        config: EngineConfig,
        world: InMemoryWorld,
        capabilities: CapabilityRegistry,
        scheduler: Scheduler,
        traps: TrapField,
        rng: StdRng,
    }

    impl Fixture {
        fn new(runner_at: Location) -> Self {
            let mut world = InMemoryWorld::new();
            world.spawn(HUNTER, Location::new(WorldId::OVERWORLD, 0.0, 64.0, 0.0));
            world.spawn(RUNNER, runner_at);
            Self {
                config: EngineConfig::default(),
                world,
                capabilities: CapabilityRegistry::new(),
                scheduler: Scheduler::new(),
                traps: TrapField::new(),
                rng: StdRng::seed_from_u64(7),
            }
        }

        fn context(&mut self) -> EffectContext<'_> {
            EffectContext {
                actor: HUNTER,
                tenure: 1,
                now: Timestamp::from_secs(2_000),
                runner: Some(RUNNER),
                config: &self.config,
                world: &mut self.world,
                capabilities: &mut self.capabilities,
                scheduler: &mut self.scheduler,
                traps: &mut self.traps,
                rng: &mut self.rng,
            }
        }

        fn run(&mut self, ability: AbilityId) -> Result<Activation, AbilityError> {
            execute(&mut self.context(), ability)
        }
    }

    fn near() -> Location {
        Location::new(WorldId::OVERWORLD, 10.0, 64.0, 0.0)
    }

    #[test]
    fn plans_agree_with_catalog_shapes() {
        for ability in AbilityId::iter() {
            let mut fixture = Fixture::new(near());
            let activation = fixture.run(ability).unwrap();

            assert_eq!(effect_for(ability).ability(), ability);
            assert_eq!(activation.token.map(|t| t.flag), ability.flag());
            match ability.def().shape {
                EffectShape::Instant => assert!(fixture.scheduler.is_empty()),
                _ => assert_eq!(fixture.scheduler.len(), 1),
            }
        }
    }

    #[test]
    fn flagged_ability_is_not_reentrant() {
        let mut fixture = Fixture::new(near());
        fixture.run(AbilityId::Shield).unwrap();

        assert_eq!(
            fixture.run(AbilityId::Shield),
            Err(AbilityError::AlreadyActive {
                ability: AbilityId::Shield
            })
        );
        assert_eq!(fixture.scheduler.len(), 1);
    }

    #[test]
    fn pull_rejects_runner_beyond_range() {
        let mut fixture = Fixture::new(Location::new(WorldId::OVERWORLD, 40.0, 64.0, 0.0));

        let err = fixture.run(AbilityId::Pull).unwrap_err();
        assert!(matches!(
            err,
            AbilityError::InvalidTarget {
                reason: TargetError::OutOfRange { .. },
                ..
            }
        ));
        assert_eq!(fixture.world.body(RUNNER).unwrap().velocity, Vector::ZERO);
    }

    #[test]
    fn pull_moves_runner_toward_hunter() {
        let mut fixture = Fixture::new(near());
        fixture.run(AbilityId::Pull).unwrap();

        let velocity = fixture.world.body(RUNNER).unwrap().velocity;
        assert!(velocity.x < 0.0);
        assert!(velocity.y > 0.0);
    }

    #[test]
    fn runner_in_other_world_is_invalid() {
        let mut fixture = Fixture::new(Location::new(WorldId(1), 0.0, 64.0, 0.0));

        assert_eq!(
            fixture.run(AbilityId::Scan),
            Err(AbilityError::InvalidTarget {
                ability: AbilityId::Scan,
                reason: TargetError::DifferentWorld
            })
        );
    }

    #[test]
    fn vision_rejects_offline_runner_without_flag() {
        let mut fixture = Fixture::new(near());
        fixture.world.set_online(RUNNER, false);

        assert!(fixture.run(AbilityId::Vision).is_err());
        assert!(!fixture.capabilities.is_set(HUNTER, Capabilities::VISION));
        assert!(fixture.scheduler.is_empty());
    }

    #[test]
    fn runner_effects_report_missing_runner() {
        let mut fixture = Fixture::new(near());
        let targets = Targets {
            hunter: fixture.world.location(HUNTER).unwrap(),
            runner: None,
        };
        let mut ctx = fixture.context();

        for ability in [
            AbilityId::Scan,
            AbilityId::Pull,
            AbilityId::Strike,
            AbilityId::Vision,
        ] {
            let effect = effect_for(ability);
            assert_eq!(effect.plan(&ctx, &targets), Err(TargetError::NoRunner));
            assert_eq!(effect.apply(&mut ctx, &targets), Err(TargetError::NoRunner));
        }
    }

    #[test]
    fn mines_scatter_around_hunter() {
        let mut fixture = Fixture::new(near());
        fixture.run(AbilityId::Mines).unwrap();

        let hunter = fixture.world.location(HUNTER).unwrap();
        assert_eq!(fixture.traps.len(), fixture.config.traps.mines_per_use);
        for marker in fixture.traps.markers() {
            let d = marker.location.distance(&hunter).unwrap();
            assert!((MINE_MIN_SCATTER..=fixture.config.traps.scatter_radius + 1e-9).contains(&d));
            assert_eq!(marker.owner, HUNTER);
        }
    }

    #[test]
    fn observation_raises_into_spectator() {
        let mut fixture = Fixture::new(near());
        let activation = fixture.run(AbilityId::Observation).unwrap();

        let body = fixture.world.body(HUNTER).unwrap();
        assert_eq!(body.mode, ActorMode::Spectator);
        assert_eq!(body.location.y, 84.0);
        assert_eq!(
            activation.completes_at,
            Some(Timestamp::from_secs(2_000).after_millis(10_000))
        );
    }
}
