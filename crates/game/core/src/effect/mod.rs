//! Effect lifecycle: turning a gated ability request into world changes and
//! the delayed steps that finish them.
//!
//! # Shapes
//!
//! - **Instant**: applied and finished inside [`execute`].
//! - **Timed**: the capability flag is registered together with its
//!   [`Reversion`], the effect is applied, and one [`Step::Revert`] carrying
//!   the activation token is scheduled.
//! - **Two-phase**: like timed, but the first phase moves the actor into an
//!   alternate state (observation) or marks a location whose follow-up lands
//!   later (strike).
//!
//! Validation (exclusion, hunter liveness, target checks) runs before any
//! mutation, so an aborted request leaves no flag, step or world change. The
//! flag is registered before the effect is applied and withdrawn again if
//! applying fails; the delayed step is only scheduled once applying succeeded.

mod kinds;
mod scheduler;

pub use kinds::effect_for;
pub use scheduler::{Scheduler, Step};

use rand::rngs::StdRng;

use crate::ability::{AbilityId, TargetRequirement};
use crate::capability::{ActivationToken, Capabilities, CapabilityRegistry, Reversion};
use crate::config::EngineConfig;
use crate::error::{AbilityError, TargetError};
use crate::trap::TrapField;
use crate::types::{EntityId, Location, Timestamp, Vector};
use crate::world::World;

/// Mutable engine state an effect may touch.
pub struct EffectContext<'a> {
    pub actor: EntityId,
    /// Registration tenure of `actor`; follow-up steps carry it.
    pub tenure: u64,
    pub now: Timestamp,
    pub runner: Option<EntityId>,
    pub config: &'a EngineConfig,
    pub world: &'a mut dyn World,
    pub capabilities: &'a mut CapabilityRegistry,
    pub scheduler: &'a mut Scheduler,
    pub traps: &'a mut TrapField,
    pub rng: &'a mut StdRng,
}

/// Positions resolved during validation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Targets {
    pub hunter: Location,
    pub runner: Option<(EntityId, Location)>,
}

impl Targets {
    /// Runner resolved for abilities that require one.
    pub fn runner(&self) -> Result<(EntityId, Location), TargetError> {
        self.runner.ok_or(TargetError::NoRunner)
    }
}

/// What happens after the first phase of an effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Phase {
    /// Nothing further.
    Instant,
    /// Register `flag` with `reversion`; revert after `after_ms`.
    Revert {
        flag: Capabilities,
        reversion: Reversion,
        after_ms: u64,
    },
    /// Run `step` after `after_ms`.
    FollowUp { step: Step, after_ms: u64 },
}

/// Observable result of the first phase.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectReport {
    /// A status was applied to `target`.
    StatusApplied { target: EntityId },
    Launched { velocity: Vector },
    Scanned { runner: EntityId, distance: f64 },
    MinesPlaced { markers: Vec<u64> },
    Raised { to: Location },
    Pulled { runner: EntityId, velocity: Vector },
    Marked { runner: EntityId, at: Location },
}

/// A successful ability activation.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Activation {
    pub actor: EntityId,
    pub ability: AbilityId,
    pub at: Timestamp,
    /// Token of the registered flag, for flagged abilities.
    pub token: Option<ActivationToken>,
    /// When the scheduled second step comes due, if any.
    pub completes_at: Option<Timestamp>,
    pub report: EffectReport,
}

/// One ability behaviour.
///
/// `plan` runs before `apply` and must not mutate anything; it captures what
/// the later phase needs (for example the location to restore).
pub trait AbilityEffect {
    fn ability(&self) -> AbilityId;

    fn plan(&self, ctx: &EffectContext<'_>, targets: &Targets) -> Result<Phase, TargetError>;

    fn apply(
        &self,
        ctx: &mut EffectContext<'_>,
        targets: &Targets,
    ) -> Result<EffectReport, TargetError>;
}

/// Executes `ability` for `ctx.actor`. Gate checks are the caller's job.
///
/// On `Ok` the activation consumed a trigger and the caller should record the
/// cooldown; on `Err` nothing was changed.
pub fn execute(ctx: &mut EffectContext<'_>, ability: AbilityId) -> Result<Activation, AbilityError> {
    if let Some(flag) = ability.flag()
        && ctx.capabilities.is_set(ctx.actor, flag)
    {
        return Err(AbilityError::AlreadyActive { ability });
    }

    let targets = resolve_targets(ctx, ability)
        .map_err(|reason| AbilityError::InvalidTarget { ability, reason })?;

    let effect = effect_for(ability);
    let invalid = |reason| AbilityError::InvalidTarget { ability, reason };
    let phase = effect.plan(ctx, &targets).map_err(invalid)?;

    let token = match phase {
        Phase::Revert { flag, reversion, .. } => Some(
            ctx.capabilities
                .try_set_exclusive(ctx.actor, flag, reversion)
                .ok_or(AbilityError::AlreadyActive { ability })?,
        ),
        Phase::Instant | Phase::FollowUp { .. } => None,
    };

    let report = match effect.apply(ctx, &targets) {
        Ok(report) => report,
        Err(reason) => {
            if let Some(token) = token {
                ctx.capabilities.take_if_current(token);
            }
            return Err(invalid(reason));
        }
    };

    let completes_at = match (phase, token) {
        (Phase::Revert { after_ms, .. }, Some(token)) => {
            let due = ctx.now.after_millis(after_ms);
            ctx.scheduler.schedule(due, Step::Revert(token));
            Some(due)
        }
        (Phase::FollowUp { step, after_ms }, _) => {
            let due = ctx.now.after_millis(after_ms);
            ctx.scheduler.schedule(due, step);
            Some(due)
        }
        _ => None,
    };

    Ok(Activation {
        actor: ctx.actor,
        ability,
        at: ctx.now,
        token,
        completes_at,
        report,
    })
}

fn resolve_targets(ctx: &EffectContext<'_>, ability: AbilityId) -> Result<Targets, TargetError> {
    let hunter = ctx
        .world
        .location(ctx.actor)
        .ok_or(TargetError::ActorOffline(ctx.actor))?;

    let requirement = ability.def().target;
    if requirement == TargetRequirement::None {
        return Ok(Targets {
            hunter,
            runner: None,
        });
    }

    let runner = ctx.runner.ok_or(TargetError::NoRunner)?;
    let runner_at = ctx
        .world
        .location(runner)
        .ok_or(TargetError::RunnerOffline(runner))?;
    let distance = hunter
        .distance(&runner_at)
        .ok_or(TargetError::DifferentWorld)?;

    if requirement == TargetRequirement::RunnerInRange && distance > ctx.config.pull_max_distance {
        return Err(TargetError::OutOfRange {
            distance,
            max: ctx.config.pull_max_distance,
        });
    }

    Ok(Targets {
        hunter,
        runner: Some((runner, runner_at)),
    })
}

/// Undoes `reversion` for `actor`. Returns whether the world changed.
///
/// Call this after the flag's own entry has left `capabilities`. A status
/// another live activation still holds on the same target is left in place.
/// Absent or offline actors are skipped: the bookkeeping is already gone by
/// the time this runs, so there is nothing left to guard.
pub fn apply_reversion(
    world: &mut dyn World,
    capabilities: &CapabilityRegistry,
    actor: EntityId,
    reversion: Reversion,
) -> bool {
    match reversion {
        Reversion::EndStatus { target, status } => {
            if capabilities.holds_status(target, status) {
                return false;
            }
            world.remove_status(target, status)
        }
        Reversion::RestoreVantage { location, mode } => {
            if !world.is_online(actor) {
                return false;
            }
            let moved = world.teleport(actor, location);
            let restored = world.set_mode(actor, mode);
            moved || restored
        }
    }
}
