//! Ability request gateway.
//!
//! [`AbilityEngine`] is the authoritative owner of every per-actor store
//! (cooldown history, capability flags, pending selections), the effect
//! scheduler and the trap field. Callers drive it with selection-surface
//! events, lifecycle commands and periodic [`AbilityEngine::tick`] calls; the
//! world itself is borrowed per call so the engine never holds a reference
//! into it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use strum::IntoEnumIterator;

use crate::ability::AbilityId;
use crate::capability::{ActivationToken, Capabilities, CapabilityRegistry};
use crate::clock::GameClock;
use crate::config::{EngineConfig, SelectionMode};
use crate::cooldown::{CooldownTracker, Gate};
use crate::effect::{self, Activation, EffectContext, Scheduler, Step};
use crate::error::AbilityError;
use crate::trap::{TrapField, TrapTrigger};
use crate::types::{EntityId, Location, Timestamp};
use crate::world::World;

/// Display status of one ability for one hunter.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityStatus {
    RunNotStarted,
    Locked { remaining_secs: u64 },
    OnCooldown { remaining_secs: u64 },
    Ready,
}

impl fmt::Display for AbilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RunNotStarted => f.write_str("run not started"),
            Self::Locked { remaining_secs } => write!(f, "locked: {remaining_secs}s"),
            Self::OnCooldown { remaining_secs } => {
                write!(f, "cooldown: {remaining_secs}s remaining")
            }
            Self::Ready => f.write_str("ready"),
        }
    }
}

/// One row of the selection surface.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct AbilityStatusLine {
    pub ability: AbilityId,
    pub label: &'static str,
    pub lore: &'static [&'static str],
    pub status: AbilityStatus,
}

/// Result of a selection-surface click.
#[derive(Clone, Debug, PartialEq)]
pub enum SelectionOutcome {
    /// The click only recorded a pending choice.
    Pending(AbilityId),
    /// The click triggered the ability at once.
    Triggered(Activation),
}

/// What a due step did when it ran.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StepOutcome {
    /// The token was current; its flag is cleared. `applied` is false when
    /// the world had nothing left to undo.
    Reverted {
        token: ActivationToken,
        applied: bool,
    },
    /// The token was superseded or already cleared; nothing happened.
    Stale { token: ActivationToken },
    Struck { owner: EntityId, at: Location },
    /// The registration that queued the strike ended before it landed.
    StrikeDropped { owner: EntityId },
}

/// Everything one tick did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    pub steps: Vec<StepOutcome>,
    pub trap_triggers: Vec<TrapTrigger>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty() && self.trap_triggers.is_empty()
    }
}

/// Flags reverted while tearing down an actor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Teardown {
    pub actor: EntityId,
    pub reverted: Capabilities,
}

/// The ability timing and effect-lifecycle engine.
pub struct AbilityEngine {
    config: EngineConfig,
    clock: GameClock,
    cooldowns: CooldownTracker,
    capabilities: CapabilityRegistry,
    scheduler: Scheduler,
    traps: TrapField,
    /// Hunters with the tenure minted when they registered.
    hunters: BTreeMap<EntityId, u64>,
    next_tenure: u64,
    runner: Option<EntityId>,
    pending: HashMap<EntityId, AbilityId>,
    rng: StdRng,
}

impl AbilityEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            cooldowns: CooldownTracker::new(&config),
            rng: StdRng::seed_from_u64(config.rng_seed),
            clock: GameClock::new(),
            capabilities: CapabilityRegistry::new(),
            scheduler: Scheduler::new(),
            traps: TrapField::new(),
            hunters: BTreeMap::new(),
            next_tenure: 0,
            runner: None,
            pending: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &GameClock {
        &self.clock
    }

    pub fn is_hunter(&self, actor: EntityId) -> bool {
        self.hunters.contains_key(&actor)
    }

    pub fn hunters(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.hunters.keys().copied()
    }

    pub fn runner(&self) -> Option<EntityId> {
        self.runner
    }

    pub fn pending_selection(&self, actor: EntityId) -> Option<AbilityId> {
        self.pending.get(&actor).copied()
    }

    pub fn active_flags(&self, actor: EntityId) -> Capabilities {
        self.capabilities.flags(actor)
    }

    pub fn traps(&self) -> &TrapField {
        &self.traps
    }

    pub fn pending_steps(&self) -> usize {
        self.scheduler.len()
    }

    pub fn next_due(&self) -> Option<Timestamp> {
        self.scheduler.next_due()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Adds `actor` to the hunters. Returns `false` if it already was one.
    ///
    /// Every registration mints a fresh tenure, so follow-ups queued during
    /// an earlier registration of the same actor are dropped. With
    /// `auto_start_on_first_hunter`, registering starts an unset clock.
    pub fn register_hunter(&mut self, actor: EntityId, now: Timestamp) -> bool {
        if self.hunters.contains_key(&actor) {
            return false;
        }
        self.next_tenure += 1;
        self.hunters.insert(actor, self.next_tenure);
        if self.config.auto_start_on_first_hunter && !self.clock.is_started() {
            self.clock.start(now);
        }
        true
    }

    /// Removes `actor` from the hunters, reverting every active effect it owns.
    ///
    /// Returns `None` if `actor` was not a hunter. Scheduled reversions for the
    /// actor stay queued and resolve as stale when they come due.
    pub fn remove_hunter(&mut self, actor: EntityId, world: &mut dyn World) -> Option<Teardown> {
        self.hunters.remove(&actor)?;
        let reverted = self.teardown_flags(actor, world);
        self.cooldowns.clear_actor(actor);
        self.pending.remove(&actor);
        Some(Teardown { actor, reverted })
    }

    /// Removes every hunter. Returns the teardowns in actor order.
    pub fn clear_all_hunters(&mut self, world: &mut dyn World) -> Vec<Teardown> {
        let hunters: Vec<_> = self.hunters.keys().copied().collect();
        hunters
            .into_iter()
            .filter_map(|actor| self.remove_hunter(actor, world))
            .collect()
    }

    /// Designates the runner. Returns the previous one.
    pub fn set_runner(&mut self, runner: Option<EntityId>) -> Option<EntityId> {
        std::mem::replace(&mut self.runner, runner)
    }

    /// Starts a fresh run at `now`.
    ///
    /// Clears cooldown history, pending selections, queued strikes and trap
    /// markers, and reverts every active capability flag. Hunters and the
    /// runner designation survive.
    pub fn start_run(&mut self, now: Timestamp, world: &mut dyn World) -> Vec<Teardown> {
        self.clock.start(now);
        self.cooldowns.reset();
        self.pending.clear();
        self.traps.clear();
        self.scheduler.retain(|step| matches!(step, Step::Revert(_)));

        let actors: Vec<_> = self.capabilities.actors().collect();
        actors
            .into_iter()
            .map(|actor| Teardown {
                actor,
                reverted: self.teardown_flags(actor, world),
            })
            .filter(|teardown| !teardown.reverted.is_empty())
            .collect()
    }

    fn teardown_flags(&mut self, actor: EntityId, world: &mut dyn World) -> Capabilities {
        let mut reverted = Capabilities::empty();
        for (flag, reversion) in self.capabilities.clear_all(actor) {
            effect::apply_reversion(world, &self.capabilities, actor, reversion);
            reverted |= flag;
        }
        reverted
    }

    // ------------------------------------------------------------------
    // Requests
    // ------------------------------------------------------------------

    /// Pure gate check. Before the run starts every ability is locked for
    /// its full unlock delay.
    pub fn check_gate(&self, actor: EntityId, ability: AbilityId, now: Timestamp) -> Gate {
        self.cooldowns.check_gate(&self.clock, actor, ability, now)
    }

    /// Handles a click on `ability` in the selection surface.
    pub fn on_ability_selected(
        &mut self,
        actor: EntityId,
        ability: AbilityId,
        now: Timestamp,
        world: &mut dyn World,
    ) -> Result<SelectionOutcome, AbilityError> {
        self.ensure_hunter(actor)?;
        match self.config.selection_mode {
            SelectionMode::Immediate => self
                .trigger(actor, ability, now, world)
                .map(SelectionOutcome::Triggered),
            SelectionMode::ConfirmOnClose | SelectionMode::Explicit => {
                self.pending.insert(actor, ability);
                Ok(SelectionOutcome::Pending(ability))
            }
        }
    }

    /// Confirms the pending selection of `actor`, re-checking the gate now.
    ///
    /// Returns `Ok(None)` when nothing was selected. The selection is
    /// consumed whether or not the trigger succeeds.
    pub fn on_selection_confirmed(
        &mut self,
        actor: EntityId,
        now: Timestamp,
        world: &mut dyn World,
    ) -> Result<Option<Activation>, AbilityError> {
        self.ensure_hunter(actor)?;
        match self.pending.remove(&actor) {
            Some(ability) => self.trigger(actor, ability, now, world).map(Some),
            None => Ok(None),
        }
    }

    /// Handles the selection surface closing.
    ///
    /// Under [`SelectionMode::ConfirmOnClose`] this confirms; otherwise the
    /// pending selection is discarded without touching any state.
    pub fn on_selection_closed(
        &mut self,
        actor: EntityId,
        now: Timestamp,
        world: &mut dyn World,
    ) -> Result<Option<Activation>, AbilityError> {
        if self.config.selection_mode == SelectionMode::ConfirmOnClose {
            return self.on_selection_confirmed(actor, now, world);
        }
        self.pending.remove(&actor);
        Ok(None)
    }

    /// Gate-checks and executes `ability`, recording the cooldown on success.
    pub fn trigger(
        &mut self,
        actor: EntityId,
        ability: AbilityId,
        now: Timestamp,
        world: &mut dyn World,
    ) -> Result<Activation, AbilityError> {
        let tenure = self.tenure(actor)?;
        self.check_gate(actor, ability, now).into_result(ability)?;

        let mut ctx = EffectContext {
            actor,
            tenure,
            now,
            runner: self.runner,
            config: &self.config,
            world,
            capabilities: &mut self.capabilities,
            scheduler: &mut self.scheduler,
            traps: &mut self.traps,
            rng: &mut self.rng,
        };
        let activation = effect::execute(&mut ctx, ability)?;

        self.cooldowns.record_trigger(actor, ability, now);
        Ok(activation)
    }

    /// Status rows for every ability, in catalog order.
    pub fn render_state(&self, actor: EntityId, now: Timestamp) -> Vec<AbilityStatusLine> {
        AbilityId::iter()
            .map(|ability| {
                let def = ability.def();
                let status = if !self.clock.is_started() {
                    AbilityStatus::RunNotStarted
                } else {
                    match self.check_gate(actor, ability, now) {
                        Gate::Locked { remaining_secs } => AbilityStatus::Locked { remaining_secs },
                        Gate::OnCooldown { remaining_secs } => {
                            AbilityStatus::OnCooldown { remaining_secs }
                        }
                        Gate::Ready => AbilityStatus::Ready,
                    }
                };
                AbilityStatusLine {
                    ability,
                    label: def.label,
                    lore: def.lore,
                    status,
                }
            })
            .collect()
    }

    fn ensure_hunter(&self, actor: EntityId) -> Result<(), AbilityError> {
        self.tenure(actor).map(|_| ())
    }

    fn tenure(&self, actor: EntityId) -> Result<u64, AbilityError> {
        self.hunters
            .get(&actor)
            .copied()
            .ok_or(AbilityError::NotRegistered { actor })
    }

    // ------------------------------------------------------------------
    // Periodic work
    // ------------------------------------------------------------------

    /// Runs every step due at `now`, then the trap field against the runner.
    pub fn tick(&mut self, now: Timestamp, world: &mut dyn World) -> TickReport {
        let mut report = TickReport::default();

        while let Some((_, step)) = self.scheduler.pop_due(now) {
            report.steps.push(self.run_step(step, world));
        }

        if let Some(runner) = self.runner {
            report.trap_triggers = self.traps.tick(runner, now, &self.config.traps, world);
        }

        report
    }

    fn run_step(&mut self, step: Step, world: &mut dyn World) -> StepOutcome {
        match step {
            Step::Revert(token) => match self.capabilities.take_if_current(token) {
                Some(reversion) => StepOutcome::Reverted {
                    token,
                    applied: effect::apply_reversion(
                        world,
                        &self.capabilities,
                        token.actor,
                        reversion,
                    ),
                },
                None => StepOutcome::Stale { token },
            },
            Step::Strike { owner, tenure, at } => {
                if self.hunters.get(&owner) != Some(&tenure) {
                    return StepOutcome::StrikeDropped { owner };
                }
                world.strike_lightning(at);
                StepOutcome::Struck { owner, at }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WorldId;
    use crate::world::{ActorMode, InMemoryWorld, StatusKind};

    const HUNTER: EntityId = EntityId(1);
    const RUNNER: EntityId = EntityId(2);
    const OTHER: EntityId = EntityId(3);

    fn spawn_pair() -> InMemoryWorld {
        let mut world = InMemoryWorld::new();
        world.spawn(HUNTER, Location::new(WorldId::OVERWORLD, 0.0, 64.0, 0.0));
        world.spawn(RUNNER, Location::new(WorldId::OVERWORLD, 8.0, 64.0, 0.0));
        world
    }

    fn engine(config: EngineConfig) -> AbilityEngine {
        let mut engine = AbilityEngine::new(config);
        engine.register_hunter(HUNTER, Timestamp::ZERO);
        engine.set_runner(Some(RUNNER));
        engine
    }

    fn started(world: &mut InMemoryWorld, elapsed_secs: u64) -> (AbilityEngine, Timestamp) {
        let mut engine = engine(EngineConfig::default());
        engine.start_run(Timestamp::ZERO, world);
        (engine, Timestamp::from_secs(elapsed_secs))
    }

    #[test]
    fn gate_before_start_is_fully_locked() {
        let engine = engine(EngineConfig::default());
        let now = Timestamp::from_secs(10_000);

        assert_eq!(
            engine.check_gate(HUNTER, AbilityId::Overdrive, now),
            Gate::Locked { remaining_secs: 300 }
        );
        for ability in AbilityId::iter() {
            assert_eq!(
                engine.check_gate(HUNTER, ability, now),
                Gate::Locked {
                    remaining_secs: ability.def().unlock_secs
                }
            );
        }
        assert!(
            engine
                .render_state(HUNTER, now)
                .iter()
                .all(|line| line.status == AbilityStatus::RunNotStarted)
        );
    }

    #[test]
    fn trigger_records_cooldown_and_expires() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 400);

        assert_eq!(engine.check_gate(HUNTER, AbilityId::Overdrive, now), Gate::Ready);
        engine
            .trigger(HUNTER, AbilityId::Overdrive, now, &mut world)
            .unwrap();
        assert_eq!(
            engine.check_gate(HUNTER, AbilityId::Overdrive, now),
            Gate::OnCooldown { remaining_secs: 45 }
        );
        assert_eq!(
            engine.check_gate(HUNTER, AbilityId::Overdrive, now.after_secs(46)),
            Gate::Ready
        );
    }

    #[test]
    fn repeated_trigger_is_rejected_without_second_step() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 1_000);

        engine
            .trigger(HUNTER, AbilityId::Observation, now, &mut world)
            .unwrap();
        let err = engine
            .trigger(HUNTER, AbilityId::Observation, now, &mut world)
            .unwrap_err();

        assert!(matches!(err, AbilityError::OnCooldown { .. }));
        assert_eq!(engine.pending_steps(), 1);
    }

    #[test]
    fn reentrant_flag_is_rejected_after_cooldown_shortened() {
        let mut world = spawn_pair();
        let config = EngineConfig::default().with_timing(AbilityId::Observation, 300, 0);
        let mut engine = engine(config);
        engine.start_run(Timestamp::ZERO, &mut world);
        let now = Timestamp::from_secs(300);

        engine
            .trigger(HUNTER, AbilityId::Observation, now, &mut world)
            .unwrap();
        assert_eq!(
            engine.trigger(HUNTER, AbilityId::Observation, now.after_secs(1), &mut world),
            Err(AbilityError::AlreadyActive {
                ability: AbilityId::Observation
            })
        );
        assert_eq!(engine.pending_steps(), 1);

        let report = engine.tick(now.after_secs(10), &mut world);
        assert!(matches!(
            report.steps.as_slice(),
            [StepOutcome::Reverted { applied: true, .. }]
        ));
        assert_eq!(world.body(HUNTER).unwrap().mode, ActorMode::Survival);
        assert_eq!(world.body(HUNTER).unwrap().location.y, 64.0);
    }

    #[test]
    fn aborted_trigger_does_not_consume_cooldown() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 2_000);
        engine.set_runner(None);

        assert!(matches!(
            engine.trigger(HUNTER, AbilityId::Scan, now, &mut world),
            Err(AbilityError::InvalidTarget { .. })
        ));
        assert_eq!(engine.check_gate(HUNTER, AbilityId::Scan, now), Gate::Ready);
    }

    #[test]
    fn non_hunter_is_not_registered() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 2_000);

        assert_eq!(
            engine.trigger(RUNNER, AbilityId::Jump, now, &mut world),
            Err(AbilityError::NotRegistered { actor: RUNNER })
        );
    }

    #[test]
    fn removal_mid_effect_leaves_stale_step() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 1_000);

        engine
            .trigger(HUNTER, AbilityId::Observation, now, &mut world)
            .unwrap();
        world.despawn(HUNTER);

        let teardown = engine.remove_hunter(HUNTER, &mut world).unwrap();
        assert_eq!(teardown.reverted, Capabilities::OBSERVATION);
        assert!(engine.active_flags(HUNTER).is_empty());

        let report = engine.tick(now.after_secs(10), &mut world);
        assert!(matches!(report.steps.as_slice(), [StepOutcome::Stale { .. }]));
        assert!(world.body(HUNTER).is_none());
    }

    #[test]
    fn removal_reverts_world_effects() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 2_000);

        engine.trigger(HUNTER, AbilityId::Shield, now, &mut world).unwrap();
        engine.trigger(HUNTER, AbilityId::Vision, now, &mut world).unwrap();
        assert!(world.has_status(RUNNER, StatusKind::Blindness));

        engine.remove_hunter(HUNTER, &mut world);
        assert!(!world.has_status(HUNTER, StatusKind::Resistance));
        assert!(!world.has_status(RUNNER, StatusKind::Blindness));
        assert!(engine.remove_hunter(HUNTER, &mut world).is_none());
    }

    #[test]
    fn clear_all_hunters_is_idempotent() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 2_000);
        engine.trigger(HUNTER, AbilityId::Zoom, now, &mut world).unwrap();

        assert_eq!(engine.clear_all_hunters(&mut world).len(), 1);
        assert!(engine.clear_all_hunters(&mut world).is_empty());
        assert!(engine.active_flags(HUNTER).is_empty());
        assert_eq!(engine.hunters().count(), 0);
    }

    #[test]
    fn closing_explicit_selection_mutates_nothing() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 400);

        let outcome = engine
            .on_ability_selected(HUNTER, AbilityId::Overdrive, now, &mut world)
            .unwrap();
        assert_eq!(outcome, SelectionOutcome::Pending(AbilityId::Overdrive));
        assert_eq!(engine.on_selection_closed(HUNTER, now, &mut world), Ok(None));

        assert!(engine.active_flags(HUNTER).is_empty());
        assert_eq!(engine.pending_selection(HUNTER), None);
        assert_eq!(engine.check_gate(HUNTER, AbilityId::Overdrive, now), Gate::Ready);
        engine
            .on_ability_selected(HUNTER, AbilityId::Overdrive, now.after_secs(5), &mut world)
            .unwrap();
        assert_eq!(
            engine.render_state(HUNTER, now.after_secs(5))[0].status,
            AbilityStatus::Ready
        );
    }

    #[test]
    fn confirmation_rechecks_gate() {
        let mut world = spawn_pair();
        let (mut engine, _) = started(&mut world, 0);

        engine
            .on_ability_selected(HUNTER, AbilityId::Overdrive, Timestamp::from_secs(200), &mut world)
            .unwrap();
        let activation = engine
            .on_selection_confirmed(HUNTER, Timestamp::from_secs(300), &mut world)
            .unwrap();
        assert!(activation.is_some());
    }

    #[test]
    fn confirm_on_close_triggers() {
        let mut world = spawn_pair();
        let config = EngineConfig::default().with_selection_mode(SelectionMode::ConfirmOnClose);
        let mut engine = engine(config);
        engine.start_run(Timestamp::ZERO, &mut world);
        let now = Timestamp::from_secs(400);

        engine
            .on_ability_selected(HUNTER, AbilityId::Mines, now, &mut world)
            .unwrap();
        assert!(matches!(
            engine.on_selection_closed(HUNTER, now, &mut world),
            Err(AbilityError::Locked { .. })
        ));
        engine
            .on_ability_selected(HUNTER, AbilityId::Overdrive, now, &mut world)
            .unwrap();
        assert!(engine.on_selection_closed(HUNTER, now, &mut world).unwrap().is_some());
    }

    #[test]
    fn immediate_mode_triggers_on_click() {
        let mut world = spawn_pair();
        let config = EngineConfig::default().with_selection_mode(SelectionMode::Immediate);
        let mut engine = engine(config);
        engine.start_run(Timestamp::ZERO, &mut world);

        let outcome = engine
            .on_ability_selected(HUNTER, AbilityId::Overdrive, Timestamp::from_secs(300), &mut world)
            .unwrap();
        assert!(matches!(outcome, SelectionOutcome::Triggered(_)));
    }

    #[test]
    fn strike_lands_after_delay() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 1_200);

        engine.trigger(HUNTER, AbilityId::Strike, now, &mut world).unwrap();
        assert!(engine.tick(now.after_millis(1_499), &mut world).steps.is_empty());

        let report = engine.tick(now.after_millis(1_500), &mut world);
        assert!(matches!(report.steps.as_slice(), [StepOutcome::Struck { .. }]));
        assert_eq!(world.lightning_strikes().len(), 1);
    }

    #[test]
    fn strike_is_dropped_for_removed_owner() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 1_200);

        engine.trigger(HUNTER, AbilityId::Strike, now, &mut world).unwrap();
        engine.remove_hunter(HUNTER, &mut world);

        let report = engine.tick(now.after_secs(2), &mut world);
        assert_eq!(report.steps, vec![StepOutcome::StrikeDropped { owner: HUNTER }]);
        assert!(world.lightning_strikes().is_empty());
    }

    #[test]
    fn strike_from_earlier_registration_is_dropped() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 1_200);

        engine.trigger(HUNTER, AbilityId::Strike, now, &mut world).unwrap();
        engine.remove_hunter(HUNTER, &mut world);
        assert!(engine.register_hunter(HUNTER, now.after_millis(500)));

        let report = engine.tick(now.after_secs(2), &mut world);
        assert_eq!(report.steps, vec![StepOutcome::StrikeDropped { owner: HUNTER }]);
        assert!(world.lightning_strikes().is_empty());
    }

    fn with_second_hunter(world: &mut InMemoryWorld, engine: &mut AbilityEngine, now: Timestamp) {
        world.spawn(OTHER, Location::new(WorldId::OVERWORLD, 0.0, 64.0, 4.0));
        engine.register_hunter(OTHER, now);
    }

    #[test]
    fn shared_blindness_outlives_first_vision() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 2_000);
        with_second_hunter(&mut world, &mut engine, now);

        engine.trigger(HUNTER, AbilityId::Vision, now, &mut world).unwrap();
        engine
            .trigger(OTHER, AbilityId::Vision, now.after_secs(3), &mut world)
            .unwrap();

        let report = engine.tick(now.after_secs(7), &mut world);
        assert!(matches!(
            report.steps.as_slice(),
            [StepOutcome::Reverted { applied: false, .. }]
        ));
        assert!(engine.active_flags(OTHER).contains(Capabilities::VISION));
        assert!(world.has_status(RUNNER, StatusKind::Blindness));

        let report = engine.tick(now.after_secs(10), &mut world);
        assert!(matches!(
            report.steps.as_slice(),
            [StepOutcome::Reverted { applied: true, .. }]
        ));
        assert!(!world.has_status(RUNNER, StatusKind::Blindness));
    }

    #[test]
    fn removal_keeps_blindness_another_hunter_holds() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 2_000);
        with_second_hunter(&mut world, &mut engine, now);

        engine.trigger(HUNTER, AbilityId::Vision, now, &mut world).unwrap();
        engine.trigger(OTHER, AbilityId::Vision, now, &mut world).unwrap();

        engine.remove_hunter(HUNTER, &mut world);
        assert!(world.has_status(RUNNER, StatusKind::Blindness));

        let teardowns = engine.start_run(now.after_secs(1), &mut world);
        assert_eq!(teardowns.len(), 1);
        assert!(!world.has_status(RUNNER, StatusKind::Blindness));
    }

    #[test]
    fn start_run_resets_history_and_flags() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 2_000);
        engine.trigger(HUNTER, AbilityId::Shield, now, &mut world).unwrap();
        engine.trigger(HUNTER, AbilityId::Mines, now, &mut world).unwrap();
        engine.trigger(HUNTER, AbilityId::Strike, now, &mut world).unwrap();

        let teardowns = engine.start_run(now, &mut world);
        assert_eq!(teardowns.len(), 1);
        assert!(!world.has_status(HUNTER, StatusKind::Resistance));
        assert!(engine.traps().is_empty());
        assert!(engine.is_hunter(HUNTER));
        assert_eq!(engine.runner(), Some(RUNNER));

        // the shield revert stays queued and resolves stale
        assert_eq!(engine.pending_steps(), 1);
        let report = engine.tick(now.after_secs(10), &mut world);
        assert!(matches!(report.steps.as_slice(), [StepOutcome::Stale { .. }]));
        assert_eq!(
            engine.check_gate(HUNTER, AbilityId::Shield, now.after_secs(10)),
            Gate::Locked { remaining_secs: 710 }
        );
    }

    #[test]
    fn tick_fires_traps_under_runner() {
        let mut world = spawn_pair();
        let (mut engine, now) = started(&mut world, 2_000);
        engine.trigger(HUNTER, AbilityId::Mines, now, &mut world).unwrap();

        let marker = engine.traps().markers()[0];
        world.move_to(RUNNER, marker.location);
        let report = engine.tick(now.after_secs(1), &mut world);

        assert!(report.trap_triggers.iter().any(|t| t.marker.id == marker.id));
        assert!(world.body(RUNNER).unwrap().health < crate::world::ActorBody::MAX_HEALTH);
    }

    #[test]
    fn auto_start_on_first_hunter() {
        let config = EngineConfig {
            auto_start_on_first_hunter: true,
            ..EngineConfig::default()
        };
        let mut engine = AbilityEngine::new(config);
        assert!(engine.register_hunter(HUNTER, Timestamp::from_secs(5)));
        assert!(!engine.register_hunter(HUNTER, Timestamp::from_secs(9)));
        assert_eq!(engine.clock().started_at(), Some(Timestamp::from_secs(5)));
    }
}
