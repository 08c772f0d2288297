//! Engine worker that owns the authoritative [`AbilityEngine`] and world.
//!
//! Receives commands from [`RuntimeHandle`](crate::RuntimeHandle), drives the
//! engine on a fixed tick interval, and publishes outcomes to the EventBus.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use hunter_core::{
    AbilityEngine, AbilityError, AbilityId, AbilityStatusLine, Activation, EntityId, Gate,
    SelectionOutcome, StepOutcome, Teardown, TickReport, Timestamp, World,
};

use crate::api::{Result, RuntimeError};
use crate::events::{AbilityEvent, Event, EventBus, LifecycleEvent, TrapEvent};

/// Closure run against the world on the worker task.
pub type WorldFn<W> = Box<dyn FnOnce(&mut W) + Send>;

/// Commands that can be sent to the engine worker
pub enum Command<W> {
    RegisterHunter {
        actor: EntityId,
        reply: oneshot::Sender<bool>,
    },
    RemoveHunter {
        actor: EntityId,
        reply: oneshot::Sender<Option<Teardown>>,
    },
    ClearAllHunters {
        reply: oneshot::Sender<Vec<Teardown>>,
    },
    SetRunner {
        runner: Option<EntityId>,
        reply: oneshot::Sender<Option<EntityId>>,
    },
    /// Starts a fresh run; replies with the start timestamp.
    StartRun { reply: oneshot::Sender<Timestamp> },
    SelectAbility {
        actor: EntityId,
        ability: AbilityId,
        reply: oneshot::Sender<Result<SelectionOutcome>>,
    },
    ConfirmSelection {
        actor: EntityId,
        reply: oneshot::Sender<Result<Option<Activation>>>,
    },
    CloseSelection {
        actor: EntityId,
        reply: oneshot::Sender<Result<Option<Activation>>>,
    },
    Trigger {
        actor: EntityId,
        ability: AbilityId,
        reply: oneshot::Sender<Result<Activation>>,
    },
    CheckGate {
        actor: EntityId,
        ability: AbilityId,
        reply: oneshot::Sender<Gate>,
    },
    RenderState {
        actor: EntityId,
        reply: oneshot::Sender<Vec<AbilityStatusLine>>,
    },
    /// Runs a closure against the world (spawning, moving, inspecting).
    WithWorld(WorldFn<W>),
}

/// Background task that processes engine commands and periodic ticks.
pub struct EngineWorker<W> {
    engine: AbilityEngine,
    world: W,
    command_rx: mpsc::Receiver<Command<W>>,
    event_bus: EventBus,
    tick_interval: Duration,
    remove_offline_hunters: bool,
    epoch: Instant,
}

impl<W: World + Send + 'static> EngineWorker<W> {
    /// Creates a new engine worker. The engine timeline starts now.
    pub fn new(
        engine: AbilityEngine,
        world: W,
        command_rx: mpsc::Receiver<Command<W>>,
        event_bus: EventBus,
        tick_interval: Duration,
        remove_offline_hunters: bool,
    ) -> Self {
        info!(
            target: "hunter_runtime::worker",
            tick_ms = tick_interval.as_millis() as u64,
            selection_mode = ?engine.config().selection_mode,
            "EngineWorker initialized"
        );

        Self {
            engine,
            world,
            command_rx,
            event_bus,
            tick_interval,
            remove_offline_hunters,
            epoch: Instant::now(),
        }
    }

    /// Main worker loop. Ends when every handle has been dropped.
    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd),
                    None => break,
                },
                _ = ticker.tick() => self.handle_tick(),
            }
        }

        debug!(target: "hunter_runtime::worker", "EngineWorker stopped");
    }

    /// Milliseconds since the worker started.
    fn now(&self) -> Timestamp {
        let millis = u64::try_from(self.epoch.elapsed().as_millis()).unwrap_or(u64::MAX);
        Timestamp::from_millis(millis)
    }

    fn handle_command(&mut self, cmd: Command<W>) {
        let now = self.now();
        match cmd {
            Command::RegisterHunter { actor, reply } => {
                let result = self.register_hunter(actor, now);
                reply_or_log(reply, result, "RegisterHunter");
            }
            Command::RemoveHunter { actor, reply } => {
                let result = self.remove_hunter(actor, false);
                reply_or_log(reply, result, "RemoveHunter");
            }
            Command::ClearAllHunters { reply } => {
                let teardowns = self.engine.clear_all_hunters(&mut self.world);
                for teardown in &teardowns {
                    self.publish_removal(teardown, false);
                }
                reply_or_log(reply, teardowns, "ClearAllHunters");
            }
            Command::SetRunner { runner, reply } => {
                let previous = self.engine.set_runner(runner);
                info!(target: "hunter_runtime::worker", ?runner, ?previous, "runner set");
                self.event_bus
                    .publish(Event::Lifecycle(LifecycleEvent::RunnerSet { runner }));
                reply_or_log(reply, previous, "SetRunner");
            }
            Command::StartRun { reply } => {
                self.start_run(now);
                reply_or_log(reply, now, "StartRun");
            }
            Command::SelectAbility {
                actor,
                ability,
                reply,
            } => {
                let result = self
                    .engine
                    .on_ability_selected(actor, ability, now, &mut self.world);
                let result = match result {
                    Ok(SelectionOutcome::Pending(ability)) => {
                        self.event_bus
                            .publish(Event::Ability(AbilityEvent::Selected { actor, ability }));
                        Ok(SelectionOutcome::Pending(ability))
                    }
                    Ok(SelectionOutcome::Triggered(activation)) => {
                        self.publish_activation(&activation);
                        Ok(SelectionOutcome::Triggered(activation))
                    }
                    Err(err) => Err(self.rejected(actor, Some(ability), err)),
                };
                reply_or_log(reply, result, "SelectAbility");
            }
            Command::ConfirmSelection { actor, reply } => {
                let pending = self.engine.pending_selection(actor);
                let result = self
                    .engine
                    .on_selection_confirmed(actor, now, &mut self.world);
                let result = self.finish_confirmation(actor, pending, result);
                reply_or_log(reply, result, "ConfirmSelection");
            }
            Command::CloseSelection { actor, reply } => {
                let pending = self.engine.pending_selection(actor);
                let result = self.engine.on_selection_closed(actor, now, &mut self.world);
                let result = self.finish_confirmation(actor, pending, result);
                reply_or_log(reply, result, "CloseSelection");
            }
            Command::Trigger {
                actor,
                ability,
                reply,
            } => {
                let result = match self.engine.trigger(actor, ability, now, &mut self.world) {
                    Ok(activation) => {
                        self.publish_activation(&activation);
                        Ok(activation)
                    }
                    Err(err) => Err(self.rejected(actor, Some(ability), err)),
                };
                reply_or_log(reply, result, "Trigger");
            }
            Command::CheckGate {
                actor,
                ability,
                reply,
            } => {
                let gate = self.engine.check_gate(actor, ability, now);
                reply_or_log(reply, gate, "CheckGate");
            }
            Command::RenderState { actor, reply } => {
                let lines = self.engine.render_state(actor, now);
                reply_or_log(reply, lines, "RenderState");
            }
            Command::WithWorld(apply) => apply(&mut self.world),
        }
    }

    fn register_hunter(&mut self, actor: EntityId, now: Timestamp) -> bool {
        let was_started = self.engine.clock().is_started();
        let added = self.engine.register_hunter(actor, now);
        if added {
            let run_started = !was_started && self.engine.clock().is_started();
            info!(target: "hunter_runtime::worker", %actor, run_started, "hunter registered");
            self.event_bus
                .publish(Event::Lifecycle(LifecycleEvent::HunterRegistered {
                    actor,
                    run_started,
                }));
        }
        added
    }

    fn remove_hunter(&mut self, actor: EntityId, disconnected: bool) -> Option<Teardown> {
        let teardown = self.engine.remove_hunter(actor, &mut self.world)?;
        self.publish_removal(&teardown, disconnected);
        Some(teardown)
    }

    fn start_run(&mut self, now: Timestamp) {
        let reverted: Vec<_> = self
            .engine
            .start_run(now, &mut self.world)
            .into_iter()
            .map(|teardown| (teardown.actor, teardown.reverted))
            .collect();
        info!(
            target: "hunter_runtime::worker",
            at_ms = now.as_millis(),
            reverted = reverted.len(),
            "run started"
        );
        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::RunStarted { at: now, reverted }));
    }

    fn finish_confirmation(
        &mut self,
        actor: EntityId,
        pending: Option<AbilityId>,
        result: std::result::Result<Option<Activation>, AbilityError>,
    ) -> Result<Option<Activation>> {
        match result {
            Ok(Some(activation)) => {
                self.publish_activation(&activation);
                Ok(Some(activation))
            }
            Ok(None) => Ok(None),
            Err(err) => Err(self.rejected(actor, pending, err)),
        }
    }

    fn publish_activation(&self, activation: &Activation) {
        debug!(
            target: "hunter_runtime::worker",
            actor = %activation.actor,
            ability = %activation.ability,
            completes_at_ms = activation.completes_at.map(Timestamp::as_millis),
            "ability triggered"
        );
        self.event_bus
            .publish(Event::Ability(AbilityEvent::Triggered {
                actor: activation.actor,
                ability: activation.ability,
                at: activation.at,
                report: activation.report.clone(),
                completes_at: activation.completes_at,
            }));
    }

    fn rejected(
        &self,
        actor: EntityId,
        ability: Option<AbilityId>,
        err: AbilityError,
    ) -> RuntimeError {
        debug!(
            target: "hunter_runtime::worker",
            %actor,
            ?ability,
            severity = err.severity().as_str(),
            "ability rejected: {}",
            err
        );
        self.event_bus
            .publish(Event::Ability(AbilityEvent::Rejected {
                actor,
                ability,
                severity: err.severity(),
                reason: err.to_string(),
            }));
        RuntimeError::from(err)
    }

    fn publish_removal(&self, teardown: &Teardown, disconnected: bool) {
        info!(
            target: "hunter_runtime::worker",
            actor = %teardown.actor,
            reverted = ?teardown.reverted,
            disconnected,
            "hunter removed"
        );
        self.event_bus
            .publish(Event::Lifecycle(LifecycleEvent::HunterRemoved {
                actor: teardown.actor,
                reverted: teardown.reverted,
                disconnected,
            }));
    }

    fn handle_tick(&mut self) {
        let now = self.now();

        if self.remove_offline_hunters {
            let offline: Vec<_> = self
                .engine
                .hunters()
                .filter(|&hunter| !self.world.is_online(hunter))
                .collect();
            for hunter in offline {
                self.remove_hunter(hunter, true);
            }
        }

        let report = self.engine.tick(now, &mut self.world);
        if !report.is_empty() {
            self.publish_tick(report, now);
        }
    }

    fn publish_tick(&self, report: TickReport, now: Timestamp) {
        for step in report.steps {
            let event = match step {
                StepOutcome::Reverted { token, applied } => {
                    debug!(
                        target: "hunter_runtime::worker",
                        actor = %token.actor,
                        flag = ?token.flag,
                        applied,
                        "effect reverted"
                    );
                    AbilityEvent::Reverted {
                        token,
                        applied,
                        at: now,
                    }
                }
                StepOutcome::Stale { token } => {
                    debug!(
                        target: "hunter_runtime::worker",
                        actor = %token.actor,
                        generation = token.generation,
                        "stale reversion absorbed"
                    );
                    AbilityEvent::StaleStep { token, at: now }
                }
                StepOutcome::Struck { owner, at } => {
                    debug!(target: "hunter_runtime::worker", %owner, location = %at, "strike landed");
                    AbilityEvent::StrikeLanded {
                        owner,
                        location: at,
                        at: now,
                    }
                }
                StepOutcome::StrikeDropped { owner } => {
                    AbilityEvent::StrikeDropped { owner, at: now }
                }
            };
            self.event_bus.publish(Event::Ability(event));
        }

        for trigger in report.trap_triggers {
            debug!(
                target: "hunter_runtime::worker",
                marker = trigger.marker.id,
                target_actor = %trigger.target,
                "trap triggered"
            );
            self.event_bus
                .publish(Event::Trap(TrapEvent::from(trigger)));
        }
    }
}

/// Sends `value` back to the caller, logging when it stopped waiting.
pub(crate) fn reply_or_log<T>(reply: oneshot::Sender<T>, value: T, command: &'static str) {
    if reply.send(value).is_err() {
        debug!(target: "hunter_runtime::worker", command, "reply channel closed (caller dropped)");
    }
}
