//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RuntimeHandle`] hides channel plumbing and offers async helpers for
//! driving the engine or streaming events from specific topics.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use hunter_core::{
    AbilityId, AbilityStatusLine, Activation, EntityId, Gate, InMemoryWorld, SelectionOutcome,
    Teardown, Timestamp,
};

use super::errors::{Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::workers::{Command, reply_or_log};

/// Client-facing handle to interact with the runtime
pub struct RuntimeHandle<W = InMemoryWorld> {
    command_tx: mpsc::Sender<Command<W>>,
    event_bus: EventBus,
}

impl<W> Clone for RuntimeHandle<W> {
    fn clone(&self) -> Self {
        Self {
            command_tx: self.command_tx.clone(),
            event_bus: self.event_bus.clone(),
        }
    }
}

impl<W: Send + 'static> RuntimeHandle<W> {
    pub(crate) fn new(command_tx: mpsc::Sender<Command<W>>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> Command<W>,
    ) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }

    /// Make `actor` a hunter. Returns `false` if it already was one.
    pub async fn register_hunter(&self, actor: EntityId) -> Result<bool> {
        self.request(|reply| Command::RegisterHunter { actor, reply })
            .await
    }

    /// Remove `actor` from the hunters, reverting its active effects.
    pub async fn remove_hunter(&self, actor: EntityId) -> Result<Option<Teardown>> {
        self.request(|reply| Command::RemoveHunter { actor, reply })
            .await
    }

    pub async fn clear_all_hunters(&self) -> Result<Vec<Teardown>> {
        self.request(|reply| Command::ClearAllHunters { reply })
            .await
    }

    /// Designate the runner. Returns the previous designation.
    pub async fn set_runner(&self, runner: Option<EntityId>) -> Result<Option<EntityId>> {
        self.request(|reply| Command::SetRunner { runner, reply })
            .await
    }

    /// Start a fresh run now. Returns the start timestamp.
    pub async fn start_run(&self) -> Result<Timestamp> {
        self.request(|reply| Command::StartRun { reply }).await
    }

    /// A click on `ability` in the selection surface.
    pub async fn select_ability(
        &self,
        actor: EntityId,
        ability: AbilityId,
    ) -> Result<SelectionOutcome> {
        self.request(|reply| Command::SelectAbility {
            actor,
            ability,
            reply,
        })
        .await?
    }

    /// Explicitly confirm the pending selection.
    pub async fn confirm_selection(&self, actor: EntityId) -> Result<Option<Activation>> {
        self.request(|reply| Command::ConfirmSelection { actor, reply })
            .await?
    }

    /// The selection surface closed.
    pub async fn close_selection(&self, actor: EntityId) -> Result<Option<Activation>> {
        self.request(|reply| Command::CloseSelection { actor, reply })
            .await?
    }

    /// Trigger `ability` directly, bypassing the selection surface.
    pub async fn trigger(&self, actor: EntityId, ability: AbilityId) -> Result<Activation> {
        self.request(|reply| Command::Trigger {
            actor,
            ability,
            reply,
        })
        .await?
    }

    pub async fn check_gate(&self, actor: EntityId, ability: AbilityId) -> Result<Gate> {
        self.request(|reply| Command::CheckGate {
            actor,
            ability,
            reply,
        })
        .await
    }

    /// Status rows for the selection surface of `actor`.
    pub async fn render_state(&self, actor: EntityId) -> Result<Vec<AbilityStatusLine>> {
        self.request(|reply| Command::RenderState { actor, reply })
            .await
    }

    /// Run `f` against the world on the worker task and return its result.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let spawned = handle
    ///     .with_world(move |world| { world.spawn(runner, origin); })
    ///     .await?;
    /// ```
    pub async fn with_world<R, F>(&self, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut W) -> R + Send + 'static,
    {
        self.request(|reply: oneshot::Sender<R>| {
            Command::WithWorld(Box::new(move |world: &mut W| {
                reply_or_log(reply, f(world), "with_world");
            }))
        })
        .await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Ability` - Triggers, rejections and delayed steps
    /// - `Topic::Trap` - Trap markers firing
    /// - `Topic::Lifecycle` - Hunters, runner, run start
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use hunter_runtime::Topic;
    ///
    /// let mut ability_rx = handle.subscribe(Topic::Ability);
    /// while let Ok(event) = ability_rx.recv().await {
    ///     // Handle ability events
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
