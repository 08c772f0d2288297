//! High-level runtime orchestrator.
//!
//! The runtime owns the engine worker, wires up command/event channels, and
//! exposes a builder-based API for clients to drive the ability engine.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use hunter_core::{AbilityEngine, EngineConfig, InMemoryWorld, World};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::EventBus;
use crate::workers::{Command, EngineWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    /// Period of the trap field and delayed-step tick.
    pub tick_interval: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Treat a hunter that went offline as removed on the next tick.
    pub remove_offline_hunters: bool,
}

impl RuntimeConfig {
    pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(250);
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            tick_interval: Self::DEFAULT_TICK_INTERVAL,
            event_buffer_size: 100,
            command_buffer_size: 32,
            remove_offline_hunters: true,
        }
    }
}

/// Main runtime that orchestrates the ability engine
///
/// Design: Runtime owns the worker and coordinates shutdown.
/// [`RuntimeHandle`] provides a cloneable façade for clients.
pub struct Runtime<W = InMemoryWorld> {
    handle: RuntimeHandle<W>,
    worker_handle: JoinHandle<()>,
}

impl Runtime<InMemoryWorld> {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder<InMemoryWorld> {
        RuntimeBuilder::new()
    }
}

impl<W: World + Send + 'static> Runtime<W> {
    /// Create a builder for a runtime driving a custom world.
    pub fn builder_for() -> RuntimeBuilder<W> {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle<W> {
        self.handle.clone()
    }

    /// Shutdown the runtime gracefully
    ///
    /// The worker stops once every outstanding handle has been dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder<W> {
    config: RuntimeConfig,
    world: Option<W>,
}

impl<W: World + Send + 'static> RuntimeBuilder<W> {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            world: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Override only the engine configuration
    pub fn engine_config(mut self, engine: EngineConfig) -> Self {
        self.config.engine = engine;
        self
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.config.tick_interval = interval;
        self
    }

    /// Provide the world the engine acts on
    pub fn world(mut self, world: W) -> Self {
        self.world = Some(world);
        self
    }

    /// Build the runtime and spawn its worker
    pub async fn build(self) -> Result<Runtime<W>> {
        let world = self.world.ok_or(RuntimeError::MissingWorld)?;
        if self.config.tick_interval.is_zero() {
            return Err(RuntimeError::InvalidTickInterval);
        }

        let (command_tx, command_rx) = mpsc::channel::<Command<W>>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let handle = RuntimeHandle::new(command_tx, event_bus.clone());

        let worker = EngineWorker::new(
            AbilityEngine::new(self.config.engine),
            world,
            command_rx,
            event_bus,
            self.config.tick_interval,
            self.config.remove_offline_hunters,
        );

        let worker_handle = tokio::spawn(async move {
            worker.run().await;
        });

        Ok(Runtime {
            handle,
            worker_handle,
        })
    }
}
