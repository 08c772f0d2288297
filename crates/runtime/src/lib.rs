//! Runtime orchestration for the hunter ability engine.
//!
//! This crate wires the pure [`hunter_core::AbilityEngine`] and a
//! [`hunter_core::World`] into a tokio worker with a fixed tick, a command
//! channel and a topic-based event bus. Consumers embed [`Runtime`] and talk
//! to it through [`RuntimeHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - `workers` keeps the engine task internal to the crate
pub mod api;
pub mod events;
pub mod runtime;

mod workers;

pub use api::{Result, RuntimeError, RuntimeHandle};
pub use events::{AbilityEvent, Event, EventBus, LifecycleEvent, Topic, TrapEvent};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig};
