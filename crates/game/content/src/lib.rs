//! Data-driven engine configuration.
//!
//! This crate reads the TOML files that tune the ability engine:
//! - Per-ability unlock and cooldown overrides
//! - Selection mode and run auto-start
//! - Proximity trap tuning
//!
//! The engine only ever receives the resolved [`hunter_core::EngineConfig`];
//! file formats stay on this side of the boundary.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LoadResult};
