//! Worker tasks that back the runtime orchestration.
//!
//! The engine worker owns the ability engine and the world, and is the only
//! task that ever mutates either.

mod engine;

pub(crate) use engine::reply_or_log;
pub use engine::{Command, EngineWorker, WorldFn};
