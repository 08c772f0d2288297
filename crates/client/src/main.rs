//! Hunter engine console.
//!
//! Composition root that assembles:
//! 1. Engine configuration from `engine.toml` via `hunter-content`
//! 2. The runtime worker over an in-memory world
//! 3. A line console on stdin plus an event printer
//!
//! ```bash
//! HUNTER_DATA_DIR=crates/game/content/data cargo run -p hunter-client
//! ```
mod config;
mod console;
mod logging;

use anyhow::{Context, Result};
use hunter_content::ContentFactory;
use hunter_core::InMemoryWorld;
use hunter_runtime::{Event, Runtime, RuntimeConfig, Topic};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

use config::ClientConfig;
use console::{ConsoleCommand, Flow};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = ClientConfig::from_env();
    let _log_guard = logging::setup_logging(config.session_id.as_deref())?;

    let data_dir = config.resolved_data_dir();
    let factory = ContentFactory::new(&data_dir);
    let engine = factory
        .load_config_or_default()
        .with_context(|| format!("loading engine config from {}", data_dir.display()))?;
    tracing::info!(
        "Engine config: data_dir={}, selection_mode={:?}",
        data_dir.display(),
        engine.selection_mode
    );

    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            engine,
            tick_interval: config.tick_interval,
            command_buffer_size: config.command_buffer,
            event_buffer_size: config.event_buffer,
            ..RuntimeConfig::default()
        })
        .world(InMemoryWorld::new())
        .build()
        .await?;
    let handle = runtime.handle();

    let printer = tokio::spawn(print_events(handle.subscribe_multiple(&[
        Topic::Ability,
        Topic::Trap,
        Topic::Lifecycle,
    ])));

    println!("{}", console::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<ConsoleCommand>() {
            Ok(command) => {
                if console::execute(&handle, command).await? == Flow::Quit {
                    break;
                }
            }
            Err(err) => println!("{err}"),
        }
    }

    drop(handle);
    printer.abort();
    runtime.shutdown().await?;
    tracing::info!("Client stopped");
    Ok(())
}

async fn print_events(
    receivers: std::collections::HashMap<Topic, tokio::sync::broadcast::Receiver<Event>>,
) {
    let mut tasks = tokio::task::JoinSet::new();
    for (topic, mut rx) in receivers {
        tasks.spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => println!("[{topic:?}] {event:?}"),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(?topic, skipped, "event printer lagged");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
    while tasks.join_next().await.is_some() {}
}
