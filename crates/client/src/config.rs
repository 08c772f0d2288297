//! Client configuration loaded from the process environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use hunter_runtime::RuntimeConfig;

/// Configuration required to bootstrap the runtime and console.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Directory holding `engine.toml`. Defaults to the platform config dir.
    pub data_dir: Option<PathBuf>,
    pub tick_interval: Duration,
    pub session_id: Option<String>,
    pub command_buffer: usize,
    pub event_buffer: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            tick_interval: RuntimeConfig::DEFAULT_TICK_INTERVAL,
            session_id: None,
            command_buffer: 32,
            event_buffer: 100,
        }
    }
}

impl ClientConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `HUNTER_DATA_DIR` - Directory containing `engine.toml` (default: platform config dir)
    /// - `HUNTER_TICK_MS` - Engine tick period in milliseconds (default: 250)
    /// - `HUNTER_SESSION_ID` - Session identifier for log files (default: auto-generated)
    /// - `HUNTER_COMMAND_BUFFER` - Worker command queue size (default: 32)
    /// - `HUNTER_EVENT_BUFFER` - Per-topic event capacity (default: 100)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        config.data_dir = read("HUNTER_DATA_DIR").map(PathBuf::from);
        config.session_id = read("HUNTER_SESSION_ID");

        if let Some(millis) = read("HUNTER_TICK_MS").and_then(|v| v.parse::<u64>().ok()) {
            config.tick_interval = Duration::from_millis(millis.max(1));
        }
        if let Some(capacity) = read("HUNTER_COMMAND_BUFFER").and_then(|v| v.parse::<usize>().ok()) {
            config.command_buffer = capacity.max(1);
        }
        if let Some(capacity) = read("HUNTER_EVENT_BUFFER").and_then(|v| v.parse::<usize>().ok()) {
            config.event_buffer = capacity.max(1);
        }

        config
    }

    /// Configured data directory, or the platform config directory.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            ProjectDirs::from("", "", "hunter")
                .map(|dirs| dirs.config_dir().to_path_buf())
                .unwrap_or_else(|| PathBuf::from("data"))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert!(config.data_dir.is_none());
        assert!(config.session_id.is_none());
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("HUNTER_DATA_DIR", "/srv/hunter"),
            ("HUNTER_TICK_MS", "50"),
            ("HUNTER_SESSION_ID", "arena-1"),
        ]);
        assert_eq!(config.data_dir, Some(PathBuf::from("/srv/hunter")));
        assert_eq!(config.tick_interval, Duration::from_millis(50));
        assert_eq!(config.session_id.as_deref(), Some("arena-1"));
    }

    #[test]
    fn ignores_malformed_and_zero_values() {
        let config = config_from(&[("HUNTER_TICK_MS", "fast"), ("HUNTER_COMMAND_BUFFER", "0")]);
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.command_buffer, 1);
    }
}
