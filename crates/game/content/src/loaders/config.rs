//! Engine configuration loader.

use std::path::Path;

use anyhow::ensure;
use hunter_core::EngineConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for engine configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Missing fields take their defaults; unknown fields and unknown ability
    /// keys are rejected.
    pub fn load(path: &Path) -> LoadResult<EngineConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
    }

    /// Parse and validate config from TOML text.
    pub fn parse(content: &str) -> LoadResult<EngineConfig> {
        let config: EngineConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &EngineConfig) -> LoadResult<()> {
        ensure!(
            config.pull_max_distance.is_finite() && config.pull_max_distance > 0.0,
            "pull_max_distance must be positive, got {}",
            config.pull_max_distance
        );
        ensure!(
            config.traps.radius.is_finite() && config.traps.radius >= 0.0,
            "traps.radius must be non-negative, got {}",
            config.traps.radius
        );
        ensure!(
            config.traps.damage.is_finite() && config.traps.damage >= 0.0,
            "traps.damage must be non-negative, got {}",
            config.traps.damage
        );
        ensure!(
            config.traps.scatter_radius.is_finite(),
            "traps.scatter_radius must be finite"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use hunter_core::{AbilityId, SelectionMode};

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        assert_eq!(ConfigLoader::parse("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn overrides_are_floored() {
        let config = ConfigLoader::parse(
            r#"
            selection_mode = "confirm_on_close"

            [abilities.overdrive]
            unlock_secs = 10
            cooldown_secs = 5

            [abilities.vision]
            cooldown_secs = 120
            "#,
        )
        .unwrap();

        assert_eq!(config.selection_mode, SelectionMode::ConfirmOnClose);
        let overdrive = config.timing(AbilityId::Overdrive);
        assert_eq!(overdrive.unlock_secs, EngineConfig::MIN_UNLOCK_SECS);
        assert_eq!(overdrive.cooldown_secs, 5);
        let vision = config.timing(AbilityId::Vision);
        assert_eq!(vision.unlock_secs, 1320);
        assert_eq!(vision.cooldown_secs, 120);
    }

    #[test]
    fn unknown_ability_is_rejected() {
        let err = ConfigLoader::parse("[abilities.teleport]\nunlock_secs = 400\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn unknown_field_is_rejected() {
        assert!(ConfigLoader::parse("tick_rate = 4\n").is_err());
    }

    #[test]
    fn negative_pull_distance_is_rejected() {
        assert!(ConfigLoader::parse("pull_max_distance = -1.0\n").is_err());
    }

    #[test]
    fn load_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[traps]\nradius = 2.5\ndamage = 6.0").unwrap();

        let config = ConfigLoader::load(file.path()).unwrap();
        assert_eq!(config.traps.radius, 2.5);
        assert_eq!(config.traps.damage, 6.0);

        let missing = ConfigLoader::load(Path::new("/nonexistent/engine.toml")).unwrap_err();
        assert!(missing.to_string().contains("/nonexistent/engine.toml"));
    }
}
