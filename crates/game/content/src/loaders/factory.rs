//! Content factory for loading engine data from a directory.

use std::path::{Path, PathBuf};

use hunter_core::EngineConfig;

use crate::loaders::{ConfigLoader, LoadResult};

/// Content factory that loads engine content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// └── engine.toml
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "engine.toml";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load engine configuration from `engine.toml`.
    pub fn load_config(&self) -> LoadResult<EngineConfig> {
        ConfigLoader::load(&self.config_path())
    }

    /// Like [`load_config`](Self::load_config), but a missing file yields the
    /// default configuration. A present but invalid file is still an error.
    pub fn load_config_or_default(&self) -> LoadResult<EngineConfig> {
        let path = self.config_path();
        if path.exists() {
            ConfigLoader::load(&path)
        } else {
            Ok(EngineConfig::default())
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join(Self::CONFIG_FILE)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_paths() {
        let factory = ContentFactory::new("/tmp/data");
        assert_eq!(factory.data_dir(), Path::new("/tmp/data"));
        assert_eq!(factory.config_path(), Path::new("/tmp/data/engine.toml"));
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let factory = ContentFactory::new(dir.path());

        assert!(factory.load_config().is_err());
        assert_eq!(
            factory.load_config_or_default().unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn bundled_data_parses() {
        let factory = ContentFactory::new(concat!(env!("CARGO_MANIFEST_DIR"), "/data"));
        let config = factory.load_config().unwrap();
        assert_eq!(config.traps.radius, 1.5);
    }

    #[test]
    fn invalid_file_is_not_replaced_by_defaults() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(ContentFactory::CONFIG_FILE), "bogus = true").unwrap();

        assert!(
            ContentFactory::new(dir.path())
                .load_config_or_default()
                .is_err()
        );
    }
}
