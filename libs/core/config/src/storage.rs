use crate::{env_parse, ConfigError, FromEnv};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Where the local JSON store keeps its blobs
#[derive(Clone, Debug, Default)]
pub struct StorageConfig {
    /// Directory for `<key>.json` files; `None` keeps everything in memory
    pub directory: Option<PathBuf>,
    /// Artificial delay applied to every repository call
    pub simulated_latency: Duration,
}

impl StorageConfig {
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn is_persistent(&self) -> bool {
        self.directory.is_some()
    }
}

impl FromEnv for StorageConfig {
    /// - INVENTORY_STORAGE_DIR: optional directory, unset or blank means in-memory
    /// - INVENTORY_SIMULATED_LATENCY_MS: defaults to 0
    fn from_env() -> Result<Self, ConfigError> {
        let directory = env::var("INVENTORY_STORAGE_DIR")
            .ok()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty())
            .map(PathBuf::from);
        let latency_ms: u64 = env_parse("INVENTORY_SIMULATED_LATENCY_MS", 0)?;

        Ok(Self {
            directory,
            simulated_latency: Duration::from_millis(latency_ms),
        })
    }
}
