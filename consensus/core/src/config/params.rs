use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEVNET_MIN_DIFFICULTY_BITS, DIFFICULTY_WINDOW, GHOSTDAG_K, MAX_ORPHANS, MIN_DIFFICULTY_BITS, ORPHAN_TIMEOUT_MS,
    TARGET_TIME_PER_BLOCK_MS,
};
use crate::errors::ConfigError;
use crate::KType;

/// How the indexer treats a block whose parents are not known yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestionMode {
    /// Reject with `UnknownParent`
    Strict,
    /// Hold the block until its parents arrive or it times out
    OutOfOrder,
}

/// Engine configuration. Every field has a default, so partial TOML files work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DagConfig {
    /// Name of the network preset this config was built from
    pub network: String,
    /// GHOSTDAG K parameter
    pub ghostdag_k: KType,
    pub ingestion_mode: IngestionMode,
    /// Pending blocks older than this are evicted as orphans
    pub orphan_timeout_ms: u64,
    /// Maximum number of pending blocks
    pub max_orphans: usize,
    /// Target time per block (milliseconds)
    pub target_time_per_block_ms: u64,
    /// Selected chain blocks used for difficulty statistics
    pub difficulty_window_size: usize,
    /// Compact form of the easiest allowed target
    pub min_difficulty_bits: u32,
}

impl Default for DagConfig {
    fn default() -> Self {
        Self {
            network: "mainnet".to_string(),
            ghostdag_k: GHOSTDAG_K,
            ingestion_mode: IngestionMode::OutOfOrder,
            orphan_timeout_ms: ORPHAN_TIMEOUT_MS,
            max_orphans: MAX_ORPHANS,
            target_time_per_block_ms: TARGET_TIME_PER_BLOCK_MS,
            difficulty_window_size: DIFFICULTY_WINDOW,
            min_difficulty_bits: MIN_DIFFICULTY_BITS,
        }
    }
}

impl DagConfig {
    /// Load configuration from file if it exists, otherwise use defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content =
            fs::read_to_string(path).map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: DagConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Preset for a named network
    pub fn for_network(network: &str) -> Result<Self, ConfigError> {
        let mut config = DagConfig::default();
        match network {
            "mainnet" => {}
            "testnet" => {
                config.network = "testnet".to_string();
                config.orphan_timeout_ms = 120_000;
            }
            "devnet" => {
                config.network = "devnet".to_string();
                config.ghostdag_k = 3;
                config.difficulty_window_size = 16;
                config.min_difficulty_bits = DEVNET_MIN_DIFFICULTY_BITS;
            }
            _ => return Err(ConfigError::UnknownNetwork(network.to_string())),
        }
        Ok(config)
    }

    pub fn with_k(mut self, k: KType) -> Self {
        self.ghostdag_k = k;
        self
    }

    pub fn with_ingestion_mode(mut self, mode: IngestionMode) -> Self {
        self.ingestion_mode = mode;
        self
    }

    pub fn orphan_timeout(&self) -> Duration {
        Duration::from_millis(self.orphan_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_orphans == 0 {
            return Err(ConfigError::Invalid("max_orphans must be positive".to_string()));
        }
        if self.target_time_per_block_ms == 0 {
            return Err(ConfigError::Invalid("target_time_per_block_ms must be positive".to_string()));
        }
        if self.difficulty_window_size < 2 {
            return Err(ConfigError::Invalid("difficulty_window_size must be at least 2".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = DagConfig::from_toml_str("ghostdag_k = 5\ningestion_mode = \"strict\"\n").unwrap();
        assert_eq!(config.ghostdag_k, 5);
        assert_eq!(config.ingestion_mode, IngestionMode::Strict);
        assert_eq!(config.max_orphans, MAX_ORPHANS);
        assert_eq!(config.orphan_timeout(), Duration::from_millis(ORPHAN_TIMEOUT_MS));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(DagConfig::from_toml_str("max_orphans = 0"), Err(ConfigError::Invalid(_))));
        assert!(matches!(DagConfig::from_toml_str("ghostdag_k = \"x\""), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_network_presets() {
        assert_eq!(DagConfig::for_network("mainnet").unwrap(), DagConfig::default());
        let devnet = DagConfig::for_network("devnet").unwrap();
        assert_eq!(devnet.ghostdag_k, 3);
        assert_eq!(devnet.min_difficulty_bits, DEVNET_MIN_DIFFICULTY_BITS);
        assert!(matches!(DagConfig::for_network("moonnet"), Err(ConfigError::UnknownNetwork(_))));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "network = \"testnet\"\norphan_timeout_ms = 500").unwrap();
        let config = DagConfig::load(file.path()).unwrap();
        assert_eq!(config.network, "testnet");
        assert_eq!(config.orphan_timeout_ms, 500);

        let missing = DagConfig::load(Path::new("/nonexistent/phoenix.toml")).unwrap();
        assert_eq!(missing, DagConfig::default());
    }
}
