//! Application configuration.
//!
//! Supports YAML file and environment variable overrides.

use serde::Deserialize;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "TELLER_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "TELLER";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "TELLER_LOG";

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Network addressing configuration.
    pub network: NetworkConfig,
    /// Read consistency configuration.
    pub consistency: ConsistencyConfig,
}

/// Network addressing configuration.
///
/// Branch identifiers map to ports by fixed offset: `base_port + id`.
/// The mapping is shared local convention between branches (to resolve
/// peers) and customers (to resolve their home branch), not part of the
/// wire protocol.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Host branches bind to and clients dial.
    pub host: String,
    /// Base port for the id-to-port offset mapping.
    pub base_port: u16,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            base_port: 50000,
        }
    }
}

/// Read consistency configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConsistencyConfig {
    /// How long a query waits before reading the balance, in milliseconds.
    ///
    /// Stands in for a real synchronization barrier: it assumes in-flight
    /// propagation from peers lands within the window. Probabilistic under
    /// load, not a race-free guarantee.
    pub settle_delay_ms: u64,
}

impl Default for ConsistencyConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 3000,
        }
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `TELLER_CONFIG` environment variable (if set)
    /// 3. Environment variables with `TELLER` prefix
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        Ok(config)
    }

    /// Settle delay as a duration.
    pub fn settle_delay(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.consistency.settle_delay_ms)
    }
}
