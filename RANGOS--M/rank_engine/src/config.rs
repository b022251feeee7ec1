use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use shared_logging::LogLevel;

use crate::strategy::RankStrategy;

/// Default ceiling for |A| * |B| on the brute-force path.
pub const DEFAULT_MAX_BRUTE_FORCE_WORK: u64 = 50_000_000;

/// Runtime configuration, usually read from a TOML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Strategy used when the caller does not pick one.
    #[serde(default)]
    pub default_strategy: RankStrategy,
    /// Maximum number of comparisons brute force may perform.
    #[serde(default = "default_max_brute_force_work")]
    pub max_brute_force_work: u64,
    /// Log sink settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Log sink settings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// JSON-lines log file. No file logging when absent.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Records below this level are dropped.
    #[serde(default = "default_min_level")]
    pub min_level: LogLevel,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: None,
            min_level: default_min_level(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_strategy: RankStrategy::default(),
            max_brute_force_work: default_max_brute_force_work(),
            logging: LoggingConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Loads and validates a TOML file. A relative log path is resolved
    /// against the directory holding the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading engine config {}", path.display()))?;
        let mut config =
            Self::from_toml_str(&raw).with_context(|| format!("parsing {}", path.display()))?;
        let resolved = match (config.logging.path.as_deref(), path.parent()) {
            (Some(log_path), Some(dir)) if log_path.is_relative() => Some(dir.join(log_path)),
            _ => None,
        };
        if resolved.is_some() {
            config.logging.path = resolved;
        }
        Ok(config)
    }

    /// Loads `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Parses and validates TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.max_brute_force_work > 0,
            "max_brute_force_work must be greater than zero"
        );
        Ok(())
    }
}

const fn default_max_brute_force_work() -> u64 {
    DEFAULT_MAX_BRUTE_FORCE_WORK
}

const fn default_min_level() -> LogLevel {
    LogLevel::Info
}
