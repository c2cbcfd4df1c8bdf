//! Engine configuration loading.
//!
//! The file is TOML. Every field is required; there are no silent defaults
//! apart from the ones spelled out in the file itself.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use timegrid_core::{ConfigError, GridConfig};
use uuid::Uuid;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_PATH_ENV: &str = "TIMEGRID_CONFIG";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// The single writer whose rows the engine reads and writes.
    pub principal_id: Uuid,
    /// Tracing filter used when `TIMEGRID_LOG` is unset.
    pub log_filter: String,
    /// Open plus trashed tabs allowed per label.
    pub max_tabs_per_label: usize,
    /// Grid used when the store holds no config row.
    pub default_grid: GridConfig,
    /// Labels created on first load when the store holds none.
    pub seed_labels: Vec<SeedLabel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedLabel {
    /// Optional stable id; generated when absent.
    pub id: Option<String>,
    pub name: String,
    pub color: String,
}

#[derive(Debug, thiserror::Error)]
pub enum EngineConfigError {
    #[error("Missing configuration file path (use --config or TIMEGRID_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

impl EngineConfig {
    /// Locate, parse and validate the config file.
    pub fn load() -> Result<Self, EngineConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(EngineConfigError::MissingConfigPath)?;
        Self::from_path(&path)
    }

    pub fn from_path(path: &Path) -> Result<Self, EngineConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, EngineConfigError> {
        let config: EngineConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.principal_id.is_nil() {
            return Err(invalid("principal_id", self.principal_id, "must not be nil"));
        }
        if self.log_filter.trim().is_empty() {
            return Err(invalid("log_filter", "", "must not be empty"));
        }
        if self.max_tabs_per_label == 0 {
            return Err(invalid("max_tabs_per_label", 0, "must be > 0"));
        }
        if let Err(timegrid_core::TimegridError::Config(e)) = self.default_grid.validate() {
            return Err(e);
        }
        for (i, label) in self.seed_labels.iter().enumerate() {
            if label.name.trim().is_empty() {
                return Err(invalid(&format!("seed_labels[{}].name", i), "", "must not be empty"));
            }
            if label.color.trim().is_empty() {
                return Err(invalid(&format!("seed_labels[{}].color", i), "", "must not be empty"));
            }
        }
        Ok(())
    }
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}
