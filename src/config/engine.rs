//! TOML engine configuration

use crate::bitset::DEFAULT_BLOCK_BITS;
use crate::config::error::{ConfigError, ConfigResult};
use crate::config::layout::StorageLayout;
use crate::config::{APP_DIR, CONFIG_FILE};
use crate::core::logging::LogFormat;
use crate::delayed::DEFAULT_SLOT_MILLIS;
use crate::state::RollbackPriority;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub bitset: BitSetConfig,
    pub state: StateConfig,
    pub delayed: DelayedConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BitSetConfig {
    /// Identifiers per block
    pub block_size: u64,
}

impl Default for BitSetConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_BITS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StateConfig {
    pub rollback_priority: RollbackPriority,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DelayedConfig {
    pub slot_millis: u64,
}

impl Default for DelayedConfig {
    fn default() -> Self {
        Self {
            slot_millis: DEFAULT_SLOT_MILLIS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    pub data_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<PathBuf>,
}

const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];

impl EngineConfig {
    /// Platform default config file, `<config dir>/delivery-state/engine.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one the platform default is
    /// read if present, otherwise defaults apply. Returns the file actually
    /// read alongside the config.
    pub fn load(path: Option<&Path>) -> ConfigResult<(Self, Option<PathBuf>)> {
        let config_path = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound {
                        path: path.to_path_buf(),
                    });
                }
                Some(path.to_path_buf())
            }
            None => Self::default_path().filter(|path| path.exists()),
        };

        match config_path {
            Some(path) => {
                let config = Self::from_file(&path)?;
                log::debug!("Loaded configuration from {}", path.display());
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    /// Read, parse and validate one file
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let block_size = self.bitset.block_size;
        if block_size == 0 || block_size % 64 != 0 {
            return Err(ConfigError::Invalid {
                field: "bitset.block_size",
                message: format!(
                    "block_size {} must be a positive multiple of 64",
                    block_size
                ),
            });
        }
        if self.delayed.slot_millis == 0 {
            return Err(ConfigError::Invalid {
                field: "delayed.slot_millis",
                message: "slot_millis must be greater than zero".to_string(),
            });
        }
        if let Some(level) = &self.logging.level {
            if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
                return Err(ConfigError::Invalid {
                    field: "logging.level",
                    message: format!(
                        "log level '{}' must be one of {}",
                        level,
                        LOG_LEVELS.join(", ")
                    ),
                });
            }
        }
        if let Some(format) = &self.logging.format {
            if LogFormat::parse(format).is_none() {
                return Err(ConfigError::Invalid {
                    field: "logging.format",
                    message: format!("log format '{}' must be text, ext or json", format),
                });
            }
        }
        Ok(())
    }

    /// Root directory for file-backed storage
    pub fn data_dir(&self) -> ConfigResult<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or(ConfigError::NoDataDir),
        }
    }

    /// Storage layout of one destination
    pub fn layout(&self, destination: &str) -> ConfigResult<StorageLayout> {
        Ok(StorageLayout::new(
            self.data_dir()?,
            destination,
            self.bitset.block_size,
        ))
    }
}
