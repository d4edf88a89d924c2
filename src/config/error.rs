//! Configuration Error Types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Error reading configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration value for {field}: {message}")]
    Invalid { field: &'static str, message: String },

    #[error("No data directory configured and no platform default available")]
    NoDataDir,
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl crate::core::error_handling::ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Read { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::NotFound { .. } => Some("The specified configuration file does not exist"),
            ConfigError::Parse { .. } => Some("The configuration file is not valid TOML"),
            ConfigError::Invalid { message, .. } => Some(message),
            ConfigError::NoDataDir => Some("Set [storage] data_dir in the configuration file"),
            ConfigError::Read { .. } => None,
        }
    }
}
