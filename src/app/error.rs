//! CLI Error Types

use crate::bitset::BitSetError;
use crate::config::ConfigError;
use crate::core::error_handling::ContextualError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] BitSetError),

    #[error("Owner {owner} has no identifiers in {path}")]
    UnknownOwner { owner: u64, path: PathBuf },

    #[error("Unable to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("Unable to encode JSON output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unable to initialise logging: {0}")]
    Logging(String),
}

/// Result type for CLI commands
pub type CliResult<T> = Result<T, CliError>;

impl ContextualError for CliError {
    fn is_user_actionable(&self) -> bool {
        match self {
            CliError::Config(e) => e.is_user_actionable(),
            CliError::Storage(e) => e.is_user_actionable(),
            CliError::UnknownOwner { .. } => true,
            _ => false,
        }
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            CliError::Config(e) => e.user_message(),
            CliError::Storage(e) => e.user_message(),
            CliError::UnknownOwner { .. } => Some("The requested owner id is not in the file"),
            _ => None,
        }
    }
}
