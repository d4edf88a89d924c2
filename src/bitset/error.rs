//! Bitset Storage Error Types

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BitSetError {
    #[error("Bitset storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bitset file {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("Bitset file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Invalid block size {bits}: must be a positive multiple of 64")]
    InvalidBlockSize { bits: u64 },

    #[error("Bitset factory has been closed")]
    Closed,
}

/// Result type for bitset storage operations
pub type BitSetResult<T> = Result<T, BitSetError>;

impl crate::core::error_handling::ContextualError for BitSetError {
    fn is_user_actionable(&self) -> bool {
        matches!(
            self,
            BitSetError::NotFound { .. } | BitSetError::InvalidBlockSize { .. }
        )
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            BitSetError::NotFound { .. } => Some("The bitset file does not exist"),
            BitSetError::InvalidBlockSize { .. } => {
                Some("Block size must be a positive multiple of 64 bits")
            }
            _ => None,
        }
    }
}
