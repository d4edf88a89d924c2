//! Shared error reporting for the storage, config and CLI error types
//!
//! Every error enum in the crate says whether its message is something the
//! operator can act on (a missing file, a bad block size) or an internal
//! failure that only needs the operation context plus debug detail.

/// Errors that can tell operator mistakes apart from system failures
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)`. Otherwise it should return `None`.
pub trait ContextualError: std::error::Error {
    /// True if the message should be shown to the operator as is
    ///
    /// Examples: a bitset file that does not exist, an invalid block size,
    /// a config value out of range.
    fn is_user_actionable(&self) -> bool;

    /// The operator-facing message for user-actionable errors
    fn user_message(&self) -> Option<&str>;
}

/// Log a fatal error at the detail level its kind calls for
///
/// User-actionable errors log their own message. System errors log the
/// operation context. The full error is always logged at debug level.
///
/// ```rust,no_run
/// # use delivery_state::core::error_handling::log_error_with_context;
/// # use delivery_state::bitset::BitSetError;
/// let err = BitSetError::InvalidBlockSize { bits: 100 };
/// log_error_with_context(&err, "Opening bitset file");
/// // Logs: "FATAL: Block size must be a positive multiple of 64 bits"
/// ```
pub fn log_error_with_context<E: ContextualError + std::fmt::Display + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => log::error!("FATAL: {}", user_msg),
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
