//! Synchronization utilities for robust mutex handling
//!
//! State managers guard every transition with one mutex and every guarded
//! structure is consistent between calls, so a lock poisoned by a panicking
//! caller is recovered instead of propagated. Operations on the state index
//! are total and have no error channel to report poisoning through.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lock `mutex`, recovering the guard if a previous holder panicked
pub fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison_err: PoisonError<MutexGuard<'_, T>>| {
        log::warn!("Recovering poisoned lock; a previous holder panicked");
        poison_err.into_inner()
    })
}
