//! On-disk layout of a destination's durable state
//!
//! ```text
//! <data_dir>/<destination>/
//!     subscriptions-<scope>-at-rest.bits
//!     subscriptions-<scope>-in-flight.bits
//!     delayed.bits
//!     transactions.bits
//! ```
//!
//! Each file belongs to exactly one manager.

use crate::bitset::{BitSetResult, FileBitSetFactory};
use crate::delayed::{DelayedMessageManager, TransactionalMessageManager};
use crate::state::{MessageStateManager, RollbackPriority};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    root: PathBuf,
    block_bits: u64,
}

/// Keep a name to one path component
fn file_safe(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

impl StorageLayout {
    pub fn new(data_dir: impl AsRef<Path>, destination: &str, block_bits: u64) -> Self {
        Self {
            root: data_dir.as_ref().join(file_safe(destination)),
            block_bits,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn block_bits(&self) -> u64 {
        self.block_bits
    }

    pub fn at_rest_path(&self, scope: &str) -> PathBuf {
        self.root
            .join(format!("subscriptions-{}-at-rest.bits", file_safe(scope)))
    }

    pub fn in_flight_path(&self, scope: &str) -> PathBuf {
        self.root
            .join(format!("subscriptions-{}-in-flight.bits", file_safe(scope)))
    }

    pub fn delayed_path(&self) -> PathBuf {
        self.root.join("delayed.bits")
    }

    pub fn transactions_path(&self) -> PathBuf {
        self.root.join("transactions.bits")
    }

    /// Durable state manager for the subscription `scope`
    pub fn open_subscription(
        &self,
        scope: &str,
        rollback_priority: RollbackPriority,
    ) -> BitSetResult<MessageStateManager> {
        let at_rest = FileBitSetFactory::new(self.at_rest_path(scope), self.block_bits)?;
        let in_flight = FileBitSetFactory::new(self.in_flight_path(scope), self.block_bits)?;
        Ok(MessageStateManager::new(scope, at_rest, in_flight)
            .with_rollback_priority(rollback_priority))
    }

    pub fn open_delayed(&self, slot_millis: u64) -> BitSetResult<DelayedMessageManager> {
        let factory = FileBitSetFactory::new(self.delayed_path(), self.block_bits)?;
        Ok(DelayedMessageManager::new(factory, slot_millis))
    }

    /// Durable transaction buckets. Transactions left open by the previous
    /// run are still present; see `TransactionalMessageManager::abort_all`.
    pub fn open_transactions(&self) -> BitSetResult<TransactionalMessageManager> {
        let factory = FileBitSetFactory::new(self.transactions_path(), self.block_bits)?;
        Ok(TransactionalMessageManager::new(factory))
    }
}
