//! Buckets keyed by transaction id

use crate::bitset::{BitSetFactory, BitSetResult};
use crate::delayed::bucket_manager::BucketManager;
use crate::state::Message;

/// Messages written inside a transaction that has not finished yet
pub struct TransactionalMessageManager {
    buckets: BucketManager,
}

impl TransactionalMessageManager {
    pub fn new<F: BitSetFactory + 'static>(factory: F) -> Self {
        Self {
            buckets: BucketManager::new(factory),
        }
    }

    /// Open transactions, ascending
    pub fn transactions(&self) -> Vec<u64> {
        self.buckets.bucket_ids()
    }

    /// Add `message` to `transaction`, returns false if already there
    pub fn register(&self, transaction: u64, message: &Message) -> bool {
        self.buckets.register(transaction, message)
    }

    pub fn register_id(&self, transaction: u64, id: u64) -> bool {
        self.buckets.register_id(transaction, id)
    }

    pub fn remove(&self, transaction: u64, id: u64) -> bool {
        self.buckets.remove(transaction, id)
    }

    /// Number of messages held by `transaction`
    pub fn pending(&self, transaction: u64) -> usize {
        self.buckets.bucket_len(transaction)
    }

    /// End `transaction`, returning the identifiers to make deliverable
    pub fn commit(&self, transaction: u64) -> Vec<u64> {
        let ids = self.buckets.remove_bucket(transaction);
        log::debug!("transaction {}: commit {} messages", transaction, ids.len());
        ids
    }

    /// End `transaction`, returning the identifiers to discard
    pub fn abort(&self, transaction: u64) -> Vec<u64> {
        let ids = self.buckets.remove_bucket(transaction);
        log::debug!("transaction {}: abort {} messages", transaction, ids.len());
        ids
    }

    /// Abort every open transaction, returns how many were aborted
    ///
    /// Run after a restart: no client can finish a transaction begun before it.
    pub fn abort_all(&self) -> usize {
        let transactions = self.transactions();
        for transaction in &transactions {
            self.abort(*transaction);
        }
        if !transactions.is_empty() {
            log::debug!("aborted {} open transactions", transactions.len());
        }
        transactions.len()
    }

    /// Underlying bucket index
    pub fn buckets(&self) -> &BucketManager {
        &self.buckets
    }

    pub fn size(&self) -> usize {
        self.buckets.size()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn close(&self) -> BitSetResult<()> {
        self.buckets.close()
    }

    pub fn delete_storage(&self) -> BitSetResult<()> {
        self.buckets.delete_storage()
    }
}
