//! Messages held back from delivery until a trigger fires
//!
//! A [`BucketManager`] groups message identifiers under an opaque 64-bit
//! bucket key so a scheduler can ask what is waiting under one key without
//! scanning everything pending. Two specialisations pick the key:
//!
//! - [`DelayedMessageManager`]: the delivery time truncated to a time slot
//! - [`TransactionalMessageManager`]: the transaction id
//!
//! Buckets are stored through a [`BitSetFactory`](crate::bitset::BitSetFactory)
//! with the bucket key as owner id, so a manager built over a durable
//! factory picks up every bucket that existed before a restart.

mod bucket_manager;
mod delayed;
mod transactional;

pub use bucket_manager::BucketManager;
pub use delayed::{DelayedMessageManager, DEFAULT_SLOT_MILLIS};
pub use transactional::TransactionalMessageManager;

#[cfg(test)]
mod tests;
