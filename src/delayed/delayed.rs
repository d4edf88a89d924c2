//! Buckets keyed by delivery time slot

use crate::bitset::{BitSetFactory, BitSetResult};
use crate::delayed::bucket_manager::BucketManager;
use crate::state::Message;

/// Default width of a delivery time slot
pub const DEFAULT_SLOT_MILLIS: u64 = 1000;

/// Messages waiting for their delivery time
///
/// A message is filed under its delivery time truncated to a multiple of
/// `slot_millis`. A due slot may still hold messages a little ahead of
/// `now`; callers check each message's own delivery time before releasing
/// it.
pub struct DelayedMessageManager {
    buckets: BucketManager,
    slot_millis: u64,
}

impl DelayedMessageManager {
    pub fn new<F: BitSetFactory + 'static>(factory: F, slot_millis: u64) -> Self {
        Self {
            buckets: BucketManager::new(factory),
            slot_millis: slot_millis.max(1),
        }
    }

    pub fn slot_millis(&self) -> u64 {
        self.slot_millis
    }

    /// Bucket key for a delivery time
    pub fn slot_for(&self, delivery_time: u64) -> u64 {
        delivery_time - delivery_time % self.slot_millis
    }

    /// File `message` under its delivery slot, returns the slot
    ///
    /// Messages without a delivery time are not delayed and are left out.
    pub fn register(&self, message: &Message) -> Option<u64> {
        let delivery_time = message.delivery_time()?;
        Some(self.register_at(delivery_time, message.identifier()))
    }

    pub fn register_at(&self, delivery_time: u64, id: u64) -> u64 {
        let slot = self.slot_for(delivery_time);
        self.buckets.register_id(slot, id);
        slot
    }

    /// Slots whose start is not after `now`, ascending
    pub fn due_buckets(&self, now: u64) -> Vec<u64> {
        self.buckets
            .bucket_ids()
            .into_iter()
            .take_while(|slot| *slot <= now)
            .collect()
    }

    /// Remove `id` without knowing its slot
    ///
    /// Slots are scanned in ascending order and the first one holding `id`
    /// loses it; a slot left empty is dropped.
    pub fn remove(&self, id: u64) -> bool {
        self.buckets.remove_from_any(id).is_some()
    }

    /// Remove `id` from a known slot
    pub fn remove_from(&self, slot: u64, id: u64) -> bool {
        self.buckets.remove(slot, id)
    }

    pub fn get_next(&self, slot: u64) -> Option<u64> {
        self.buckets.get_next(slot)
    }

    /// Detach a slot and return its identifiers, ascending
    pub fn remove_bucket(&self, slot: u64) -> Vec<u64> {
        self.buckets.remove_bucket(slot)
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
