//! Identifier queues keyed by bucket

use crate::bitset::{BitSetFactory, BitSetResult, FactoryHandle};
use crate::collections::OrderedIdQueue;
use crate::core::sync::lock_or_recover;
use crate::state::Message;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

struct BucketInner {
    buckets: BTreeMap<u64, OrderedIdQueue>,
    /// Identifiers across all buckets
    counter: usize,
    handle: FactoryHandle,
}

impl BucketInner {
    /// Detach `bucket`, release its blocks and return what it held
    fn drain(&mut self, bucket: u64) -> Option<Vec<u64>> {
        let mut queue = self.buckets.remove(&bucket)?;
        let ids: Vec<u64> = queue.iter().collect();
        queue.clear();
        self.counter -= ids.len();
        Some(ids)
    }
}

/// Message identifiers grouped under caller-chosen bucket keys
///
/// A bucket is created on first registration. An emptied bucket stays in
/// the index until `get_next` reads it, but is never reported by
/// `bucket_ids`.
pub struct BucketManager {
    inner: Mutex<BucketInner>,
}

impl BucketManager {
    /// Create a manager owning `factory`, recovering every bucket it holds
    pub fn new<F: BitSetFactory + 'static>(factory: F) -> Self {
        let handle = FactoryHandle::new(factory);
        let mut buckets = BTreeMap::new();
        let mut counter = 0;

        for bucket in handle.unique_ids() {
            let queue = OrderedIdQueue::with_handle(bucket, handle.clone());
            if queue.is_empty() {
                continue;
            }
            counter += queue.len();
            buckets.insert(bucket, queue);
        }
        if !buckets.is_empty() {
            log::debug!(
                "Recovered {} buckets holding {} identifiers",
                buckets.len(),
                counter
            );
        }

        Self {
            inner: Mutex::new(BucketInner {
                buckets,
                counter,
                handle,
            }),
        }
    }

    /// Add `message` under `bucket`, returns false if it was already there
    pub fn register(&self, bucket: u64, message: &Message) -> bool {
        self.register_id(bucket, message.identifier())
    }

    pub fn register_id(&self, bucket: u64, id: u64) -> bool {
        let mut inner = lock_or_recover(&self.inner);
        let BucketInner {
            buckets,
            counter,
            handle,
        } = &mut *inner;
        let queue = buckets
            .entry(bucket)
            .or_insert_with(|| OrderedIdQueue::with_handle(bucket, handle.clone()));
        let added = queue.offer(id);
        if added {
            *counter += 1;
        }
        log::trace!("bucket {}: register {} (new: {})", bucket, id, added);
        added
    }

    /// Remove `id` from `bucket`. An emptied bucket is left for `get_next`
    /// to prune.
    pub fn remove(&self, bucket: u64, id: u64) -> bool {
        let mut inner = lock_or_recover(&self.inner);
        let removed = inner
            .buckets
            .get_mut(&bucket)
            .is_some_and(|queue| queue.remove(id));
        if removed {
            inner.counter -= 1;
        }
        log::trace!("bucket {}: remove {} (found: {})", bucket, id, removed);
        removed
    }

    /// Smallest identifier in `bucket` without removing it
    ///
    /// A missing or empty bucket gives `None` and an empty one is dropped
    /// from the index.
    pub fn get_next(&self, bucket: u64) -> Option<u64> {
        let mut inner = lock_or_recover(&self.inner);
        let next = inner.buckets.get(&bucket).and_then(OrderedIdQueue::peek);
        if next.is_none() && inner.buckets.remove(&bucket).is_some() {
            log::trace!("bucket {}: pruned empty bucket", bucket);
        }
        next
    }

    /// Drop `bucket` and everything in it, returns false if it was unknown
    pub fn delete(&self, bucket: u64) -> bool {
        let mut inner = lock_or_recover(&self.inner);
        match inner.drain(bucket) {
            Some(ids) => {
                log::debug!("bucket {}: deleted with {} identifiers", bucket, ids.len());
                true
            }
            None => false,
        }
    }

    /// Detach `bucket` and return its identifiers, ascending
    ///
    /// Unknown buckets give an empty list.
    pub fn remove_bucket(&self, bucket: u64) -> Vec<u64> {
        let mut inner = lock_or_recover(&self.inner);
        let ids = inner.drain(bucket).unwrap_or_default();
        log::debug!("bucket {}: drained {} identifiers", bucket, ids.len());
        ids
    }

    /// Remove `id` from the first bucket holding it, scanning keys in
    /// ascending order. An emptied bucket is dropped. Returns the bucket.
    pub(crate) fn remove_from_any(&self, id: u64) -> Option<u64> {
        let mut inner = lock_or_recover(&self.inner);
        let bucket = inner
            .buckets
            .iter_mut()
            .find_map(|(bucket, queue)| queue.remove(id).then_some(*bucket))?;
        inner.counter -= 1;
        if inner.buckets.get(&bucket).is_some_and(OrderedIdQueue::is_empty) {
            inner.buckets.remove(&bucket);
        }
        log::trace!("bucket {}: remove {}", bucket, id);
        Some(bucket)
    }

    /// Keys of the non-empty buckets, ascending
    pub fn bucket_ids(&self) -> Vec<u64> {
        lock_or_recover(&self.inner)
            .buckets
            .iter()
            .filter(|(_, queue)| !queue.is_empty())
            .map(|(bucket, _)| *bucket)
            .collect()
    }

    pub fn contains_bucket(&self, bucket: u64) -> bool {
        lock_or_recover(&self.inner)
            .buckets
            .get(&bucket)
            .is_some_and(|queue| !queue.is_empty())
    }

    pub fn bucket_len(&self, bucket: u64) -> usize {
        lock_or_recover(&self.inner)
            .buckets
            .get(&bucket)
            .map_or(0, OrderedIdQueue::len)
    }

    /// Identifiers across all buckets
    pub fn size(&self) -> usize {
        lock_or_recover(&self.inner).counter
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn sync(&self) -> BitSetResult<()> {
        lock_or_recover(&self.inner).handle.sync()
    }

    /// Release storage, keeping durable buckets for the next start
    pub fn close(&self) -> BitSetResult<()> {
        let mut inner = lock_or_recover(&self.inner);
        inner.buckets.clear();
        inner.counter = 0;
        inner.handle.close()
    }

    /// Release storage and destroy every durable bucket
    pub fn delete_storage(&self) -> BitSetResult<()> {
        let mut inner = lock_or_recover(&self.inner);
        inner.buckets.clear();
        inner.counter = 0;
        inner.handle.delete()
    }
}

impl fmt::Display for BucketManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock_or_recover(&self.inner);
        writeln!(f, "Size:{}", inner.counter)?;
        for (bucket, queue) in &inner.buckets {
            writeln!(f, "\t{} -> {}", bucket, queue)?;
        }
        Ok(())
    }
}

impl fmt::Debug for BucketManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock_or_recover(&self.inner);
        f.debug_struct("BucketManager")
            .field("buckets", &inner.buckets.len())
            .field("size", &inner.counter)
            .finish()
    }
}
