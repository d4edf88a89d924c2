//! Sorted identifier set over bit-vector blocks

use crate::bitset::{BitSetBlock, BitSetFactory, BitSetResult, FactoryHandle};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Sorted set of 64-bit identifiers
///
/// Blocks are keyed by their start identifier. Only blocks holding at least
/// one identifier are kept; an emptied block goes straight back to the
/// factory. Ascending order falls out of the block map order plus bit
/// position, so `peek` never compares identifiers.
pub struct OrderedIdQueue {
    unique_id: u64,
    handle: FactoryHandle,
    blocks: BTreeMap<u64, BitSetBlock>,
    len: usize,
}

impl OrderedIdQueue {
    /// Create a queue that owns `factory`, recovering any blocks it holds
    /// for `unique_id`
    pub fn new<F: BitSetFactory + 'static>(unique_id: u64, factory: F) -> Self {
        Self::with_handle(unique_id, FactoryHandle::new(factory))
    }

    pub(crate) fn with_handle(unique_id: u64, handle: FactoryHandle) -> Self {
        let mut blocks: BTreeMap<u64, BitSetBlock> = BTreeMap::new();
        let mut len = 0;

        for block in handle.recover(unique_id) {
            if block.is_empty() {
                handle.release(block);
                continue;
            }
            match blocks.entry(block.start()) {
                Entry::Vacant(slot) => {
                    len += block.len();
                    slot.insert(block);
                }
                Entry::Occupied(mut slot) => {
                    // Two records for the same range, fold the second into the first
                    let existing = slot.get_mut();
                    let before = existing.len();
                    let changed = existing.merge(&block);
                    handle.persist_words(existing, &changed);
                    len += existing.len() - before;
                    handle.release(block);
                }
            }
        }

        if len > 0 {
            log::debug!(
                "Recovered {} identifiers in {} blocks for owner {}",
                len,
                blocks.len(),
                unique_id
            );
        }

        Self {
            unique_id,
            handle,
            blocks,
            len,
        }
    }

    /// Owner id under which this queue's blocks are stored
    pub fn unique_id(&self) -> u64 {
        self.unique_id
    }

    /// Insert `id`, returns false if it was already present
    pub fn offer(&mut self, id: u64) -> bool {
        let start = self.handle.start_index(id);
        let block = match self.blocks.entry(start) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => slot.insert(self.handle.open(self.unique_id, id)),
        };
        if !block.set(id) {
            return false;
        }
        self.handle.persist(block, block.word_index(id));
        self.len += 1;
        true
    }

    /// Smallest identifier present
    pub fn peek(&self) -> Option<u64> {
        self.blocks.values().find_map(|block| block.first())
    }

    /// Remove and return the smallest identifier present
    pub fn poll(&mut self) -> Option<u64> {
        let id = self.peek()?;
        self.remove(id);
        Some(id)
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let start = self.handle.start_index(id);
        let Some(block) = self.blocks.get_mut(&start) else {
            return false;
        };
        if !block.clear(id) {
            return false;
        }
        self.len -= 1;
        if block.is_empty() {
            if let Some(block) = self.blocks.remove(&start) {
                self.handle.release(block);
            }
        } else {
            self.handle.persist(block, block.word_index(id));
        }
        true
    }

    pub fn contains(&self, id: u64) -> bool {
        let start = self.handle.start_index(id);
        self.blocks
            .get(&start)
            .is_some_and(|block| block.is_set(id))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of blocks currently held
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Identifiers in ascending order
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.blocks.values().flat_map(|block| block.iter())
    }

    /// Remove every identifier, releasing all blocks
    pub fn clear(&mut self) {
        for (_, block) in std::mem::take(&mut self.blocks) {
            self.handle.release(block);
        }
        self.len = 0;
    }

    /// Merge every identifier of `other` into this queue, returns how many
    /// were newly added
    pub fn add_all(&mut self, other: &OrderedIdQueue) -> usize {
        if other.handle.block_bits() != self.handle.block_bits() {
            return other.iter().filter(|id| self.offer(*id)).count();
        }

        let mut added = 0;
        for (start, source) in &other.blocks {
            let target = match self.blocks.entry(*start) {
                Entry::Occupied(slot) => slot.into_mut(),
                Entry::Vacant(slot) => slot.insert(self.handle.open(self.unique_id, *start)),
            };
            let before = target.len();
            let changed = target.merge(source);
            self.handle.persist_words(target, &changed);
            added += target.len() - before;
        }
        self.len += added;
        added
    }

    /// Drop the in-memory blocks without releasing them, so stored blocks
    /// stay recoverable
    pub(crate) fn detach(&mut self) {
        self.blocks.clear();
        self.len = 0;
    }

    /// Flush pending writes of the backing factory
    pub fn sync(&self) -> BitSetResult<()> {
        self.handle.sync()
    }

    /// Release the backing storage, keeping durable state
    pub fn close(&mut self) -> BitSetResult<()> {
        self.detach();
        self.handle.close()
    }

    /// Release the backing storage and destroy durable state
    pub fn delete(&mut self) -> BitSetResult<()> {
        self.detach();
        self.handle.delete()
    }
}

impl fmt::Display for OrderedIdQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "size = {}", self.len)
    }
}

impl fmt::Debug for OrderedIdQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedIdQueue")
            .field("unique_id", &self.unique_id)
            .field("len", &self.len)
            .field("blocks", &self.blocks.len())
            .finish()
    }
}
