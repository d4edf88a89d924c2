//! Bitset persistence factory contract
//!
//! A factory hands out fixed-size blocks to the ordered queues, persists
//! word-level changes and gives recovered blocks back after a restart.
//! Block owners are opaque 64-bit ids chosen by the caller (a priority
//! level, a bucket key); the factory never interprets them.

use crate::bitset::block::BitSetBlock;
use crate::bitset::error::{BitSetError, BitSetResult};
use crate::core::sync::lock_or_recover;
use std::sync::{Arc, Mutex};

/// Storage backend supplying bit-vector blocks
///
/// Implementations assume a single writer. A factory is moved into the
/// manager that uses it, which is what keeps two managers from sharing one.
pub trait BitSetFactory: Send {
    /// Bits per block, always a positive multiple of 64
    fn block_bits(&self) -> u64;

    /// Start of the block that would hold `value`
    fn start_index(&self, value: u64) -> u64 {
        value - value % self.block_bits()
    }

    /// Allocate an empty block for `owner` covering `value`
    fn open(&mut self, owner: u64, value: u64) -> BitSetResult<BitSetBlock>;

    /// Hand back every stored block belonging to `owner`
    fn recover(&mut self, owner: u64) -> Vec<BitSetBlock>;

    /// Persist one word of a block after it changed
    fn persist(&mut self, block: &BitSetBlock, word: usize) -> BitSetResult<()>;

    /// Return a block to the free pool, discarding its contents
    fn release(&mut self, block: BitSetBlock) -> BitSetResult<()>;

    /// Owners with stored blocks that have not been recovered yet, ascending
    fn unique_ids(&self) -> Vec<u64>;

    /// Flush pending writes to durable storage
    fn sync(&mut self) -> BitSetResult<()>;

    /// Release the backing storage, keeping durable state
    fn close(&mut self) -> BitSetResult<()>;

    /// Release the backing storage and destroy durable state
    fn delete(&mut self) -> BitSetResult<()>;
}

struct SharedFactory {
    factory: Box<dyn BitSetFactory>,
    /// First storage failure seen by an operation that cannot fail
    deferred: Option<BitSetError>,
}

/// Handle shared by the queues of one manager over a single factory.
///
/// Storage failures on the mutating path are logged and kept as a deferred
/// error, which the next `sync`/`close`/`delete` returns.
#[derive(Clone)]
pub(crate) struct FactoryHandle {
    shared: Arc<Mutex<SharedFactory>>,
    block_bits: u64,
}

impl FactoryHandle {
    pub(crate) fn new<F: BitSetFactory + 'static>(factory: F) -> Self {
        let block_bits = factory.block_bits();
        Self {
            shared: Arc::new(Mutex::new(SharedFactory {
                factory: Box::new(factory),
                deferred: None,
            })),
            block_bits,
        }
    }

    pub(crate) fn block_bits(&self) -> u64 {
        self.block_bits
    }

    pub(crate) fn start_index(&self, value: u64) -> u64 {
        value - value % self.block_bits
    }

    /// Open a block, falling back to a detached in-memory block on failure
    pub(crate) fn open(&self, owner: u64, value: u64) -> BitSetBlock {
        let mut shared = lock_or_recover(&self.shared);
        match shared.factory.open(owner, value) {
            Ok(block) => block,
            Err(e) => {
                log::error!(
                    "Unable to allocate durable block for owner {} (value {}): {}",
                    owner,
                    value,
                    e
                );
                shared.defer(e);
                BitSetBlock::new(owner, self.start_index(value), self.block_bits)
            }
        }
    }

    pub(crate) fn recover(&self, owner: u64) -> Vec<BitSetBlock> {
        lock_or_recover(&self.shared).factory.recover(owner)
    }

    pub(crate) fn persist(&self, block: &BitSetBlock, word: usize) {
        let mut shared = lock_or_recover(&self.shared);
        if let Err(e) = shared.factory.persist(block, word) {
            log::error!(
                "Unable to persist block {}@{} for owner {}: {}",
                block.start(),
                word,
                block.owner(),
                e
            );
            shared.defer(e);
        }
    }

    pub(crate) fn persist_words(&self, block: &BitSetBlock, words: &[usize]) {
        for word in words {
            self.persist(block, *word);
        }
    }

    pub(crate) fn release(&self, block: BitSetBlock) {
        let mut shared = lock_or_recover(&self.shared);
        let owner = block.owner();
        if let Err(e) = shared.factory.release(block) {
            log::error!("Unable to release block for owner {}: {}", owner, e);
            shared.defer(e);
        }
    }

    pub(crate) fn unique_ids(&self) -> Vec<u64> {
        lock_or_recover(&self.shared).factory.unique_ids()
    }

    pub(crate) fn sync(&self) -> BitSetResult<()> {
        let mut shared = lock_or_recover(&self.shared);
        let result = shared.factory.sync();
        shared.finish(result)
    }

    pub(crate) fn close(&self) -> BitSetResult<()> {
        let mut shared = lock_or_recover(&self.shared);
        let result = shared.factory.close();
        shared.finish(result)
    }

    pub(crate) fn delete(&self) -> BitSetResult<()> {
        let mut shared = lock_or_recover(&self.shared);
        let result = shared.factory.delete();
        shared.finish(result)
    }
}

impl SharedFactory {
    fn defer(&mut self, error: BitSetError) {
        if self.deferred.is_none() {
            self.deferred = Some(error);
        }
    }

    /// Report the deferred error first, it happened before `result`
    fn finish(&mut self, result: BitSetResult<()>) -> BitSetResult<()> {
        match self.deferred.take() {
            Some(deferred) => {
                if let Err(e) = result {
                    log::error!("Storage operation failed after earlier failure: {}", e);
                }
                Err(deferred)
            }
            None => result,
        }
    }
}
