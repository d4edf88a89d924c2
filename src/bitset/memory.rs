//! Heap-only bitset factory
//!
//! Used for non-durable subscriptions and for scratch collections built
//! during diagnostics. Nothing survives `close()`.

use crate::bitset::block::BitSetBlock;
use crate::bitset::error::{BitSetError, BitSetResult};
use crate::bitset::factory::BitSetFactory;
use crate::bitset::DEFAULT_BLOCK_BITS;

#[derive(Debug, Clone)]
pub struct MemoryBitSetFactory {
    block_bits: u64,
}

impl MemoryBitSetFactory {
    pub fn new(block_bits: u64) -> BitSetResult<Self> {
        if block_bits == 0 || block_bits % 64 != 0 {
            return Err(BitSetError::InvalidBlockSize { bits: block_bits });
        }
        Ok(Self { block_bits })
    }
}

impl Default for MemoryBitSetFactory {
    fn default() -> Self {
        Self {
            block_bits: DEFAULT_BLOCK_BITS,
        }
    }
}

impl BitSetFactory for MemoryBitSetFactory {
    fn block_bits(&self) -> u64 {
        self.block_bits
    }

    fn open(&mut self, owner: u64, value: u64) -> BitSetResult<BitSetBlock> {
        Ok(BitSetBlock::new(
            owner,
            self.start_index(value),
            self.block_bits,
        ))
    }

    fn recover(&mut self, _owner: u64) -> Vec<BitSetBlock> {
        Vec::new()
    }

    fn persist(&mut self, _block: &BitSetBlock, _word: usize) -> BitSetResult<()> {
        Ok(())
    }

    fn release(&mut self, _block: BitSetBlock) -> BitSetResult<()> {
        Ok(())
    }

    fn unique_ids(&self) -> Vec<u64> {
        Vec::new()
    }

    fn sync(&mut self) -> BitSetResult<()> {
        Ok(())
    }

    fn close(&mut self) -> BitSetResult<()> {
        Ok(())
    }

    fn delete(&mut self) -> BitSetResult<()> {
        Ok(())
    }
}
