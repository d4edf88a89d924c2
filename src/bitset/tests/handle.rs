//! Deferred storage errors on the shared factory handle

use crate::bitset::{
    BitSetBlock, BitSetError, BitSetFactory, BitSetResult, FactoryHandle, MemoryBitSetFactory,
};

/// Factory whose writes always fail
struct FailingFactory;

impl BitSetFactory for FailingFactory {
    fn block_bits(&self) -> u64 {
        64
    }

    fn open(&mut self, _owner: u64, _value: u64) -> BitSetResult<BitSetBlock> {
        Err(BitSetError::Io(std::io::Error::other("disk full")))
    }

    fn recover(&mut self, _owner: u64) -> Vec<BitSetBlock> {
        Vec::new()
    }

    fn persist(&mut self, _block: &BitSetBlock, _word: usize) -> BitSetResult<()> {
        Err(BitSetError::Io(std::io::Error::other("disk full")))
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

#[test]
fn test_failed_open_falls_back_to_detached_block() {
    let handle = FactoryHandle::new(FailingFactory);
    let block = handle.open(4, 100);
    assert_eq!(block.owner(), 4);
    assert_eq!(block.start(), 64);
    assert!(block.covers(100));
}

#[test]
fn test_deferred_error_reported_once_on_sync() {
    let handle = FactoryHandle::new(FailingFactory);
    let block = handle.open(1, 0);
    handle.persist(&block, 0);

    assert!(matches!(handle.sync(), Err(BitSetError::Io(_))));
    assert!(handle.sync().is_ok(), "deferred error is cleared once reported");
}

#[test]
fn test_clones_share_the_factory() {
    let handle = FactoryHandle::new(MemoryBitSetFactory::new(256).unwrap());
    let other = handle.clone();
    assert_eq!(other.block_bits(), 256);
    assert_eq!(other.start_index(700), 512);
    assert!(handle.close().is_ok());
    assert!(other.sync().is_ok());
}
