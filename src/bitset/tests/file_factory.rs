//! Record layout, free-slot reuse and recovery of the file factory

use crate::bitset::{BitSetError, BitSetFactory, FileBitSetFactory, RECORD_FREE, RECORD_IN_USE};
use tempfile::TempDir;

const BITS: u64 = 128;
// 24 byte header + 128 / 8
const RECORD: u64 = 40;

#[test]
fn test_new_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("orders").join("delayed.bits");
    let factory = FileBitSetFactory::new(&path, BITS).unwrap();
    assert!(path.exists());
    assert_eq!(factory.path(), path.as_path());
    assert_eq!(factory.record_count(), 0);
}

#[test]
fn test_open_existing_missing_file() {
    let dir = TempDir::new().unwrap();
    let result = FileBitSetFactory::open_existing(dir.path().join("nope.bits"), BITS);
    assert!(matches!(result, Err(BitSetError::NotFound { .. })));
}

#[test]
fn test_invalid_block_size_rejected() {
    let dir = TempDir::new().unwrap();
    let result = FileBitSetFactory::new(dir.path().join("a.bits"), 96);
    assert!(matches!(result, Err(BitSetError::InvalidBlockSize { bits: 96 })));
}

#[test]
fn test_truncated_file_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.bits");
    std::fs::write(&path, vec![0u8; (RECORD + 5) as usize]).unwrap();
    let result = FileBitSetFactory::open_existing(&path, BITS);
    assert!(matches!(result, Err(BitSetError::Corrupt { .. })));
}

#[test]
fn test_unaligned_start_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.bits");
    let mut record = Vec::new();
    record.extend_from_slice(&RECORD_IN_USE.to_be_bytes());
    record.extend_from_slice(&1u64.to_be_bytes());
    record.extend_from_slice(&7u64.to_be_bytes());
    record.resize(RECORD as usize, 0);
    std::fs::write(&path, record).unwrap();
    let result = FileBitSetFactory::open_existing(&path, BITS);
    assert!(matches!(result, Err(BitSetError::Corrupt { .. })));
}

#[test]
fn test_unknown_record_state_is_corrupt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.bits");
    let mut record = Vec::new();
    record.extend_from_slice(&9u64.to_be_bytes());
    record.resize(RECORD as usize, 0);
    std::fs::write(&path, record).unwrap();
    let result = FileBitSetFactory::open_existing(&path, BITS);
    assert!(matches!(result, Err(BitSetError::Corrupt { .. })));
}

#[test]
fn test_zeroed_record_is_free() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.bits");
    std::fs::write(&path, vec![0u8; RECORD as usize]).unwrap();
    let factory = FileBitSetFactory::open_existing(&path, BITS).unwrap();
    assert_eq!(factory.free_records(), 1);
    assert!(factory.unique_ids().is_empty());
}

#[test]
fn test_max_owner_id_is_recovered() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.bits");
    {
        let mut factory = FileBitSetFactory::new(&path, BITS).unwrap();
        for owner in [u64::MAX, 3] {
            let mut block = factory.open(owner, 42).unwrap();
            block.set(42);
            factory.persist(&block, block.word_index(42)).unwrap();
        }
        factory.close().unwrap();
    }

    let mut factory = FileBitSetFactory::open_existing(&path, BITS).unwrap();
    assert_eq!(factory.free_records(), 0);
    assert_eq!(factory.unique_ids(), vec![3, u64::MAX]);
    let values: Vec<u64> = factory.recover(u64::MAX).iter().flat_map(|b| b.iter()).collect();
    assert_eq!(values, vec![42]);
}

#[test]
fn test_record_layout_is_big_endian() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.bits");
    {
        let mut factory = FileBitSetFactory::new(&path, BITS).unwrap();
        let mut block = factory.open(0x0102, 130).unwrap();
        block.set(130);
        factory.persist(&block, block.word_index(130)).unwrap();
        factory.close().unwrap();
    }
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len() as u64, RECORD);
    assert_eq!(&bytes[0..8], &RECORD_IN_USE.to_be_bytes());
    assert_eq!(&bytes[8..16], &0x0102u64.to_be_bytes());
    assert_eq!(&bytes[16..24], &128u64.to_be_bytes());
    // 130 is bit 2 of word 0
    assert_eq!(&bytes[24..32], &4u64.to_be_bytes());
    assert_eq!(&bytes[32..40], &0u64.to_be_bytes());
}

#[test]
fn test_blocks_recovered_by_owner() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.bits");
    {
        let mut factory = FileBitSetFactory::new(&path, BITS).unwrap();
        for (owner, value) in [(20u64, 3u64), (10, 1), (10, 300)] {
            let mut block = factory.open(owner, value).unwrap();
            block.set(value);
            factory.persist(&block, block.word_index(value)).unwrap();
        }
        factory.close().unwrap();
    }

    let mut factory = FileBitSetFactory::open_existing(&path, BITS).unwrap();
    assert_eq!(factory.record_count(), 3);
    assert_eq!(factory.unique_ids(), vec![10, 20]);

    let blocks = factory.recover(10);
    let values: Vec<u64> = blocks.iter().flat_map(|b| b.iter()).collect();
    assert_eq!(values, vec![1, 300]);
    assert_eq!(factory.unique_ids(), vec![20]);
    assert!(factory.recover(10).is_empty(), "blocks are handed back once");
}

#[test]
fn test_released_record_is_reused() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.bits");
    let mut factory = FileBitSetFactory::new(&path, BITS).unwrap();

    let first = factory.open(1, 0).unwrap();
    let _second = factory.open(2, 0).unwrap();
    assert_eq!(factory.record_count(), 2);

    factory.release(first).unwrap();
    assert_eq!(factory.free_records(), 1);

    let third = factory.open(3, 500).unwrap();
    assert_eq!(factory.record_count(), 2, "free record reused before growing");
    assert_eq!(factory.free_records(), 0);
    assert_eq!(third.start(), 384);
    factory.close().unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..8], &RECORD_IN_USE.to_be_bytes());
    assert_eq!(&bytes[8..16], &3u64.to_be_bytes());
}

#[test]
fn test_free_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.bits");
    {
        let mut factory = FileBitSetFactory::new(&path, BITS).unwrap();
        let block = factory.open(1, 0).unwrap();
        factory.release(block).unwrap();
        factory.close().unwrap();
    }
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[0..8], &RECORD_FREE.to_be_bytes());

    let factory = FileBitSetFactory::open_existing(&path, BITS).unwrap();
    assert_eq!(factory.free_records(), 1);
    assert!(factory.unique_ids().is_empty());
}

#[test]
fn test_closed_factory_rejects_writes() {
    let dir = TempDir::new().unwrap();
    let mut factory = FileBitSetFactory::new(dir.path().join("a.bits"), BITS).unwrap();
    factory.close().unwrap();
    assert!(matches!(factory.open(1, 0), Err(BitSetError::Closed)));
    assert!(matches!(factory.sync(), Err(BitSetError::Closed)));
    assert!(factory.close().is_ok(), "close is idempotent");
}

#[test]
fn test_delete_removes_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("a.bits");
    let mut factory = FileBitSetFactory::new(&path, BITS).unwrap();
    factory.open(1, 0).unwrap();
    factory.delete().unwrap();
    assert!(!path.exists());
}
