//! File-backed bitset factory
//!
//! The file is a flat array of fixed-size records:
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬─────────────────────────────────┐
//! │ state (u64)  │ owner (u64)  │ start (u64)  │ block_bits / 64 words (u64 each) │
//! └──────────────┴──────────────┴──────────────┴─────────────────────────────────┘
//! ```
//!
//! All integers are big-endian. `state` is [`RECORD_FREE`] or [`RECORD_IN_USE`]
//! so every owner id, `u64::MAX` included, can be stored. A free record is
//! reused before the file grows. There is no manifest: recovery rebuilds the
//! owner index from the records themselves.

use crate::bitset::block::BitSetBlock;
use crate::bitset::error::{BitSetError, BitSetResult};
use crate::bitset::factory::BitSetFactory;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

const HEADER_BYTES: u64 = 24;
const WORD_BYTES: u64 = 8;

/// Record state of a zeroed or released record
pub const RECORD_FREE: u64 = 0;
/// Record state of a record holding a block
pub const RECORD_IN_USE: u64 = 1;

pub struct FileBitSetFactory {
    path: PathBuf,
    file: Option<File>,
    block_bits: u64,
    record_bytes: u64,
    /// Offsets of free records
    free: Vec<u64>,
    /// Stored blocks not yet claimed through `recover`
    recovered: BTreeMap<u64, Vec<BitSetBlock>>,
    /// Current file length
    end: u64,
}

impl FileBitSetFactory {
    /// Open the file at `path`, creating it (and its parent directories) if needed
    pub fn new(path: impl AsRef<Path>, block_bits: u64) -> BitSetResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)?;
        Self::load(path, file, block_bits)
    }

    /// Open an existing file, failing with `NotFound` if it is missing
    pub fn open_existing(path: impl AsRef<Path>, block_bits: u64) -> BitSetResult<Self> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(BitSetError::NotFound { path });
        }
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Self::load(path, file, block_bits)
    }

    fn load(path: PathBuf, file: File, block_bits: u64) -> BitSetResult<Self> {
        if block_bits == 0 || block_bits % 64 != 0 {
            return Err(BitSetError::InvalidBlockSize { bits: block_bits });
        }
        let record_bytes = HEADER_BYTES + (block_bits / 8);
        let len = file.metadata()?.len();
        if len % record_bytes != 0 {
            return Err(BitSetError::Corrupt {
                path,
                reason: format!(
                    "length {} is not a multiple of the {} byte record size",
                    len, record_bytes
                ),
            });
        }

        let word_count = (block_bits / 64) as usize;
        let mut free = Vec::new();
        let mut recovered: BTreeMap<u64, Vec<BitSetBlock>> = BTreeMap::new();
        let mut reader = BufReader::new(&file);
        let mut buf = vec![0u8; record_bytes as usize];

        for index in 0..(len / record_bytes) {
            reader.read_exact(&mut buf)?;
            let slot = index * record_bytes;
            match read_u64(&buf, 0) {
                RECORD_FREE => {
                    free.push(slot);
                    continue;
                }
                RECORD_IN_USE => {}
                state => {
                    return Err(BitSetError::Corrupt {
                        path,
                        reason: format!("record at {} has unknown state {}", slot, state),
                    });
                }
            }
            let owner = read_u64(&buf, 8);
            let start = read_u64(&buf, 16);
            if start % block_bits != 0 {
                return Err(BitSetError::Corrupt {
                    path,
                    reason: format!("record at {} starts at unaligned id {}", slot, start),
                });
            }
            let words: Box<[u64]> = (0..word_count)
                .map(|w| read_u64(&buf, (HEADER_BYTES as usize) + w * WORD_BYTES as usize))
                .collect();
            recovered
                .entry(owner)
                .or_default()
                .push(BitSetBlock::from_words(owner, start, words, Some(slot)));
        }
        drop(reader);

        // Reuse the lowest offsets first
        free.sort_unstable_by(|a, b| b.cmp(a));

        log::debug!(
            "Opened bitset file {} ({} records, {} free, {} owners)",
            path.display(),
            len / record_bytes,
            free.len(),
            recovered.len()
        );

        Ok(Self {
            path,
            file: Some(file),
            block_bits,
            record_bytes,
            free,
            recovered,
            end: len,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records in the file, used or free
    pub fn record_count(&self) -> u64 {
        self.end / self.record_bytes
    }

    /// Number of free records available for reuse
    pub fn free_records(&self) -> usize {
        self.free.len()
    }

    fn write_at(&mut self, offset: u64, bytes: &[u8]) -> BitSetResult<()> {
        let file = self.file.as_mut().ok_or(BitSetError::Closed)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(bytes)?;
        Ok(())
    }

    fn encode_record(&self, state: u64, owner: u64, start: u64, words: Option<&[u64]>) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.record_bytes as usize);
        buf.extend_from_slice(&state.to_be_bytes());
        buf.extend_from_slice(&owner.to_be_bytes());
        buf.extend_from_slice(&start.to_be_bytes());
        match words {
            Some(words) => {
                for word in words {
                    buf.extend_from_slice(&word.to_be_bytes());
                }
            }
            None => buf.resize(self.record_bytes as usize, 0),
        }
        buf
    }
}

fn read_u64(buf: &[u8], offset: usize) -> u64 {
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&buf[offset..offset + 8]);
    u64::from_be_bytes(bytes)
}

impl BitSetFactory for FileBitSetFactory {
    fn block_bits(&self) -> u64 {
        self.block_bits
    }

    fn open(&mut self, owner: u64, value: u64) -> BitSetResult<BitSetBlock> {
        let start = self.start_index(value);
        let (slot, reused) = match self.free.last() {
            Some(slot) => (*slot, true),
            None => (self.end, false),
        };
        let record = self.encode_record(RECORD_IN_USE, owner, start, None);
        self.write_at(slot, &record)?;
        if reused {
            self.free.pop();
        } else {
            self.end += self.record_bytes;
        }
        let words = vec![0u64; (self.block_bits / 64) as usize].into_boxed_slice();
        Ok(BitSetBlock::from_words(owner, start, words, Some(slot)))
    }

    fn recover(&mut self, owner: u64) -> Vec<BitSetBlock> {
        self.recovered.remove(&owner).unwrap_or_default()
    }

    fn persist(&mut self, block: &BitSetBlock, word: usize) -> BitSetResult<()> {
        let Some(slot) = block.slot() else {
            return Ok(());
        };
        let offset = slot + HEADER_BYTES + word as u64 * WORD_BYTES;
        self.write_at(offset, &block.word(word).to_be_bytes())
    }

    fn release(&mut self, block: BitSetBlock) -> BitSetResult<()> {
        let Some(slot) = block.slot() else {
            return Ok(());
        };
        let record = self.encode_record(RECORD_FREE, 0, 0, None);
        self.write_at(slot, &record)?;
        self.free.push(slot);
        Ok(())
    }

    fn unique_ids(&self) -> Vec<u64> {
        self.recovered.keys().copied().collect()
    }

    fn sync(&mut self) -> BitSetResult<()> {
        let file = self.file.as_mut().ok_or(BitSetError::Closed)?;
        file.sync_data()?;
        Ok(())
    }

    fn close(&mut self) -> BitSetResult<()> {
        self.recovered.clear();
        self.free.clear();
        if let Some(file) = self.file.take() {
            file.sync_all()?;
            log::debug!("Closed bitset file {}", self.path.display());
        }
        Ok(())
    }

    fn delete(&mut self) -> BitSetResult<()> {
        self.close()?;
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
            log::debug!("Deleted bitset file {}", self.path.display());
        }
        Ok(())
    }
}
