//! Block-structured bit-vector storage
//!
//! Identifiers are stored as bits in fixed-size blocks. A block covering
//! `[start, start + bits)` is allocated from a [`BitSetFactory`] the first
//! time an identifier in its range is inserted, and released as soon as it
//! becomes empty, so memory follows the live identifier ranges rather than
//! the largest identifier ever seen.
//!
//! Two factories are provided:
//!
//! - [`MemoryBitSetFactory`] keeps blocks on the heap only
//! - [`FileBitSetFactory`] writes every changed word through to a record file
//!   and gives the blocks back by owner id after a restart

mod block;
mod error;
mod factory;
mod file;
mod memory;

pub use block::{BitSetBlock, BlockIter};
pub use error::{BitSetError, BitSetResult};
pub use factory::BitSetFactory;
pub(crate) use factory::FactoryHandle;
pub use file::{FileBitSetFactory, RECORD_FREE, RECORD_IN_USE};
pub use memory::MemoryBitSetFactory;

/// Default number of identifiers per block
pub const DEFAULT_BLOCK_BITS: u64 = 4096;

#[cfg(test)]
mod tests;
