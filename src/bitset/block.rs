//! Fixed-size bit-vector blocks
//!
//! A block covers the identifier range `[start, start + bits)`. Bit position
//! is the identifier value, so iteration order is ascending value order with
//! no comparisons involved. Words are scanned with `trailing_zeros` which
//! keeps a sparse block cheap to walk.

const WORD_BITS: u64 = u64::BITS as u64;

/// One block of a block-structured bit-vector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitSetBlock {
    owner: u64,
    start: u64,
    words: Box<[u64]>,
    count: usize,
    /// Storage position assigned by the factory, `None` when not durable
    slot: Option<u64>,
}

impl BitSetBlock {
    /// Create an empty, non-durable block. `bits` must be a multiple of 64.
    pub fn new(owner: u64, start: u64, bits: u64) -> Self {
        debug_assert!(bits > 0 && bits % WORD_BITS == 0);
        let words = vec![0u64; (bits / WORD_BITS) as usize].into_boxed_slice();
        Self {
            owner,
            start,
            words,
            count: 0,
            slot: None,
        }
    }

    /// Rebuild a block from stored words
    pub(crate) fn from_words(owner: u64, start: u64, words: Box<[u64]>, slot: Option<u64>) -> Self {
        let count = words.iter().map(|w| w.count_ones() as usize).sum();
        Self {
            owner,
            start,
            words,
            count,
            slot,
        }
    }

    pub fn owner(&self) -> u64 {
        self.owner
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    /// Number of identifiers this block can hold
    pub fn bits(&self) -> u64 {
        self.words.len() as u64 * WORD_BITS
    }

    /// First identifier past the end of this block (saturating)
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.bits())
    }

    /// Number of set bits
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn covers(&self, value: u64) -> bool {
        value >= self.start && value - self.start < self.bits()
    }

    /// Index of the word holding `value`
    pub fn word_index(&self, value: u64) -> usize {
        debug_assert!(self.covers(value));
        ((value - self.start) / WORD_BITS) as usize
    }

    pub fn word(&self, index: usize) -> u64 {
        self.words[index]
    }

    pub fn words(&self) -> &[u64] {
        &self.words
    }

    pub(crate) fn slot(&self) -> Option<u64> {
        self.slot
    }

    fn mask(&self, value: u64) -> (usize, u64) {
        let offset = value - self.start;
        ((offset / WORD_BITS) as usize, 1u64 << (offset % WORD_BITS))
    }

    /// Set the bit for `value`, returns true if it was not already set
    pub fn set(&mut self, value: u64) -> bool {
        let (index, mask) = self.mask(value);
        if self.words[index] & mask != 0 {
            return false;
        }
        self.words[index] |= mask;
        self.count += 1;
        true
    }

    /// Clear the bit for `value`, returns true if it was set
    pub fn clear(&mut self, value: u64) -> bool {
        if !self.covers(value) {
            return false;
        }
        let (index, mask) = self.mask(value);
        if self.words[index] & mask == 0 {
            return false;
        }
        self.words[index] &= !mask;
        self.count -= 1;
        true
    }

    pub fn is_set(&self, value: u64) -> bool {
        if !self.covers(value) {
            return false;
        }
        let (index, mask) = self.mask(value);
        self.words[index] & mask != 0
    }

    /// Smallest identifier held by this block
    pub fn first(&self) -> Option<u64> {
        self.next_set(self.start)
    }

    /// Smallest identifier `>= from` held by this block
    pub fn next_set(&self, from: u64) -> Option<u64> {
        if self.count == 0 || from >= self.end() {
            return None;
        }
        let from = from.max(self.start);
        let offset = from - self.start;
        let mut index = (offset / WORD_BITS) as usize;
        // Mask off bits below `from` in the first word
        let mut word = self.words[index] & (!0u64 << (offset % WORD_BITS));
        loop {
            if word != 0 {
                let bit = index as u64 * WORD_BITS + word.trailing_zeros() as u64;
                return Some(self.start + bit);
            }
            index += 1;
            if index >= self.words.len() {
                return None;
            }
            word = self.words[index];
        }
    }

    /// OR the bits of `other` into this block.
    ///
    /// Both blocks must cover the same range. Returns the indexes of the
    /// words that changed so the caller can persist them.
    pub fn merge(&mut self, other: &BitSetBlock) -> Vec<usize> {
        debug_assert_eq!(self.start, other.start);
        debug_assert_eq!(self.words.len(), other.words.len());
        let mut changed = Vec::new();
        for (index, (lhs, rhs)) in self.words.iter_mut().zip(other.words.iter()).enumerate() {
            let merged = *lhs | *rhs;
            if merged != *lhs {
                self.count += (merged & !*lhs).count_ones() as usize;
                *lhs = merged;
                changed.push(index);
            }
        }
        changed
    }

    /// Clear every bit, returns the indexes of the words that changed
    pub fn clear_all(&mut self) -> Vec<usize> {
        let mut changed = Vec::new();
        for (index, word) in self.words.iter_mut().enumerate() {
            if *word != 0 {
                *word = 0;
                changed.push(index);
            }
        }
        self.count = 0;
        changed
    }

    /// Ascending iterator over the identifiers held by this block
    pub fn iter(&self) -> BlockIter<'_> {
        BlockIter {
            block: self,
            index: 0,
            current: self.words.first().copied().unwrap_or(0),
        }
    }
}

/// Ascending identifier iterator over one block
pub struct BlockIter<'a> {
    block: &'a BitSetBlock,
    index: usize,
    current: u64,
}

impl Iterator for BlockIter<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as u64;
                self.current &= self.current - 1;
                return Some(self.block.start + self.index as u64 * WORD_BITS + bit);
            }
            self.index += 1;
            if self.index >= self.block.words.len() {
                return None;
            }
            self.current = self.block.words[self.index];
        }
    }
}
