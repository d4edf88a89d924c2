//! One ordered queue per priority level behind a single merged view

use crate::bitset::{BitSetFactory, BitSetResult, FactoryHandle};
use crate::collections::ordered_queue::OrderedIdQueue;
use crate::collections::priority::{Priority, LEVELS};
use std::fmt;
use strum::IntoEnumIterator;

/// Identifier set partitioned by priority
///
/// All levels share one factory; each level stores its blocks under its
/// priority ordinal as owner id. Reads scan from `Highest` down and take the
/// first non-empty level, so an identifier from a lower level is never
/// returned while a higher level holds one.
pub struct PriorityCollection {
    levels: [OrderedIdQueue; LEVELS],
    handle: FactoryHandle,
}

impl PriorityCollection {
    /// Create a collection that owns `factory`, recovering stored levels
    pub fn new<F: BitSetFactory + 'static>(factory: F) -> Self {
        Self::with_handle(FactoryHandle::new(factory))
    }

    pub(crate) fn with_handle(handle: FactoryHandle) -> Self {
        let levels = std::array::from_fn(|index| {
            OrderedIdQueue::with_handle(index as u64, handle.clone())
        });
        Self { levels, handle }
    }

    /// Add `id` at `priority`, returns false if that level already held it
    pub fn add(&mut self, id: u64, priority: Priority) -> bool {
        self.levels[priority.index()].offer(id)
    }

    /// Remove `id` from whichever level holds it
    pub fn remove(&mut self, id: u64) -> bool {
        self.remove_and_get_priority(id).is_some()
    }

    /// Remove `id` and report the level it was found at
    pub fn remove_and_get_priority(&mut self, id: u64) -> Option<Priority> {
        Priority::iter().find(|priority| self.levels[priority.index()].remove(id))
    }

    /// Level holding `id`, if any
    pub fn priority_of(&self, id: u64) -> Option<Priority> {
        Priority::iter().find(|priority| self.levels[priority.index()].contains(id))
    }

    /// Next identifier in delivery order
    pub fn peek(&self) -> Option<u64> {
        self.peek_with_priority().map(|(id, _)| id)
    }

    pub fn peek_with_priority(&self) -> Option<(u64, Priority)> {
        Priority::descending().find_map(|priority| {
            self.levels[priority.index()]
                .peek()
                .map(|id| (id, priority))
        })
    }

    /// Remove and return the next identifier in delivery order
    pub fn poll(&mut self) -> Option<u64> {
        let (id, priority) = self.peek_with_priority()?;
        self.levels[priority.index()].remove(id);
        Some(id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.levels.iter().any(|level| level.contains(id))
    }

    pub fn len(&self) -> usize {
        self.levels.iter().map(OrderedIdQueue::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(OrderedIdQueue::is_empty)
    }

    pub fn level_len(&self, priority: Priority) -> usize {
        self.levels[priority.index()].len()
    }

    /// Read-only view of one level
    pub fn level(&self, priority: Priority) -> &OrderedIdQueue {
        &self.levels[priority.index()]
    }

    /// Merge `other` level by level, returns how many identifiers were added
    pub fn add_all(&mut self, other: &PriorityCollection) -> usize {
        self.levels
            .iter_mut()
            .zip(other.levels.iter())
            .map(|(target, source)| target.add_all(source))
            .sum()
    }

    /// Append every identifier to `into`, lowest level first and ascending
    /// within a level
    pub fn flatten(&self, into: &mut Vec<u64>) {
        for level in &self.levels {
            into.extend(level.iter());
        }
    }

    /// Identifiers in delivery order
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.levels.iter().rev().flat_map(|level| level.iter())
    }

    /// Identifiers with their level, in delivery order
    pub fn iter_with_priority(&self) -> impl Iterator<Item = (u64, Priority)> + '_ {
        Priority::descending().flat_map(move |priority| {
            self.levels[priority.index()]
                .iter()
                .map(move |id| (id, priority))
        })
    }

    /// Remove every identifier from every level
    pub fn clear(&mut self) {
        for level in &mut self.levels {
            level.clear();
        }
    }

    pub fn sync(&self) -> BitSetResult<()> {
        self.handle.sync()
    }

    /// Release the backing storage, keeping durable state
    pub fn close(&mut self) -> BitSetResult<()> {
        for level in &mut self.levels {
            level.detach();
        }
        self.handle.close()
    }

    /// Release the backing storage and destroy durable state
    pub fn delete(&mut self) -> BitSetResult<()> {
        for level in &mut self.levels {
            level.detach();
        }
        self.handle.delete()
    }
}

impl fmt::Display for PriorityCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Count:{},", self.len())?;
        for priority in Priority::descending() {
            let level = &self.levels[priority.index()];
            if !level.is_empty() {
                write!(f, " {}[{}]", priority, level)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for PriorityCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.levels.iter()).finish()
    }
}
