//! Identifier collections used by the state managers
//!
//! [`OrderedIdQueue`] is a sorted set of message identifiers stored as bits
//! in factory-supplied blocks. [`PriorityCollection`] stacks one queue per
//! [`Priority`] level and always serves the highest non-empty level first,
//! smallest identifier first within a level.

mod ordered_queue;
mod priority;
mod priority_collection;

pub use ordered_queue::OrderedIdQueue;
pub use priority::{Priority, LEVELS};
pub use priority_collection::PriorityCollection;

#[cfg(test)]
mod tests;
