//! Per-subscription message delivery state
//!
//! A [`MessageStateManager`] tracks every message identifier of one
//! subscription as either *at rest* (stored, waiting for a consumer) or
//! *in flight* (handed to a consumer, waiting for an acknowledgement):
//!
//! ```text
//!   register ──► at rest ──allocate──► in flight ──commit──► (gone)
//!                   ▲                      │
//!                   └──rollback / bulk─────┘
//!   expired: removed from whichever set holds it
//! ```
//!
//! Each set is a [`PriorityCollection`](crate::collections::PriorityCollection)
//! so delivery always takes the highest priority first and the smallest
//! identifier within a priority.

mod listener;
mod manager;
mod message;
mod policy;

pub use listener::MessageStateListener;
pub use manager::MessageStateManager;
pub use message::Message;
pub use policy::RollbackPriority;

#[cfg(test)]
mod tests;
