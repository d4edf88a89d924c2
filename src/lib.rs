//! Delivery state engine for a message broker
//!
//! Tracks which message identifiers of a destination are waiting, which are
//! handed to a consumer, and which are held back for a delay or an open
//! transaction. Identifier sets are kept as fixed-size bitset blocks that
//! can be persisted to a file and recovered after a restart.

pub mod app;
pub mod bitset;
pub mod collections;
pub mod config;
pub mod core;
pub mod delayed;
pub mod state;
