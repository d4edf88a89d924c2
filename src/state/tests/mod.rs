//! Tests for the message state manager

mod concurrent;
