//! Tests for priorities, ordered queues and priority collections
