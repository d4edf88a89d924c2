//! Delivery lifecycle through a configured subscription

use crate::common;
use delivery_state::collections::Priority;
use delivery_state::state::{Message, MessageStateListener, RollbackPriority};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Default)]
struct Counter {
    added: AtomicUsize,
    removed: AtomicUsize,
}

impl MessageStateListener for Counter {
    fn add(&self, _id: u64) {
        self.added.fetch_add(1, Ordering::SeqCst);
    }

    fn remove(&self, _id: u64) {
        self.removed.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_delivery_cycle() {
    let (_dir, config) = common::engine("");
    let layout = config.layout("orders").unwrap();
    let state = layout
        .open_subscription("billing", config.state.rollback_priority)
        .unwrap();
    let counter = Arc::new(Counter::default());
    state.add_listener(counter.clone());

    state.register_message(&Message::new(10).with_priority(Priority::Low));
    state.register_message(&Message::new(11).with_priority(Priority::High));
    state.register_id(12);

    // Default priority sits above High
    assert_eq!(state.next_message_id(), Some(12));
    assert!(state.allocate(12, Priority::DEFAULT));
    assert_eq!(state.next_message_id(), Some(11));
    assert!(state.allocate(11, Priority::High));

    assert!(state.commit(12));
    assert!(state.rollback(11));
    assert_eq!(state.next_message_id(), Some(11));
    assert!(state.expired(10));

    assert_eq!(state.get_all(), vec![11]);
    assert_eq!(counter.added.load(Ordering::SeqCst), 4);
    assert_eq!(counter.removed.load(Ordering::SeqCst), 2);
    state.close().unwrap();
}

#[test]
fn test_increment_policy_from_config() {
    let (_dir, config) = common::engine("\n[state]\nrollback_priority = \"increment\"\n");
    assert_eq!(config.state.rollback_priority, RollbackPriority::Increment);

    let layout = config.layout("orders").unwrap();
    let state = layout
        .open_subscription("billing", config.state.rollback_priority)
        .unwrap();
    state.register(1, Priority::Normal);
    state.register(2, Priority::AboveNormal);
    state.allocate(1, Priority::Normal);
    state.rollback(1);

    // Both now at AboveNormal, ascending within the level
    assert_eq!(state.next_message_id(), Some(1));
    state.delete().unwrap();
    assert!(!layout.at_rest_path("billing").exists());
}
