//! Recovery of every store after a restart

use crate::common;
use delivery_state::collections::Priority;
use delivery_state::config::EngineConfig;
use delivery_state::state::RollbackPriority;

fn populate(config: &EngineConfig) {
    let layout = config.layout("orders").unwrap();
    let state = layout
        .open_subscription("billing", RollbackPriority::Maintain)
        .unwrap();
    for id in 0..200 {
        state.register(id, Priority::clamped((id % 10) as i64));
    }
    for id in 0..20 {
        state.allocate(id, Priority::clamped((id % 10) as i64));
    }
    for id in 0..10 {
        state.commit(id);
    }
    state.close().unwrap();

    let delayed = layout.open_delayed(config.delayed.slot_millis).unwrap();
    delayed.register_at(5_500, 300);
    delayed.register_at(5_900, 301);
    delayed.register_at(9_000, 302);
    delayed.close().unwrap();

    let transactions = layout.open_transactions().unwrap();
    transactions.register_id(7, 400);
    transactions.register_id(7, 401);
    transactions.register_id(8, 402);
    transactions.commit(8);
    transactions.close().unwrap();
}

#[test]
fn test_subscription_recovers() {
    let (_dir, config) = common::engine("");
    populate(&config);

    let layout = config.layout("orders").unwrap();
    let state = layout
        .open_subscription("billing", RollbackPriority::Maintain)
        .unwrap();
    assert_eq!(state.size(), 190);
    assert_eq!(state.in_flight_count(), 10);
    assert_eq!(state.pending(), 180);
    assert!(!state.has_message(3));
    assert!(state.has_message(15));

    assert_eq!(state.rollback_in_flight_messages(), 10);
    assert_eq!(state.pending(), 190);
    // Highest level holds 19, 29, ... and 19 is the lowest of them
    assert_eq!(state.next_message_id(), Some(19));
    state.close().unwrap();
}

#[test]
fn test_delayed_slots_recover() {
    let (_dir, config) = common::engine("");
    populate(&config);

    let layout = config.layout("orders").unwrap();
    let delayed = layout.open_delayed(config.delayed.slot_millis).unwrap();
    assert_eq!(delayed.buckets().bucket_ids(), vec![5_000, 9_000]);
    assert_eq!(delayed.due_buckets(6_000), vec![5_000]);
    assert_eq!(delayed.remove_bucket(5_000), vec![300, 301]);
    assert_eq!(delayed.size(), 1);
}

#[test]
fn test_open_transactions_abort_after_restart() {
    let (_dir, config) = common::engine("");
    populate(&config);

    let layout = config.layout("orders").unwrap();
    let transactions = layout.open_transactions().unwrap();
    assert_eq!(transactions.transactions(), vec![7]);
    assert_eq!(transactions.pending(7), 2);
    assert_eq!(transactions.abort_all(), 1);
    assert!(transactions.is_empty());
    transactions.close().unwrap();

    let transactions = layout.open_transactions().unwrap();
    assert!(transactions.transactions().is_empty());
}
