//! Delayed and transactional messages handed to a subscription

use crate::common;
use delivery_state::collections::Priority;
use delivery_state::state::Message;

#[test]
fn test_due_delayed_messages_become_deliverable() {
    let (_dir, config) = common::engine("\n[delayed]\nslot_millis = 100\n");
    let layout = config.layout("orders").unwrap();
    let delayed = layout.open_delayed(config.delayed.slot_millis).unwrap();
    let state = layout
        .open_subscription("billing", config.state.rollback_priority)
        .unwrap();

    let later = Message::new(2).with_delivery_time(450);
    let sooner = Message::new(1).with_delivery_time(120);
    assert_eq!(delayed.register(&later), Some(400));
    assert_eq!(delayed.register(&sooner), Some(100));
    assert_eq!(delayed.register(&Message::new(3)), None);

    for slot in delayed.due_buckets(200) {
        for id in delayed.remove_bucket(slot) {
            state.register(id, Priority::Normal);
        }
    }
    assert_eq!(state.get_all(), vec![1]);
    assert_eq!(delayed.buckets().bucket_ids(), vec![400]);

    // Cancelled before it was due
    assert!(delayed.remove(2));
    assert!(delayed.is_empty());
}

#[test]
fn test_committed_transaction_is_delivered() {
    let (_dir, config) = common::engine("");
    let layout = config.layout("orders").unwrap();
    let transactions = layout.open_transactions().unwrap();
    let state = layout
        .open_subscription("billing", config.state.rollback_priority)
        .unwrap();

    let message = Message::new(50)
        .with_priority(Priority::High)
        .with_transaction(9);
    transactions.register(message.transaction_id().unwrap(), &message);
    transactions.register_id(9, 51);
    assert!(state.is_empty());

    for id in transactions.commit(9) {
        state.register(id, Priority::High);
    }
    assert_eq!(state.get_all_at_rest(), vec![50, 51]);
    assert!(transactions.transactions().is_empty());
}
