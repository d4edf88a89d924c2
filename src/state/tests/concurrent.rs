//! Manager shared across threads

use crate::collections::Priority;
use crate::state::MessageStateManager;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_register_allocate_commit() {
    let state = Arc::new(MessageStateManager::in_memory("shared"));
    let producers = 4u64;
    let per_producer = 500u64;

    let handles: Vec<_> = (0..producers)
        .map(|producer| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for n in 0..per_producer {
                    let id = producer * per_producer + n;
                    state.register(id, Priority::clamped((id % 10) as i64));
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(state.pending() as u64, producers * per_producer);

    // Consumers race on the same at-rest set; each id is allocated once
    let consumers: Vec<_> = (0..4)
        .map(|_| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                let mut won = 0usize;
                while let Some(id) = state.next_message_id() {
                    if state.allocate(id, Priority::Normal) {
                        state.commit(id);
                        won += 1;
                    }
                }
                won
            })
        })
        .collect();
    let total: usize = consumers.into_iter().map(|c| c.join().unwrap()).sum();

    assert_eq!(total as u64, producers * per_producer);
    assert!(state.is_empty());
}

#[test]
fn test_expiry_races_allocation() {
    let state = Arc::new(MessageStateManager::in_memory("racing"));
    for id in 0..1000 {
        state.register(id, Priority::Normal);
    }

    let expirer = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for id in (0..1000).step_by(2) {
                state.expired(id);
            }
        })
    };
    let allocator = {
        let state = Arc::clone(&state);
        thread::spawn(move || {
            for id in 0..1000 {
                state.allocate(id, Priority::Normal);
            }
        })
    };
    expirer.join().unwrap();
    allocator.join().unwrap();

    assert_eq!(state.pending(), 0);
    assert_eq!(state.size(), state.in_flight_count());
    // Odd ids were never expired, so they all made it into flight
    for id in (1..1000).step_by(2) {
        assert!(state.has_message(id));
    }
}
