//! At-rest / in-flight state machine for one subscription

use crate::bitset::{BitSetFactory, BitSetResult, FactoryHandle, MemoryBitSetFactory};
use crate::collections::{Priority, PriorityCollection};
use crate::core::sync::lock_or_recover;
use crate::state::listener::MessageStateListener;
use crate::state::message::Message;
use crate::state::policy::RollbackPriority;
use std::fmt;
use std::sync::{Arc, Mutex};

struct StateInner {
    at_rest: PriorityCollection,
    in_flight: PriorityCollection,
    listeners: Vec<Arc<dyn MessageStateListener>>,
}

impl StateInner {
    fn notify(&self, f: impl Fn(&dyn MessageStateListener)) {
        for listener in &self.listeners {
            f(listener.as_ref());
        }
    }
}

/// Delivery state of one subscription
///
/// Every operation takes the single instance lock, so transitions on one
/// manager are linearised while separate managers run fully in parallel.
/// Operations are total: an identifier that is not where the operation
/// expects it gives `false` or `None`, never an error. Storage failures on
/// the mutating path surface from [`sync`](Self::sync), [`close`](Self::close)
/// and [`delete`](Self::delete).
pub struct MessageStateManager {
    name: String,
    rollback_priority: RollbackPriority,
    inner: Mutex<StateInner>,
}

impl MessageStateManager {
    /// Create a manager owning one factory for each set
    ///
    /// Durable factories hand back their stored levels, so a manager rebuilt
    /// after a restart sees the identifiers it held before. Messages that
    /// were in flight at the time usually go back with
    /// [`rollback_in_flight_messages`](Self::rollback_in_flight_messages).
    pub fn new<A, I>(name: impl Into<String>, at_rest: A, in_flight: I) -> Self
    where
        A: BitSetFactory + 'static,
        I: BitSetFactory + 'static,
    {
        let name = name.into();
        let at_rest = PriorityCollection::with_handle(FactoryHandle::new(at_rest));
        let mut in_flight = PriorityCollection::with_handle(FactoryHandle::new(in_flight));
        reconcile(&name, &at_rest, &mut in_flight);
        if !at_rest.is_empty() || !in_flight.is_empty() {
            log::debug!(
                "{}: recovered {} at rest, {} in flight",
                name,
                at_rest.len(),
                in_flight.len()
            );
        }
        Self {
            name,
            rollback_priority: RollbackPriority::default(),
            inner: Mutex::new(StateInner {
                at_rest,
                in_flight,
                listeners: Vec::new(),
            }),
        }
    }

    /// Non-durable manager with the default block size
    pub fn in_memory(name: impl Into<String>) -> Self {
        Self::new(
            name,
            MemoryBitSetFactory::default(),
            MemoryBitSetFactory::default(),
        )
    }

    pub fn with_rollback_priority(mut self, policy: RollbackPriority) -> Self {
        self.rollback_priority = policy;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rollback_priority(&self) -> RollbackPriority {
        self.rollback_priority
    }

    pub fn add_listener(&self, listener: Arc<dyn MessageStateListener>) {
        lock_or_recover(&self.inner).listeners.push(listener);
    }

    /// Detach a listener previously added, returns false if it was not attached
    pub fn remove_listener(&self, listener: &Arc<dyn MessageStateListener>) -> bool {
        let mut inner = lock_or_recover(&self.inner);
        let before = inner.listeners.len();
        inner
            .listeners
            .retain(|attached| !Arc::ptr_eq(attached, listener));
        inner.listeners.len() != before
    }

    /// Store `id` at rest at `priority`
    ///
    /// Returns false, changing nothing, if the manager already holds `id`
    /// in either set.
    pub fn register(&self, id: u64, priority: Priority) -> bool {
        let mut inner = lock_or_recover(&self.inner);
        if inner.at_rest.contains(id) || inner.in_flight.contains(id) {
            log::trace!("{}: register {} already held", self.name, id);
            return false;
        }
        inner.at_rest.add(id, priority);
        inner.notify(|listener| listener.add(id));
        log::trace!("{}: register {} at {}", self.name, id, priority);
        true
    }

    /// Store `message` at rest at its own priority
    pub fn register_message(&self, message: &Message) -> bool {
        self.register(message.identifier(), message.priority())
    }

    /// Store `id` at rest at the default priority
    pub fn register_id(&self, id: u64) -> bool {
        self.register(id, Priority::DEFAULT)
    }

    /// Move `id` from at rest to in flight at `priority`
    ///
    /// Returns false, changing nothing, if `id` is not at rest. That is the
    /// normal outcome when allocation races an expiry.
    pub fn allocate(&self, id: u64, priority: Priority) -> bool {
        let mut inner = lock_or_recover(&self.inner);
        let moved = inner.at_rest.contains(id);
        if moved {
            // Destination first: a crash in between leaves a duplicate that
            // recovery drops, never a lost identifier
            inner.in_flight.add(id, priority);
            inner.at_rest.remove(id);
        }
        log::trace!("{}: allocate {} (moved: {})", self.name, id, moved);
        moved
    }

    pub fn allocate_message(&self, message: &Message) -> bool {
        self.allocate(message.identifier(), message.priority())
    }

    /// Drop `id` from in flight after a successful delivery
    ///
    /// Listeners hear `remove` only if `id` was in flight, so a duplicate
    /// acknowledgement leaves mirrors alone.
    pub fn commit(&self, id: u64) -> bool {
        let mut inner = lock_or_recover(&self.inner);
        let committed = inner.in_flight.remove(id);
        if committed {
            inner.notify(|listener| listener.remove(id));
        }
        log::trace!("{}: commit {} (in flight: {})", self.name, id, committed);
        committed
    }

    /// Return `id` from in flight to at rest for redelivery
    pub fn rollback(&self, id: u64) -> bool {
        let mut inner = lock_or_recover(&self.inner);
        let Some(priority) = inner.in_flight.priority_of(id) else {
            log::trace!("{}: rollback {} not in flight", self.name, id);
            return false;
        };
        let priority = self.rollback_priority.apply(priority);
        inner.at_rest.add(id, priority);
        inner.in_flight.remove(id);
        inner.notify(|listener| listener.add(id));
        log::trace!("{}: rollback {} to {}", self.name, id, priority);
        true
    }

    /// Return every in-flight identifier to at rest at its current level,
    /// returns how many were moved
    pub fn rollback_in_flight_messages(&self) -> usize {
        let mut inner = lock_or_recover(&self.inner);
        if inner.in_flight.is_empty() {
            return 0;
        }
        let mut ids = Vec::with_capacity(inner.in_flight.len());
        inner.in_flight.flatten(&mut ids);
        log::debug!("{}: rolling back {} in flight", self.name, ids.len());

        let StateInner {
            at_rest, in_flight, ..
        } = &mut *inner;
        at_rest.add_all(in_flight);
        in_flight.clear();

        inner.notify(|listener| listener.add_all(&ids));
        ids.len()
    }

    /// Remove `id` from both sets, returns true if either held it
    pub fn expired(&self, id: u64) -> bool {
        let mut inner = lock_or_recover(&self.inner);
        let at_rest = inner.at_rest.remove(id);
        let in_flight = inner.in_flight.remove(id);
        let present = at_rest || in_flight;
        if present {
            inner.notify(|listener| listener.remove(id));
        }
        log::trace!("{}: expired {} (present: {})", self.name, id, present);
        present
    }

    /// Next identifier to deliver, without changing state
    pub fn next_message_id(&self) -> Option<u64> {
        let inner = lock_or_recover(&self.inner);
        let next = inner.at_rest.peek();
        log::trace!("{}: next {:?}", self.name, next);
        next
    }

    pub fn has_message(&self, id: u64) -> bool {
        let inner = lock_or_recover(&self.inner);
        inner.at_rest.contains(id) || inner.in_flight.contains(id)
    }

    pub fn has_at_rest_messages(&self) -> bool {
        !lock_or_recover(&self.inner).at_rest.is_empty()
    }

    pub fn has_messages_in_flight(&self) -> bool {
        !lock_or_recover(&self.inner).in_flight.is_empty()
    }

    /// At rest plus in flight
    pub fn size(&self) -> usize {
        let inner = lock_or_recover(&self.inner);
        inner.at_rest.len() + inner.in_flight.len()
    }

    /// At rest only
    pub fn pending(&self) -> usize {
        lock_or_recover(&self.inner).at_rest.len()
    }

    pub fn in_flight_count(&self) -> usize {
        lock_or_recover(&self.inner).in_flight.len()
    }

    pub fn is_empty(&self) -> bool {
        let inner = lock_or_recover(&self.inner);
        inner.at_rest.is_empty() && inner.in_flight.is_empty()
    }

    /// Every identifier held, ascending
    pub fn get_all(&self) -> Vec<u64> {
        let inner = lock_or_recover(&self.inner);
        let mut ids = Vec::with_capacity(inner.at_rest.len() + inner.in_flight.len());
        inner.at_rest.flatten(&mut ids);
        inner.in_flight.flatten(&mut ids);
        ids.sort_unstable();
        ids
    }

    /// Identifiers at rest, ascending
    pub fn get_all_at_rest(&self) -> Vec<u64> {
        let inner = lock_or_recover(&self.inner);
        let mut ids = Vec::with_capacity(inner.at_rest.len());
        inner.at_rest.flatten(&mut ids);
        ids.sort_unstable();
        ids
    }

    /// Flush both factories, reporting any deferred storage failure
    pub fn sync(&self) -> BitSetResult<()> {
        let inner = lock_or_recover(&self.inner);
        let at_rest = inner.at_rest.sync();
        let in_flight = inner.in_flight.sync();
        at_rest.and(in_flight)
    }

    /// Release storage, keeping durable state for the next start
    pub fn close(&self) -> BitSetResult<()> {
        let mut inner = lock_or_recover(&self.inner);
        let at_rest = inner.at_rest.close();
        let in_flight = inner.in_flight.close();
        log::debug!("{}: closed", self.name);
        at_rest.and(in_flight)
    }

    /// Release storage and destroy durable state
    pub fn delete(&self) -> BitSetResult<()> {
        let mut inner = lock_or_recover(&self.inner);
        let at_rest = inner.at_rest.delete();
        let in_flight = inner.in_flight.delete();
        log::debug!("{}: deleted", self.name);
        at_rest.and(in_flight)
    }
}

/// Drop from `in_flight` every identifier also held at rest
///
/// A crash between the two writes of a transition can leave an identifier
/// in both files. The at-rest copy wins so the message is redelivered once.
fn reconcile(name: &str, at_rest: &PriorityCollection, in_flight: &mut PriorityCollection) {
    let duplicates: Vec<u64> = in_flight.iter().filter(|id| at_rest.contains(*id)).collect();
    if duplicates.is_empty() {
        return;
    }
    for id in &duplicates {
        in_flight.remove(*id);
    }
    log::debug!(
        "{}: dropped {} in-flight identifiers also held at rest",
        name,
        duplicates.len()
    );
}

impl fmt::Display for MessageStateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = lock_or_recover(&self.inner);
        write!(
            f,
            "{} At Rest:{} InFlight:{}",
            self.name, inner.at_rest, inner.in_flight
        )
    }
}

impl fmt::Debug for MessageStateManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageStateManager")
            .field("name", &self.name)
            .field("rollback_priority", &self.rollback_priority)
            .finish_non_exhaustive()
    }
}
