//! Observers of message state transitions

/// Receives state transitions from a [`MessageStateManager`]
///
/// Callbacks run synchronously while the manager's lock is held, so a
/// secondary index stays consistent with the primary state. They receive
/// only identifiers and must not call back into the manager.
///
/// - `add`: an identifier was registered or rolled back to at rest
/// - `remove`: an identifier was committed or expired
/// - `add_all`: the whole in-flight set was rolled back
///
/// [`MessageStateManager`]: crate::state::MessageStateManager
pub trait MessageStateListener: Send + Sync {
    fn add(&self, id: u64);

    fn remove(&self, id: u64);

    fn add_all(&self, ids: &[u64]) {
        for id in ids {
            self.add(*id);
        }
    }
}
