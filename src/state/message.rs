//! Message metadata seen by the state engine

use crate::collections::Priority;
use serde::{Deserialize, Serialize};

/// The parts of a stored message the delivery state cares about
///
/// Bodies and headers live elsewhere; only the identifier, its priority and
/// the scheduling keys reach the state managers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    identifier: u64,
    #[serde(default)]
    priority: Priority,
    /// Earliest delivery time, milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    delivery_time: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    transaction_id: Option<u64>,
}

impl Message {
    pub fn new(identifier: u64) -> Self {
        Self {
            identifier,
            priority: Priority::DEFAULT,
            delivery_time: None,
            transaction_id: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_delivery_time(mut self, millis: u64) -> Self {
        self.delivery_time = Some(millis);
        self
    }

    pub fn with_transaction(mut self, transaction_id: u64) -> Self {
        self.transaction_id = Some(transaction_id);
        self
    }

    pub fn identifier(&self) -> u64 {
        self.identifier
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn delivery_time(&self) -> Option<u64> {
        self.delivery_time
    }

    pub fn transaction_id(&self) -> Option<u64> {
        self.transaction_id
    }
}
