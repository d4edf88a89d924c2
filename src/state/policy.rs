//! Priority applied to a message rolled back for redelivery

use crate::collections::Priority;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollbackPriority {
    /// Back at the priority it was delivered with
    #[default]
    Maintain,
    /// One level higher, saturating at `Highest`
    Increment,
}

impl RollbackPriority {
    pub fn apply(self, priority: Priority) -> Priority {
        match self {
            Self::Maintain => priority,
            Self::Increment => priority.increment(),
        }
    }
}

impl fmt::Display for RollbackPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Maintain => write!(f, "maintain"),
            Self::Increment => write!(f, "increment"),
        }
    }
}
