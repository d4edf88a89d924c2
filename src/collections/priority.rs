//! Message priority levels

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, FromRepr};

/// Number of priority levels
pub const LEVELS: usize = 10;

/// Delivery priority, `Lowest` (0) to `Highest` (9)
#[derive(
    EnumIter,
    FromRepr,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Priority {
    Lowest = 0,
    VeryLow = 1,
    Low = 2,
    BelowNormal = 3,
    Normal = 4,
    AboveNormal = 5,
    High = 6,
    VeryHigh = 7,
    OneBelowHighest = 8,
    Highest = 9,
}

impl Priority {
    /// Priority of messages that do not carry one. Keeps administrative
    /// traffic at `Highest` ahead of regular traffic.
    pub const DEFAULT: Priority = Priority::OneBelowHighest;

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    /// Index into a per-level table
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::from_repr(ordinal)
    }

    /// Map an arbitrary protocol priority onto the 10 levels
    pub fn clamped(value: i64) -> Self {
        Self::from_repr(value.clamp(0, 9) as u8).unwrap_or(Self::DEFAULT)
    }

    /// One level up, saturating at `Highest`
    pub fn increment(self) -> Self {
        Self::from_repr(self as u8 + 1).unwrap_or(Priority::Highest)
    }

    /// Levels from `Highest` down to `Lowest`, the delivery scan order
    pub fn descending() -> impl Iterator<Item = Priority> {
        Self::iter().rev()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Lowest => "lowest",
            Self::VeryLow => "very_low",
            Self::Low => "low",
            Self::BelowNormal => "below_normal",
            Self::Normal => "normal",
            Self::AboveNormal => "above_normal",
            Self::High => "high",
            Self::VeryHigh => "very_high",
            Self::OneBelowHighest => "one_below_highest",
            Self::Highest => "highest",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<u8> for Priority {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_repr(value).ok_or(value)
    }
}
