//! Inclusive time spans.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contiguous span of time `[start..=end]`.
///
/// In a coverage skyline a range means every bucket inside it is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive start timestamp.
    pub start: DateTime<Utc>,
    /// Inclusive end timestamp.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a new range. No ordering check is performed.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Returns `true` if `other` lies fully inside `self`.
    #[must_use]
    pub fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && self.end >= other.end
    }

    /// Returns `true` if `ts` lies inside `self`.
    #[must_use]
    pub fn contains_ts(&self, ts: DateTime<Utc>) -> bool {
        self.start <= ts && ts <= self.end
    }
}
