//! Bucket width of a candle series.

use std::fmt;
use std::num::NonZeroU64;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::CacheError;

/// A positive bucket width in milliseconds.
///
/// Several granularities may be cached side by side; a granularity `g` can stand
/// in for a coarser `target` whenever it tiles it evenly (see [`Granularity::divides`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct Granularity(NonZeroU64);

impl Granularity {
    /// Build a granularity from a millisecond count.
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` when `millis` is zero.
    pub fn new(millis: u64) -> Result<Self, CacheError> {
        NonZeroU64::new(millis)
            .map(Self)
            .ok_or_else(|| CacheError::Configuration("granularity must be positive".into()))
    }

    /// Build a granularity from whole seconds.
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` when `secs` is zero or overflows.
    pub fn from_secs(secs: u64) -> Result<Self, CacheError> {
        let millis = secs
            .checked_mul(1_000)
            .ok_or_else(|| CacheError::Configuration(format!("granularity overflow: {secs}s")))?;
        Self::new(millis)
    }

    /// Build a granularity from whole minutes.
    ///
    /// # Errors
    /// Returns `CacheError::Configuration` when `minutes` is zero or overflows.
    pub fn from_minutes(minutes: u64) -> Result<Self, CacheError> {
        let secs = minutes.checked_mul(60).ok_or_else(|| {
            CacheError::Configuration(format!("granularity overflow: {minutes}m"))
        })?;
        Self::from_secs(secs)
    }

    /// Bucket width in milliseconds.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0.get()
    }

    /// Bucket width as a `chrono` delta, saturating at `i64::MAX` milliseconds.
    #[must_use]
    pub fn as_duration(self) -> TimeDelta {
        TimeDelta::milliseconds(i64::try_from(self.as_millis()).unwrap_or(i64::MAX))
    }

    /// Returns `true` when `self` evenly tiles into `target` (`self <= target`
    /// and `target % self == 0`). A granularity always divides itself.
    #[must_use]
    pub const fn divides(self, target: Self) -> bool {
        self.as_millis() <= target.as_millis() && target.as_millis() % self.as_millis() == 0
    }

    /// Number of buckets needed to span `start..end`, rounded up.
    ///
    /// Returns zero when `end <= start`.
    #[must_use]
    pub fn buckets_between(self, start: DateTime<Utc>, end: DateTime<Utc>) -> u64 {
        let span = (end - start).num_milliseconds();
        let Ok(span) = u64::try_from(span) else {
            return 0;
        };
        span.div_ceil(self.as_millis())
    }
}

impl TryFrom<u64> for Granularity {
    type Error = CacheError;

    fn try_from(millis: u64) -> Result<Self, Self::Error> {
        Self::new(millis)
    }
}

impl From<Granularity> for u64 {
    fn from(g: Granularity) -> Self {
        g.as_millis()
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.as_millis())
    }
}
