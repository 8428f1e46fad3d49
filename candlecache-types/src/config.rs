//! Configuration types for the time-series cache.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scope of the query cooldown window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ThrottleScope {
    /// One cooldown shared by every query on the cache instance.
    ///
    /// A query for an unrelated range or granularity is dropped while another
    /// query's cooldown is active.
    #[default]
    Global,
    /// An independent cooldown per requested granularity.
    PerGranularity,
}

/// Configuration for a `TimeSeriesCache`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Optional fixed base resolution in milliseconds. When set, queries must
    /// request a multiple of it.
    pub granularity_ms: Option<u64>,
    /// Maximum number of candles requested from the source in a single call.
    pub max_candles_per_request: usize,
    /// Minimum spacing between admitted queries.
    pub cooldown: Duration,
    /// Whether the cooldown applies to the whole cache or per granularity.
    pub throttle_scope: ThrottleScope,
    /// Optional deadline for the whole concurrent backfill join.
    pub request_timeout: Option<Duration>,
    /// Buffer size of the change-notification channel.
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            granularity_ms: None,
            max_candles_per_request: 500,
            cooldown: Duration::from_millis(1_500),
            throttle_scope: ThrottleScope::Global,
            request_timeout: None,
            event_capacity: 64,
        }
    }
}
