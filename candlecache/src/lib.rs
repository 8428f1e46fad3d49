//! candlecache keeps OHLCV candles for a single instrument at several
//! granularities and fills gaps from an asynchronous upstream source.
//!
//! Overview
//! - Stores candles per granularity, ascending by bucket start, one candle per bucket.
//! - Tracks which time ranges are fully populated (the coverage skyline) so a
//!   range is only fetched once.
//! - Serves a coarse granularity from any finer cached granularity that evenly
//!   divides it, aggregating on the fly.
//! - Backfills uncovered ranges with concurrent, size-bounded source calls.
//! - Publishes a `DataModified` event whenever stored data changes.
//!
//! Key behaviors and trade-offs
//! - Cooldown: a query arriving within `cooldown` of the last admitted query is
//!   dropped, not queued. The scope is the whole cache by default and can be
//!   narrowed to one granularity with `ThrottleScope::PerGranularity`.
//! - Coverage is recorded from the first to the last candle a source returns.
//!   Gaps inside a returned batch are not tracked, so a sparse source response
//!   still marks its whole span as covered.
//! - Downsampled results are not written back; they are recomputed per query.
//! - Backfill windows are merged in window order. When a window fails, windows
//!   ahead of it stay cached and the error is returned.
//!
//! Examples
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use candlecache::{Granularity, TimeSeriesCache};
//!
//! let cache = TimeSeriesCache::builder()
//!     .source(Arc::new(my_source))
//!     .max_candles_per_request(500)
//!     .cooldown(Duration::from_millis(1_500))
//!     .build()?;
//!
//! let mut events = cache.subscribe();
//! let minute = Granularity::from_minutes(1)?;
//! let outcome = cache.query(start, end, minute).await?;
//! if let Some(candles) = outcome.into_candles() {
//!     println!("{} candles", candles.len());
//! }
//! ```
#![warn(missing_docs)]

mod cache;
mod gate;
mod plan;
mod query;
mod util;

pub use cache::{TimeSeriesCache, TimeSeriesCacheBuilder};
pub use gate::AdmissionGate;
pub use plan::plan_batches;
pub use query::QueryOutcome;

pub use candlecache_core::{
    CacheConfig, CacheError, CacheEvent, Candle, CandleSource, FnSource, Granularity,
    InsertOutcome, RawCandle, ThrottleScope, TimeRange,
};
