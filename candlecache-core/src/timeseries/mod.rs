//! Time-series building blocks owned by the cache.
//!
//! Modules include:
//! - `skyline`: per-granularity coverage of known time ranges
//! - `store`: sorted, de-duplicated candle series with merge-insert
//! - `availability`: which cached granularity can serve a request
//! - `resample`: aggregate finer candles into coarser ones
/// Resolution of requests against cached coverage.
pub mod availability;
/// Downsampling of finer candles into coarser buckets.
pub mod resample;
/// Coverage skyline and interval merging.
pub mod skyline;
/// Candle series storage and merge-insert.
pub mod store;
