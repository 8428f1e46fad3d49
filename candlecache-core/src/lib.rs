//! candlecache-core
//!
//! Core types, traits, and algorithms shared across the candlecache workspace.
//!
//! - `timeseries`: coverage skyline, candle store, availability resolution and
//!   downsampling.
//! - `source`: the `CandleSource` trait implemented by upstream data providers.
//! - `events`: the change-notification bus.
//!
//! Async runtime (Tokio)
//! ---------------------
//! `events::EventBus` is built on `tokio::sync::broadcast`; receivers must be
//! awaited under a Tokio 1.x runtime. Everything in `timeseries` is synchronous.
#![warn(missing_docs)]

/// Change-notification bus.
pub mod events;
/// Upstream candle source trait and closure adaptor.
pub mod source;
/// Time-series utilities for coverage, storage and downsampling.
pub mod timeseries;

pub use candlecache_types::{
    CacheConfig, CacheError, Candle, Granularity, RawCandle, ThrottleScope, TimeRange,
};
pub use events::{CacheEvent, EventBus};
pub use source::{CandleSource, FnSource};
pub use timeseries::resample::downsample;
pub use timeseries::skyline::{Skyline, merge_ranges};
pub use timeseries::store::{
    CandleStore, InsertOutcome, collapse_duplicates, fetch_range, merge_insert,
};
