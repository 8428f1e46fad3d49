use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use candlecache_core::{
    CacheConfig, CacheError, CacheEvent, Candle, CandleSource, CandleStore, EventBus,
    Granularity, InsertOutcome, RawCandle, ThrottleScope, TimeRange,
};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;

use crate::gate::AdmissionGate;

pub(crate) struct CacheState {
    pub(crate) store: CandleStore,
    pub(crate) disposed: bool,
}

/// Multi-granularity OHLCV cache backed by an asynchronous [`CandleSource`].
///
/// Store and skylines live behind a single mutex that is never held across an
/// `.await`, so a batch merge is atomic with respect to concurrent readers.
pub struct TimeSeriesCache {
    pub(crate) source: Arc<dyn CandleSource>,
    pub(crate) cfg: CacheConfig,
    pub(crate) resolution: Option<Granularity>,
    pub(crate) state: Mutex<CacheState>,
    pub(crate) events: EventBus,
    pub(crate) gate: AdmissionGate,
}

/// Builder for constructing a [`TimeSeriesCache`] with custom configuration.
pub struct TimeSeriesCacheBuilder {
    source: Option<Arc<dyn CandleSource>>,
    cfg: CacheConfig,
}

impl Default for TimeSeriesCacheBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSeriesCacheBuilder {
    /// Create a new builder with default configuration.
    ///
    /// Defaults: 500 candles per source call, a 1.5s global cooldown, no fixed
    /// base resolution and no backfill deadline. A source must be supplied via
    /// [`source`](Self::source) before calling [`build`](Self::build).
    #[must_use]
    pub fn new() -> Self {
        Self {
            source: None,
            cfg: CacheConfig::default(),
        }
    }

    /// Set the upstream source used for backfills.
    #[must_use]
    pub fn source(mut self, source: Arc<dyn CandleSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, cfg: CacheConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Fix the base resolution. Queries must then request a multiple of it.
    #[must_use]
    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.cfg.granularity_ms = Some(granularity.as_millis());
        self
    }

    /// Maximum number of candles requested from the source per call.
    #[must_use]
    pub fn max_candles_per_request(mut self, max: usize) -> Self {
        self.cfg.max_candles_per_request = max;
        self
    }

    /// Minimum spacing between admitted queries. `Duration::ZERO` disables throttling.
    #[must_use]
    pub fn cooldown(mut self, cooldown: Duration) -> Self {
        self.cfg.cooldown = cooldown;
        self
    }

    /// Whether the cooldown is shared or tracked per granularity.
    #[must_use]
    pub fn throttle_scope(mut self, scope: ThrottleScope) -> Self {
        self.cfg.throttle_scope = scope;
        self
    }

    /// Deadline for the whole concurrent backfill.
    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.cfg.request_timeout = Some(timeout);
        self
    }

    /// Buffer size of the change-notification channel.
    #[must_use]
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.cfg.event_capacity = capacity;
        self
    }

    /// Build the cache.
    ///
    /// # Errors
    /// Returns `Configuration` if no source was supplied, if
    /// `max_candles_per_request` or `event_capacity` is zero, or if a zero base
    /// resolution was configured.
    pub fn build(self) -> Result<TimeSeriesCache, CacheError> {
        let Some(source) = self.source else {
            return Err(CacheError::Configuration(
                "no source supplied; set one via source(...)".to_string(),
            ));
        };
        if self.cfg.max_candles_per_request == 0 {
            return Err(CacheError::Configuration(
                "max_candles_per_request must be at least 1".to_string(),
            ));
        }
        if self.cfg.event_capacity == 0 {
            return Err(CacheError::Configuration(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        let resolution = self.cfg.granularity_ms.map(Granularity::new).transpose()?;

        Ok(TimeSeriesCache {
            source,
            resolution,
            state: Mutex::new(CacheState {
                store: CandleStore::new(),
                disposed: false,
            }),
            events: EventBus::new(self.cfg.event_capacity),
            gate: AdmissionGate::new(self.cfg.cooldown, self.cfg.throttle_scope),
            cfg: self.cfg,
        })
    }
}

impl TimeSeriesCache {
    /// Start building a new cache.
    ///
    /// ```rust,ignore
    /// use std::sync::Arc;
    /// use std::time::Duration;
    /// use candlecache::TimeSeriesCache;
    ///
    /// let cache = TimeSeriesCache::builder()
    ///     .source(Arc::new(my_source))
    ///     .max_candles_per_request(1_000)
    ///     .cooldown(Duration::from_millis(500))
    ///     .build()?;
    /// ```
    #[must_use]
    pub fn builder() -> TimeSeriesCacheBuilder {
        TimeSeriesCacheBuilder::new()
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.cfg
    }

    /// Name of the configured source.
    #[must_use]
    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, CacheState>, CacheError> {
        let guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.disposed {
            return Err(CacheError::Disposed);
        }
        Ok(guard)
    }

    // Merge a validated batch and notify subscribers if anything changed.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub(crate) fn merge_batch(
        &self,
        granularity: Granularity,
        candles: Vec<Candle>,
    ) -> Result<InsertOutcome, CacheError> {
        let outcome = self.lock()?.store.insert(granularity, candles);
        if let InsertOutcome::Merged { range, len } = &outcome {
            let reached = self.events.publish(CacheEvent::DataModified);
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "candlecache::cache",
                granularity = %granularity,
                start = %range.start,
                end = %range.end,
                len = *len,
                subscribers = reached,
                "batch merged"
            );
        }
        Ok(outcome)
    }

    /// Insert a batch of candles at `granularity`.
    ///
    /// The batch is rejected as a whole if any element lacks a timestamp. It
    /// is skipped if its span is already available; otherwise it is merged,
    /// its span is recorded as covered and `DataModified` is published.
    ///
    /// # Errors
    /// `Validation` for a malformed batch, `Disposed` after [`dispose`](Self::dispose).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candlecache::cache::add",
            skip_all,
            fields(granularity = %granularity, len = batch.len()),
        )
    )]
    pub fn add(
        &self,
        granularity: Granularity,
        batch: Vec<RawCandle>,
    ) -> Result<InsertOutcome, CacheError> {
        let mut candles = RawCandle::validate_batch(batch)?;
        candles.sort_by_key(|c| c.ts);
        self.merge_batch(granularity, candles)
    }

    /// Stored candles at exactly `granularity` with `ts` in `[start, end]`.
    ///
    /// Finer granularities are not consulted; see [`resolve`](Self::resolve).
    ///
    /// # Errors
    /// `Disposed` after [`dispose`](Self::dispose).
    pub fn fetch(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<Vec<Candle>, CacheError> {
        Ok(self
            .lock()?
            .store
            .fetch(granularity, &TimeRange::new(start, end)))
    }

    /// Returns `true` if `[start, end]` is covered at `granularity` or at a
    /// finer granularity that evenly divides it.
    ///
    /// # Errors
    /// `Disposed` after [`dispose`](Self::dispose).
    pub fn available(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<bool, CacheError> {
        Ok(self
            .lock()?
            .store
            .available(&TimeRange::new(start, end), granularity))
    }

    /// The granularity whose coverage satisfies `[start, end]` at `granularity`:
    /// the exact granularity when covered, otherwise the coarsest covering divisor.
    ///
    /// # Errors
    /// `Disposed` after [`dispose`](Self::dispose).
    pub fn resolve(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<Option<Granularity>, CacheError> {
        Ok(self
            .lock()?
            .store
            .resolve(&TimeRange::new(start, end), granularity))
    }

    /// Snapshot of the covered ranges at `granularity`.
    ///
    /// # Errors
    /// `Disposed` after [`dispose`](Self::dispose).
    pub fn coverage(&self, granularity: Granularity) -> Result<Vec<TimeRange>, CacheError> {
        Ok(self
            .lock()?
            .store
            .skyline(granularity)
            .map(|s| s.ranges().to_vec())
            .unwrap_or_default())
    }

    /// Subscribe to change notifications.
    ///
    /// A `DataModified` event is published after every merge that changed the
    /// store. Receivers see `RecvError::Closed` once the cache is dropped.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Drop all cached data and coverage and refuse further use.
    ///
    /// Idempotent. Backfills still in flight finish their source calls but
    /// their results are discarded.
    pub fn dispose(&self) {
        let mut guard = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        guard.store.clear();
        guard.disposed = true;
        drop(guard);
        self.gate.reset();
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "candlecache::cache", "cache disposed");
    }

    /// Returns `true` once [`dispose`](Self::dispose) has been called.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .disposed
    }
}
