use candlecache_core::{
    CacheError, Candle, Granularity, RawCandle, TimeRange, collapse_duplicates, downsample,
    fetch_range, merge_insert,
};
use chrono::{DateTime, Utc};

use crate::TimeSeriesCache;
use crate::plan::plan_batches;
use crate::util::{join_with_deadline, tag_err};

/// How a [`TimeSeriesCache::query`] was served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Dropped by the cooldown gate; nothing was read or fetched.
    Throttled,
    /// Served from candles stored at the requested granularity.
    CacheHit(Vec<Candle>),
    /// Aggregated from a finer cached granularity.
    Downsampled {
        /// The cached granularity the candles were built from.
        from: Granularity,
        /// The aggregated candles.
        candles: Vec<Candle>,
    },
    /// Fetched from the source and merged into the store, limited to the
    /// requested range.
    Backfilled(Vec<Candle>),
}

impl QueryOutcome {
    /// The candles produced, or `None` if the query was throttled.
    #[must_use]
    pub fn into_candles(self) -> Option<Vec<Candle>> {
        match self {
            Self::Throttled => None,
            Self::CacheHit(c) | Self::Backfilled(c) | Self::Downsampled { candles: c, .. } => {
                Some(c)
            }
        }
    }

    /// Borrow the candles produced, or `None` if the query was throttled.
    #[must_use]
    pub fn candles(&self) -> Option<&[Candle]> {
        match self {
            Self::Throttled => None,
            Self::CacheHit(c) | Self::Backfilled(c) | Self::Downsampled { candles: c, .. } => {
                Some(c)
            }
        }
    }

    /// Returns `true` if the query was dropped by the cooldown gate.
    #[must_use]
    pub const fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled)
    }
}

impl TimeSeriesCache {
    fn check_query(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<(), CacheError> {
        if start > end {
            return Err(CacheError::InvalidArg(format!(
                "start {start} is after end {end}"
            )));
        }
        if let Some(base) = self.resolution
            && !base.divides(granularity)
        {
            return Err(CacheError::InvalidArg(format!(
                "granularity {granularity} is not a multiple of the base resolution {base}"
            )));
        }
        Ok(())
    }

    /// Candles for `[start, end]` at `granularity`, from the cache when possible.
    ///
    /// Behavior:
    /// - The query first passes the cooldown gate; a query arriving while a
    ///   cooldown is active returns [`QueryOutcome::Throttled`] and is not retried.
    /// - If the range is covered at `granularity`, stored candles are returned.
    /// - If it is covered at a finer granularity that divides `granularity`, the
    ///   finer candles are aggregated on the fly; nothing is written back.
    /// - Otherwise the range is split into windows of at most
    ///   `max_candles_per_request` buckets, all windows are requested from the
    ///   source concurrently, and each response is merged in window order.
    ///   Overlapping responses resolve like the store (later window wins) and
    ///   the returned candles are limited to `[start, end]`.
    ///
    /// # Errors
    /// - `InvalidArg` if `start > end` or `granularity` is not a multiple of the
    ///   configured base resolution.
    /// - `Upstream` or `Validation` from the first failing window. Windows ahead
    ///   of it stay merged.
    /// - `RequestTimeout` if the backfill exceeds `request_timeout`.
    /// - `Disposed` after [`dispose`](Self::dispose).
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candlecache::query",
            skip_all,
            fields(start = %start, end = %end, granularity = %granularity),
        )
    )]
    pub async fn query(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        granularity: Granularity,
    ) -> Result<QueryOutcome, CacheError> {
        drop(self.lock()?);
        self.check_query(start, end, granularity)?;

        if !self.gate.try_admit(granularity) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "candlecache::query",
                remaining_ms = u64::try_from(self.gate.remaining(granularity).as_millis()).unwrap_or(u64::MAX),
                "cooldown active; query dropped"
            );
            return Ok(QueryOutcome::Throttled);
        }

        let range = TimeRange::new(start, end);
        let hit = {
            let state = self.lock()?;
            state
                .store
                .resolve(&range, granularity)
                .map(|from| (from, state.store.fetch(from, &range)))
        };

        match hit {
            Some((from, candles)) if from == granularity => {
                #[cfg(feature = "tracing")]
                tracing::debug!(target: "candlecache::query", len = candles.len(), "cache hit");
                Ok(QueryOutcome::CacheHit(candles))
            }
            Some((from, candles)) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    target: "candlecache::query",
                    from = %from,
                    len = candles.len(),
                    "downsampling from finer cached granularity"
                );
                let candles = downsample(candles, from, granularity)?;
                Ok(QueryOutcome::Downsampled { from, candles })
            }
            None => self
                .backfill(range, granularity)
                .await
                .map(QueryOutcome::Backfilled),
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            name = "candlecache::query::backfill",
            skip_all,
            fields(source = self.source.name(), start = %range.start, end = %range.end),
        )
    )]
    async fn backfill(
        &self,
        range: TimeRange,
        granularity: Granularity,
    ) -> Result<Vec<Candle>, CacheError> {
        let windows = plan_batches(
            range.start,
            range.end,
            granularity,
            self.cfg.max_candles_per_request,
        );
        #[cfg(feature = "tracing")]
        tracing::debug!(target: "candlecache::query", windows = windows.len(), "backfilling");

        let calls = windows
            .iter()
            .map(|window| self.source.fetch(*window, granularity));
        let responses = join_with_deadline(calls, self.cfg.request_timeout)
            .await
            .map_err(|_| CacheError::request_timeout("backfill"))?;

        let mut out: Vec<Candle> = Vec::new();
        for response in responses {
            let raw: Vec<RawCandle> = match response {
                Ok(raw) => raw,
                Err(e) => {
                    let e = tag_err(self.source.name(), e);
                    #[cfg(feature = "tracing")]
                    tracing::warn!(target: "candlecache::query", error = %e, "backfill window failed");
                    return Err(e);
                }
            };
            let mut candles = RawCandle::validate_batch(raw)?;
            candles.sort_by_key(|c| c.ts);
            let candles = collapse_duplicates(candles);
            self.merge_batch(granularity, candles.clone())?;

            // windows may overlap (shared boundary bucket, or a source answering
            // wider than asked); later windows win, as in the store
            out = merge_insert(std::mem::take(&mut out), candles);
        }
        Ok(fetch_range(&out, range.start, range.end))
    }
}
