use std::cmp::Ordering;
use std::collections::BTreeMap;

use candlecache_types::{CacheError, Candle, Granularity, RawCandle, TimeRange};
use chrono::{DateTime, Utc};

use super::skyline::Skyline;

/// Two-pointer merge of two ascending candle series.
///
/// Output is ascending with one candle per timestamp; on equal timestamps the
/// `incoming` candle replaces the `existing` one.
#[must_use]
pub fn merge_insert(existing: Vec<Candle>, incoming: Vec<Candle>) -> Vec<Candle> {
    let mut out = Vec::with_capacity(existing.len() + incoming.len());
    let mut old = existing.into_iter().peekable();
    let mut new = incoming.into_iter().peekable();

    loop {
        let ord = match (old.peek(), new.peek()) {
            (Some(o), Some(n)) => o.ts.cmp(&n.ts),
            _ => break,
        };
        match ord {
            Ordering::Greater => out.extend(new.next()),
            Ordering::Less => out.extend(old.next()),
            Ordering::Equal => {
                old.next();
                out.extend(new.next());
            }
        }
    }

    out.extend(old);
    out.extend(new);
    out
}

/// Candles of an ascending series whose `ts` lies in `[start, end]`.
#[must_use]
pub fn fetch_range(candles: &[Candle], start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<Candle> {
    if start > end {
        return Vec::new();
    }
    let lo = candles.partition_point(|c| c.ts < start);
    let hi = candles.partition_point(|c| c.ts <= end);
    candles[lo..hi].to_vec()
}

/// Collapse equal timestamps in an ascending batch; the later record wins.
#[must_use]
pub fn collapse_duplicates(candles: Vec<Candle>) -> Vec<Candle> {
    let mut out: Vec<Candle> = Vec::with_capacity(candles.len());
    for c in candles {
        if let Some(last) = out.last_mut()
            && last.ts == c.ts
        {
            *last = c;
            continue;
        }
        out.push(c);
    }
    out
}

/// Result of inserting a batch into a [`CandleStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The batch was merged and its span recorded in the skyline.
    Merged {
        /// Span `[first.ts, last.ts]` of the batch.
        range: TimeRange,
        /// Number of candles in the batch.
        len: usize,
    },
    /// The batch's span was already available; nothing changed.
    AlreadyCovered,
    /// The batch was empty; nothing changed.
    Empty,
}

impl InsertOutcome {
    /// Returns `true` when the store was modified.
    #[must_use]
    pub const fn is_merged(&self) -> bool {
        matches!(self, Self::Merged { .. })
    }
}

/// Per-granularity candle series plus their coverage skylines.
///
/// Series are ascending and hold at most one candle per timestamp. Every
/// mutation goes through [`CandleStore::insert`], which keeps the series and the
/// skyline of a granularity in step.
#[derive(Debug, Clone, Default)]
pub struct CandleStore {
    pub(crate) series: BTreeMap<Granularity, Vec<Candle>>,
    pub(crate) skylines: BTreeMap<Granularity, Skyline>,
}

impl CandleStore {
    /// Create an empty store.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            series: BTreeMap::new(),
            skylines: BTreeMap::new(),
        }
    }

    /// Merge an ascending batch into the series for `granularity`.
    ///
    /// The batch is skipped when `[first.ts, last.ts]` is already available at
    /// `granularity` or at any finer granularity dividing it. Otherwise it is
    /// merged (fresher values win on equal timestamps) and its span is added
    /// to the skyline.
    pub fn insert(&mut self, granularity: Granularity, candles: Vec<Candle>) -> InsertOutcome {
        let (Some(first), Some(last)) = (candles.first(), candles.last()) else {
            return InsertOutcome::Empty;
        };
        let range = TimeRange::new(first.ts, last.ts);

        if self.available(&range, granularity) {
            #[cfg(feature = "tracing")]
            tracing::debug!(
                target: "candlecache::store",
                granularity = %granularity,
                start = %range.start,
                end = %range.end,
                "batch already covered; skipping merge"
            );
            return InsertOutcome::AlreadyCovered;
        }

        let incoming = collapse_duplicates(candles);
        let len = incoming.len();
        let existing = self.series.remove(&granularity).unwrap_or_default();
        self.series
            .insert(granularity, merge_insert(existing, incoming));
        self.skylines.entry(granularity).or_default().add(range);

        InsertOutcome::Merged { range, len }
    }

    /// Validate a raw batch and insert it.
    ///
    /// # Errors
    /// Returns `CacheError::Validation` if any record lacks a timestamp; the
    /// store is left untouched.
    pub fn insert_raw(
        &mut self,
        granularity: Granularity,
        batch: Vec<RawCandle>,
    ) -> Result<InsertOutcome, CacheError> {
        let candles = RawCandle::validate_batch(batch)?;
        Ok(self.insert(granularity, candles))
    }

    /// Stored candles at `granularity` with `ts` in `range`.
    ///
    /// Returns an empty vector when nothing is stored.
    #[must_use]
    pub fn fetch(&self, granularity: Granularity, range: &TimeRange) -> Vec<Candle> {
        self.series
            .get(&granularity)
            .map(|s| fetch_range(s, range.start, range.end))
            .unwrap_or_default()
    }

    /// Coverage skyline for `granularity`, if anything was stored at it.
    #[must_use]
    pub fn skyline(&self, granularity: Granularity) -> Option<&Skyline> {
        self.skylines.get(&granularity)
    }

    /// Number of candles stored at `granularity`.
    #[must_use]
    pub fn len(&self, granularity: Granularity) -> usize {
        self.series.get(&granularity).map_or(0, Vec::len)
    }

    /// Returns `true` if no granularity holds data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.values().all(Vec::is_empty)
    }

    /// Drop every series and skyline.
    pub fn clear(&mut self) {
        self.series.clear();
        self.skylines.clear();
    }
}
