use candlecache_core::{Granularity, TimeRange};
use chrono::{DateTime, TimeDelta, Utc};

/// Split `[start, end]` into the source windows a backfill requests.
///
/// The span holds `max(1, ceil((end - start) / granularity))` buckets, cut into
/// `ceil(buckets / max_candles)` windows of `max_candles` buckets each. Window
/// `k` starts at `start + k * max_candles * granularity` and ends at the next
/// window's start, clamped to `end`. Both ends are inclusive, so neighbouring
/// windows share one boundary bucket and the coverage they produce merges
/// into a single contiguous range.
///
/// A `max_candles` of zero is treated as one.
#[must_use]
pub fn plan_batches(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    granularity: Granularity,
    max_candles: usize,
) -> Vec<TimeRange> {
    let buckets = granularity.buckets_between(start, end).max(1);
    let per_window = u64::try_from(max_candles.max(1)).unwrap_or(u64::MAX);
    let windows = buckets.div_ceil(per_window);
    let frame_ms = per_window.saturating_mul(granularity.as_millis());

    (0..windows)
        .map(|k| {
            let offset = i64::try_from(k.saturating_mul(frame_ms)).unwrap_or(i64::MAX);
            let frame_start = start
                .checked_add_signed(TimeDelta::milliseconds(offset))
                .map_or(end, |s| s.min(end));
            let frame_end = frame_start
                .checked_add_signed(TimeDelta::milliseconds(
                    i64::try_from(frame_ms).unwrap_or(i64::MAX),
                ))
                .map_or(end, |e| e.min(end));
            TimeRange::new(frame_start, frame_end)
        })
        .collect()
}
