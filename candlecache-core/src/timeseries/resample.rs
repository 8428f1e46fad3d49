use candlecache_types::{CacheError, Candle, Granularity};
use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;

struct BucketAgg {
    ts: DateTime<Utc>,
    open: Decimal,
    high: Decimal,
    low: Decimal,
    close: Decimal,
    volume: Decimal,
    trades: Option<u64>,
}

impl BucketAgg {
    fn start(ts: DateTime<Utc>, c: Candle) -> Self {
        Self {
            ts,
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
            trades: c.trades,
        }
    }

    fn absorb(&mut self, c: Candle) {
        self.high = self.high.max(c.high);
        self.low = self.low.min(c.low);
        self.close = c.close;
        self.volume += c.volume;
        if let Some(n) = c.trades {
            self.trades = Some(self.trades.unwrap_or(0).saturating_add(n));
        }
    }

    fn finish(self) -> Candle {
        Candle {
            ts: self.ts,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            trades: self.trades,
        }
    }
}

/// Generic resampler that groups ascending candles by a bucket function and
/// aggregates OHLCV within each bucket.
fn resample_by<F>(mut candles: Vec<Candle>, bucket_of: F) -> Vec<Candle>
where
    F: Fn(DateTime<Utc>) -> DateTime<Utc>,
{
    candles.sort_by_key(|c| c.ts);

    let mut out: Vec<Candle> = Vec::new();
    let mut iter = candles.into_iter();
    let Some(first) = iter.next() else {
        return out;
    };
    let mut cur = BucketAgg::start(bucket_of(first.ts), first);

    for c in iter {
        let bucket = bucket_of(c.ts);
        if bucket == cur.ts {
            cur.absorb(c);
        } else {
            out.push(std::mem::replace(&mut cur, BucketAgg::start(bucket, c)).finish());
        }
    }
    out.push(cur.finish());
    out
}

/// Aggregate `source`-granularity candles into `target`-granularity candles.
///
/// Buckets are `target` wide and anchored at the first candle, so a complete
/// run of `target / source` consecutive candles becomes one output candle:
/// - Open = first open, Close = last close
/// - High = max high, Low = min low
/// - Volume = sum of volumes
/// - Trades = sum of known trade counts (`None` if no input reports one)
///
/// Grouping is by time offset from the earliest candle, not by counting
/// `target / source` inputs; the two agree on gap-free input. Missing
/// sub-candles shrink a bucket rather than shifting later buckets.
/// Inputs are never mutated; equal granularities return the input unchanged.
///
/// # Errors
/// Returns `CacheError::InvalidArg` if `source` does not evenly divide `target`.
pub fn downsample(
    candles: Vec<Candle>,
    source: Granularity,
    target: Granularity,
) -> Result<Vec<Candle>, CacheError> {
    if source == target {
        return Ok(candles);
    }
    if !source.divides(target) {
        return Err(CacheError::InvalidArg(format!(
            "cannot downsample {source} candles into {target} buckets"
        )));
    }
    let Some(anchor) = candles.iter().map(|c| c.ts).min() else {
        return Ok(Vec::new());
    };
    let width = target.as_duration().num_milliseconds();

    Ok(resample_by(candles, move |ts| {
        let offset = (ts - anchor).num_milliseconds();
        anchor + TimeDelta::milliseconds(offset - offset.rem_euclid(width))
    }))
}
