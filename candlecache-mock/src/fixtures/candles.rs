use candlecache_core::{Granularity, RawCandle, TimeRange};
use chrono::DateTime;
use rust_decimal::Decimal;

/// Deterministic candle for the bucket starting at `ts_ms`.
///
/// Prices cycle with the bucket index so neighbouring candles differ and any
/// aggregation over them is easy to predict in tests.
#[must_use]
pub fn candle_at(ts_ms: i64, granularity: Granularity) -> RawCandle {
    let g = i64::try_from(granularity.as_millis()).unwrap_or(i64::MAX);
    let index = ts_ms.div_euclid(g);
    let open = Decimal::from(100 + index.rem_euclid(20));
    let close = if index.rem_euclid(2) == 0 {
        open + Decimal::ONE
    } else {
        open - Decimal::ONE
    };
    RawCandle {
        ts: DateTime::from_timestamp_millis(ts_ms),
        open,
        high: open.max(close) + Decimal::TWO,
        low: open.min(close) - Decimal::ONE,
        close,
        volume: Decimal::from(1_000 + index.rem_euclid(7) * 10),
        trades: u64::try_from(10 + index.rem_euclid(5)).ok(),
    }
}

/// One candle per bucket whose start, aligned to multiples of `granularity`
/// since the epoch, lies inside `window` (both ends inclusive).
#[must_use]
pub fn synthesize(window: TimeRange, granularity: Granularity) -> Vec<RawCandle> {
    let g = i64::try_from(granularity.as_millis()).unwrap_or(i64::MAX);
    let start = window.start.timestamp_millis();
    let end = window.end.timestamp_millis();
    let mut ts = start.div_euclid(g).saturating_mul(g);
    if ts < start {
        ts = ts.saturating_add(g);
    }

    let mut out = Vec::new();
    while ts <= end {
        out.push(candle_at(ts, granularity));
        let Some(next) = ts.checked_add(g) else {
            break;
        };
        ts = next;
    }
    out
}
