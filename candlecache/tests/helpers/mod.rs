// Re-export helpers so tests can `use helpers::*;`
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use candlecache::{Candle, CandleSource, Granularity, RawCandle, TimeRange, TimeSeriesCache};
use candlecache_mock::synthesize;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Candles per source call used by the batching tests.
pub const MAX: usize = 10;

/// Construct a UTC `DateTime` from epoch milliseconds.
pub fn t(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).expect("valid timestamp")
}

/// Construct a granularity from milliseconds.
pub fn g(ms: u64) -> Granularity {
    Granularity::new(ms).expect("non-zero granularity")
}

/// Flat candle with every price equal to `px`.
pub fn raw(ts_ms: i64, px: i64) -> RawCandle {
    let px = Decimal::from(px);
    RawCandle {
        ts: Some(t(ts_ms)),
        open: px,
        high: px,
        low: px,
        close: px,
        volume: Decimal::ONE,
        trades: None,
    }
}

/// What the mock sources synthesize for `[start, end]`, already validated.
pub fn expected(start: i64, end: i64, granularity: Granularity) -> Vec<Candle> {
    synthesize(TimeRange::new(t(start), t(end)), granularity)
        .into_iter()
        .map(|c| Candle::try_from(c).expect("synthesized candles carry timestamps"))
        .collect()
}

/// Cache over `source` with throttling disabled and `MAX` candles per call.
pub fn cache_over(source: Arc<dyn CandleSource>) -> TimeSeriesCache {
    TimeSeriesCache::builder()
        .source(source)
        .max_candles_per_request(MAX)
        .cooldown(Duration::ZERO)
        .build()
        .expect("valid cache config")
}
