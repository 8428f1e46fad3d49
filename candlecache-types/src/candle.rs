//! Candle records as stored by the cache and as returned by sources.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::CacheError;

/// One OHLCV bucket keyed by its bucket-start timestamp.
///
/// `ts` is the identity of the candle once stored; the price and volume fields
/// may later be overwritten by a fresher insert for the same bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket start (UTC).
    pub ts: DateTime<Utc>,
    /// First traded price in the bucket.
    pub open: Decimal,
    /// Highest traded price in the bucket.
    pub high: Decimal,
    /// Lowest traded price in the bucket.
    pub low: Decimal,
    /// Last traded price in the bucket.
    pub close: Decimal,
    /// Traded volume in the bucket.
    pub volume: Decimal,
    /// Number of trades, when the source reports it.
    pub trades: Option<u64>,
}

/// A candle as delivered by an upstream source, before validation.
///
/// Sources may omit the timestamp; such records cannot be placed in a bucket and
/// cause the whole batch to be rejected by [`RawCandle::validate_batch`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCandle {
    /// Bucket start (UTC), if known.
    pub ts: Option<DateTime<Utc>>,
    /// First traded price in the bucket.
    pub open: Decimal,
    /// Highest traded price in the bucket.
    pub high: Decimal,
    /// Lowest traded price in the bucket.
    pub low: Decimal,
    /// Last traded price in the bucket.
    pub close: Decimal,
    /// Traded volume in the bucket.
    pub volume: Decimal,
    /// Number of trades, when the source reports it.
    pub trades: Option<u64>,
}

impl RawCandle {
    /// Validate a whole batch, converting every record into a [`Candle`].
    ///
    /// # Errors
    /// Returns `CacheError::Validation` naming the first record without a
    /// timestamp. No partial result is produced.
    pub fn validate_batch(batch: Vec<Self>) -> Result<Vec<Candle>, CacheError> {
        if let Some(idx) = batch.iter().position(|r| r.ts.is_none()) {
            return Err(CacheError::Validation(format!(
                "all data points must include a timestamp (record {idx} of {} has none)",
                batch.len()
            )));
        }
        batch.into_iter().map(Candle::try_from).collect()
    }
}

impl TryFrom<RawCandle> for Candle {
    type Error = CacheError;

    fn try_from(raw: RawCandle) -> Result<Self, Self::Error> {
        let Some(ts) = raw.ts else {
            return Err(CacheError::Validation(
                "data point is missing its timestamp".into(),
            ));
        };
        Ok(Self {
            ts,
            open: raw.open,
            high: raw.high,
            low: raw.low,
            close: raw.close,
            volume: raw.volume,
            trades: raw.trades,
        })
    }
}

impl From<Candle> for RawCandle {
    fn from(c: Candle) -> Self {
        Self {
            ts: Some(c.ts),
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
            volume: c.volume,
            trades: c.trades,
        }
    }
}
