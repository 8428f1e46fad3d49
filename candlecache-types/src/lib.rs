//! Candlecache data transfer objects, configuration primitives and errors.
#![warn(missing_docs)]

mod candle;
mod config;
mod error;
mod granularity;
mod range;

pub use candle::{Candle, RawCandle};
pub use config::{CacheConfig, ThrottleScope};
pub use error::CacheError;
pub use granularity::Granularity;
pub use range::TimeRange;
