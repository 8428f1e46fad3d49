use std::future::Future;

use async_trait::async_trait;
use candlecache_types::{CacheError, Granularity, RawCandle, TimeRange};

/// Upstream provider of raw candles used to backfill the cache.
///
/// Implementations return the candles whose bucket start lies inside `window`
/// (both ends inclusive). Returning fewer or more candles is tolerated, and
/// ordering is not required: the cache re-sorts every response before merging.
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Stable name used in error messages and logs.
    fn name(&self) -> &'static str;

    /// Fetch raw candles for `window` at `granularity`.
    ///
    /// # Errors
    /// Any error fails the enclosing backfill.
    async fn fetch(
        &self,
        window: TimeRange,
        granularity: Granularity,
    ) -> Result<Vec<RawCandle>, CacheError>;
}

/// Adaptor turning an async closure into a [`CandleSource`].
///
/// ```rust,ignore
/// let source = FnSource::new("static", |_window, _g| async { Ok(vec![]) });
/// ```
pub struct FnSource<F> {
    name: &'static str,
    f: F,
}

impl<F> FnSource<F> {
    /// Wrap `f` under the given source name.
    pub const fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

#[async_trait]
impl<F, Fut> CandleSource for FnSource<F>
where
    F: Fn(TimeRange, Granularity) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Vec<RawCandle>, CacheError>> + Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(
        &self,
        window: TimeRange,
        granularity: Granularity,
    ) -> Result<Vec<RawCandle>, CacheError> {
        (self.f)(window, granularity).await
    }
}
