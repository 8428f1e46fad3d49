use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use candlecache_core::{CacheError, CandleSource, Granularity, RawCandle, TimeRange};
use tokio::sync::Mutex;

mod dynamic;
mod fixtures;

pub use dynamic::{DynamicMockController, DynamicMockSource, MockBehavior};
pub use fixtures::candles::{candle_at, synthesize};

/// Mock source for CI-safe tests and examples. Synthesizes deterministic
/// candles for every requested window and logs each call.
pub struct MockSource {
    latency: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<(TimeRange, Granularity)>>,
}

impl Default for MockSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockSource {
    #[must_use]
    pub fn new() -> Self {
        Self {
            latency: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Delay every response by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Number of `fetch` calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Windows requested so far, in arrival order.
    pub async fn requests(&self) -> Vec<(TimeRange, Granularity)> {
        self.requests.lock().await.clone()
    }

    /// Forget the call log.
    pub async fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
        self.requests.lock().await.clear();
    }
}

#[async_trait]
impl CandleSource for MockSource {
    fn name(&self) -> &'static str {
        "candlecache-mock"
    }

    async fn fetch(
        &self,
        window: TimeRange,
        granularity: Granularity,
    ) -> Result<Vec<RawCandle>, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push((window, granularity));
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        Ok(synthesize(window, granularity))
    }
}
