use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use candlecache_core::{CacheError, CandleSource, Granularity, RawCandle, TimeRange};

use crate::fixtures::candles::synthesize;

/// Instruction for how a `fetch` call should behave.
#[derive(Clone)]
pub enum MockBehavior {
    /// Synthesize deterministic candles for the requested window.
    Synthesize,
    /// Return the provided candles immediately.
    Return(Vec<RawCandle>),
    /// Synthesize candles, then strip the timestamp from the first one.
    OmitTimestamps,
    /// Fail immediately with the provided error.
    Fail(CacheError),
    /// Hang indefinitely (simulate a timeout).
    Hang,
}

#[derive(Default)]
struct InternalState {
    default_behavior: Option<MockBehavior>,
    window_rules: HashMap<DateTime<Utc>, MockBehavior>,
    requests: Vec<(TimeRange, Granularity)>,
}

/// Controller handle used by tests to drive the dynamic mock from the outside.
pub struct DynamicMockController {
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockController {
    /// Set the behavior for calls without a window-specific rule.
    pub async fn set_default_behavior(&self, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.default_behavior = Some(behavior);
    }

    /// Set the behavior for the window starting at `window_start`.
    pub async fn set_window_behavior(&self, window_start: DateTime<Utc>, behavior: MockBehavior) {
        let mut guard = self.state.lock().await;
        guard.window_rules.insert(window_start, behavior);
    }

    /// Return a copy of the request log, in arrival order.
    pub async fn requests(&self) -> Vec<(TimeRange, Granularity)> {
        let guard = self.state.lock().await;
        guard.requests.clone()
    }

    /// Number of `fetch` calls received so far.
    pub async fn call_count(&self) -> usize {
        self.state.lock().await.requests.len()
    }

    /// Clear all configured behaviors and the request log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.default_behavior = None;
        guard.window_rules.clear();
        guard.requests.clear();
    }
}

/// A source that defers all behavior to an external controller.
///
/// Without any configured rule every call synthesizes candles, like
/// [`MockSource`](crate::MockSource).
pub struct DynamicMockSource {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl DynamicMockSource {
    /// Create a new dynamic mock source and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<dyn CandleSource>, DynamicMockController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = DynamicMockController {
            state: Arc::clone(&state),
        };
        let me = Arc::new(Self { name, state });
        (me as Arc<dyn CandleSource>, controller)
    }
}

#[async_trait]
impl CandleSource for DynamicMockSource {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn fetch(
        &self,
        window: TimeRange,
        granularity: Granularity,
    ) -> Result<Vec<RawCandle>, CacheError> {
        // Log the request and snapshot the behavior without holding the lock across await points
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push((window, granularity));
            guard
                .window_rules
                .get(&window.start)
                .or(guard.default_behavior.as_ref())
                .cloned()
        };

        match behavior.unwrap_or(MockBehavior::Synthesize) {
            MockBehavior::Synthesize => Ok(synthesize(window, granularity)),
            MockBehavior::Return(candles) => Ok(candles),
            MockBehavior::OmitTimestamps => {
                let mut candles = synthesize(window, granularity);
                if let Some(first) = candles.first_mut() {
                    first.ts = None;
                }
                Ok(candles)
            }
            MockBehavior::Fail(e) => Err(e),
            MockBehavior::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
