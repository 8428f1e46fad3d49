//! Timestamp-based admission control for queries.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use candlecache_core::{Granularity, ThrottleScope};
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum GateKey {
    Global,
    Granularity(Granularity),
}

/// Cooldown gate: a query is admitted only if no other query sharing its scope
/// key was admitted within the cooldown window. Rejected queries are dropped,
/// not queued.
pub struct AdmissionGate {
    cooldown: Duration,
    scope: ThrottleScope,
    last_admitted: Mutex<HashMap<GateKey, Instant>>,
}

impl AdmissionGate {
    /// Create a gate with the given cooldown and scope.
    #[must_use]
    pub fn new(cooldown: Duration, scope: ThrottleScope) -> Self {
        Self {
            cooldown,
            scope,
            last_admitted: Mutex::new(HashMap::new()),
        }
    }

    const fn key(&self, granularity: Granularity) -> GateKey {
        match self.scope {
            ThrottleScope::PerGranularity => GateKey::Granularity(granularity),
            _ => GateKey::Global,
        }
    }

    /// Admit a query for `granularity` and start its cooldown, or return
    /// `false` if a cooldown covering it is still active.
    pub fn try_admit(&self, granularity: Granularity) -> bool {
        if self.cooldown.is_zero() {
            return true;
        }
        let key = self.key(granularity);
        let now = Instant::now();
        let mut last = self
            .last_admitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let admitted = last
            .get(&key)
            .is_none_or(|&at| now.duration_since(at) >= self.cooldown);
        if admitted {
            last.insert(key, now);
        }
        admitted
    }

    /// Time left before a query for `granularity` would be admitted.
    #[must_use]
    pub fn remaining(&self, granularity: Granularity) -> Duration {
        let key = self.key(granularity);
        let last = self
            .last_admitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        last.get(&key).map_or(Duration::ZERO, |&at| {
            self.cooldown.saturating_sub(Instant::now().duration_since(at))
        })
    }

    /// Forget every active cooldown.
    pub fn reset(&self) {
        self.last_admitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
