use tokio::sync::broadcast;

/// Notification published by the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum CacheEvent {
    /// A batch was merged into the store. Carries no payload; subscribers
    /// re-query to learn what changed.
    DataModified,
}

/// Publish/subscribe hub for [`CacheEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<CacheEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per lagging subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        // broadcast::channel panics on zero capacity
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Register a new subscriber. Only events published afterwards are received.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.tx.subscribe()
    }

    /// Publish `event` to all current subscribers and return how many were reached.
    ///
    /// Publishing with no subscribers is not an error.
    pub fn publish(&self, event: CacheEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::new(4);
        let mut rx = bus.subscribe();
        assert_eq!(bus.publish(CacheEvent::DataModified), 1);
        assert_eq!(rx.recv().await.unwrap(), CacheEvent::DataModified);
    }

    #[test]
    fn publish_without_subscribers_is_noop() {
        let bus = EventBus::new(0);
        assert_eq!(bus.publish(CacheEvent::DataModified), 0);
    }
}
