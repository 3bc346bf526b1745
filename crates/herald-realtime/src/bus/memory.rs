//! In-memory pub/sub for single-node deployments.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::broadcast;

use herald_core::result::AppResult;
use herald_core::traits::bus::MessageBus;

/// In-process bus built on one `tokio::sync::broadcast` channel per subject.
#[derive(Debug)]
pub struct MemoryBus {
    /// Subject → broadcast sender.
    channels: DashMap<String, broadcast::Sender<String>>,
    /// Buffer size for new channels.
    buffer_size: usize,
}

impl MemoryBus {
    /// Create a new in-memory bus.
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: DashMap::new(),
            buffer_size: buffer_size.max(1),
        }
    }

    /// Subscribe to a subject, returns a receiver.
    pub fn subscribe(&self, subject: &str) -> broadcast::Receiver<String> {
        self.channels
            .entry(subject.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0)
            .subscribe()
    }

    /// Number of live receivers on a subject.
    pub fn subscriber_count(&self, subject: &str) -> usize {
        self.channels
            .get(subject)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

#[async_trait]
impl MessageBus for MemoryBus {
    async fn publish(&self, subject: &str, payload: &str) -> AppResult<u64> {
        let delivered = match self.channels.get(subject) {
            // A send error only means nobody is listening right now.
            Some(tx) => tx.send(payload.to_string()).unwrap_or(0),
            None => 0,
        };
        Ok(delivered as u64)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscribers_of_that_subject_only() {
        let bus = MemoryBus::new(8);
        let mut user_rx = bus.subscribe("user/a");
        let mut other_rx = bus.subscribe("user/b");

        assert_eq!(bus.publish("user/a", "hello").await.expect("publish"), 1);
        assert_eq!(user_rx.recv().await.expect("recv"), "hello");
        assert!(other_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_not_an_error() {
        let bus = MemoryBus::new(8);
        assert_eq!(bus.publish("system", "{}").await.expect("publish"), 0);
        drop(bus.subscribe("system"));
        assert_eq!(bus.subscriber_count("system"), 0);
        assert_eq!(bus.publish("system", "{}").await.expect("publish"), 0);
    }
}
