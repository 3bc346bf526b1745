//! Bus client that dispatches to the configured backend.

use std::sync::Arc;

use tracing::{info, warn};

use herald_core::config::{BusConfig, BusProvider};
use herald_core::error::AppError;
use herald_core::result::AppResult;
use herald_core::traits::bus::MessageBus;

use super::memory::MemoryBus;

/// Handle to the message bus, constructed once at startup and injected.
///
/// A client without a backend is a valid state: publishing through it
/// fails with `DistributionFailure` instead of panicking, and callers log
/// and move on.
#[derive(Debug, Clone, Default)]
pub struct BusClient {
    /// The selected backend, `None` when not configured.
    inner: Option<Arc<dyn MessageBus>>,
    /// Namespace joined in front of every subject.
    subject_prefix: String,
}

impl BusClient {
    /// Create a bus client from configuration.
    pub async fn from_config(config: &BusConfig) -> AppResult<Self> {
        let inner: Option<Arc<dyn MessageBus>> = match config.provider {
            BusProvider::Memory => {
                info!("Initializing in-memory message bus");
                Some(Arc::new(MemoryBus::new(config.channel_buffer_size)))
            }
            #[cfg(feature = "redis-bus")]
            BusProvider::Redis => {
                info!("Initializing Redis message bus");
                Some(Arc::new(super::redis::RedisBus::connect(&config.redis_url).await?))
            }
            #[cfg(not(feature = "redis-bus"))]
            BusProvider::Redis => {
                return Err(AppError::configuration(
                    "bus.provider = \"redis\" requires the `redis-bus` feature",
                ));
            }
            BusProvider::None => {
                warn!("No message bus configured; live push is disabled");
                None
            }
        };

        Ok(Self {
            inner,
            subject_prefix: config.subject_prefix.clone(),
        })
    }

    /// Create a client from an existing backend (for testing and embedding).
    pub fn from_bus(bus: Arc<dyn MessageBus>) -> Self {
        Self {
            inner: Some(bus),
            subject_prefix: String::new(),
        }
    }

    /// A client with no backend.
    pub fn unconfigured() -> Self {
        Self::default()
    }

    /// Set the subject namespace.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.subject_prefix = prefix.into();
        self
    }

    /// The subject namespace, possibly empty.
    pub fn subject_prefix(&self) -> &str {
        &self.subject_prefix
    }

    /// Whether a backend is configured.
    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    /// Backend name for logs.
    pub fn backend_name(&self) -> &'static str {
        self.inner.as_ref().map(|bus| bus.name()).unwrap_or("none")
    }

    /// Publish a payload on an already-prefixed subject.
    pub async fn publish(&self, subject: &str, payload: &str) -> AppResult<u64> {
        match &self.inner {
            Some(bus) => bus.publish(subject, payload).await,
            None => Err(AppError::distribution("Message bus is not configured")),
        }
    }
}

#[cfg(test)]
mod tests {
    use herald_core::error::ErrorKind;

    use super::*;

    #[tokio::test]
    async fn test_unconfigured_client_short_circuits() {
        let client = BusClient::unconfigured();
        assert!(!client.is_configured());
        let err = client.publish("system", "{}").await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::DistributionFailure);
    }

    #[tokio::test]
    async fn test_from_config_selects_provider() {
        let mut config = BusConfig::default();
        let client = BusClient::from_config(&config).await.expect("memory");
        assert_eq!(client.backend_name(), "memory");

        config.provider = BusProvider::None;
        config.subject_prefix = "clinic-a".to_string();
        let client = BusClient::from_config(&config).await.expect("none");
        assert!(!client.is_configured());
        assert_eq!(client.subject_prefix(), "clinic-a");
    }
}
