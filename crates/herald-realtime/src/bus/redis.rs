//! Redis pub/sub bus for multi-node deployments.

use async_trait::async_trait;
use redis::Client;
use redis::aio::ConnectionManager;
use tracing::info;

use herald_core::error::{AppError, ErrorKind};
use herald_core::result::AppResult;
use herald_core::traits::bus::MessageBus;

/// Bus that relays every message through Redis `PUBLISH`.
#[derive(Clone)]
pub struct RedisBus {
    /// Redis connection manager (pooled, reconnecting).
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBus").finish_non_exhaustive()
    }
}

impl RedisBus {
    /// Connect to Redis.
    pub async fn connect(url: &str) -> AppResult<Self> {
        info!(url = %mask_redis_url(url), "Connecting to Redis bus");

        let client = Client::open(url).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid Redis URL", e)
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::DistributionFailure,
                "Failed to connect to Redis",
                e,
            )
        })?;

        info!("Successfully connected to Redis bus");
        Ok(Self { conn })
    }
}

#[async_trait]
impl MessageBus for RedisBus {
    async fn publish(&self, subject: &str, payload: &str) -> AppResult<u64> {
        let mut conn = self.conn.clone();
        let receivers: i64 = redis::cmd("PUBLISH")
            .arg(subject)
            .arg(payload)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::DistributionFailure,
                    format!("Redis PUBLISH to '{subject}' failed"),
                    e,
                )
            })?;
        Ok(receivers.max(0) as u64)
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

/// Mask password in Redis URL for safe logging.
fn mask_redis_url(url: &str) -> String {
    if let Some(at_pos) = url.find('@') {
        if let Some(colon_pos) = url[..at_pos].rfind(':') {
            let scheme_end = url.find("://").map(|p| p + 3).unwrap_or(0);
            if colon_pos > scheme_end {
                return format!("{}:****@{}", &url[..colon_pos], &url[at_pos + 1..]);
            }
        }
    }
    url.to_string()
}
