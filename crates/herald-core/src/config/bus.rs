//! Message bus configuration for live push.

use serde::{Deserialize, Serialize};

/// Which bus carries published notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusProvider {
    /// In-process broadcast channels.
    #[default]
    Memory,
    /// Redis `PUBLISH` (requires the `redis-bus` feature).
    Redis,
    /// No bus; publishing is skipped and logged.
    None,
}

/// Bus client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Selected bus provider.
    #[serde(default)]
    pub provider: BusProvider,
    /// Redis connection URL, used when `provider = "redis"`.
    #[serde(default = "default_redis_url")]
    pub redis_url: String,
    /// Buffer size of each in-process subject channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Optional namespace joined in front of every subject with `/`.
    #[serde(default)]
    pub subject_prefix: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            provider: BusProvider::default(),
            redis_url: default_redis_url(),
            channel_buffer_size: default_channel_buffer(),
            subject_prefix: String::new(),
        }
    }
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

fn default_channel_buffer() -> usize {
    256
}
