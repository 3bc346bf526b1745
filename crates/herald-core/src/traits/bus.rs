//! Message bus trait for live-push backends.

use async_trait::async_trait;

use crate::result::AppResult;

/// A publish/subscribe transport carrying serialized notifications.
///
/// Delivery is best-effort. Implementations map their native errors into
/// `DistributionFailure`.
#[async_trait]
pub trait MessageBus: Send + Sync + std::fmt::Debug + 'static {
    /// Publish `payload` on `subject`. Returns how many subscribers
    /// received it, as reported by the backend.
    async fn publish(&self, subject: &str, payload: &str) -> AppResult<u64>;

    /// Short backend name for logs (`"memory"`, `"redis"`).
    fn name(&self) -> &'static str;
}
