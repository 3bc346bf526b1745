//! Distribution publisher: turns a stored notification into one bus message.

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use herald_core::result::AppResult;
use herald_entity::Notification;

use crate::bus::BusClient;
use crate::message::NotificationMessage;
use crate::subject::Subject;

/// Publishes notifications on the subject selected by their scope.
///
/// Publishing is best-effort. Failures are logged with the notification id
/// and subject, returned to direct callers (the sweep needs to know), and
/// never retried here.
#[derive(Debug, Clone)]
pub struct DistributionPublisher {
    /// Bus the messages go out on.
    client: BusClient,
}

impl DistributionPublisher {
    /// Create a publisher over a bus client.
    pub fn new(client: BusClient) -> Self {
        Self { client }
    }

    /// The underlying bus client.
    pub fn client(&self) -> &BusClient {
        &self.client
    }

    /// The full subject string a notification is published on.
    pub fn subject_for(&self, notification: &Notification) -> String {
        Subject::for_scope(&notification.scope()).with_prefix(self.client.subject_prefix())
    }

    /// Publish one notification and wait for the bus to accept it.
    ///
    /// Returns the subject it went out on.
    pub async fn publish(&self, notification: &Notification) -> AppResult<String> {
        let subject = self.subject_for(notification);
        let outcome = async {
            let payload = NotificationMessage::from(notification).to_json()?;
            self.client.publish(&subject, &payload).await
        }
        .await;

        match outcome {
            Ok(receivers) => {
                debug!(
                    notification_id = %notification.id,
                    subject = %subject,
                    receivers,
                    bus = self.client.backend_name(),
                    "Published notification"
                );
                Ok(subject)
            }
            Err(e) => {
                warn!(
                    notification_id = %notification.id,
                    subject = %subject,
                    error = %e,
                    "Failed to publish notification"
                );
                Err(e)
            }
        }
    }

    /// Publish on an independent task. The caller does not wait and never
    /// sees the outcome; failures are only logged.
    pub fn spawn_publish(&self, notification: Notification) -> JoinHandle<()> {
        let publisher = self.clone();
        tokio::spawn(async move {
            let _ = publisher.publish(&notification).await;
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use herald_core::error::ErrorKind;
    use herald_core::types::id::{GroupId, NotificationId};
    use herald_entity::{NewNotification, NotificationCategory, NotificationScope};

    use super::*;
    use crate::bus::MemoryBus;

    fn notification(scope: NotificationScope) -> Notification {
        NewNotification {
            title: "Appointment Cancelled".to_string(),
            body: "The 14:00 appointment was cancelled".to_string(),
            category: NotificationCategory::AppointmentUpdate,
            icon: None,
            color: None,
            scope,
            payload: None,
            actions: Vec::new(),
            scheduled_for: None,
            expires_at: None,
            created_by: None,
        }
        .into_notification(NotificationId::new(), Utc::now())
    }

    #[tokio::test]
    async fn test_publish_goes_to_group_subject() {
        let bus = Arc::new(MemoryBus::new(8));
        let publisher =
            DistributionPublisher::new(BusClient::from_bus(bus.clone()).with_prefix("clinic-a"));
        let group = GroupId::new();
        let n = notification(NotificationScope::Group(group));
        let mut rx = bus.subscribe(&format!("clinic-a/group/{group}"));
        let mut system_rx = bus.subscribe("clinic-a/system");

        let subject = publisher.publish(&n).await.expect("publish");
        assert_eq!(subject, format!("clinic-a/group/{group}"));

        let received: NotificationMessage =
            serde_json::from_str(&rx.recv().await.expect("recv")).expect("decode");
        assert_eq!(received.id, n.id);
        assert_eq!(received.icon, "calendar");
        assert!(system_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_unconfigured_bus_fails_without_panicking() {
        let publisher = DistributionPublisher::new(BusClient::unconfigured());
        let n = notification(NotificationScope::System);
        let err = publisher.publish(&n).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::DistributionFailure);

        publisher.spawn_publish(n).await.expect("task completes");
    }
}
