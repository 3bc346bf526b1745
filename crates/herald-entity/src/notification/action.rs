//! Client-actionable follow-ups attached to a notification.

use serde::{Deserialize, Serialize};

/// A follow-up the client can offer next to a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Button label.
    pub label: String,
    /// Client-side action key (e.g. `"view-appointment"`).
    pub action: String,
    /// Target URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// HTTP method when the action calls an endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Extra data sent with the action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    /// Visual style: `primary`, `secondary`, or `danger`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl NotificationAction {
    /// Create an action with a label and key.
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
            url: None,
            method: None,
            payload: None,
            style: None,
        }
    }

    /// Set the target URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the HTTP method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    /// Attach a payload.
    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Set the visual style.
    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_fields_are_omitted() {
        let action = NotificationAction::new("View Patient", "view-patient").url("/patients/7");
        let json = serde_json::to_value(&action).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "label": "View Patient",
                "action": "view-patient",
                "url": "/patients/7",
            })
        );
    }
}
