//! Notification category enumeration and presentation defaults.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Icon used when the category has no entry in the lookup table.
pub const FALLBACK_ICON: &str = "information-circle";
/// Colour used when the category has no entry in the lookup table.
pub const FALLBACK_COLOR: &str = "blue";

/// What a notification is about. Drives the default icon and colour.
///
/// The set is closed for presentation purposes but open on the wire:
/// producers may send a category this build does not know, which is kept
/// verbatim as [`NotificationCategory::Other`] and rendered with the
/// fallback icon and colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationCategory {
    /// An operation succeeded.
    Success,
    /// An operation failed.
    Error,
    /// Something needs attention.
    Warning,
    /// Neutral information.
    Info,
    /// An appointment is about to start.
    AppointmentReminder,
    /// An appointment was created, moved, or cancelled.
    AppointmentUpdate,
    /// A patient record changed.
    PatientUpdate,
    /// A system-level alert.
    SystemAlert,
    /// An announcement to a whole clinic.
    ClinicAnnouncement,
    /// A peer review changed state.
    PeerReviewUpdate,
    /// Stock fell below its threshold.
    InventoryAlert,
    /// A category this build has no presentation entry for.
    Other(String),
}

impl NotificationCategory {
    /// Return the category's wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::AppointmentReminder => "appointment_reminder",
            Self::AppointmentUpdate => "appointment_update",
            Self::PatientUpdate => "patient_update",
            Self::SystemAlert => "system_alert",
            Self::ClinicAnnouncement => "clinic_announcement",
            Self::PeerReviewUpdate => "peer_review_update",
            Self::InventoryAlert => "inventory_alert",
            Self::Other(name) => name,
        }
    }

    /// Default icon for this category.
    pub fn default_icon(&self) -> &'static str {
        match self {
            Self::Success => "check-circle",
            Self::Error => "x-circle",
            Self::Warning | Self::SystemAlert => "exclamation-triangle",
            Self::Info => "information-circle",
            Self::AppointmentReminder => "clock",
            Self::AppointmentUpdate => "calendar",
            Self::PatientUpdate => "user",
            Self::ClinicAnnouncement => "megaphone",
            Self::PeerReviewUpdate => "users",
            Self::InventoryAlert => "box",
            Self::Other(_) => FALLBACK_ICON,
        }
    }

    /// Default colour for this category.
    pub fn default_color(&self) -> &'static str {
        match self {
            Self::Success | Self::PatientUpdate => "green",
            Self::Error | Self::SystemAlert => "red",
            Self::Warning | Self::InventoryAlert => "yellow",
            Self::Info | Self::AppointmentReminder | Self::ClinicAnnouncement => "blue",
            Self::AppointmentUpdate | Self::PeerReviewUpdate => "purple",
            Self::Other(_) => FALLBACK_COLOR,
        }
    }
}

impl Default for NotificationCategory {
    fn default() -> Self {
        Self::Info
    }
}

impl FromStr for NotificationCategory {
    type Err = std::convert::Infallible;

    /// Parse a wire name. Kebab-case (`inventory-alert`) is accepted as an
    /// alias of the snake_case form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        Ok(match normalized.as_str() {
            "success" => Self::Success,
            "error" => Self::Error,
            "warning" => Self::Warning,
            "info" => Self::Info,
            "appointment_reminder" => Self::AppointmentReminder,
            "appointment_update" => Self::AppointmentUpdate,
            "patient_update" => Self::PatientUpdate,
            "system_alert" => Self::SystemAlert,
            "clinic_announcement" => Self::ClinicAnnouncement,
            "peer_review_update" => Self::PeerReviewUpdate,
            "inventory_alert" => Self::InventoryAlert,
            _ => Self::Other(s.trim().to_string()),
        })
    }
}

impl From<&str> for NotificationCategory {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(category) => category,
            Err(never) => match never {},
        }
    }
}

impl From<String> for NotificationCategory {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for NotificationCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for NotificationCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_alert_defaults() {
        let category = NotificationCategory::from("inventory-alert");
        assert_eq!(category, NotificationCategory::InventoryAlert);
        assert_eq!(category.default_icon(), "box");
        assert_eq!(category.default_color(), "yellow");
    }

    #[test]
    fn test_lookup_table() {
        let cases = [
            ("success", "check-circle", "green"),
            ("error", "x-circle", "red"),
            ("warning", "exclamation-triangle", "yellow"),
            ("info", "information-circle", "blue"),
            ("appointment_reminder", "clock", "blue"),
            ("appointment_update", "calendar", "purple"),
            ("patient_update", "user", "green"),
            ("system_alert", "exclamation-triangle", "red"),
            ("clinic_announcement", "megaphone", "blue"),
            ("peer_review_update", "users", "purple"),
        ];
        for (name, icon, color) in cases {
            let category = NotificationCategory::from(name);
            assert_eq!(category.as_str(), name);
            assert_eq!(category.default_icon(), icon, "icon for {name}");
            assert_eq!(category.default_color(), color, "color for {name}");
        }
    }

    #[test]
    fn test_unknown_category_is_preserved() {
        let category = NotificationCategory::from("lab_result");
        assert_eq!(category, NotificationCategory::Other("lab_result".to_string()));
        assert_eq!(category.default_icon(), FALLBACK_ICON);
        assert_eq!(category.default_color(), FALLBACK_COLOR);

        let json = serde_json::to_string(&category).expect("serialize");
        assert_eq!(json, "\"lab_result\"");
    }

    #[test]
    fn test_serde_uses_wire_name() {
        let json = serde_json::to_string(&NotificationCategory::PeerReviewUpdate).expect("ser");
        assert_eq!(json, "\"peer_review_update\"");
        let parsed: NotificationCategory =
            serde_json::from_str("\"appointment_reminder\"").expect("de");
        assert_eq!(parsed, NotificationCategory::AppointmentReminder);
    }
}
