//! Convenience builders for the subsystems that raise notifications.
//!
//! Each builder only assembles a [`CreateNotificationRequest`]; callers
//! still go through [`NotificationService::create`] or
//! [`NotificationService::submit`].
//!
//! [`NotificationService::create`]: super::NotificationService::create
//! [`NotificationService::submit`]: super::NotificationService::submit

use serde_json::json;

use herald_core::types::id::{GroupId, UserId};
use herald_entity::{NotificationAction, NotificationCategory};

use super::request::CreateNotificationRequest;

/// What happened to an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentChange {
    /// Newly booked.
    Scheduled,
    /// Called off.
    Cancelled,
    /// Moved to another slot.
    Rescheduled,
    /// Any other edit.
    Updated,
}

impl AppointmentChange {
    /// Parse a producer's update type. Unknown values count as an edit.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "scheduled" => Self::Scheduled,
            "cancelled" => Self::Cancelled,
            "rescheduled" => Self::Rescheduled,
            _ => Self::Updated,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Cancelled => "cancelled",
            Self::Rescheduled => "rescheduled",
            Self::Updated => "updated",
        }
    }
}

/// What happened to a patient record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatientChange {
    /// Newly registered.
    Created,
    /// Any other edit.
    Updated,
}

impl PatientChange {
    /// Parse a producer's update type. Unknown values count as an edit.
    pub fn parse(kind: &str) -> Self {
        match kind {
            "created" => Self::Created,
            _ => Self::Updated,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
        }
    }
}

fn view_appointment(appointment_id: i64) -> NotificationAction {
    NotificationAction::new("View Appointment", "view-appointment")
        .url(format!("/appointments/{appointment_id}"))
}

/// Reminder sent to the treating doctor ahead of an appointment.
pub fn appointment_reminder(
    doctor_id: UserId,
    appointment_id: i64,
    patient_id: i64,
    patient_name: &str,
    minutes_until: u32,
) -> CreateNotificationRequest {
    CreateNotificationRequest::new(
        "Appointment Reminder",
        format!("{patient_name} has an appointment in {minutes_until} minutes"),
        NotificationCategory::AppointmentReminder,
    )
    .for_user(doctor_id)
    .payload(json!({
        "appointment_id": appointment_id,
        "patient_id": patient_id,
        "minutes_until": minutes_until,
    }))
    .action(view_appointment(appointment_id))
}

/// Appointment change announced to the whole clinic.
pub fn appointment_update(
    group_id: GroupId,
    appointment_id: i64,
    patient_id: i64,
    patient_name: &str,
    change: AppointmentChange,
) -> CreateNotificationRequest {
    let (title, body) = match change {
        AppointmentChange::Scheduled => (
            "New Appointment Scheduled",
            format!("Appointment scheduled for {patient_name}"),
        ),
        AppointmentChange::Cancelled => (
            "Appointment Cancelled",
            format!("Appointment with {patient_name} has been cancelled"),
        ),
        AppointmentChange::Rescheduled => (
            "Appointment Rescheduled",
            format!("Appointment with {patient_name} has been rescheduled"),
        ),
        AppointmentChange::Updated => (
            "Appointment Updated",
            format!("Appointment with {patient_name} has been updated"),
        ),
    };

    CreateNotificationRequest::new(title, body, NotificationCategory::AppointmentUpdate)
        .for_group(group_id)
        .payload(json!({
            "appointment_id": appointment_id,
            "patient_id": patient_id,
            "update_type": change.as_str(),
        }))
        .action(view_appointment(appointment_id))
}

/// Patient record change announced to the whole clinic.
pub fn patient_update(
    group_id: GroupId,
    patient_id: i64,
    patient_name: &str,
    change: PatientChange,
) -> CreateNotificationRequest {
    let (title, body) = match change {
        PatientChange::Created => (
            "New Patient Added",
            format!("New patient {patient_name} has been added"),
        ),
        PatientChange::Updated => (
            "Patient Updated",
            format!("Patient {patient_name} has been updated"),
        ),
    };

    CreateNotificationRequest::new(title, body, NotificationCategory::PatientUpdate)
        .for_group(group_id)
        .payload(json!({
            "patient_id": patient_id,
            "update_type": change.as_str(),
        }))
        .action(
            NotificationAction::new("View Patient", "view-patient")
                .url(format!("/patients/{patient_id}")),
        )
}

/// Low-stock alert for a clinic's inventory.
pub fn inventory_alert(
    group_id: GroupId,
    item_id: i64,
    item_name: &str,
    quantity: i64,
    threshold: i64,
) -> CreateNotificationRequest {
    CreateNotificationRequest::new(
        "Low Stock Alert",
        format!("{item_name} is running low ({quantity} left, threshold {threshold})"),
        NotificationCategory::InventoryAlert,
    )
    .for_group(group_id)
    .payload(json!({
        "item_id": item_id,
        "quantity": quantity,
        "threshold": threshold,
    }))
    .action(
        NotificationAction::new("View Inventory", "view-inventory")
            .url(format!("/inventory/{item_id}"))
            .style("primary"),
    )
}

/// Category for a producer's free-form clinic notification kind.
pub fn clinic_category(kind: &str) -> NotificationCategory {
    match kind {
        "inventory" | "inventory_low" | "restock_alert" => NotificationCategory::InventoryAlert,
        "appointment_cancelled" => NotificationCategory::AppointmentUpdate,
        "patient_created" | "patient_registered" => NotificationCategory::PatientUpdate,
        "announcement" => NotificationCategory::ClinicAnnouncement,
        _ => NotificationCategory::Info,
    }
}

/// Free-form notification to every member of a clinic.
pub fn clinic_announcement(
    group_id: GroupId,
    title: &str,
    body: &str,
    kind: &str,
) -> CreateNotificationRequest {
    CreateNotificationRequest::new(title, body, clinic_category(kind)).for_group(group_id)
}

/// Free-form notification to one user.
pub fn user_notification(
    user_id: UserId,
    title: &str,
    body: &str,
    category: NotificationCategory,
) -> CreateNotificationRequest {
    CreateNotificationRequest::new(title, body, category).for_user(user_id)
}

/// Informational notification to every user.
pub fn system_notification(title: &str, body: &str) -> CreateNotificationRequest {
    CreateNotificationRequest::new(title, body, NotificationCategory::Info)
}

/// Alert to every user.
pub fn system_alert(title: &str, body: &str) -> CreateNotificationRequest {
    CreateNotificationRequest::new(title, body, NotificationCategory::SystemAlert)
}

#[cfg(test)]
mod tests {
    use herald_entity::NotificationScope;

    use super::*;

    #[test]
    fn test_appointment_reminder_targets_doctor() {
        let doctor = UserId::new();
        let new = appointment_reminder(doctor, 12, 7, "Ana Lima", 30)
            .into_new_notification()
            .expect("valid");
        assert_eq!(new.scope, NotificationScope::User(doctor));
        assert_eq!(new.body, "Ana Lima has an appointment in 30 minutes");
        assert_eq!(new.actions[0].url.as_deref(), Some("/appointments/12"));
        assert_eq!(new.resolved_icon(), "clock");
    }

    #[test]
    fn test_appointment_update_wording() {
        let group = GroupId::new();
        let cases = [
            ("scheduled", "New Appointment Scheduled"),
            ("cancelled", "Appointment Cancelled"),
            ("rescheduled", "Appointment Rescheduled"),
            ("moved-room", "Appointment Updated"),
        ];
        for (kind, title) in cases {
            let req = appointment_update(group, 1, 2, "Ana Lima", AppointmentChange::parse(kind));
            assert_eq!(req.title, title);
            assert_eq!(req.group_id, Some(group));
        }
    }

    #[test]
    fn test_patient_update_wording() {
        let req = patient_update(GroupId::new(), 3, "Ana Lima", PatientChange::parse("created"));
        assert_eq!(req.title, "New Patient Added");
        let req = patient_update(GroupId::new(), 3, "Ana Lima", PatientChange::parse("merged"));
        assert_eq!(req.title, "Patient Updated");
        assert_eq!(req.payload.as_ref().map(|p| p["update_type"].clone()), Some(json!("updated")));
    }

    #[test]
    fn test_inventory_alert_uses_category_defaults() {
        let new = inventory_alert(GroupId::new(), 9, "Gauze", 3, 10)
            .into_new_notification()
            .expect("valid");
        assert_eq!(new.resolved_icon(), "box");
        assert_eq!(new.resolved_color(), "yellow");
    }

    #[test]
    fn test_clinic_category_mapping() {
        assert_eq!(clinic_category("restock_alert"), NotificationCategory::InventoryAlert);
        assert_eq!(clinic_category("patient_registered"), NotificationCategory::PatientUpdate);
        assert_eq!(clinic_category("system_maintenance"), NotificationCategory::Info);
    }

    #[test]
    fn test_system_builders_have_no_target() {
        let alert = system_alert("Outage", "Lab results delayed");
        assert!(alert.user_id.is_none() && alert.group_id.is_none());
        assert_eq!(alert.category, NotificationCategory::SystemAlert);
        assert_eq!(
            system_notification("Release", "v2 is live").category,
            NotificationCategory::Info
        );
    }
}
