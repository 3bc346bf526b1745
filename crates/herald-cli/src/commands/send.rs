//! Notification creation from the command line.

use chrono::{DateTime, Duration, Utc};
use clap::Args;
use serde::Serialize;

use crate::output::{self, OutputFormat};
use herald_core::clock::Clock;
use herald_core::error::AppError;
use herald_core::types::id::{GroupId, UserId};
use herald_entity::{Notification, NotificationAction, NotificationCategory};
use herald_service::CreateNotificationRequest;

/// Arguments for the send command
#[derive(Debug, Args)]
pub struct SendArgs {
    /// Headline
    #[arg(short, long)]
    pub title: String,
    /// Body text
    #[arg(short, long)]
    pub body: String,
    /// Category (info, warning, appointment_reminder, ...)
    #[arg(short = 'k', long, default_value = "info")]
    pub category: NotificationCategory,
    /// Deliver to one user
    #[arg(long, conflicts_with = "group")]
    pub user: Option<UserId>,
    /// Deliver to every member of a group
    #[arg(long)]
    pub group: Option<GroupId>,
    /// JSON payload
    #[arg(short, long)]
    pub payload: Option<String>,
    /// Action as `label=url`; repeatable
    #[arg(short, long = "action")]
    pub actions: Vec<String>,
    /// Hold the notification back this many minutes
    #[arg(long, conflicts_with = "at")]
    pub delay_minutes: Option<i64>,
    /// Hold the notification back until this RFC 3339 instant
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,
    /// Hide the notification after this many minutes
    #[arg(long)]
    pub expires_in_minutes: Option<i64>,
    /// Creating user
    #[arg(long)]
    pub created_by: Option<UserId>,
}

#[derive(Debug, Serialize)]
struct SendResult<'a> {
    notification: &'a Notification,
    published_to: Option<&'a str>,
}

/// Execute the send command
pub async fn execute(
    args: &SendArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::Engine::connect(config_path).await?;
    let now = engine.clock.now();
    let req = build_request(args, now)?;

    let (notification, subject) = engine.service().create_and_publish(req).await?;

    match format {
        OutputFormat::Json => output::print_json(
            &SendResult {
                notification: &notification,
                published_to: subject.as_deref(),
            },
            "{}",
        ),
        OutputFormat::Table => {
            output::print_success(&format!("Notification {} created", notification.id));
            output::print_kv("Category", notification.category.as_str());
            output::print_kv("Scope", &format!("{:?}", notification.scope()));
            match (&subject, notification.scheduled_for) {
                (Some(subject), _) => output::print_kv("Published to", subject),
                (None, Some(at)) => output::print_kv("Scheduled for", &at.to_rfc3339()),
                (None, None) => output::print_warning("Stored but not published"),
            }
        }
    }

    Ok(())
}

/// Turn CLI arguments into a creation request.
fn build_request(args: &SendArgs, now: DateTime<Utc>) -> Result<CreateNotificationRequest, AppError> {
    let mut req = CreateNotificationRequest::new(&args.title, &args.body, args.category.clone());

    if let Some(user) = args.user {
        req = req.for_user(user);
    }
    if let Some(group) = args.group {
        req = req.for_group(group);
    }
    if let Some(raw) = &args.payload {
        let payload: serde_json::Value = serde_json::from_str(raw)
            .map_err(|e| AppError::invalid_input(format!("Invalid JSON payload: {e}")))?;
        req = req.payload(payload);
    }
    for raw_action in &args.actions {
        let (label, url) = raw_action.split_once('=').ok_or_else(|| {
            AppError::invalid_input(format!("Action '{raw_action}' must look like label=url"))
        })?;
        req = req.action(NotificationAction::new(label.trim(), "navigate").url(url.trim()));
    }
    if let Some(at) = args.at {
        req = req.scheduled_for(at);
    }
    if let Some(minutes) = args.delay_minutes {
        req = req.scheduled_for(now + Duration::minutes(minutes));
    }
    if let Some(minutes) = args.expires_in_minutes {
        req = req.expires_at(now + Duration::minutes(minutes));
    }
    if let Some(user) = args.created_by {
        req = req.created_by(user);
    }

    Ok(req)
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        send: SendArgs,
    }

    fn parse(args: &[&str]) -> SendArgs {
        let mut argv = vec!["herald"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).expect("parse").send
    }

    #[test]
    fn test_build_group_request_with_delay_and_action() {
        let group = GroupId::new();
        let args = parse(&[
            "--title",
            "Stock count",
            "--body",
            "Friday 9am",
            "--category",
            "inventory-alert",
            "--group",
            &group.to_string(),
            "--action",
            "Open=/inventory",
            "--delay-minutes",
            "30",
        ]);
        let now = Utc::now();
        let req = build_request(&args, now).expect("request");

        assert_eq!(req.category, NotificationCategory::InventoryAlert);
        assert_eq!(req.group_id, Some(group));
        assert_eq!(req.user_id, None);
        assert_eq!(req.scheduled_for, Some(now + Duration::minutes(30)));
        assert_eq!(req.actions.len(), 1);
        assert_eq!(req.actions[0].label, "Open");
    }

    #[test]
    fn test_user_and_group_conflict() {
        let result = TestCli::try_parse_from([
            "herald",
            "--title",
            "t",
            "--body",
            "b",
            "--user",
            &UserId::new().to_string(),
            "--group",
            &GroupId::new().to_string(),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_payload_is_invalid_input() {
        let args = parse(&["--title", "t", "--body", "b", "--payload", "{not json"]);
        let err = build_request(&args, Utc::now()).unwrap_err();
        assert!(err.is(herald_core::error::ErrorKind::InvalidInput));
    }
}
