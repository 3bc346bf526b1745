//! One recipient's view of their notifications.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use herald_core::error::AppError;
use herald_core::types::id::{GroupId, NotificationId, UserId};
use herald_entity::{LedgerTransition, NotificationView, ReadFilter};
use herald_service::RequestContext;

/// Arguments for inbox commands
#[derive(Debug, Args)]
pub struct InboxArgs {
    /// Recipient user
    #[arg(long)]
    pub user: UserId,
    /// Recipient's group, if any
    #[arg(long)]
    pub group: Option<GroupId>,
    /// Inbox subcommand
    #[command(subcommand)]
    pub command: InboxCommand,
}

/// Inbox subcommands
#[derive(Debug, Subcommand)]
pub enum InboxCommand {
    /// List visible notifications, newest first
    List {
        /// Page number (1-based)
        #[arg(short, long, default_value = "1")]
        page: u64,
        /// Page size
        #[arg(short, long, default_value = "10")]
        limit: u64,
        /// all, unread, or read
        #[arg(long, default_value = "all")]
        filter: ReadFilter,
    },
    /// Count unread notifications
    Unread,
    /// Mark one notification read
    Read {
        /// Notification to mark
        id: NotificationId,
    },
    /// Dismiss one notification
    Dismiss {
        /// Notification to dismiss
        id: NotificationId,
    },
    /// Mark every visible notification read
    ReadAll,
    /// Send this recipient a test notification
    Test,
}

/// Table row for a notification in an inbox.
#[derive(Debug, Serialize, Tabled)]
struct InboxRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Read")]
    read: String,
    #[tabled(rename = "Created")]
    created_at: String,
}

impl From<&NotificationView> for InboxRow {
    fn from(view: &NotificationView) -> Self {
        Self {
            id: view.notification.id.to_string(),
            title: view.notification.title.clone(),
            category: view.notification.category.to_string(),
            read: if view.is_read { "yes" } else { "no" }.to_string(),
            created_at: view.notification.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute inbox commands
pub async fn execute(
    args: &InboxArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let engine = super::Engine::connect(config_path).await?;
    let service = engine.service();
    let ctx = RequestContext::new(args.user, args.group);

    match &args.command {
        InboxCommand::List {
            page,
            limit,
            filter,
        } => {
            let result = service.list(&ctx, *page, *limit, *filter).await?;
            match format {
                OutputFormat::Json => output::print_json(&result, "{}"),
                OutputFormat::Table => {
                    let rows: Vec<InboxRow> = result.items.iter().map(InboxRow::from).collect();
                    output::print_list(&rows, format);
                    println!(
                        "Page {} ({} per page), {} total",
                        result.page, result.limit, result.total
                    );
                }
            }
        }
        InboxCommand::Unread => {
            let count = service.unread_count(&ctx).await?;
            match format {
                OutputFormat::Json => output::print_json(&serde_json::json!({ "count": count }), "{}"),
                OutputFormat::Table => output::print_kv("Unread", &count.to_string()),
            }
        }
        InboxCommand::Read { id } => {
            let transition = service.mark_read(&ctx, *id).await?;
            report_transition("read", *id, transition);
        }
        InboxCommand::Dismiss { id } => {
            let transition = service.dismiss(&ctx, *id).await?;
            report_transition("dismissed", *id, transition);
        }
        InboxCommand::ReadAll => {
            let changed = service.mark_all_read(&ctx).await?;
            output::print_success(&format!("Marked {} notification(s) read", changed));
        }
        InboxCommand::Test => {
            let notification = service.send_test(&ctx).await?;
            output::print_success(&format!("Test notification {} created", notification.id));
        }
    }

    Ok(())
}

fn report_transition(state: &str, id: NotificationId, transition: LedgerTransition) {
    if transition.changed() {
        output::print_success(&format!("Notification {} {}", id, state));
    } else {
        output::print_warning(&format!("Notification {} was already {}", id, state));
    }
}
