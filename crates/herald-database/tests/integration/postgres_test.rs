//! PostgreSQL store tests.
//!
//! These need a disposable database:
//! `DATABASE_URL=postgres://... cargo test -p herald-database -- --ignored`

use chrono::{Duration, Utc};

use herald_core::config::DatabaseConfig;
use herald_core::types::id::{GroupId, UserId};
use herald_core::types::pagination::PageRequest;
use herald_database::migration::run_migrations;
use herald_database::{DatabasePool, Stores};
use herald_entity::{
    LedgerTransition, NewNotification, NotificationCategory, NotificationScope, ReadFilter,
    Recipient,
};

async fn stores() -> Stores {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let config = DatabaseConfig {
        url,
        ..DatabaseConfig::default()
    };
    let db = DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    run_migrations(db.pool())
        .await
        .expect("Failed to run migrations");
    Stores::postgres(&db)
}

fn notification(title: &str, scope: NotificationScope) -> NewNotification {
    NewNotification {
        title: title.to_string(),
        body: "body".to_string(),
        category: NotificationCategory::PatientUpdate,
        icon: None,
        color: None,
        scope,
        payload: None,
        actions: Vec::new(),
        scheduled_for: None,
        expires_at: None,
        created_by: None,
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_list_visible_joins_own_ledger_rows() {
    let stores = stores().await;
    let group = GroupId::new();
    let reader = Recipient::new(UserId::new(), Some(group));
    let now = Utc::now();

    let direct = stores
        .notifications
        .insert(
            notification("direct", NotificationScope::User(reader.user_id)),
            now - Duration::seconds(3),
        )
        .await
        .expect("insert");
    let grouped = stores
        .notifications
        .insert(
            notification("grouped", NotificationScope::Group(group)),
            now - Duration::seconds(2),
        )
        .await
        .expect("insert");
    let hidden = stores
        .notifications
        .insert(
            notification("dismissed", NotificationScope::Group(group)),
            now - Duration::seconds(1),
        )
        .await
        .expect("insert");
    stores
        .notifications
        .insert(
            notification("someone else", NotificationScope::User(UserId::new())),
            now,
        )
        .await
        .expect("insert");

    stores
        .ledger
        .mark_read(direct.id, reader.user_id, now)
        .await
        .expect("read");
    stores
        .ledger
        .dismiss(hidden.id, reader.user_id, now)
        .await
        .expect("dismiss");

    let all = stores
        .notifications
        .list_visible(&reader, ReadFilter::All, now, &PageRequest::default())
        .await
        .expect("list");
    assert_eq!(all.total, 2);
    assert_eq!(all.items[0].notification.id, grouped.id);
    assert!(!all.items[0].is_read);
    assert_eq!(all.items[1].notification.id, direct.id);
    assert!(all.items[1].is_read);

    let unread = stores
        .notifications
        .list_visible(&reader, ReadFilter::Unread, now, &PageRequest::default())
        .await
        .expect("list");
    assert_eq!(unread.total, 1);
    assert_eq!(
        stores
            .notifications
            .count_unread(&reader, now)
            .await
            .expect("count"),
        1
    );

    // A colleague still sees the group notification the reader dismissed.
    let colleague = Recipient::new(UserId::new(), Some(group));
    let theirs = stores
        .notifications
        .list_visible(&colleague, ReadFilter::All, now, &PageRequest::default())
        .await
        .expect("list");
    assert_eq!(theirs.total, 2);

    let far = stores
        .notifications
        .list_visible(&reader, ReadFilter::All, now, &PageRequest::new(u64::MAX, 10))
        .await
        .expect("list past the end");
    assert!(far.items.is_empty());
    assert_eq!(far.total, 2);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_ledger_upserts_are_idempotent() {
    let stores = stores().await;
    let user = UserId::new();
    let now = Utc::now();
    let n = stores
        .notifications
        .insert(notification("upsert", NotificationScope::User(user)), now)
        .await
        .expect("insert");

    let (a, b) = tokio::join!(
        stores.ledger.mark_read(n.id, user, now),
        stores.ledger.mark_read(n.id, user, now)
    );
    let mut transitions = [a.expect("first"), b.expect("second")];
    transitions.sort_by_key(|t| *t != LedgerTransition::Created);
    assert_eq!(
        transitions,
        [LedgerTransition::Created, LedgerTransition::Unchanged]
    );

    assert_eq!(
        stores.ledger.dismiss(n.id, user, now).await.expect("dismiss"),
        LedgerTransition::Updated
    );
    assert_eq!(
        stores.ledger.dismiss(n.id, user, now).await.expect("again"),
        LedgerTransition::Unchanged
    );
    let entry = stores
        .ledger
        .find(n.id, user)
        .await
        .expect("find")
        .expect("row");
    assert!(entry.is_read && entry.is_dismissed());
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_due_rows_leave_the_queue_once_cleared() {
    let stores = stores().await;
    let user = UserId::new();
    let now = Utc::now();
    let mut deferred = notification("later", NotificationScope::User(user));
    deferred.scheduled_for = Some(now + Duration::minutes(5));
    let n = stores
        .notifications
        .insert(deferred, now)
        .await
        .expect("insert");

    let later = now + Duration::minutes(6);
    let due = stores
        .notifications
        .find_due(later, u64::MAX)
        .await
        .expect("due");
    assert!(due.iter().any(|d| d.id == n.id));

    assert!(stores.notifications.clear_schedule(n.id).await.expect("clear"));
    assert!(!stores.notifications.clear_schedule(n.id).await.expect("again"));
    let due = stores
        .notifications
        .find_due(later, u64::MAX)
        .await
        .expect("due");
    assert!(due.iter().all(|d| d.id != n.id));
}
