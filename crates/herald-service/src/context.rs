//! Request context carrying the calling user and their group.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use herald_core::types::id::{GroupId, UserId};
use herald_entity::Recipient;

/// Context for the current authenticated request.
///
/// Authentication and group lookup happen upstream; the engine trusts
/// what it is handed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated user's ID.
    pub user_id: UserId,
    /// The tenant group the user belongs to, if any.
    pub group_id: Option<GroupId>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user_id: UserId, group_id: Option<GroupId>) -> Self {
        Self {
            user_id,
            group_id,
            request_time: Utc::now(),
        }
    }

    /// The recipient read-path queries are evaluated for.
    pub fn recipient(&self) -> Recipient {
        Recipient::new(self.user_id, self.group_id)
    }
}
