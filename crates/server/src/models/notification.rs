//! Notification domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crm_portal_core::{CustomerId, NotificationId};

/// An entry in the polled notification feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    /// Free-form tag such as `info` or `warning`.
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: Option<String>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    /// Addressed customer; `None` for portal-wide notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_id: Option<CustomerId>,
}

/// Validated input for inserting a notification.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub title: String,
    pub message: String,
    pub kind: Option<String>,
    pub recipient_id: Option<CustomerId>,
}
