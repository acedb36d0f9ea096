//! Notification storage.

use async_trait::async_trait;
use sqlx::PgPool;

use crm_portal_core::{CustomerId, NotificationId};

use super::RepositoryError;
use crate::models::{NewNotification, Notification};

/// Storage operations on the notification feed.
///
/// A `viewer` of `None` sees every notification; `Some(id)` sees portal-wide
/// notifications plus those addressed to `id`.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Append a notification with `read = false` and the current time.
    async fn insert(&self, notification: NewNotification)
    -> Result<Notification, RepositoryError>;

    /// Visible notifications, newest first.
    async fn list(&self, viewer: Option<CustomerId>)
    -> Result<Vec<Notification>, RepositoryError>;

    /// Set `read = true`. Already-read notifications are left as they are.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no visible notification has this ID.
    async fn mark_read(
        &self,
        id: NotificationId,
        viewer: Option<CustomerId>,
    ) -> Result<(), RepositoryError>;
}

/// `PostgreSQL` notification store.
#[derive(Debug, Clone)]
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    /// Create a new notification store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn insert(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let created = sqlx::query_as::<_, Notification>(
            r"
            INSERT INTO notifications (title, message, type, recipient_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, message, type, read, created_at, recipient_id
            ",
        )
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(&notification.kind)
        .bind(notification.recipient_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn list(
        &self,
        viewer: Option<CustomerId>,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let notifications = sqlx::query_as::<_, Notification>(
            r"
            SELECT id, title, message, type, read, created_at, recipient_id
            FROM notifications
            WHERE $1::INTEGER IS NULL OR recipient_id IS NULL OR recipient_id = $1
            ORDER BY created_at DESC, id DESC
            ",
        )
        .bind(viewer)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        viewer: Option<CustomerId>,
    ) -> Result<(), RepositoryError> {
        // Matched rows count even when `read` was already true.
        let result = sqlx::query(
            r"
            UPDATE notifications
            SET read = TRUE
            WHERE id = $1
              AND ($2::INTEGER IS NULL OR recipient_id IS NULL OR recipient_id = $2)
            ",
        )
        .bind(id)
        .bind(viewer)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
