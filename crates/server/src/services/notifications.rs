//! Notification feed.
//!
//! Clients poll the feed; nothing is pushed. A notification is either
//! portal-wide (no recipient) or addressed to one customer, and its `read`
//! flag only ever moves from `false` to `true`.

use serde::Deserialize;
use thiserror::Error;

use crm_portal_core::{CustomerId, NotificationId};

use crate::db::{NotificationStore, RepositoryError};
use crate::models::{NewNotification, Notification};
use crate::services::validation::ValidationErrors;

/// Errors from the notification service.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("notification {0} not found")]
    NotFound(NotificationId),

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Input for creating a notification.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NotificationInput {
    pub title: Option<String>,
    pub message: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub struct NotificationService<'a> {
    store: &'a dyn NotificationStore,
}

impl<'a> NotificationService<'a> {
    #[must_use]
    pub const fn new(store: &'a dyn NotificationStore) -> Self {
        Self { store }
    }

    /// Create an unread notification.
    ///
    /// The returned record is already visible to [`Self::list`].
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Validation` if title or message is blank.
    pub async fn create(
        &self,
        input: &NotificationInput,
        recipient: Option<CustomerId>,
    ) -> Result<Notification, NotificationError> {
        let mut errors = ValidationErrors::new();
        let title = errors.required("title", input.title.as_deref());
        let message = errors.required("message", input.message.as_deref());

        let (Some(title), Some(message)) = (title, message) else {
            return Err(errors.into());
        };

        let notification = self
            .store
            .insert(NewNotification {
                title: title.to_owned(),
                message: message.to_owned(),
                kind: ValidationErrors::optional(input.kind.as_deref()),
                recipient_id: recipient,
            })
            .await?;

        tracing::info!(
            notification_id = %notification.id,
            recipient = ?recipient.map(|r| r.as_i32()),
            "notification created"
        );

        Ok(notification)
    }

    /// Notifications visible to `viewer`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Repository` if the store fails.
    pub async fn list(
        &self,
        viewer: Option<CustomerId>,
    ) -> Result<Vec<Notification>, NotificationError> {
        Ok(self.store.list(viewer).await?)
    }

    /// Mark a notification as read. Marking it again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::NotFound` if no notification visible to
    /// `viewer` has this ID.
    pub async fn mark_read(
        &self,
        id: NotificationId,
        viewer: Option<CustomerId>,
    ) -> Result<(), NotificationError> {
        self.store.mark_read(id, viewer).await.map_err(|e| match e {
            RepositoryError::NotFound => NotificationError::NotFound(id),
            other => NotificationError::Repository(other),
        })
    }

    /// Number of unread notifications visible to `viewer`.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::Repository` if the store fails.
    pub async fn unread_count(&self, viewer: Option<CustomerId>) -> Result<usize, NotificationError> {
        let notifications = self.store.list(viewer).await?;
        Ok(notifications.iter().filter(|n| !n.read).count())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use crate::db::MemoryNotificationStore;

    use super::*;

    fn input(title: &str, kind: Option<&str>) -> NotificationInput {
        NotificationInput {
            title: Some(title.to_owned()),
            message: Some("...".to_owned()),
            kind: kind.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn test_create_then_list_newest_first() {
        let store = MemoryNotificationStore::default();
        let service = NotificationService::new(&store);

        service.create(&input("older", None), None).await.unwrap();
        let newest = service
            .create(&input("New product arrived", Some("info")), None)
            .await
            .unwrap();

        let listed = service.list(None).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, newest.id);
        assert_eq!(listed[0].kind.as_deref(), Some("info"));
        assert!(!listed[0].read);
    }

    #[tokio::test]
    async fn test_create_requires_title_and_message() {
        let store = MemoryNotificationStore::default();
        let service = NotificationService::new(&store);

        let err = service
            .create(&NotificationInput::default(), None)
            .await
            .unwrap_err();
        let NotificationError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.errors().len(), 2);
        assert!(service.list(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mark_read_twice_and_unread_count() {
        let store = MemoryNotificationStore::default();
        let service = NotificationService::new(&store);

        let a = service.create(&input("a", None), None).await.unwrap();
        service.create(&input("b", None), None).await.unwrap();
        assert_eq!(service.unread_count(None).await.unwrap(), 2);

        service.mark_read(a.id, None).await.unwrap();
        service.mark_read(a.id, None).await.unwrap();
        assert_eq!(service.unread_count(None).await.unwrap(), 1);

        let listed = service.list(None).await.unwrap();
        let a = listed.iter().find(|n| n.id == a.id).unwrap();
        assert!(a.read);
    }

    #[tokio::test]
    async fn test_mark_read_unknown_or_hidden_id() {
        let store = MemoryNotificationStore::default();
        let service = NotificationService::new(&store);

        let err = service
            .mark_read(NotificationId::new(42), None)
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::NotFound(id) if id == NotificationId::new(42)));

        let private = service
            .create(&input("private", None), Some(CustomerId::new(1)))
            .await
            .unwrap();
        let err = service
            .mark_read(private.id, Some(CustomerId::new(2)))
            .await
            .unwrap_err();
        assert!(matches!(err, NotificationError::NotFound(_)));
    }
}
