//! Application state shared across handlers.

use std::sync::Arc;

use crate::db::{CustomerStore, NotificationStore, Stores};
use crate::services::auth::PasswordHasher;
use crate::services::{AuthService, CatalogService, NotificationService};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Services are built per request from the
/// stores held here.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    stores: Stores,
    passwords: PasswordHasher,
    catalog: CatalogService,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(stores: Stores, passwords: PasswordHasher) -> Self {
        let catalog = CatalogService::new(Arc::clone(&stores.products));

        Self {
            inner: Arc::new(AppStateInner {
                stores,
                passwords,
                catalog,
            }),
        }
    }

    #[must_use]
    pub fn customers(&self) -> &dyn CustomerStore {
        self.inner.stores.customers.as_ref()
    }

    #[must_use]
    pub fn notification_store(&self) -> &dyn NotificationStore {
        self.inner.stores.notifications.as_ref()
    }

    /// Get a reference to the password hasher.
    #[must_use]
    pub fn passwords(&self) -> &PasswordHasher {
        &self.inner.passwords
    }

    /// Get the cached product catalog.
    #[must_use]
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Authentication service over this state's stores.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(
            self.customers(),
            self.notification_store(),
            self.passwords(),
        )
    }

    /// Notification service over this state's store.
    #[must_use]
    pub fn notifications(&self) -> NotificationService<'_> {
        NotificationService::new(self.notification_store())
    }
}
