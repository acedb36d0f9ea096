//! In-memory stores.
//!
//! Used when the server runs with `PORTAL_STORAGE=memory` and by the test
//! suites. Each store keeps its rows behind one `tokio` mutex, so
//! check-then-insert sequences are atomic the same way a unique index makes
//! them atomic in `PostgreSQL`.

use std::cmp::Reverse;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crm_portal_core::{CustomerId, Email, NotificationId, ProductId};

use super::{CustomerStore, NotificationStore, ProductStore, RepositoryError};
use crate::models::{
    Customer, NewCustomer, NewNotification, NewProduct, Notification, Product, ProfileChanges,
};

struct Table<T> {
    rows: Vec<T>,
    last_id: i32,
}

// Derived `Default` would demand `T: Default`
impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&mut self) -> i32 {
        self.last_id += 1;
        self.last_id
    }
}

/// In-memory customer store.
#[derive(Default)]
pub struct MemoryCustomerStore {
    table: Mutex<Table<(Customer, String)>>,
}

impl MemoryCustomerStore {
    /// Number of stored customers with this email.
    pub async fn count_with_email(&self, email: &Email) -> usize {
        self.table
            .lock()
            .await
            .rows
            .iter()
            .filter(|(c, _)| &c.email == email)
            .count()
    }

    /// Overwrite a stored password hash, e.g. to simulate a corrupted row.
    pub async fn set_password_hash(&self, id: CustomerId, hash: &str) -> bool {
        let mut table = self.table.lock().await;
        match table.rows.iter_mut().find(|(c, _)| c.id == id) {
            Some((_, stored)) => {
                hash.clone_into(stored);
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        let mut table = self.table.lock().await;

        if table.rows.iter().any(|(c, _)| c.email == customer.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let now = Utc::now();
        let stored = Customer {
            id: CustomerId::new(table.next_id()),
            name: customer.name,
            email: customer.email,
            phone: customer.phone,
            address: customer.address,
            customer_type: customer.customer_type,
            created_at: now,
            updated_at: now,
        };
        table
            .rows
            .push((stored.clone(), customer.password_hash));

        Ok(stored)
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Customer, String)>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|(c, _)| &c.email == email).cloned())
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table
            .rows
            .iter()
            .find(|(c, _)| c.id == id)
            .map(|(c, _)| c.clone()))
    }

    async fn update_profile(
        &self,
        id: CustomerId,
        changes: ProfileChanges,
    ) -> Result<Customer, RepositoryError> {
        let mut table = self.table.lock().await;

        if table
            .rows
            .iter()
            .any(|(c, _)| c.id != id && c.email == changes.email)
        {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        let (customer, _) = table
            .rows
            .iter_mut()
            .find(|(c, _)| c.id == id)
            .ok_or(RepositoryError::NotFound)?;

        customer.name = changes.name;
        customer.email = changes.email;
        customer.phone = changes.phone;
        customer.address = changes.address;
        customer.updated_at = Utc::now();

        Ok(customer.clone())
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

fn visible_to(notification: &Notification, viewer: Option<CustomerId>) -> bool {
    match (viewer, notification.recipient_id) {
        (None, _) | (_, None) => true,
        (Some(viewer), Some(recipient)) => viewer == recipient,
    }
}

/// In-memory notification store.
#[derive(Default)]
pub struct MemoryNotificationStore {
    table: Mutex<Table<Notification>>,
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn insert(
        &self,
        notification: NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let mut table = self.table.lock().await;

        let created = Notification {
            id: NotificationId::new(table.next_id()),
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            read: false,
            created_at: Utc::now(),
            recipient_id: notification.recipient_id,
        };
        table.rows.push(created.clone());

        Ok(created)
    }

    async fn list(
        &self,
        viewer: Option<CustomerId>,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let table = self.table.lock().await;

        let mut visible: Vec<Notification> = table
            .rows
            .iter()
            .filter(|n| visible_to(n, viewer))
            .cloned()
            .collect();
        visible.sort_by_key(|n| Reverse((n.created_at, n.id)));

        Ok(visible)
    }

    async fn mark_read(
        &self,
        id: NotificationId,
        viewer: Option<CustomerId>,
    ) -> Result<(), RepositoryError> {
        let mut table = self.table.lock().await;

        let notification = table
            .rows
            .iter_mut()
            .find(|n| n.id == id && visible_to(n, viewer))
            .ok_or(RepositoryError::NotFound)?;
        notification.read = true;

        Ok(())
    }
}

/// In-memory product store.
#[derive(Default)]
pub struct MemoryProductStore {
    table: Mutex<Table<Product>>,
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        Ok(self.table.lock().await.rows.clone())
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().find(|p| p.product_id == id).cloned())
    }

    async fn insert(&self, product: NewProduct) -> Result<Product, RepositoryError> {
        let mut table = self.table.lock().await;

        let created = Product {
            product_id: ProductId::new(table.next_id()),
            name: product.name,
            description: product.description,
            price: product.price,
            original_price: product.original_price,
            category: product.category,
            rating: product.rating,
            reviews: product.reviews,
            image_url: product.image_url,
            in_stock: product.in_stock,
            created_at: Utc::now(),
        };
        table.rows.push(created.clone());

        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crm_portal_core::{CustomerType, Phone};

    use super::*;

    fn new_customer(email: &str) -> NewCustomer {
        NewCustomer {
            name: "John Doe".to_owned(),
            email: Email::parse(email).unwrap(),
            phone: Phone::parse("9876543210").unwrap(),
            address: None,
            password_hash: "hash".to_owned(),
            customer_type: CustomerType::Both,
        }
    }

    fn new_notification(title: &str, recipient_id: Option<CustomerId>) -> NewNotification {
        NewNotification {
            title: title.to_owned(),
            message: "message".to_owned(),
            kind: None,
            recipient_id,
        }
    }

    #[tokio::test]
    async fn test_customer_insert_rejects_duplicate_email() {
        let store = MemoryCustomerStore::default();
        let first = store.insert(new_customer("a@example.com")).await.unwrap();
        assert_eq!(first.id, CustomerId::new(1));

        let second = store.insert(new_customer("a@example.com")).await;
        assert!(matches!(second, Err(RepositoryError::Conflict(_))));

        let email = Email::parse("a@example.com").unwrap();
        assert_eq!(store.count_with_email(&email).await, 1);
    }

    #[tokio::test]
    async fn test_customer_update_profile_keeps_id_and_checks_email() {
        let store = MemoryCustomerStore::default();
        let a = store.insert(new_customer("a@example.com")).await.unwrap();
        store.insert(new_customer("b@example.com")).await.unwrap();

        let taken = store
            .update_profile(
                a.id,
                ProfileChanges {
                    name: "A".to_owned(),
                    email: Email::parse("b@example.com").unwrap(),
                    phone: a.phone.clone(),
                    address: None,
                },
            )
            .await;
        assert!(matches!(taken, Err(RepositoryError::Conflict(_))));

        let updated = store
            .update_profile(
                a.id,
                ProfileChanges {
                    name: "Alice".to_owned(),
                    email: a.email.clone(),
                    phone: a.phone.clone(),
                    address: Some("1 Main St".to_owned()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, a.id);
        assert_eq!(updated.name, "Alice");
        assert_eq!(updated.customer_type, a.customer_type);

        let missing = store
            .update_profile(
                CustomerId::new(99),
                ProfileChanges {
                    name: "X".to_owned(),
                    email: Email::parse("x@example.com").unwrap(),
                    phone: a.phone,
                    address: None,
                },
            )
            .await;
        assert!(matches!(missing, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_notifications_newest_first_and_scoped() {
        let store = MemoryNotificationStore::default();
        let first = store.insert(new_notification("first", None)).await.unwrap();
        let second = store
            .insert(new_notification("for 2", Some(CustomerId::new(2))))
            .await
            .unwrap();
        let third = store.insert(new_notification("third", None)).await.unwrap();

        let all: Vec<_> = store.list(None).await.unwrap().into_iter().map(|n| n.id).collect();
        assert_eq!(all, vec![third.id, second.id, first.id]);

        let for_one: Vec<_> = store
            .list(Some(CustomerId::new(1)))
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(for_one, vec![third.id, first.id]);

        let missing = store.mark_read(second.id, Some(CustomerId::new(1))).await;
        assert!(matches!(missing, Err(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn test_mark_read_is_idempotent() {
        let store = MemoryNotificationStore::default();
        let n = store.insert(new_notification("hello", None)).await.unwrap();
        assert!(!n.read);

        store.mark_read(n.id, None).await.unwrap();
        store.mark_read(n.id, None).await.unwrap();

        let listed = store.list(None).await.unwrap();
        assert!(listed.iter().all(|n| n.read));
    }

    #[tokio::test]
    async fn test_default_stores_start_empty() {
        let customers = MemoryCustomerStore::default();
        let notifications = MemoryNotificationStore::default();
        let products = MemoryProductStore::default();

        assert!(customers.find_by_id(CustomerId::new(1)).await.unwrap().is_none());
        assert!(notifications.list(None).await.unwrap().is_empty());
        assert!(products.list().await.unwrap().is_empty());

        let created = notifications
            .insert(new_notification("First", None))
            .await
            .unwrap();
        assert_eq!(created.id, NotificationId::new(1));
    }
}
