//! Customer storage.
//!
//! The credential store: customers keyed uniquely by email. The password hash
//! only leaves the store through [`CustomerStore::find_by_email`].

use async_trait::async_trait;
use sqlx::PgPool;

use crm_portal_core::{CustomerId, Email};

use super::RepositoryError;
use crate::models::{Customer, NewCustomer, ProfileChanges};

/// Storage operations on customers.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Insert a new customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError>;

    /// Look up a customer and their password hash by exact (normalized) email.
    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Customer, String)>, RepositoryError>;

    /// Look up a customer by ID.
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError>;

    /// Overwrite the editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email belongs to another customer.
    async fn update_profile(
        &self,
        id: CustomerId,
        changes: ProfileChanges,
    ) -> Result<Customer, RepositoryError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct CustomerWithHash {
    #[sqlx(flatten)]
    customer: Customer,
    password_hash: String,
}

/// `PostgreSQL` customer store.
#[derive(Debug, Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    /// Create a new customer store.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn insert(&self, customer: NewCustomer) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            r"
            INSERT INTO customers (name, email, phone, address, password_hash, customer_type)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, phone, address, customer_type, created_at, updated_at
            ",
        )
        .bind(&customer.name)
        .bind(&customer.email)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(&customer.password_hash)
        .bind(customer.customer_type)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email"))
    }

    async fn find_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<(Customer, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, CustomerWithHash>(
            r"
            SELECT id, name, email, phone, address, customer_type, created_at, updated_at,
                   password_hash
            FROM customers
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| (r.customer, r.password_hash)))
    }

    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        let customer = sqlx::query_as::<_, Customer>(
            r"
            SELECT id, name, email, phone, address, customer_type, created_at, updated_at
            FROM customers
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn update_profile(
        &self,
        id: CustomerId,
        changes: ProfileChanges,
    ) -> Result<Customer, RepositoryError> {
        sqlx::query_as::<_, Customer>(
            r"
            UPDATE customers
            SET name = $2, email = $3, phone = $4, address = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, email, phone, address, customer_type, created_at, updated_at
            ",
        )
        .bind(id)
        .bind(&changes.name)
        .bind(&changes.email)
        .bind(&changes.phone)
        .bind(&changes.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::from_insert(e, "email"))?
        .ok_or(RepositoryError::NotFound)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
