//! Customer domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crm_portal_core::{CustomerId, CustomerType, Email, Phone};

/// A registered customer.
///
/// The password hash is deliberately not a field: stores hand it out
/// separately and only to the login path, so a `Customer` is always safe to
/// serialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Customer {
    /// Unique customer ID.
    pub id: CustomerId,
    /// Display name.
    pub name: String,
    /// Login email (normalized, unique).
    pub email: Email,
    /// Contact phone number.
    pub phone: Phone,
    /// Postal address, if given.
    pub address: Option<String>,
    /// Which dashboard sections the customer can see.
    pub customer_type: CustomerType,
    /// When the customer registered.
    pub created_at: DateTime<Utc>,
    /// When the profile was last changed.
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

/// Validated input for inserting a customer.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub address: Option<String>,
    pub password_hash: String,
    pub customer_type: CustomerType,
}

/// Validated profile fields a customer may overwrite.
///
/// `id` and `customer_type` are not editable.
#[derive(Debug, Clone)]
pub struct ProfileChanges {
    pub name: String,
    pub email: Email,
    pub phone: Phone,
    pub address: Option<String>,
}
