//! Authentication service.
//!
//! Registration, password login and profile edits for portal customers.

mod error;
pub mod password;

pub use error::AuthError;
pub use password::{HashParams, PasswordError, PasswordHasher};

use serde::Deserialize;

use crm_portal_core::{CustomerId, CustomerType, Email, Phone};

use crate::db::{CustomerStore, NotificationStore, RepositoryError};
use crate::models::{Customer, NewCustomer, NewNotification, ProfileChanges};
use crate::services::validation::ValidationErrors;

/// Minimum password length in characters.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Registration form. Every field is optional so missing fields surface as
/// validation errors rather than JSON decode failures.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
    pub customer_type: Option<String>,
}

/// Login form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Profile edit form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProfileInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Authentication service.
///
/// Borrows its stores and hasher from the application state for the duration
/// of one request.
pub struct AuthService<'a> {
    customers: &'a dyn CustomerStore,
    notifications: &'a dyn NotificationStore,
    passwords: &'a PasswordHasher,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(
        customers: &'a dyn CustomerStore,
        notifications: &'a dyn NotificationStore,
        passwords: &'a PasswordHasher,
    ) -> Self {
        Self {
            customers,
            notifications,
            passwords,
        }
    }

    /// Register a new customer.
    ///
    /// All fields are validated before the store is touched. On success a
    /// welcome notification is addressed to the new customer; if that fails the
    /// registration still stands.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field is missing or malformed.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(&self, input: &RegisterInput) -> Result<Customer, AuthError> {
        let mut errors = ValidationErrors::new();
        let name = errors.required("name", input.name.as_deref());
        let email = errors.parse("email", input.email.as_deref(), Email::parse);
        let phone = errors.parse("phone", input.phone.as_deref(), Phone::parse);
        let password = check_password(&mut errors, input.password.as_deref());
        let customer_type = errors.parse(
            "customer_type",
            input.customer_type.as_deref(),
            str::parse::<CustomerType>,
        );

        let (Some(name), Some(email), Some(phone), Some(password), Some(customer_type)) =
            (name, email, phone, password, customer_type)
        else {
            return Err(errors.into());
        };

        if self.customers.find_by_email(&email).await?.is_some() {
            return Err(AuthError::UserAlreadyExists);
        }

        let password_hash = self.passwords.hash_async(password).await?;

        let customer = self
            .customers
            .insert(NewCustomer {
                name: name.to_owned(),
                email,
                phone,
                address: ValidationErrors::optional(input.address.as_deref()),
                password_hash,
                customer_type,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(
            customer_id = %customer.id,
            customer_type = %customer.customer_type,
            "customer registered"
        );

        if let Err(e) = self
            .notifications
            .insert(NewNotification {
                title: "Welcome".to_owned(),
                message: format!("Welcome to the portal, {}!", customer.name),
                kind: Some("info".to_owned()),
                recipient_id: Some(customer.id),
            })
            .await
        {
            tracing::warn!(error = %e, customer_id = %customer.id, "failed to create welcome notification");
        }

        Ok(customer)
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if either field is missing or the email is malformed.
    /// Returns `AuthError::UserNotFound` if no customer has this email.
    /// Returns `AuthError::InvalidCredentials` if the password is wrong.
    pub async fn login(&self, input: &LoginInput) -> Result<Customer, AuthError> {
        let mut errors = ValidationErrors::new();
        let email = errors.parse("email", input.email.as_deref(), Email::parse);
        let password = match input.password.as_deref() {
            Some(p) if !p.is_empty() => Some(p),
            _ => {
                errors.add("password", "password is required");
                None
            }
        };

        let (Some(email), Some(password)) = (email, password) else {
            return Err(errors.into());
        };

        let Some((customer, password_hash)) = self.customers.find_by_email(&email).await? else {
            self.passwords.verify_dummy_async(password).await?;
            return Err(AuthError::UserNotFound);
        };

        if !self
            .passwords
            .verify_async(password, &password_hash)
            .await?
        {
            tracing::debug!(customer_id = %customer.id, "login rejected: wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(customer_id = %customer.id, "customer logged in");
        Ok(customer)
    }

    /// Reload the customer behind a session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the customer doesn't exist.
    pub async fn current(&self, id: CustomerId) -> Result<Customer, AuthError> {
        self.customers
            .find_by_id(id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Overwrite the customer's editable profile fields.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` if any field is missing or malformed.
    /// Returns `AuthError::UserAlreadyExists` if the new email belongs to another customer.
    /// Returns `AuthError::UserNotFound` if the customer doesn't exist.
    pub async fn update_profile(
        &self,
        id: CustomerId,
        input: &ProfileInput,
    ) -> Result<Customer, AuthError> {
        let mut errors = ValidationErrors::new();
        let name = errors.required("name", input.name.as_deref());
        let email = errors.parse("email", input.email.as_deref(), Email::parse);
        let phone = errors.parse("phone", input.phone.as_deref(), Phone::parse);

        let (Some(name), Some(email), Some(phone)) = (name, email, phone) else {
            return Err(errors.into());
        };

        let customer = self
            .customers
            .update_profile(
                id,
                ProfileChanges {
                    name: name.to_owned(),
                    email,
                    phone,
                    address: ValidationErrors::optional(input.address.as_deref()),
                },
            )
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(customer_id = %customer.id, "profile updated");
        Ok(customer)
    }
}

/// Passwords are not trimmed; only emptiness and length are checked.
fn check_password<'v>(errors: &mut ValidationErrors, password: Option<&'v str>) -> Option<&'v str> {
    match password {
        None | Some("") => {
            errors.add("password", "password is required");
            None
        }
        Some(p) if p.chars().count() < MIN_PASSWORD_LENGTH => {
            errors.add(
                "password",
                format!("password must be at least {MIN_PASSWORD_LENGTH} characters"),
            );
            None
        }
        Some(p) => Some(p),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use crate::db::{MemoryCustomerStore, MemoryNotificationStore};

    use super::*;

    struct Fixture {
        customers: MemoryCustomerStore,
        notifications: MemoryNotificationStore,
        passwords: PasswordHasher,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                customers: MemoryCustomerStore::default(),
                notifications: MemoryNotificationStore::default(),
                passwords: PasswordHasher::new(HashParams {
                    memory_kib: 8,
                    iterations: 1,
                    parallelism: 1,
                })
                .unwrap(),
            }
        }

        fn auth(&self) -> AuthService<'_> {
            AuthService::new(&self.customers, &self.notifications, &self.passwords)
        }
    }

    fn registration(email: &str) -> RegisterInput {
        RegisterInput {
            name: Some("John Doe".to_owned()),
            email: Some(email.to_owned()),
            phone: Some("9876543210".to_owned()),
            address: Some("  ".to_owned()),
            password: Some("secret123".to_owned()),
            customer_type: Some("both".to_owned()),
        }
    }

    fn login(email: &str, password: &str) -> LoginInput {
        LoginInput {
            email: Some(email.to_owned()),
            password: Some(password.to_owned()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let fx = Fixture::new();
        let customer = fx.auth().register(&registration("john@example.com")).await.unwrap();

        assert_eq!(customer.email.as_str(), "john@example.com");
        assert_eq!(customer.customer_type, CustomerType::Both);
        assert_eq!(customer.address, None);

        let logged_in = fx
            .auth()
            .login(&login("John@Example.com", "secret123"))
            .await
            .unwrap();
        assert_eq!(logged_in.id, customer.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email_conflicts() {
        let fx = Fixture::new();
        fx.auth().register(&registration("a@example.com")).await.unwrap();

        let err = fx
            .auth()
            .register(&registration("A@EXAMPLE.COM"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserAlreadyExists));

        let email = Email::parse("a@example.com").unwrap();
        assert_eq!(fx.customers.count_with_email(&email).await, 1);
    }

    #[tokio::test]
    async fn test_register_collects_all_field_errors() {
        let fx = Fixture::new();
        let input = RegisterInput {
            name: None,
            email: Some("not-an-email".to_owned()),
            phone: Some("12345".to_owned()),
            address: None,
            password: Some("abc".to_owned()),
            customer_type: Some("admin".to_owned()),
        };

        let AuthError::Validation(errors) = fx.auth().register(&input).await.unwrap_err() else {
            panic!("expected validation error");
        };
        let fields: Vec<_> = errors.errors().iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["name", "email", "phone", "password", "customer_type"]
        );
        assert_eq!(
            errors.errors()[3].message,
            "password must be at least 6 characters"
        );
    }

    #[tokio::test]
    async fn test_short_password_does_not_touch_store() {
        let fx = Fixture::new();
        let mut input = registration("short@example.com");
        input.password = Some("12345".to_owned());

        let err = fx.auth().register(&input).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        let email = Email::parse("short@example.com").unwrap();
        assert_eq!(fx.customers.count_with_email(&email).await, 0);
    }

    #[tokio::test]
    async fn test_register_creates_welcome_notification() {
        let fx = Fixture::new();
        let customer = fx.auth().register(&registration("w@example.com")).await.unwrap();

        let mine = fx.notifications.list(Some(customer.id)).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].recipient_id, Some(customer.id));
        assert!(!mine[0].read);

        let others = fx.notifications.list(Some(CustomerId::new(999))).await.unwrap();
        assert!(others.is_empty());
    }

    #[tokio::test]
    async fn test_login_wrong_password_and_unknown_email() {
        let fx = Fixture::new();
        let customer = fx.auth().register(&registration("b@example.com")).await.unwrap();

        let wrong = fx
            .auth()
            .login(&login("b@example.com", "wrongpass"))
            .await
            .unwrap_err();
        assert!(matches!(wrong, AuthError::InvalidCredentials));

        let unknown = fx
            .auth()
            .login(&login("nobody@example.com", "secret123"))
            .await
            .unwrap_err();
        assert!(matches!(unknown, AuthError::UserNotFound));

        // A failed login leaves the record untouched.
        let reloaded = fx.auth().current(customer.id).await.unwrap();
        assert_eq!(reloaded, customer);
    }

    #[tokio::test]
    async fn test_login_requires_both_fields() {
        let fx = Fixture::new();
        let err = fx.auth().login(&LoginInput::default()).await.unwrap_err();

        let AuthError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.errors().len(), 2);
    }

    #[tokio::test]
    async fn test_login_with_corrupted_hash_is_rejected() {
        let fx = Fixture::new();
        let customer = fx.auth().register(&registration("c@example.com")).await.unwrap();
        assert!(fx.customers.set_password_hash(customer.id, "garbage").await);

        let err = fx
            .auth()
            .login(&login("c@example.com", "secret123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_update_profile() {
        let fx = Fixture::new();
        let a = fx.auth().register(&registration("a@example.com")).await.unwrap();
        fx.auth().register(&registration("b@example.com")).await.unwrap();

        let taken = fx
            .auth()
            .update_profile(
                a.id,
                &ProfileInput {
                    name: Some("Ann".to_owned()),
                    email: Some("b@example.com".to_owned()),
                    phone: Some("9876543210".to_owned()),
                    address: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(taken, AuthError::UserAlreadyExists));

        let updated = fx
            .auth()
            .update_profile(
                a.id,
                &ProfileInput {
                    name: Some("Ann".to_owned()),
                    email: Some("ann@example.com".to_owned()),
                    phone: Some("5550100000".to_owned()),
                    address: Some("1 Main St".to_owned()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, a.id);
        assert_eq!(updated.email.as_str(), "ann@example.com");
        assert_eq!(updated.address.as_deref(), Some("1 Main St"));

        fx.auth()
            .login(&login("ann@example.com", "secret123"))
            .await
            .unwrap();
    }
}
