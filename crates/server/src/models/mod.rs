//! Domain models for the portal.
//!
//! These types represent validated domain objects; row decoding lives next to
//! them via `sqlx::FromRow` so the memory and Postgres stores share one shape.

pub mod customer;
pub mod notification;
pub mod product;
pub mod session;

pub use customer::{Customer, NewCustomer, ProfileChanges};
pub use notification::{NewNotification, Notification};
pub use product::{NewProduct, Product};
pub use session::{CurrentCustomer, keys as session_keys};
