//! Core types for the customer portal.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod customer_type;
pub mod email;
pub mod id;
pub mod phone;

pub use customer_type::{CustomerType, CustomerTypeError};
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{Phone, PhoneError};
