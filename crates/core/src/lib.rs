//! Customer Portal Core - Shared types library.
//!
//! This crate provides the domain types used across the portal components:
//! - `server` - JSON API for registration, login, notifications and the catalog
//! - `cli` - Command-line tools for migrations, notifications and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and parsing rules - no I/O, no database
//! access, no HTTP. Database encode/decode support is behind the `postgres`
//! feature.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, emails, phone numbers and customer types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
