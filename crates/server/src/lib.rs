//! Customer portal server library.
//!
//! The JSON API behind the customer portal: registration and login with
//! server-side sessions, the polled notification feed and the product
//! catalog. Exposed as a library so the router can be driven from tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod app;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use app::{AppOptions, build_app};
