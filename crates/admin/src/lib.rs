//! GiftMart admin API library.
//!
//! Exposes the router, state and data layer so the binary, the CLI and
//! the integration tests share one definition of the application.
//!
//! # Security
//!
//! Every route except `/health`, login and first-admin registration needs
//! an admin session. Viewers are read-only; settings and admin management
//! require write access or the super admin role.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
