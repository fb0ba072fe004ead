//! GiftMart Core - Shared types library.
//!
//! Types used by every GiftMart component:
//! - `admin` - Marketplace administration API
//! - `cli` - Migrations and account management
//!
//! # Architecture
//!
//! The core crate contains only types and pure rules (status transitions,
//! stock classification, percentage math). No I/O, no database access, no
//! HTTP. The optional `postgres` feature adds sqlx encodings for IDs, emails
//! and status enums.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
