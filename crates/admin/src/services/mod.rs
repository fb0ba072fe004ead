//! Business logic services for admin.
//!
//! # Services
//!
//! - `activity` - Activity log recording for admin mutations
//! - `auth` - Password authentication and admin registration
//! - `finance` - Seller ledger and commission maths
//! - `reports` - Report rates, customer buckets and CSV export

pub mod activity;
pub mod auth;
pub mod finance;
pub mod reports;

pub use auth::{AuthError, AuthService};
pub use finance::SellerLedger;
