//! Core types for GiftMart.
//!
//! Type-safe wrappers for IDs, emails, money and the status vocabularies
//! shared by the admin API and the CLI.

#[macro_use]
mod macros;

pub mod email;
pub mod engagement;
pub mod id;
pub mod money;
pub mod platform;
pub mod status;

pub use email::{Email, EmailError};
pub use engagement::*;
pub use id::*;
pub use money::{RUPEE_SYMBOL, Rate, RateOutOfRange, format_rupees, percentage, round_money};
pub use platform::*;
pub use status::*;
