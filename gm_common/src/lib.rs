//! Types shared by every crate in the Grounds Market workspace.
//!
//! * [`Rupiah`] is the only money type. Amounts are whole rupiah stored as `i64`; there is no fractional currency.
//! * [`Secret`] wraps configuration values that must never be printed.
//! * [`helpers`] has small parsing utilities for environment-driven configuration.
mod rupiah;

pub mod helpers;
pub mod op;
mod secret;

pub use rupiah::{Rupiah, RupiahConversionError, CURRENCY_CODE};
pub use secret::Secret;
