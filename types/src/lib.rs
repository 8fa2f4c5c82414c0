//! Fundamental types for repwatch.
//!
//! This crate defines the types shared across every other crate in the workspace:
//! representative addresses, raw ledger amounts, timestamps and the common error.

pub mod address;
pub mod amount;
pub mod error;
pub mod time;

pub use address::{derive_address, RepAddress, DEFAULT_PREFIX};
pub use amount::RawAmount;
pub use error::RepwatchError;
pub use time::Timestamp;
