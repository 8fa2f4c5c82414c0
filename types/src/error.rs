//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for repwatch value types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepwatchError {
    #[error("invalid raw amount: {0}")]
    InvalidAmount(String),

    #[error("raw amount overflow adding {lhs} + {rhs}")]
    AmountOverflow { lhs: u128, rhs: u128 },
}
