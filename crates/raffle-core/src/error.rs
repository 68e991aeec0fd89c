//! # Error Types — Foundational Failures
//!
//! Errors raised by the foundational types. All errors use `thiserror`
//! for derive-based `Display` and `Error` implementations.
//!
//! Configuration loading has its own error enum in [`crate::config`];
//! this module covers the arithmetic and temporal primitives.

use thiserror::Error;

/// Failures in the foundational value types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Integer money arithmetic overflowed.
    #[error("amount arithmetic overflow in {op}")]
    AmountOverflow {
        /// The operation that overflowed (e.g., "add", "mul").
        op: &'static str,
    },

    /// A basis-point share outside 0..=10_000 was supplied.
    #[error("basis points out of range: {0} (max 10000)")]
    BasisPointsOutOfRange(u16),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
