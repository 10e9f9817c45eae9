//! Error types for the math kernel
//!
//! Numeric degeneracies (singular matrices, zero-length vectors, parallel
//! rays) are never errors; they resolve to sentinel values at the call site.
//! Only caller contract violations end up here.

use thiserror::Error;

/// Result type for math operations that can reject their input
pub type Result<T> = std::result::Result<T, MathError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("unknown rotation order: {0}")]
    InvalidEulerOrder(String),

    #[error("unrecognised color style: {0}")]
    InvalidColorStyle(String),

    #[error("matrix is singular (determinant is 0)")]
    SingularMatrix,

    #[error("array too short: need {needed} elements from offset {offset}, got {len}")]
    ArrayTooShort {
        needed: usize,
        offset: usize,
        len: usize,
    },
}
