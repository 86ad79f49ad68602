//! # Error Types
//!
//! Validation, state access and merge errors shared across the workspace.

use shared_crypto::CryptoError;
use thiserror::Error;

/// Structural or semantic validation failure of a value, item or fact.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A list is shorter or longer than allowed.
    #[error("array length out of range: {field} has {actual} entries, allowed {min}..={max}")]
    ArrayLength {
        field: &'static str,
        actual: usize,
        min: usize,
        max: usize,
    },

    /// The same semantic key appears twice.
    #[error("duplicate value in {field}: {value}")]
    DuplicateValue { field: &'static str, value: String },

    /// Sender targets itself.
    #[error("self target: {0}")]
    SelfTarget(String),

    /// Numeric value outside of its allowed range.
    #[error("value out of range: {0}")]
    ValueOutOfRange(String),

    /// Value of an unexpected kind.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Malformed string, identifier or encoding.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Stored hash differs from the recomputed one.
    #[error("hash mismatch: {0}")]
    HashMismatch(String),

    /// Signature or key failure.
    #[error("signature error: {0}")]
    Signature(#[from] CryptoError),
}

impl ValidationError {
    /// Prefix the error with the value it was raised for.
    pub fn context(self, what: impl std::fmt::Display) -> Self {
        match self {
            Self::SelfTarget(msg) => Self::SelfTarget(format!("{what}: {msg}")),
            Self::ValueOutOfRange(msg) => Self::ValueOutOfRange(format!("{what}: {msg}")),
            Self::InvalidFormat(msg) => Self::InvalidFormat(format!("{what}: {msg}")),
            Self::HashMismatch(msg) => Self::HashMismatch(format!("{what}: {msg}")),
            other => other,
        }
    }
}

/// Failure reading from the external state snapshot.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StateReadError {
    /// The backing store failed.
    #[error("state backend error for {key}: {reason}")]
    Backend { key: String, reason: String },

    /// The stored bytes could not be decoded.
    #[error("state decode error for {key}: {reason}")]
    Decode { key: String, reason: String },
}

/// Failure combining a merge value with the current state at commit time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MergeError {
    /// The merge needs an existing state.
    #[error("state {0} does not exist")]
    MissingState(String),

    /// A deduction exceeds the current balance.
    #[error("insufficient balance in {key}: required {required}, available {available}")]
    InsufficientBalance {
        key: String,
        required: String,
        available: String,
    },

    /// Current state holds a different value kind (or currency).
    #[error("merge mismatch for {key}: expected {expected}, got {actual}")]
    Mismatch {
        key: String,
        expected: String,
        actual: String,
    },

    /// Arithmetic overflow.
    #[error("overflow merging {0}")]
    Overflow(String),
}
