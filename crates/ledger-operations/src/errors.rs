//! # Processing Errors
//!
//! | Kind | Effect |
//! |------|--------|
//! | `ProcessError::Reason` | operation rejected, batch continues |
//! | `ProcessError::Fatal` | invariant violated, processing of the operation aborts |
//!
//! Extension failures are always reasons.

use shared_types::{MergeError, StateReadError, ValidationError};
use std::fmt;
use thiserror::Error;

/// Stable category tag of a reason error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReasonKind {
    TypeMismatch,
    StateNotFound,
    StateAlreadyExists,
    ContractNotActive,
    ContractActive,
    SignatureInvalid,
    AccountNotAuthorized,
    ServiceNotFound,
    ServiceAlreadyRegistered,
    ValueInvalid,
    InsufficientBalance,
    CurrencyNotFound,
    Extension,
}

impl ReasonKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonKind::TypeMismatch => "type-mismatch",
            ReasonKind::StateNotFound => "state-not-found",
            ReasonKind::StateAlreadyExists => "state-already-exists",
            ReasonKind::ContractNotActive => "contract-not-active",
            ReasonKind::ContractActive => "contract-active",
            ReasonKind::SignatureInvalid => "signature-invalid",
            ReasonKind::AccountNotAuthorized => "account-not-authorized",
            ReasonKind::ServiceNotFound => "service-not-found",
            ReasonKind::ServiceAlreadyRegistered => "service-already-registered",
            ReasonKind::ValueInvalid => "value-invalid",
            ReasonKind::InsufficientBalance => "insufficient-balance",
            ReasonKind::CurrencyNotFound => "currency-not-found",
            ReasonKind::Extension => "extension",
        }
    }
}

impl fmt::Display for ReasonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why an operation was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{kind}: {detail}")]
pub struct ReasonError {
    pub kind: ReasonKind,
    pub detail: String,
}

impl ReasonError {
    pub fn new(kind: ReasonKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Prefix the detail, keeping the kind.
    pub fn wrap(self, context: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            detail: format!("{context}: {}", self.detail),
        }
    }
}

/// Failures that make the outcome of an operation undecidable.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FatalError {
    #[error("state read failed: {0}")]
    StateRead(#[from] StateReadError),

    /// A stored value has the wrong shape for its key.
    #[error("corrupt state {key}: {reason}")]
    CorruptState { key: String, reason: String },

    #[error("decode failed: {0}")]
    Decode(String),

    #[error("processing cancelled")]
    Cancelled,

    #[error("invalid engine configuration: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Outcome of a failed pre-process or process call.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ProcessError {
    #[error(transparent)]
    Reason(#[from] ReasonError),

    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl ProcessError {
    pub fn reason(kind: ReasonKind, detail: impl Into<String>) -> Self {
        ProcessError::Reason(ReasonError::new(kind, detail))
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, ProcessError::Fatal(_))
    }

    pub fn reason_kind(&self) -> Option<ReasonKind> {
        match self {
            ProcessError::Reason(r) => Some(r.kind),
            ProcessError::Fatal(_) => None,
        }
    }

    /// Add operation context to a reason; fatal errors pass unchanged.
    pub fn wrap(self, context: impl fmt::Display) -> Self {
        match self {
            ProcessError::Reason(r) => ProcessError::Reason(r.wrap(context)),
            fatal => fatal,
        }
    }
}

impl From<StateReadError> for ProcessError {
    fn from(e: StateReadError) -> Self {
        ProcessError::Fatal(FatalError::StateRead(e))
    }
}

/// Invalid facts and values are rejected, never fatal.
impl From<ValidationError> for ProcessError {
    fn from(e: ValidationError) -> Self {
        let kind = match &e {
            ValidationError::TypeMismatch { .. } => ReasonKind::TypeMismatch,
            ValidationError::Signature(_) => ReasonKind::SignatureInvalid,
            _ => ReasonKind::ValueInvalid,
        };
        ProcessError::reason(kind, e.to_string())
    }
}

impl From<MergeError> for ProcessError {
    fn from(e: MergeError) -> Self {
        let kind = match &e {
            MergeError::MissingState(_) => ReasonKind::StateNotFound,
            MergeError::InsufficientBalance { .. } => ReasonKind::InsufficientBalance,
            MergeError::Mismatch { .. } => ReasonKind::TypeMismatch,
            MergeError::Overflow(_) => ReasonKind::ValueInvalid,
        };
        ProcessError::reason(kind, e.to_string())
    }
}

/// Decoding an operation from its hinted wire form.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing _hint field")]
    MissingHint,

    #[error("unknown hint: {0}")]
    UnknownHint(String),

    #[error("malformed payload for {hint}: {reason}")]
    Malformed { hint: String, reason: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<DecodeError> for FatalError {
    fn from(e: DecodeError) -> Self {
        FatalError::Decode(e.to_string())
    }
}
