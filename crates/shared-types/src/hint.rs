//! # Type Hints
//!
//! Every encoded fact and operation carries a hint `<type>-v<version>` that
//! the host's decoder uses to pick the decode routine.

use crate::ValidationError;
use std::fmt;

/// A type tag plus version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Hint {
    pub type_name: &'static str,
    pub version: &'static str,
}

impl Hint {
    pub const fn new(type_name: &'static str, version: &'static str) -> Self {
        Self { type_name, version }
    }

    /// Whether `encoded` names this type, at any version.
    pub fn is_compatible(&self, encoded: &str) -> bool {
        parse_hint(encoded)
            .map(|(type_name, _)| type_name == self.type_name)
            .unwrap_or(false)
    }
}

impl fmt::Display for Hint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-v{}", self.type_name, self.version)
    }
}

/// Split an encoded hint into `(type, version)`.
pub fn parse_hint(encoded: &str) -> Result<(&str, &str), ValidationError> {
    let idx = encoded
        .rfind("-v")
        .ok_or_else(|| ValidationError::InvalidFormat(format!("hint without version: {encoded}")))?;
    let (type_name, version) = (&encoded[..idx], &encoded[idx + 2..]);
    if type_name.is_empty() || version.is_empty() {
        return Err(ValidationError::InvalidFormat(format!(
            "malformed hint: {encoded}"
        )));
    }
    if !version.split('.').all(|part| part.parse::<u32>().is_ok()) {
        return Err(ValidationError::InvalidFormat(format!(
            "malformed hint version: {encoded}"
        )));
    }
    Ok((type_name, version))
}
