//! # Account Addresses
//!
//! An address is `<body>mca`. Bodies derived from a key set are the hex of the
//! first 20 bytes of the key-set hash; hand-picked bodies are allowed as long
//! as they use the restricted character set.

use crate::keys::AccountKeys;
use crate::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Suffix every account address carries.
pub const ADDRESS_SUFFIX: &str = "mca";
/// Minimum body length (without suffix).
pub const MIN_ADDRESS_BODY: usize = 3;
/// Maximum body length (without suffix).
pub const MAX_ADDRESS_BODY: usize = 100;

/// Ledger account address. Ordering is lexicographic over the address bytes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address(String);

impl Address {
    /// Parse and validate an address string.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        validate_address(&s)?;
        Ok(Self(s))
    }

    /// Derive the address owned by a key set.
    pub fn from_keys(keys: &AccountKeys) -> Self {
        Self(format!("{}{}", hex::encode(&keys.hash()[..20]), ADDRESS_SUFFIX))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

fn validate_address(s: &str) -> Result<(), ValidationError> {
    let body = s.strip_suffix(ADDRESS_SUFFIX).ok_or_else(|| {
        ValidationError::InvalidFormat(format!("address {s:?} lacks the {ADDRESS_SUFFIX} suffix"))
    })?;

    if body.len() < MIN_ADDRESS_BODY || body.len() > MAX_ADDRESS_BODY {
        return Err(ValidationError::InvalidFormat(format!(
            "address {s:?} body length {} outside {MIN_ADDRESS_BODY}..={MAX_ADDRESS_BODY}",
            body.len()
        )));
    }

    let bytes = body.as_bytes();
    let edge_ok = |b: u8| b.is_ascii_alphanumeric();
    let inner_ok = |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b'-');
    if !edge_ok(bytes[0]) || !edge_ok(bytes[bytes.len() - 1]) || !bytes.iter().all(|&b| inner_ok(b))
    {
        return Err(ValidationError::InvalidFormat(format!(
            "address {s:?} contains invalid characters"
        )));
    }
    Ok(())
}

impl TryFrom<String> for Address {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_addresses() {
        assert!(Address::new("alicemca").is_ok());
        assert!(Address::new("node-0.ledgermca").is_ok());
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(Address::new("alice").is_err());
        assert!(Address::new("abmca").is_err());
        assert!(Address::new("-alicemca").is_err());
        assert!(Address::new("al ice mca").is_err());
    }

    #[test]
    fn test_ordering_is_bytewise() {
        let a = Address::new("aaamca").unwrap();
        let b = Address::new("abbmca").unwrap();
        assert!(a < b);
    }

    #[test]
    fn test_serde_rejects_invalid() {
        let parsed: Result<Address, _> = serde_json::from_str("\"xmca\"");
        assert!(parsed.is_err());
        let ok: Address = serde_json::from_str("\"bobbymca\"").unwrap();
        assert_eq!(ok.as_str(), "bobbymca");
    }
}
