//! # Public Keys and Account Key Sets
//!
//! An account is controlled by a weighted key set: a sign set authorizes the
//! account when the weights of its signers reach the threshold.

use crate::encoding::ByteWriter;
use crate::{Hash, ValidationError};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_crypto::{sha256, KeyKind, KeyPair};
use std::collections::BTreeSet;
use std::fmt;

/// String suffix of Ed25519 public keys.
pub const ED25519_KEY_SUFFIX: &str = "epu";
/// String suffix of secp256k1 public keys.
pub const SECP256K1_KEY_SUFFIX: &str = "mpu";
/// Maximum keys in one key set.
pub const MAX_KEYS_IN_KEYS: usize = 10;
/// Maximum key weight and threshold.
pub const MAX_THRESHOLD: u32 = 100;

/// An algorithm-tagged public key, encoded as `<hex><suffix>`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicKey {
    kind: KeyKind,
    raw: Vec<u8>,
}

impl PublicKey {
    /// Build from raw bytes, rejecting invalid curve points.
    pub fn new(kind: KeyKind, raw: Vec<u8>) -> Result<Self, ValidationError> {
        kind.validate_public_key(&raw)?;
        Ok(Self { kind, raw })
    }

    /// Public half of a signing key.
    pub fn from_keypair(keypair: &KeyPair) -> Self {
        Self {
            kind: keypair.kind(),
            raw: keypair.public_key_bytes(),
        }
    }

    pub fn kind(&self) -> KeyKind {
        self.kind
    }

    pub fn raw(&self) -> &[u8] {
        &self.raw
    }

    /// Verify a signature made by this key.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), ValidationError> {
        shared_crypto::verify(self.kind, &self.raw, message, signature)?;
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.kind {
            KeyKind::Ed25519 => ED25519_KEY_SUFFIX,
            KeyKind::Secp256k1 => SECP256K1_KEY_SUFFIX,
        };
        write!(f, "{}{}", hex::encode(&self.raw), suffix)
    }
}

impl TryFrom<String> for PublicKey {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let (body, kind) = if let Some(body) = value.strip_suffix(ED25519_KEY_SUFFIX) {
            (body, KeyKind::Ed25519)
        } else if let Some(body) = value.strip_suffix(SECP256K1_KEY_SUFFIX) {
            (body, KeyKind::Secp256k1)
        } else {
            return Err(ValidationError::InvalidFormat(format!(
                "unknown public key suffix: {value}"
            )));
        };
        let raw = hex::decode(body)
            .map_err(|e| ValidationError::InvalidFormat(format!("public key hex: {e}")))?;
        Self::new(kind, raw)
    }
}

impl From<PublicKey> for String {
    fn from(key: PublicKey) -> Self {
        key.to_string()
    }
}

/// One weighted key of a key set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountKey {
    key: PublicKey,
    weight: u32,
}

impl AccountKey {
    pub fn new(key: PublicKey, weight: u32) -> Result<Self, ValidationError> {
        let key = Self { key, weight };
        key.is_valid()?;
        Ok(key)
    }

    pub fn key(&self) -> &PublicKey {
        &self.key
    }

    pub fn weight(&self) -> u32 {
        self.weight
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if self.weight == 0 || self.weight > MAX_THRESHOLD {
            return Err(ValidationError::ValueOutOfRange(format!(
                "key weight {} outside 1..={MAX_THRESHOLD}",
                self.weight
            )));
        }
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(&self.key.bytes()).put_u32(self.weight);
        w.finish()
    }
}

/// Weighted key set controlling an account.
///
/// Keys are kept sorted by their string form so the hash does not depend on
/// the order the keys were supplied in. The contract key set (no keys,
/// threshold 100) can never be satisfied, so contract accounts cannot sign.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "AccountKeysRaw")]
pub struct AccountKeys {
    keys: Vec<AccountKey>,
    threshold: u32,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

#[derive(Deserialize)]
struct AccountKeysRaw {
    keys: Vec<AccountKey>,
    threshold: u32,
}

impl TryFrom<AccountKeysRaw> for AccountKeys {
    type Error = ValidationError;

    fn try_from(raw: AccountKeysRaw) -> Result<Self, Self::Error> {
        if raw.keys.is_empty() && raw.threshold == MAX_THRESHOLD {
            return Ok(Self::contract());
        }
        Self::new(raw.keys, raw.threshold)
    }
}

impl AccountKeys {
    pub fn new(mut keys: Vec<AccountKey>, threshold: u32) -> Result<Self, ValidationError> {
        keys.sort_by(|a, b| a.key.to_string().cmp(&b.key.to_string()));
        let mut built = Self {
            keys,
            threshold,
            hash: [0u8; 32],
        };
        built.is_valid_structure()?;
        built.hash = built.generate_hash();
        Ok(built)
    }

    /// Single key, weight and threshold 100.
    pub fn single(key: PublicKey) -> Result<Self, ValidationError> {
        Self::new(vec![AccountKey::new(key, MAX_THRESHOLD)?], MAX_THRESHOLD)
    }

    /// Key set of contract accounts.
    pub fn contract() -> Self {
        let mut built = Self {
            keys: Vec::new(),
            threshold: MAX_THRESHOLD,
            hash: [0u8; 32],
        };
        built.hash = built.generate_hash();
        built
    }

    pub fn is_contract(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[AccountKey] {
        &self.keys
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    pub fn get(&self, key: &PublicKey) -> Option<&AccountKey> {
        self.keys.iter().find(|k| &k.key == key)
    }

    /// Same keys and threshold.
    pub fn equal(&self, other: &AccountKeys) -> bool {
        self.hash == other.hash
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_list(&self.keys, AccountKey::bytes).put_u32(self.threshold);
        w.finish()
    }

    fn generate_hash(&self) -> Hash {
        sha256(&self.bytes())
    }

    fn is_valid_structure(&self) -> Result<(), ValidationError> {
        if self.keys.is_empty() || self.keys.len() > MAX_KEYS_IN_KEYS {
            return Err(ValidationError::ArrayLength {
                field: "keys",
                actual: self.keys.len(),
                min: 1,
                max: MAX_KEYS_IN_KEYS,
            });
        }
        if self.threshold == 0 || self.threshold > MAX_THRESHOLD {
            return Err(ValidationError::ValueOutOfRange(format!(
                "threshold {} outside 1..={MAX_THRESHOLD}",
                self.threshold
            )));
        }

        let mut seen = BTreeSet::new();
        let mut total: u64 = 0;
        for key in &self.keys {
            key.is_valid()?;
            if !seen.insert(key.key.to_string()) {
                return Err(ValidationError::DuplicateValue {
                    field: "keys",
                    value: key.key.to_string(),
                });
            }
            total += u64::from(key.weight);
        }
        if total < u64::from(self.threshold) {
            return Err(ValidationError::ValueOutOfRange(format!(
                "sum of weights {total} under threshold {}",
                self.threshold
            )));
        }
        Ok(())
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if !self.is_contract() {
            self.is_valid_structure()?;
        } else if self.threshold != MAX_THRESHOLD {
            return Err(ValidationError::ValueOutOfRange(
                "contract key set threshold must be 100".into(),
            ));
        }
        if self.hash != self.generate_hash() {
            return Err(ValidationError::HashMismatch("account keys".into()));
        }
        Ok(())
    }
}
