//! # Operations
//!
//! An operation wraps one fact with the signatures that authorize it and
//! any extensions. Its hash covers all three:
//!
//! ```text
//! hash = sha256(fact_hash ‖ extensions.bytes() ‖ sign_0.bytes() ‖ ...)
//! ```
//!
//! Wire form (JSON):
//!
//! ```text
//! { "_hint": <operation hint>, "fact": { "_hint": <fact hint>, ... },
//!   "signs": [...], "extensions": [...], "hash": <hex> }
//! ```

use crate::errors::DecodeError;
use crate::extensions::{Extension, Extensions};
use crate::facts::OperationFact;
use shared_crypto::{sha256, KeyPair};
use shared_types::encoding::ByteWriter;
use shared_types::sign::check_duplicate_signers;
use shared_types::{Address, Hash, PublicKey, Sign, ValidationError};

/// Field carrying the type hint in the wire form.
pub const HINT_FIELD: &str = "_hint";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Operation {
    fact: OperationFact,
    signs: Vec<Sign>,
    extensions: Extensions,
    hash: Hash,
}

impl Operation {
    /// Unsigned operation over `fact`.
    pub fn new(fact: impl Into<OperationFact>) -> Self {
        let mut op = Self {
            fact: fact.into(),
            signs: Vec::new(),
            extensions: Extensions::new(),
            hash: [0u8; 32],
        };
        op.hash = op.generate_hash();
        op
    }

    /// Assemble a decoded operation; the hash is kept as received.
    pub fn from_parts(
        fact: OperationFact,
        signs: Vec<Sign>,
        extensions: Extensions,
        hash: Hash,
    ) -> Self {
        Self {
            fact,
            signs,
            extensions,
            hash,
        }
    }

    pub fn with_extension(mut self, extension: Extension) -> Result<Self, ValidationError> {
        self.extensions.add(extension)?;
        self.hash = self.generate_hash();
        Ok(self)
    }

    /// Sign with `keypair`, replacing an earlier sign by the same key.
    pub fn sign(&mut self, keypair: &KeyPair, network_id: &[u8], signed_at: u64) {
        let sign = Sign::new(keypair, network_id, self.fact.hash(), signed_at);
        self.push_sign(sign);
    }

    /// Sign as suffrage node `node`.
    pub fn node_sign(
        &mut self,
        keypair: &KeyPair,
        node: Address,
        network_id: &[u8],
        signed_at: u64,
    ) {
        let sign = Sign::new_node(keypair, node, network_id, self.fact.hash(), signed_at);
        self.push_sign(sign);
    }

    fn push_sign(&mut self, sign: Sign) {
        self.signs.retain(|s| s.signer() != sign.signer());
        self.signs.push(sign);
        self.hash = self.generate_hash();
    }

    pub fn fact(&self) -> &OperationFact {
        &self.fact
    }

    pub fn signs(&self) -> &[Sign] {
        &self.signs
    }

    pub fn signers(&self) -> impl Iterator<Item = &PublicKey> {
        self.signs.iter().map(Sign::signer)
    }

    pub fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    pub fn hash(&self) -> &Hash {
        &self.hash
    }

    fn generate_hash(&self) -> Hash {
        let mut w = ByteWriter::new();
        w.put_bytes(self.fact.hash())
            .put_bytes(&self.extensions.bytes());
        for sign in &self.signs {
            w.put_bytes(&sign.bytes());
        }
        sha256(&w.finish())
    }

    /// Structural validity: fact, signatures, extensions and hash.
    pub fn is_valid(&self, network_id: &[u8]) -> Result<(), ValidationError> {
        self.fact.is_valid(network_id)?;

        if self.signs.is_empty() {
            return Err(ValidationError::ArrayLength {
                field: "signs",
                actual: 0,
                min: 1,
                max: usize::MAX,
            });
        }
        check_duplicate_signers(&self.signs)?;
        for sign in &self.signs {
            sign.verify(network_id, self.fact.hash())?;
        }
        if self.fact.is_node_signed() {
            if let Some(sign) = self.signs.iter().find(|s| s.node().is_none()) {
                return Err(ValidationError::InvalidFormat(format!(
                    "{} needs node signs, {} is not one",
                    self.fact.operation_type(),
                    sign.signer()
                )));
            }
        }

        self.extensions.is_valid()?;
        if self.generate_hash() != self.hash {
            return Err(ValidationError::HashMismatch(format!(
                "operation {}",
                self.fact.operation_type()
            )));
        }
        Ok(())
    }

    /// Hinted JSON wire form.
    pub fn to_json(&self) -> Result<serde_json::Value, DecodeError> {
        let mut fact = self.fact.to_json()?;
        if let Some(map) = fact.as_object_mut() {
            map.insert(HINT_FIELD.into(), self.fact.hint().to_string().into());
        }
        Ok(serde_json::json!({
            HINT_FIELD: self.fact.operation_hint().to_string(),
            "fact": fact,
            "signs": self.signs,
            "extensions": self.extensions,
            "hash": hex::encode(self.hash),
        }))
    }
}
