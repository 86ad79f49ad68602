//! Operation signatures.
//!
//! The signed message is `network_id ‖ fact_hash`, so a signature made for one
//! network is never valid on another.

use crate::encoding::ByteWriter;
use crate::{AccountKeys, Address, Hash, PublicKey, ValidationError};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_crypto::KeyPair;
use std::collections::BTreeSet;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sign {
    signer: PublicKey,
    #[serde_as(as = "Hex")]
    signature: Vec<u8>,
    /// Unix milliseconds.
    signed_at: u64,
    /// Node address of node signatures.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    node: Option<Address>,
}

/// Message signed for `fact_hash` on `network_id`.
pub fn signing_message(network_id: &[u8], fact_hash: &Hash) -> Vec<u8> {
    let mut message = Vec::with_capacity(network_id.len() + fact_hash.len());
    message.extend_from_slice(network_id);
    message.extend_from_slice(fact_hash);
    message
}

impl Sign {
    pub fn new(keypair: &KeyPair, network_id: &[u8], fact_hash: &Hash, signed_at: u64) -> Self {
        Self {
            signer: PublicKey::from_keypair(keypair),
            signature: keypair.sign(&signing_message(network_id, fact_hash)),
            signed_at,
            node: None,
        }
    }

    pub fn new_node(
        keypair: &KeyPair,
        node: Address,
        network_id: &[u8],
        fact_hash: &Hash,
        signed_at: u64,
    ) -> Self {
        Self {
            node: Some(node),
            ..Self::new(keypair, network_id, fact_hash, signed_at)
        }
    }

    /// Assemble from parts, e.g. when decoding.
    pub fn from_parts(
        signer: PublicKey,
        signature: Vec<u8>,
        signed_at: u64,
        node: Option<Address>,
    ) -> Self {
        Self {
            signer,
            signature,
            signed_at,
            node,
        }
    }

    pub fn signer(&self) -> &PublicKey {
        &self.signer
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn signed_at(&self) -> u64 {
        self.signed_at
    }

    pub fn node(&self) -> Option<&Address> {
        self.node.as_ref()
    }

    pub fn verify(&self, network_id: &[u8], fact_hash: &Hash) -> Result<(), ValidationError> {
        self.signer
            .verify(&signing_message(network_id, fact_hash), &self.signature)
            .map_err(|e| e.context(format!("sign by {}", self.signer)))
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(&self.signer.bytes())
            .put_bytes(&self.signature)
            .put_u64(self.signed_at)
            .put_option(self.node.as_ref().map(|n| n.bytes()));
        w.finish()
    }
}

/// Reject a sign set that lists one signer twice.
pub fn check_duplicate_signers(signs: &[Sign]) -> Result<(), ValidationError> {
    let mut seen = BTreeSet::new();
    for sign in signs {
        if !seen.insert(sign.signer()) {
            return Err(ValidationError::DuplicateValue {
                field: "signs",
                value: sign.signer().to_string(),
            });
        }
    }
    Ok(())
}

/// Check that the signers' weights in `keys` reach its threshold.
///
/// Signatures themselves are verified with the operation; only authority is
/// checked here.
pub fn check_signs_by_keys(signs: &[Sign], keys: &AccountKeys) -> Result<(), ValidationError> {
    let weight: u64 = signs
        .iter()
        .filter_map(|sign| keys.get(sign.signer()))
        .map(|key| u64::from(key.weight()))
        .sum();
    if weight < u64::from(keys.threshold()) {
        return Err(ValidationError::ValueOutOfRange(format!(
            "signed weight {weight} under threshold {}",
            keys.threshold()
        )));
    }
    Ok(())
}
