//! # Algorithm-tagged keys
//!
//! Account keys and DID verification methods may use either curve. `KeyKind`
//! tags the algorithm so a raw public key plus signature can be verified in
//! one call.

use crate::{
    CryptoError, Ed25519KeyPair, Ed25519PublicKey, Secp256k1KeyPair, Secp256k1PublicKey,
};

/// Signature algorithm of a key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyKind {
    /// Ed25519 (32-byte public keys)
    Ed25519,
    /// ECDSA secp256k1 (33-byte compressed public keys)
    Secp256k1,
}

impl KeyKind {
    /// Expected public key length for this algorithm.
    pub fn public_key_length(&self) -> usize {
        match self {
            KeyKind::Ed25519 => crate::ed25519::ED25519_PUBLIC_KEY_LENGTH,
            KeyKind::Secp256k1 => crate::secp256k1::SECP256K1_PUBLIC_KEY_LENGTH,
        }
    }

    /// Check that `public_key` is a valid point for this algorithm.
    pub fn validate_public_key(&self, public_key: &[u8]) -> Result<(), CryptoError> {
        match self {
            KeyKind::Ed25519 => Ed25519PublicKey::from_slice(public_key).map(|_| ()),
            KeyKind::Secp256k1 => Secp256k1PublicKey::from_slice(public_key).map(|_| ()),
        }
    }
}

/// Verify `signature` over `message` with a raw public key of the given kind.
pub fn verify(
    kind: KeyKind,
    public_key: &[u8],
    message: &[u8],
    signature: &[u8],
) -> Result<(), CryptoError> {
    match kind {
        KeyKind::Ed25519 => Ed25519PublicKey::from_slice(public_key)?.verify(message, signature),
        KeyKind::Secp256k1 => {
            Secp256k1PublicKey::from_slice(public_key)?.verify(message, signature)
        }
    }
}

/// A signing key of either algorithm.
pub enum KeyPair {
    /// Ed25519 keypair
    Ed25519(Ed25519KeyPair),
    /// secp256k1 keypair
    Secp256k1(Secp256k1KeyPair),
}

impl KeyPair {
    /// Deterministic Ed25519 keypair from a seed.
    pub fn ed25519_from_seed(seed: [u8; 32]) -> Self {
        KeyPair::Ed25519(Ed25519KeyPair::from_seed(seed))
    }

    /// Deterministic secp256k1 keypair from secret bytes.
    pub fn secp256k1_from_bytes(secret: [u8; 32]) -> Result<Self, CryptoError> {
        Secp256k1KeyPair::from_bytes(secret).map(KeyPair::Secp256k1)
    }

    /// Algorithm of this keypair.
    pub fn kind(&self) -> KeyKind {
        match self {
            KeyPair::Ed25519(_) => KeyKind::Ed25519,
            KeyPair::Secp256k1(_) => KeyKind::Secp256k1,
        }
    }

    /// Raw public key bytes.
    pub fn public_key_bytes(&self) -> Vec<u8> {
        match self {
            KeyPair::Ed25519(kp) => kp.public_key().as_bytes().to_vec(),
            KeyPair::Secp256k1(kp) => kp.public_key().as_bytes().to_vec(),
        }
    }

    /// Sign a message.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            KeyPair::Ed25519(kp) => kp.sign(message).to_vec(),
            KeyPair::Secp256k1(kp) => kp.sign(message).to_vec(),
        }
    }
}
