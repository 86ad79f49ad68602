//! # secp256k1 Keys
//!
//! ECDSA over secp256k1, used for account keys, suffrage node keys and
//! `EcdsaSecp256k1VerificationKey2019` DID verification methods.
//!
//! - RFC 6979 deterministic nonces
//! - Signatures are 64 bytes, r||s, low-S normalized

use crate::{CryptoError, SIGNATURE_LENGTH};
use k256::ecdsa::{
    signature::{Signer, Verifier},
    Signature, SigningKey, VerifyingKey,
};
use zeroize::Zeroize;

/// Length of a compressed secp256k1 public key.
pub const SECP256K1_PUBLIC_KEY_LENGTH: usize = 33;

/// Compressed secp256k1 public key (33 bytes).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Secp256k1PublicKey([u8; SECP256K1_PUBLIC_KEY_LENGTH]);

impl Secp256k1PublicKey {
    /// Create from compressed bytes (starting with 0x02 or 0x03).
    pub fn from_bytes(bytes: [u8; SECP256K1_PUBLIC_KEY_LENGTH]) -> Result<Self, CryptoError> {
        VerifyingKey::from_sec1_bytes(&bytes).map_err(|_| CryptoError::InvalidPublicKey)?;
        Ok(Self(bytes))
    }

    /// Create from an arbitrary slice.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CryptoError> {
        let raw: [u8; SECP256K1_PUBLIC_KEY_LENGTH] =
            bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
                expected: SECP256K1_PUBLIC_KEY_LENGTH,
                actual: bytes.len(),
            })?;
        Self::from_bytes(raw)
    }

    /// Get raw compressed bytes.
    pub fn as_bytes(&self) -> &[u8; SECP256K1_PUBLIC_KEY_LENGTH] {
        &self.0
    }

    /// Verify a 64-byte signature over `message`.
    pub fn verify(&self, message: &[u8], signature: &[u8]) -> Result<(), CryptoError> {
        let verifying_key =
            VerifyingKey::from_sec1_bytes(&self.0).map_err(|_| CryptoError::InvalidPublicKey)?;

        if signature.len() != SIGNATURE_LENGTH {
            return Err(CryptoError::InvalidSignatureFormat {
                expected: SIGNATURE_LENGTH,
                actual: signature.len(),
            });
        }
        let sig = Signature::from_slice(signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;

        verifying_key
            .verify(message, &sig)
            .map_err(|_| CryptoError::SignatureVerificationFailed)
    }
}

/// secp256k1 ECDSA keypair.
pub struct Secp256k1KeyPair {
    signing_key: SigningKey,
}

impl Secp256k1KeyPair {
    /// Generate random keypair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        Self { signing_key }
    }

    /// Create from secret key bytes (32 bytes).
    pub fn from_bytes(bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let signing_key =
            SigningKey::from_bytes((&bytes).into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
        Ok(Self { signing_key })
    }

    /// Get public key (compressed, 33 bytes).
    pub fn public_key(&self) -> Secp256k1PublicKey {
        let sec1_bytes = self.signing_key.verifying_key().to_sec1_bytes();
        // SEC1 compressed form: 0x02/0x03 prefix followed by the 32-byte x-coordinate.
        let mut bytes = [0u8; SECP256K1_PUBLIC_KEY_LENGTH];
        bytes.copy_from_slice(&sec1_bytes[..SECP256K1_PUBLIC_KEY_LENGTH]);
        Secp256k1PublicKey(bytes)
    }

    /// Sign a message (deterministic RFC 6979).
    pub fn sign(&self, message: &[u8]) -> [u8; SIGNATURE_LENGTH] {
        let sig: Signature = self.signing_key.sign(message);
        sig.to_bytes().into()
    }
}

impl Drop for Secp256k1KeyPair {
    fn drop(&mut self) {
        let mut bytes: [u8; 32] = self.signing_key.to_bytes().into();
        bytes.zeroize();
    }
}
