//! # Shared Crypto
//!
//! Cryptographic primitives used by the ledger operation engine.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hashing` | SHA-256 | Fact, operation and key-set digests |
//! | `ed25519` | Ed25519 | Account keys, DID verification methods |
//! | `secp256k1` | ECDSA secp256k1 | Account keys, node keys, DID verification methods |
//! | `keys` | both | Algorithm-tagged key pairs and one-call verification |
//!
//! ## Security Properties
//!
//! - **Ed25519**: Deterministic nonces, no RNG dependency
//! - **secp256k1**: RFC 6979 deterministic, low-S signatures
//! - Secret key material is zeroized on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ed25519;
pub mod errors;
pub mod hashing;
pub mod keys;
pub mod secp256k1;

// Re-exports
pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey};
pub use errors::CryptoError;
pub use hashing::{sha256, sha256_many, Hash, Sha256Hasher};
pub use keys::{verify, KeyKind, KeyPair};
pub use secp256k1::{Secp256k1KeyPair, Secp256k1PublicKey};

/// Length of every signature produced by this crate (r||s or R||S).
pub const SIGNATURE_LENGTH: usize = 64;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
