//! # Shared Types Crate
//!
//! Value objects and ports shared by the ledger operation engine and the
//! host that drives it.
//!
//! ## Design Principles
//!
//! - **Immutable values**: every type validates on construction and exposes a
//!   deterministic `bytes()` encoding used for hashing and signing.
//! - **Deferred effects**: processing never writes state. It returns
//!   `StateMergeValue`s that the commit layer merges against the current state.
//! - **Read-only port**: the engine sees the ledger only through `StateReader`.

pub mod account;
pub mod address;
pub mod contract;
pub mod currency;
pub mod did;
pub mod encoding;
pub mod errors;
pub mod hint;
pub mod keys;
pub mod policy;
pub mod sign;
pub mod state;
pub mod suffrage;

pub use account::Account;
pub use address::Address;
pub use contract::{BalanceStatus, ContractAccountStatus, MAX_CONTRACT_ADDRESSES};
pub use currency::{Amount, CurrencyId, MAX_AMOUNTS_IN_ITEM};
pub use did::{
    AllowedOperation, AuthenticationEntry, DidDesign, DidDocument, VerificationMethod,
    VerificationMethodKind,
};
pub use errors::*;
pub use hint::Hint;
pub use keys::{AccountKey, AccountKeys, PublicKey};
pub use policy::{CurrencyDesign, CurrencyPolicy, Feeer};
pub use sign::Sign;
pub use state::{MergeValue, State, StateMergeValue, StateReader, StateValue};
pub use suffrage::{Suffrage, SuffrageNode, SuffrageProvider};

// Re-export U256 from primitive-types; every ledger amount is a U256.
pub use primitive_types::U256;
pub use shared_crypto::Hash;
