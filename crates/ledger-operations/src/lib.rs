//! # Ledger Operations - Operation Processing Engine
//!
//! Validates signed ledger operations against a read-only state snapshot and
//! turns accepted ones into state merge values for the host's commit layer.
//!
//! ## Processing Model
//!
//! Every operation goes through two phases:
//!
//! 1. `pre_process` checks structure, signatures, authority, state
//!    preconditions and fees, producing nothing.
//! 2. `process` recomputes the effects and returns `StateMergeValue`s.
//!
//! Nothing here writes state. Reason errors reject one operation; fatal
//! errors abort its processing.
//!
//! ## Operation Catalog
//!
//! | Group | Operations | Authorized by |
//! |-------|------------|---------------|
//! | Accounts | CreateAccount, Transfer, UpdateKey | sender keys |
//! | Contracts | CreateContractAccount, UpdateHandler, UpdateRecipient, Withdraw | sender keys |
//! | DID | RegisterModel, CreateDid, UpdateDidDocument, DeactivateDid | sender keys |
//! | Currency | RegisterCurrency, UpdateCurrency, Mint | suffrage nodes |
//!
//! Sender-signed operations may carry extensions:
//!
//! | Extension | Effect |
//! |-----------|--------|
//! | `Authentication` | DID verification method proves authority instead of sender keys |
//! | `Settlement` | a second account co-signs and pays the fee |
//! | `ProxyPayer` | an active contract pays the fee for one of its recipients |
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose |
//! |------|---------|
//! | `StateReader` | account, balance, contract, currency and DID state |
//! | `SuffrageProvider` | current consensus nodes for node-signed operations |
//!
//! ## Usage Example
//!
//! ```ignore
//! use ledger_operations::prelude::*;
//!
//! let engine = OperationEngine::new(EngineConfig::from_env(), suffrage)?;
//! let ctx = ProcessContext::new(height);
//! engine.pre_process(&ctx, &op, &snapshot)?;
//! let merges = engine.process(&ctx, &op, &snapshot)?;
//! ```

#![warn(clippy::all)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod extensions;
pub mod facts;
pub mod operation;
pub mod ports;
pub mod processors;
pub mod registry;
pub mod service;
pub mod telemetry;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Engine
    pub use crate::config::EngineConfig;
    pub use crate::service::{EngineStats, OperationEngine, Outcome};

    // Processing
    pub use crate::domain::{CancelFlag, ProcessContext};
    pub use crate::processors::{OperationProcessor, ProcessorEnv};

    // Errors
    pub use crate::errors::{DecodeError, FatalError, ProcessError, ReasonError, ReasonKind};

    // Operations
    pub use crate::extensions::{Authentication, Extension, Extensions, ProxyPayer, Settlement};
    pub use crate::facts::*;
    pub use crate::operation::Operation;
    pub use crate::registry::{registry, HintRegistry};

    // Ports and adapters
    pub use crate::adapters::MemoryStateStore;
    pub use crate::ports::{StateCommitter, StateReader, SuffrageProvider};

    pub use crate::telemetry::init_tracing;
}

pub use config::EngineConfig;
pub use errors::{FatalError, ProcessError, ReasonError, ReasonKind};
pub use operation::Operation;
pub use service::OperationEngine;
