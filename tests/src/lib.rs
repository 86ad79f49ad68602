//! # Ledger Operations Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Ledger harness: store, engine, funded accounts
//! └── integration/      # End-to-end flows through OperationEngine
//!     ├── accounts.rs
//!     ├── contracts.rs
//!     ├── did_auth.rs
//!     ├── currency.rs
//!     └── engine.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p ledger-tests
//!
//! # By area
//! cargo test -p ledger-tests integration::did_auth::
//!
//! # Benchmarks
//! cargo bench -p ledger-tests
//! ```

pub mod fixtures;
pub mod integration;
