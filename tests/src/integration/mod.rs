//! # Integration Flows
//!
//! Operations built, signed and applied through `OperationEngine` against a
//! `MemoryStateStore`, checking the committed state afterwards.

pub mod accounts;
pub mod contracts;
pub mod currency;
pub mod did_auth;
pub mod engine;
