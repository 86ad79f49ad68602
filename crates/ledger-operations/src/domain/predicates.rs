//! # Contract Authorization Predicates
//!
//! | Predicate | Contract | Actor |
//! |-----------|----------|-------|
//! | `ContractOwnerOnly` | any | owner |
//! | `ActiveContract` | active | - |
//! | `ActiveContractOwnerHandlerOnly` | active | owner or handler |
//! | `InActiveContractOwnerHandlerOnly` | inactive | owner or handler |
//!
//! Every failure is a reason error naming the contract and the actor.

use crate::domain::lookup;
use crate::errors::{ProcessError, ReasonKind};
use crate::facts::{ContractActor, OperationFact};
use shared_types::{Address, StateReader};

fn not_authorized(pair: &ContractActor, role: &str) -> ProcessError {
    ProcessError::reason(
        ReasonKind::AccountNotAuthorized,
        format!("{} is not {role} of contract {}", pair.actor, pair.contract),
    )
}

fn not_active(contract: &Address) -> ProcessError {
    ProcessError::reason(
        ReasonKind::ContractNotActive,
        format!("contract {contract} is not active"),
    )
}

pub fn check_contract_owner_only(
    reader: &dyn StateReader,
    pairs: &[ContractActor],
) -> Result<(), ProcessError> {
    for pair in pairs {
        let status = lookup::existing_contract_status(reader, &pair.contract)?;
        if !status.is_owner(&pair.actor) {
            return Err(not_authorized(pair, "owner"));
        }
    }
    Ok(())
}

pub fn check_active_contract(
    reader: &dyn StateReader,
    contracts: &[Address],
) -> Result<(), ProcessError> {
    for contract in contracts {
        let status = lookup::existing_contract_status(reader, contract)?;
        if !status.is_active() {
            return Err(not_active(contract));
        }
    }
    Ok(())
}

pub fn check_active_contract_owner_handler(
    reader: &dyn StateReader,
    pairs: &[ContractActor],
) -> Result<(), ProcessError> {
    for pair in pairs {
        let status = lookup::existing_contract_status(reader, &pair.contract)?;
        if !status.is_active() {
            return Err(not_active(&pair.contract));
        }
        if !status.is_owner_or_handler(&pair.actor) {
            return Err(not_authorized(pair, "owner or handler"));
        }
    }
    Ok(())
}

pub fn check_inactive_contract_owner_handler(
    reader: &dyn StateReader,
    pairs: &[ContractActor],
) -> Result<(), ProcessError> {
    for pair in pairs {
        let status = lookup::existing_contract_status(reader, &pair.contract)?;
        if status.is_active() {
            return Err(ProcessError::reason(
                ReasonKind::ContractActive,
                format!("contract {} is already active", pair.contract),
            ));
        }
        if !status.is_owner_or_handler(&pair.actor) {
            return Err(not_authorized(pair, "owner or handler"));
        }
    }
    Ok(())
}

/// Every contract role the fact declares.
pub fn check_fact_roles(
    reader: &dyn StateReader,
    fact: &OperationFact,
) -> Result<(), ProcessError> {
    if let Some(role) = fact.contract_owner_only() {
        check_contract_owner_only(reader, &role.owner_only())?;
    }
    if let Some(role) = fact.active_contract() {
        check_active_contract(reader, &role.active_contracts())?;
    }
    if let Some(role) = fact.active_contract_owner_handler_only() {
        check_active_contract_owner_handler(reader, &role.active_owner_handler())?;
    }
    if let Some(role) = fact.inactive_contract_owner_handler_only() {
        check_inactive_contract_owner_handler(reader, &role.inactive_owner_handler())?;
    }
    Ok(())
}
