//! Typed reads from the state snapshot.
//!
//! A missing state is `Ok(None)`; a state of the wrong shape for its key is
//! fatal, since the snapshot can no longer be trusted.

use crate::errors::{FatalError, ProcessError, ReasonKind};
use shared_types::state::keys;
use shared_types::{
    Account, Address, Amount, ContractAccountStatus, CurrencyDesign, CurrencyId, DidDesign,
    DidDocument, StateReader, StateValue,
};

fn typed<T>(
    reader: &dyn StateReader,
    key: &str,
    extract: impl FnOnce(&StateValue) -> Option<&T>,
    expected: &str,
) -> Result<Option<T>, ProcessError>
where
    T: Clone,
{
    let Some(state) = reader.get_state(key)? else {
        return Ok(None);
    };
    match extract(&state.value) {
        Some(value) => Ok(Some(value.clone())),
        None => Err(FatalError::CorruptState {
            key: key.to_string(),
            reason: format!("expected {expected}, found {}", state.value.kind_name()),
        }
        .into()),
    }
}

pub fn exists(reader: &dyn StateReader, key: &str) -> Result<bool, ProcessError> {
    Ok(reader.get_state(key)?.is_some())
}

/// `StateAlreadyExists` when `key` is present.
pub fn ensure_absent(reader: &dyn StateReader, key: &str) -> Result<(), ProcessError> {
    if exists(reader, key)? {
        return Err(ProcessError::reason(
            ReasonKind::StateAlreadyExists,
            format!("state {key} already exists"),
        ));
    }
    Ok(())
}

fn not_found(key: &str) -> ProcessError {
    ProcessError::reason(ReasonKind::StateNotFound, format!("state {key} not found"))
}

pub fn account(
    reader: &dyn StateReader,
    address: &Address,
) -> Result<Option<Account>, ProcessError> {
    typed(reader, &keys::account(address), StateValue::as_account, "account")
}

pub fn existing_account(
    reader: &dyn StateReader,
    address: &Address,
) -> Result<Account, ProcessError> {
    account(reader, address)?.ok_or_else(|| not_found(&keys::account(address)))
}

/// Existing account that is not a contract account.
pub fn existing_signer_account(
    reader: &dyn StateReader,
    address: &Address,
) -> Result<Account, ProcessError> {
    let account = existing_account(reader, address)?;
    if account.is_contract() {
        return Err(ProcessError::reason(
            ReasonKind::ValueInvalid,
            format!("contract account {address} can not sign operations"),
        ));
    }
    Ok(account)
}

pub fn balance(
    reader: &dyn StateReader,
    address: &Address,
    currency: &CurrencyId,
) -> Result<Option<Amount>, ProcessError> {
    typed(
        reader,
        &keys::balance(address, currency),
        StateValue::as_balance,
        "balance",
    )
}

pub fn existing_balance(
    reader: &dyn StateReader,
    address: &Address,
    currency: &CurrencyId,
) -> Result<Amount, ProcessError> {
    balance(reader, address, currency)?.ok_or_else(|| not_found(&keys::balance(address, currency)))
}

pub fn contract_status(
    reader: &dyn StateReader,
    contract: &Address,
) -> Result<Option<ContractAccountStatus>, ProcessError> {
    typed(
        reader,
        &keys::contract_account(contract),
        StateValue::as_contract_account,
        "contract account status",
    )
}

pub fn existing_contract_status(
    reader: &dyn StateReader,
    contract: &Address,
) -> Result<ContractAccountStatus, ProcessError> {
    contract_status(reader, contract)?
        .ok_or_else(|| not_found(&keys::contract_account(contract)))
}

pub fn currency(
    reader: &dyn StateReader,
    currency: &CurrencyId,
) -> Result<Option<CurrencyDesign>, ProcessError> {
    typed(
        reader,
        &keys::currency_design(currency),
        StateValue::as_currency,
        "currency design",
    )
}

/// `CurrencyNotFound` when the currency is not registered.
pub fn existing_currency(
    reader: &dyn StateReader,
    id: &CurrencyId,
) -> Result<CurrencyDesign, ProcessError> {
    currency(reader, id)?.ok_or_else(|| {
        ProcessError::reason(ReasonKind::CurrencyNotFound, format!("currency {id} not found"))
    })
}

pub fn did_design(
    reader: &dyn StateReader,
    contract: &Address,
) -> Result<Option<DidDesign>, ProcessError> {
    typed(
        reader,
        &keys::did_design(contract),
        StateValue::as_did_design,
        "did design",
    )
}

/// `ServiceNotFound` when the contract has no DID registry.
pub fn existing_did_design(
    reader: &dyn StateReader,
    contract: &Address,
) -> Result<DidDesign, ProcessError> {
    did_design(reader, contract)?.ok_or_else(|| {
        ProcessError::reason(
            ReasonKind::ServiceNotFound,
            format!("no did service on contract {contract}"),
        )
    })
}

pub fn did_document(
    reader: &dyn StateReader,
    contract: &Address,
    did: &str,
) -> Result<Option<DidDocument>, ProcessError> {
    typed(
        reader,
        &keys::did_document(contract, did),
        StateValue::as_did_document,
        "did document",
    )
}

pub fn existing_did_document(
    reader: &dyn StateReader,
    contract: &Address,
    did: &str,
) -> Result<DidDocument, ProcessError> {
    did_document(reader, contract, did)?
        .ok_or_else(|| not_found(&keys::did_document(contract, did)))
}
