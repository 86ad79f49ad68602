//! # Ledger State and Deferred Merges
//!
//! The engine reads `State` through `StateReader` and answers with
//! `StateMergeValue`s. The commit layer later merges each value against the
//! state current at commit time:
//!
//! | MergeValue | Current absent | Current present |
//! |------------|----------------|-----------------|
//! | `Set` | new value | replaced |
//! | `AddBalance` | created | incremented |
//! | `DeductBalance` | error | decremented, error when insufficient |
//! | `AddSupply` | error | `total_supply` incremented |

use crate::errors::{MergeError, StateReadError};
use crate::{
    Account, Amount, ContractAccountStatus, CurrencyDesign, DidDesign, DidDocument, Hash,
};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use std::sync::Arc;

/// State key layout.
pub mod keys {
    use crate::{Address, CurrencyId};

    pub fn account(address: &Address) -> String {
        format!("{address}:account")
    }

    pub fn balance(address: &Address, currency: &CurrencyId) -> String {
        format!("{address}:{currency}:balance")
    }

    pub fn contract_account(address: &Address) -> String {
        format!("{address}:contractaccount")
    }

    pub fn currency_design(currency: &CurrencyId) -> String {
        format!("currency:{currency}:design")
    }

    pub fn did_design(contract: &Address) -> String {
        format!("did:{contract}:design")
    }

    pub fn did_document(contract: &Address, did: &str) -> String {
        format!("did:{contract}:document:{did}")
    }
}

/// Value stored under a state key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StateValue {
    Account(Account),
    Balance(Amount),
    ContractAccount(ContractAccountStatus),
    Currency(CurrencyDesign),
    DidDesign(DidDesign),
    DidDocument(DidDocument),
}

impl StateValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            StateValue::Account(_) => "account",
            StateValue::Balance(_) => "balance",
            StateValue::ContractAccount(_) => "contract_account",
            StateValue::Currency(_) => "currency",
            StateValue::DidDesign(_) => "did_design",
            StateValue::DidDocument(_) => "did_document",
        }
    }

    pub fn as_account(&self) -> Option<&Account> {
        match self {
            StateValue::Account(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_balance(&self) -> Option<&Amount> {
        match self {
            StateValue::Balance(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_contract_account(&self) -> Option<&ContractAccountStatus> {
        match self {
            StateValue::ContractAccount(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_currency(&self) -> Option<&CurrencyDesign> {
        match self {
            StateValue::Currency(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_did_design(&self) -> Option<&DidDesign> {
        match self {
            StateValue::DidDesign(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_did_document(&self) -> Option<&DidDocument> {
        match self {
            StateValue::DidDocument(v) => Some(v),
            _ => None,
        }
    }
}

/// A committed state entry.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub key: String,
    pub value: StateValue,
    pub height: u64,
    /// Hashes of the operations that produced this version.
    #[serde_as(as = "Vec<Hex>")]
    pub operations: Vec<Hash>,
}

impl State {
    pub fn new(
        key: impl Into<String>,
        value: StateValue,
        height: u64,
        operations: Vec<Hash>,
    ) -> Self {
        Self {
            key: key.into(),
            value,
            height,
            operations,
        }
    }
}

/// How a merge value combines with the current state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "merge", content = "value", rename_all = "snake_case")]
pub enum MergeValue {
    /// Replace the current value.
    Set(StateValue),
    AddBalance(Amount),
    DeductBalance(Amount),
    /// Increase the currency design's total supply.
    AddSupply(Amount),
}

/// Deferred state change produced by processing.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMergeValue {
    pub key: String,
    pub value: MergeValue,
}

impl StateMergeValue {
    pub fn set(key: impl Into<String>, value: StateValue) -> Self {
        Self {
            key: key.into(),
            value: MergeValue::Set(value),
        }
    }

    pub fn add_balance(key: impl Into<String>, amount: Amount) -> Self {
        Self {
            key: key.into(),
            value: MergeValue::AddBalance(amount),
        }
    }

    pub fn deduct_balance(key: impl Into<String>, amount: Amount) -> Self {
        Self {
            key: key.into(),
            value: MergeValue::DeductBalance(amount),
        }
    }

    pub fn add_supply(key: impl Into<String>, amount: Amount) -> Self {
        Self {
            key: key.into(),
            value: MergeValue::AddSupply(amount),
        }
    }

    /// Combine with the state current at commit time.
    pub fn merge(&self, current: Option<&State>) -> Result<StateValue, MergeError> {
        let current = current.map(|s| &s.value);
        match &self.value {
            MergeValue::Set(value) => Ok(value.clone()),
            MergeValue::AddBalance(amount) => match current {
                None => Ok(StateValue::Balance(amount.clone())),
                Some(value) => {
                    let balance = self.expect_balance(value, amount)?;
                    let big = balance
                        .big()
                        .checked_add(amount.big())
                        .ok_or_else(|| MergeError::Overflow(self.key.clone()))?;
                    Ok(StateValue::Balance(balance.with_big(big)))
                }
            },
            MergeValue::DeductBalance(amount) => {
                let value = current.ok_or_else(|| MergeError::MissingState(self.key.clone()))?;
                let balance = self.expect_balance(value, amount)?;
                let big = balance.big().checked_sub(amount.big()).ok_or_else(|| {
                    MergeError::InsufficientBalance {
                        key: self.key.clone(),
                        required: amount.big().to_string(),
                        available: balance.big().to_string(),
                    }
                })?;
                Ok(StateValue::Balance(balance.with_big(big)))
            }
            MergeValue::AddSupply(amount) => {
                let value = current.ok_or_else(|| MergeError::MissingState(self.key.clone()))?;
                let design = value.as_currency().ok_or_else(|| MergeError::Mismatch {
                    key: self.key.clone(),
                    expected: "currency".into(),
                    actual: value.kind_name().into(),
                })?;
                if design.currency() != amount.currency() {
                    return Err(MergeError::Mismatch {
                        key: self.key.clone(),
                        expected: design.currency().to_string(),
                        actual: amount.currency().to_string(),
                    });
                }
                design
                    .add_supply(&amount.big())
                    .map(StateValue::Currency)
                    .map_err(|_| MergeError::Overflow(self.key.clone()))
            }
        }
    }

    fn expect_balance<'a>(
        &self,
        value: &'a StateValue,
        amount: &Amount,
    ) -> Result<&'a Amount, MergeError> {
        let balance = value.as_balance().ok_or_else(|| MergeError::Mismatch {
            key: self.key.clone(),
            expected: "balance".into(),
            actual: value.kind_name().into(),
        })?;
        if balance.currency() != amount.currency() {
            return Err(MergeError::Mismatch {
                key: self.key.clone(),
                expected: balance.currency().to_string(),
                actual: amount.currency().to_string(),
            });
        }
        Ok(balance)
    }
}

/// Read-only access to the ledger snapshot. Implementations must allow
/// concurrent calls.
pub trait StateReader: Send + Sync {
    fn get_state(&self, key: &str) -> Result<Option<State>, StateReadError>;
}

impl<T: StateReader + ?Sized> StateReader for &T {
    fn get_state(&self, key: &str) -> Result<Option<State>, StateReadError> {
        (**self).get_state(key)
    }
}

impl<T: StateReader + ?Sized> StateReader for Arc<T> {
    fn get_state(&self, key: &str) -> Result<Option<State>, StateReadError> {
        (**self).get_state(key)
    }
}
