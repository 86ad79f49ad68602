//! # Fact Capabilities
//!
//! Facts declare what the processors must check or charge by implementing
//! these traits. `OperationFact` exposes them through match-based accessors.

use shared_types::{Address, Amount, CurrencyId, U256};
use std::collections::BTreeMap;

/// Per-currency amounts a fee is computed from.
pub type FeeBase = BTreeMap<CurrencyId, Vec<U256>>;

/// Whether the fee-base amounts leave or reach the sender.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeeDirection {
    /// Sender pays the amounts (transfers, account creation).
    Debit,
    /// Sender receives the amounts (withdrawals).
    Credit,
}

/// A `(contract, actor)` pair checked against contract-account status.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContractActor {
    pub contract: Address,
    pub actor: Address,
}

impl ContractActor {
    pub fn new(contract: Address, actor: Address) -> Self {
        Self { contract, actor }
    }
}

pub trait FeeAble {
    fn fee_base(&self) -> FeeBase;

    fn fee_payer(&self) -> &Address;

    fn fee_direction(&self) -> FeeDirection {
        FeeDirection::Debit
    }
}

/// Actor must own the contract.
pub trait ContractOwnerOnly {
    fn owner_only(&self) -> Vec<ContractActor>;
}

/// Contracts must be active.
pub trait ActiveContract {
    fn active_contracts(&self) -> Vec<Address>;
}

/// Contract must be active; actor must be owner or handler.
pub trait ActiveContractOwnerHandlerOnly {
    fn active_owner_handler(&self) -> Vec<ContractActor>;
}

/// Contract must be inactive; actor must be owner or handler.
pub trait InActiveContractOwnerHandlerOnly {
    fn inactive_owner_handler(&self) -> Vec<ContractActor>;
}

/// Fee base of item amounts, bucketed per currency in item order.
pub fn amounts_fee_base<'a>(amounts: impl IntoIterator<Item = &'a Amount>) -> FeeBase {
    let mut base = FeeBase::new();
    for amount in amounts {
        base.entry(amount.currency().clone())
            .or_default()
            .push(amount.big());
    }
    base
}

/// Fee base of operations without amounts: one zero entry for `currency`.
pub fn zero_fee_base(currency: &CurrencyId) -> FeeBase {
    BTreeMap::from([(currency.clone(), vec![U256::zero()])])
}
