//! # Fact Catalog
//!
//! A fact is the immutable, hash-addressed intent of an operation. Its hash
//! is `sha256(bytes())`, where `bytes()` encodes the token and every field in
//! a fixed order.
//!
//! | Fact | Signed by | Item cap |
//! |------|-----------|----------|
//! | `CreateAccountFact` | sender | 100 |
//! | `TransferFact` | sender | 3000 |
//! | `UpdateKeyFact` | sender | - |
//! | `CreateContractAccountFact` | sender | 1000 |
//! | `UpdateHandlerFact` | sender | - |
//! | `UpdateRecipientFact` | sender | - |
//! | `WithdrawFact` | sender | 1000 |
//! | `RegisterModelFact` | sender | - |
//! | `CreateDidFact` | sender | - |
//! | `UpdateDidDocumentFact` | sender | - |
//! | `DeactivateDidFact` | sender | - |
//! | `RegisterCurrencyFact` | suffrage nodes | - |
//! | `UpdateCurrencyFact` | suffrage nodes | - |
//! | `MintFact` | suffrage nodes | 10 |

pub mod account;
pub mod contract;
pub mod currency;
pub mod did;
pub mod roles;

pub use account::{
    CreateAccountFact, CreateAccountItem, TransferFact, TransferItem, UpdateKeyFact,
    MAX_CREATE_ACCOUNT_ITEMS, MAX_TRANSFER_ITEMS,
};
pub use contract::{
    CreateContractAccountFact, CreateContractAccountItem, UpdateHandlerFact,
    UpdateRecipientFact, WithdrawFact, WithdrawItem, MAX_CREATE_CONTRACT_ACCOUNT_ITEMS,
    MAX_WITHDRAW_ITEMS,
};
pub use currency::{MintFact, MintItem, RegisterCurrencyFact, UpdateCurrencyFact, MAX_MINT_ITEMS};
pub use did::{CreateDidFact, DeactivateDidFact, RegisterModelFact, UpdateDidDocumentFact};
pub use roles::{
    ActiveContract, ActiveContractOwnerHandlerOnly, ContractActor, ContractOwnerOnly, FeeAble,
    FeeBase, FeeDirection, InActiveContractOwnerHandlerOnly,
};

use shared_crypto::sha256;
use shared_types::hint::Hint;
use shared_types::{Address, Hash, ValidationError};
use std::collections::BTreeSet;
use std::fmt::Display;

/// Maximum token length in bytes.
pub const MAX_TOKEN_SIZE: usize = 256;
/// Version shared by every fact and operation hint.
pub const HINT_VERSION: &str = "0.0.1";

/// Behaviour shared by every fact type.
pub trait Fact {
    /// Hint of the fact itself.
    const HINT: Hint;
    /// Hint of the operation carrying the fact.
    const OPERATION_HINT: Hint;

    fn token(&self) -> &[u8];

    fn hash(&self) -> &Hash;

    /// Deterministic encoding of the token and every field, hash excluded.
    fn bytes(&self) -> Vec<u8>;

    /// Field rules of the concrete fact.
    fn validate_fields(&self) -> Result<(), ValidationError>;

    fn is_valid(&self, _network_id: &[u8]) -> Result<(), ValidationError> {
        validate_token(self.token())?;
        if sha256(&self.bytes()) != *self.hash() {
            return Err(ValidationError::HashMismatch(Self::HINT.type_name.to_string()));
        }
        self.validate_fields()
    }
}

/// Items of multi-item facts.
pub trait FactItem {
    fn bytes(&self) -> Vec<u8>;

    fn is_valid(&self) -> Result<(), ValidationError>;
}

pub fn validate_token(token: &[u8]) -> Result<(), ValidationError> {
    if token.is_empty() || token.len() > MAX_TOKEN_SIZE {
        return Err(ValidationError::ArrayLength {
            field: "token",
            actual: token.len(),
            min: 1,
            max: MAX_TOKEN_SIZE,
        });
    }
    Ok(())
}

/// Shared rules of multi-item facts: count in `1..=max`, each item valid,
/// no duplicate item key, sender never an item target.
pub fn validate_items<I, K>(
    field: &'static str,
    items: &[I],
    max: usize,
    sender: Option<&Address>,
    key: impl Fn(&I) -> K,
    target: impl Fn(&I) -> Option<Address>,
) -> Result<(), ValidationError>
where
    I: FactItem,
    K: Ord + Display,
{
    if items.is_empty() || items.len() > max {
        return Err(ValidationError::ArrayLength {
            field,
            actual: items.len(),
            min: 1,
            max,
        });
    }

    let mut seen = BTreeSet::new();
    for (i, item) in items.iter().enumerate() {
        item.is_valid().map_err(|e| e.context(format!("{field}[{i}]")))?;
        let k = key(item);
        let shown = k.to_string();
        if !seen.insert(k) {
            return Err(ValidationError::DuplicateValue {
                field,
                value: shown,
            });
        }
        if let (Some(sender), Some(target)) = (sender, target(item)) {
            if sender == &target {
                return Err(ValidationError::SelfTarget(format!(
                    "{field}[{i}] targets sender {sender}"
                )));
            }
        }
    }
    Ok(())
}

/// Hash of a fact built from its encoding.
pub(crate) fn fact_hash(bytes: &[u8]) -> Hash {
    sha256(bytes)
}

/// One value of every fact type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OperationFact {
    CreateAccount(CreateAccountFact),
    Transfer(TransferFact),
    UpdateKey(UpdateKeyFact),
    CreateContractAccount(CreateContractAccountFact),
    UpdateHandler(UpdateHandlerFact),
    UpdateRecipient(UpdateRecipientFact),
    Withdraw(WithdrawFact),
    RegisterModel(RegisterModelFact),
    CreateDid(CreateDidFact),
    UpdateDidDocument(UpdateDidDocumentFact),
    DeactivateDid(DeactivateDidFact),
    RegisterCurrency(RegisterCurrencyFact),
    UpdateCurrency(UpdateCurrencyFact),
    Mint(MintFact),
}

macro_rules! each_fact {
    ($value:expr, $fact:ident => $body:expr) => {
        match $value {
            OperationFact::CreateAccount($fact) => $body,
            OperationFact::Transfer($fact) => $body,
            OperationFact::UpdateKey($fact) => $body,
            OperationFact::CreateContractAccount($fact) => $body,
            OperationFact::UpdateHandler($fact) => $body,
            OperationFact::UpdateRecipient($fact) => $body,
            OperationFact::Withdraw($fact) => $body,
            OperationFact::RegisterModel($fact) => $body,
            OperationFact::CreateDid($fact) => $body,
            OperationFact::UpdateDidDocument($fact) => $body,
            OperationFact::DeactivateDid($fact) => $body,
            OperationFact::RegisterCurrency($fact) => $body,
            OperationFact::UpdateCurrency($fact) => $body,
            OperationFact::Mint($fact) => $body,
        }
    };
}

macro_rules! hints_of {
    ($fact:ident) => {
        (<$fact as Fact>::HINT, <$fact as Fact>::OPERATION_HINT)
    };
}

impl OperationFact {
    pub fn hint(&self) -> Hint {
        self.hints().0
    }

    pub fn operation_hint(&self) -> Hint {
        self.hints().1
    }

    fn hints(&self) -> (Hint, Hint) {
        match self {
            OperationFact::CreateAccount(_) => hints_of!(CreateAccountFact),
            OperationFact::Transfer(_) => hints_of!(TransferFact),
            OperationFact::UpdateKey(_) => hints_of!(UpdateKeyFact),
            OperationFact::CreateContractAccount(_) => hints_of!(CreateContractAccountFact),
            OperationFact::UpdateHandler(_) => hints_of!(UpdateHandlerFact),
            OperationFact::UpdateRecipient(_) => hints_of!(UpdateRecipientFact),
            OperationFact::Withdraw(_) => hints_of!(WithdrawFact),
            OperationFact::RegisterModel(_) => hints_of!(RegisterModelFact),
            OperationFact::CreateDid(_) => hints_of!(CreateDidFact),
            OperationFact::UpdateDidDocument(_) => hints_of!(UpdateDidDocumentFact),
            OperationFact::DeactivateDid(_) => hints_of!(DeactivateDidFact),
            OperationFact::RegisterCurrency(_) => hints_of!(RegisterCurrencyFact),
            OperationFact::UpdateCurrency(_) => hints_of!(UpdateCurrencyFact),
            OperationFact::Mint(_) => hints_of!(MintFact),
        }
    }

    /// Operation type name used in DID allow-lists.
    pub fn operation_type(&self) -> &'static str {
        self.operation_hint().type_name
    }

    pub fn hash(&self) -> &Hash {
        each_fact!(self, f => f.hash())
    }

    pub fn token(&self) -> &[u8] {
        each_fact!(self, f => f.token())
    }

    pub fn bytes(&self) -> Vec<u8> {
        each_fact!(self, f => f.bytes())
    }

    pub fn is_valid(&self, network_id: &[u8]) -> Result<(), ValidationError> {
        each_fact!(self, f => f.is_valid(network_id))
    }

    /// JSON form of the fact, without its hint.
    pub fn to_json(&self) -> Result<serde_json::Value, serde_json::Error> {
        each_fact!(self, f => serde_json::to_value(f))
    }

    /// Signed by suffrage nodes rather than by a sender account.
    pub fn is_node_signed(&self) -> bool {
        matches!(
            self,
            OperationFact::RegisterCurrency(_)
                | OperationFact::UpdateCurrency(_)
                | OperationFact::Mint(_)
        )
    }

    pub fn sender(&self) -> Option<&Address> {
        match self {
            OperationFact::CreateAccount(f) => Some(f.sender()),
            OperationFact::Transfer(f) => Some(f.sender()),
            OperationFact::UpdateKey(f) => Some(f.sender()),
            OperationFact::CreateContractAccount(f) => Some(f.sender()),
            OperationFact::UpdateHandler(f) => Some(f.sender()),
            OperationFact::UpdateRecipient(f) => Some(f.sender()),
            OperationFact::Withdraw(f) => Some(f.sender()),
            OperationFact::RegisterModel(f) => Some(f.sender()),
            OperationFact::CreateDid(f) => Some(f.sender()),
            OperationFact::UpdateDidDocument(f) => Some(f.sender()),
            OperationFact::DeactivateDid(f) => Some(f.sender()),
            OperationFact::RegisterCurrency(_)
            | OperationFact::UpdateCurrency(_)
            | OperationFact::Mint(_) => None,
        }
    }

    pub fn fee_able(&self) -> Option<&dyn FeeAble> {
        match self {
            OperationFact::CreateAccount(f) => Some(f),
            OperationFact::Transfer(f) => Some(f),
            OperationFact::UpdateKey(f) => Some(f),
            OperationFact::CreateContractAccount(f) => Some(f),
            OperationFact::UpdateHandler(f) => Some(f),
            OperationFact::UpdateRecipient(f) => Some(f),
            OperationFact::Withdraw(f) => Some(f),
            OperationFact::RegisterModel(f) => Some(f),
            OperationFact::CreateDid(f) => Some(f),
            OperationFact::UpdateDidDocument(f) => Some(f),
            OperationFact::DeactivateDid(f) => Some(f),
            OperationFact::RegisterCurrency(_)
            | OperationFact::UpdateCurrency(_)
            | OperationFact::Mint(_) => None,
        }
    }

    pub fn contract_owner_only(&self) -> Option<&dyn ContractOwnerOnly> {
        match self {
            OperationFact::UpdateHandler(f) => Some(f),
            OperationFact::UpdateRecipient(f) => Some(f),
            OperationFact::Withdraw(f) => Some(f),
            _ => None,
        }
    }

    pub fn active_contract(&self) -> Option<&dyn ActiveContract> {
        match self {
            OperationFact::CreateDid(f) => Some(f),
            OperationFact::UpdateDidDocument(f) => Some(f),
            _ => None,
        }
    }

    pub fn active_contract_owner_handler_only(
        &self,
    ) -> Option<&dyn ActiveContractOwnerHandlerOnly> {
        match self {
            OperationFact::DeactivateDid(f) => Some(f),
            _ => None,
        }
    }

    pub fn inactive_contract_owner_handler_only(
        &self,
    ) -> Option<&dyn InActiveContractOwnerHandlerOnly> {
        match self {
            OperationFact::RegisterModel(f) => Some(f),
            _ => None,
        }
    }

    /// Contracts named by the fact's contract roles, sorted and distinct.
    pub fn role_contracts(&self) -> Vec<Address> {
        let mut contracts = BTreeSet::new();
        if let Some(role) = self.contract_owner_only() {
            contracts.extend(role.owner_only().into_iter().map(|p| p.contract));
        }
        if let Some(role) = self.active_contract() {
            contracts.extend(role.active_contracts());
        }
        if let Some(role) = self.active_contract_owner_handler_only() {
            contracts.extend(role.active_owner_handler().into_iter().map(|p| p.contract));
        }
        if let Some(role) = self.inactive_contract_owner_handler_only() {
            contracts.extend(role.inactive_owner_handler().into_iter().map(|p| p.contract));
        }
        contracts.into_iter().collect()
    }
}

macro_rules! impl_from_fact {
    ($($variant:ident => $fact:ty),* $(,)?) => {
        $(
            impl From<$fact> for OperationFact {
                fn from(fact: $fact) -> Self {
                    OperationFact::$variant(fact)
                }
            }
        )*
    };
}

impl_from_fact! {
    CreateAccount => CreateAccountFact,
    Transfer => TransferFact,
    UpdateKey => UpdateKeyFact,
    CreateContractAccount => CreateContractAccountFact,
    UpdateHandler => UpdateHandlerFact,
    UpdateRecipient => UpdateRecipientFact,
    Withdraw => WithdrawFact,
    RegisterModel => RegisterModelFact,
    CreateDid => CreateDidFact,
    UpdateDidDocument => UpdateDidDocumentFact,
    DeactivateDid => DeactivateDidFact,
    RegisterCurrency => RegisterCurrencyFact,
    UpdateCurrency => UpdateCurrencyFact,
    Mint => MintFact,
}

/// Fact and operation hints of one operation kind.
macro_rules! fact_hints {
    ($name:literal) => {
        const HINT: shared_types::hint::Hint = shared_types::hint::Hint::new(
            concat!("ledger-", $name, "-operation-fact"),
            crate::facts::HINT_VERSION,
        );
        const OPERATION_HINT: shared_types::hint::Hint = shared_types::hint::Hint::new(
            concat!("ledger-", $name, "-operation"),
            crate::facts::HINT_VERSION,
        );
    };
}
pub(crate) use fact_hints;
