//! Contract account facts.

use super::roles::{
    amounts_fee_base, zero_fee_base, ContractActor, ContractOwnerOnly, FeeAble, FeeBase,
    FeeDirection,
};
use super::{fact_hash, fact_hints, validate_items, Fact, FactItem};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::contract::normalize_addresses;
use shared_types::currency::{sorted_amounts, validate_item_amounts};
use shared_types::encoding::ByteWriter;
use shared_types::{AccountKeys, Address, Amount, CurrencyId, Hash, ValidationError};

pub const MAX_CREATE_CONTRACT_ACCOUNT_ITEMS: usize = 1000;
pub const MAX_WITHDRAW_ITEMS: usize = 1000;

/// New contract account. `keys` only determine its address; the account
/// itself carries the contract key set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContractAccountItem {
    keys: AccountKeys,
    amounts: Vec<Amount>,
}

impl CreateContractAccountItem {
    pub fn new(keys: AccountKeys, amounts: Vec<Amount>) -> Self {
        Self { keys, amounts }
    }

    pub fn keys(&self) -> &AccountKeys {
        &self.keys
    }

    pub fn amounts(&self) -> &[Amount] {
        &self.amounts
    }

    pub fn address(&self) -> Address {
        Address::from_keys(&self.keys)
    }
}

impl FactItem for CreateContractAccountItem {
    fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(&self.keys.bytes())
            .put_list(&self.amounts, Amount::bytes);
        w.finish()
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        self.keys.is_valid()?;
        validate_item_amounts(&self.amounts)
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateContractAccountFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    items: Vec<CreateContractAccountItem>,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl CreateContractAccountFact {
    pub fn new(
        token: impl Into<Vec<u8>>,
        sender: Address,
        items: Vec<CreateContractAccountItem>,
    ) -> Self {
        let mut fact = Self {
            token: token.into(),
            sender,
            items,
            hash: [0u8; 32],
        };
        fact.hash = fact_hash(&fact.bytes());
        fact
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn items(&self) -> &[CreateContractAccountItem] {
        &self.items
    }

    pub fn rebuild(&self) -> Self {
        let items = self
            .items
            .iter()
            .map(|i| CreateContractAccountItem::new(i.keys.clone(), sorted_amounts(&i.amounts)))
            .collect();
        Self::new(self.token.clone(), self.sender.clone(), items)
    }
}

impl Fact for CreateContractAccountFact {
    fact_hints!("create-contract-account");

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(&self.token)
            .put_bytes(self.sender.bytes())
            .put_list(&self.items, FactItem::bytes);
        w.finish()
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        validate_items(
            "items",
            &self.items,
            MAX_CREATE_CONTRACT_ACCOUNT_ITEMS,
            Some(&self.sender),
            |item| item.address(),
            |item| Some(item.address()),
        )
    }
}

impl FeeAble for CreateContractAccountFact {
    fn fee_base(&self) -> FeeBase {
        amounts_fee_base(self.items.iter().flat_map(|i| i.amounts.iter()))
    }

    fn fee_payer(&self) -> &Address {
        &self.sender
    }
}

/// Facts replacing one address list of a contract account.
macro_rules! contract_list_fact {
    ($(#[$doc:meta])* $name:ident, $field:ident, $hint:literal) => {
        $(#[$doc])*
        #[serde_as]
        #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $name {
            #[serde_as(as = "Hex")]
            token: Vec<u8>,
            sender: Address,
            contract: Address,
            $field: Vec<Address>,
            currency: CurrencyId,
            #[serde_as(as = "Hex")]
            hash: Hash,
        }

        impl $name {
            pub fn new(
                token: impl Into<Vec<u8>>,
                sender: Address,
                contract: Address,
                $field: Vec<Address>,
                currency: CurrencyId,
            ) -> Self {
                let mut fact = Self {
                    token: token.into(),
                    sender,
                    contract,
                    $field,
                    currency,
                    hash: [0u8; 32],
                };
                fact.hash = fact_hash(&fact.bytes());
                fact
            }

            pub fn sender(&self) -> &Address {
                &self.sender
            }

            pub fn contract(&self) -> &Address {
                &self.contract
            }

            pub fn $field(&self) -> &[Address] {
                &self.$field
            }

            pub fn currency(&self) -> &CurrencyId {
                &self.currency
            }
        }

        impl Fact for $name {
            fact_hints!($hint);

            fn token(&self) -> &[u8] {
                &self.token
            }

            fn hash(&self) -> &Hash {
                &self.hash
            }

            fn bytes(&self) -> Vec<u8> {
                let mut w = ByteWriter::new();
                w.put_bytes(&self.token)
                    .put_bytes(self.sender.bytes())
                    .put_bytes(self.contract.bytes())
                    .put_list(&self.$field, |a| a.bytes().to_vec())
                    .put_str(self.currency.as_str());
                w.finish()
            }

            fn validate_fields(&self) -> Result<(), ValidationError> {
                if self.sender == self.contract {
                    return Err(ValidationError::SelfTarget(format!(
                        "sender {} is the contract",
                        self.sender
                    )));
                }
                // sender stands in for the owner; ownership is checked when processing
                normalize_addresses(stringify!($field), self.$field.clone(), &self.sender)?;
                if self.$field.contains(&self.contract) {
                    return Err(ValidationError::SelfTarget(format!(
                        "contract {} in its own {}",
                        self.contract,
                        stringify!($field)
                    )));
                }
                Ok(())
            }
        }

        impl FeeAble for $name {
            fn fee_base(&self) -> FeeBase {
                zero_fee_base(&self.currency)
            }

            fn fee_payer(&self) -> &Address {
                &self.sender
            }
        }

        impl ContractOwnerOnly for $name {
            fn owner_only(&self) -> Vec<ContractActor> {
                vec![ContractActor::new(self.contract.clone(), self.sender.clone())]
            }
        }
    };
}

contract_list_fact!(
    /// Replace the handlers of a contract account.
    UpdateHandlerFact,
    handlers,
    "update-handler"
);

contract_list_fact!(
    /// Replace the recipients of a contract account.
    UpdateRecipientFact,
    recipients,
    "update-recipient"
);

/// Move balances out of a contract account owned by the sender.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawItem {
    target: Address,
    amounts: Vec<Amount>,
}

impl WithdrawItem {
    pub fn new(target: Address, amounts: Vec<Amount>) -> Self {
        Self { target, amounts }
    }

    pub fn target(&self) -> &Address {
        &self.target
    }

    pub fn amounts(&self) -> &[Amount] {
        &self.amounts
    }
}

impl FactItem for WithdrawItem {
    fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(self.target.bytes())
            .put_list(&self.amounts, Amount::bytes);
        w.finish()
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        validate_item_amounts(&self.amounts)
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    items: Vec<WithdrawItem>,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl WithdrawFact {
    pub fn new(token: impl Into<Vec<u8>>, sender: Address, items: Vec<WithdrawItem>) -> Self {
        let mut fact = Self {
            token: token.into(),
            sender,
            items,
            hash: [0u8; 32],
        };
        fact.hash = fact_hash(&fact.bytes());
        fact
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn items(&self) -> &[WithdrawItem] {
        &self.items
    }

    pub fn rebuild(&self) -> Self {
        let items = self
            .items
            .iter()
            .map(|i| WithdrawItem::new(i.target.clone(), sorted_amounts(&i.amounts)))
            .collect();
        Self::new(self.token.clone(), self.sender.clone(), items)
    }
}

impl Fact for WithdrawFact {
    fact_hints!("withdraw");

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(&self.token)
            .put_bytes(self.sender.bytes())
            .put_list(&self.items, FactItem::bytes);
        w.finish()
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        validate_items(
            "items",
            &self.items,
            MAX_WITHDRAW_ITEMS,
            Some(&self.sender),
            |item| item.target.clone(),
            |item| Some(item.target.clone()),
        )
    }
}

impl FeeAble for WithdrawFact {
    fn fee_base(&self) -> FeeBase {
        amounts_fee_base(self.items.iter().flat_map(|i| i.amounts.iter()))
    }

    fn fee_payer(&self) -> &Address {
        &self.sender
    }

    fn fee_direction(&self) -> FeeDirection {
        FeeDirection::Credit
    }
}

impl ContractOwnerOnly for WithdrawFact {
    fn owner_only(&self) -> Vec<ContractActor> {
        self.items
            .iter()
            .map(|i| ContractActor::new(i.target.clone(), self.sender.clone()))
            .collect()
    }
}
