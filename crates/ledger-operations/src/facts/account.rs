//! Account facts: create account, transfer, update key.

use super::roles::{amounts_fee_base, zero_fee_base, FeeAble, FeeBase};
use super::{fact_hash, fact_hints, validate_items, Fact, FactItem};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::currency::{sorted_amounts, validate_item_amounts};
use shared_types::encoding::ByteWriter;
use shared_types::{AccountKeys, Address, Amount, CurrencyId, Hash, ValidationError};

pub const MAX_CREATE_ACCOUNT_ITEMS: usize = 100;
pub const MAX_TRANSFER_ITEMS: usize = 3000;

/// New account: its key set and opening balances.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountItem {
    keys: AccountKeys,
    amounts: Vec<Amount>,
}

impl CreateAccountItem {
    pub fn new(keys: AccountKeys, amounts: Vec<Amount>) -> Self {
        Self { keys, amounts }
    }

    pub fn keys(&self) -> &AccountKeys {
        &self.keys
    }

    pub fn amounts(&self) -> &[Amount] {
        &self.amounts
    }

    /// Address the account is created at.
    pub fn address(&self) -> Address {
        Address::from_keys(&self.keys)
    }

    fn rebuild(&self) -> Self {
        Self::new(self.keys.clone(), sorted_amounts(&self.amounts))
    }
}

impl FactItem for CreateAccountItem {
    fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(&self.keys.bytes())
            .put_list(&self.amounts, Amount::bytes);
        w.finish()
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        self.keys.is_valid()?;
        if self.keys.is_contract() {
            return Err(ValidationError::InvalidFormat(
                "contract key set for a new account".into(),
            ));
        }
        validate_item_amounts(&self.amounts)
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateAccountFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    items: Vec<CreateAccountItem>,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl CreateAccountFact {
    pub fn new(token: impl Into<Vec<u8>>, sender: Address, items: Vec<CreateAccountItem>) -> Self {
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

    pub fn items(&self) -> &[CreateAccountItem] {
        &self.items
    }

    /// Same fact with item amounts sorted by currency and a fresh hash.
    pub fn rebuild(&self) -> Self {
        let items = self.items.iter().map(CreateAccountItem::rebuild).collect();
        Self::new(self.token.clone(), self.sender.clone(), items)
    }
}

impl Fact for CreateAccountFact {
    fact_hints!("create-account");

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
            MAX_CREATE_ACCOUNT_ITEMS,
            Some(&self.sender),
            |item| item.address(),
            |item| Some(item.address()),
        )
    }
}

impl FeeAble for CreateAccountFact {
    fn fee_base(&self) -> FeeBase {
        amounts_fee_base(self.items.iter().flat_map(|i| i.amounts.iter()))
    }

    fn fee_payer(&self) -> &Address {
        &self.sender
    }
}

/// One transfer leg.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferItem {
    receiver: Address,
    amounts: Vec<Amount>,
}

impl TransferItem {
    pub fn new(receiver: Address, amounts: Vec<Amount>) -> Self {
        Self { receiver, amounts }
    }

    pub fn receiver(&self) -> &Address {
        &self.receiver
    }

    pub fn amounts(&self) -> &[Amount] {
        &self.amounts
    }
}

impl FactItem for TransferItem {
    fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(self.receiver.bytes())
            .put_list(&self.amounts, Amount::bytes);
        w.finish()
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        validate_item_amounts(&self.amounts)
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    items: Vec<TransferItem>,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl TransferFact {
    pub fn new(token: impl Into<Vec<u8>>, sender: Address, items: Vec<TransferItem>) -> Self {
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

    pub fn items(&self) -> &[TransferItem] {
        &self.items
    }

    pub fn rebuild(&self) -> Self {
        let items = self
            .items
            .iter()
            .map(|i| TransferItem::new(i.receiver.clone(), sorted_amounts(&i.amounts)))
            .collect();
        Self::new(self.token.clone(), self.sender.clone(), items)
    }
}

impl Fact for TransferFact {
    fact_hints!("transfer");

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
            MAX_TRANSFER_ITEMS,
            Some(&self.sender),
            |item| item.receiver.clone(),
            |item| Some(item.receiver.clone()),
        )
    }
}

impl FeeAble for TransferFact {
    fn fee_base(&self) -> FeeBase {
        amounts_fee_base(self.items.iter().flat_map(|i| i.amounts.iter()))
    }

    fn fee_payer(&self) -> &Address {
        &self.sender
    }
}

/// Replace the key set of the sender account.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateKeyFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    keys: AccountKeys,
    currency: CurrencyId,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl UpdateKeyFact {
    pub fn new(
        token: impl Into<Vec<u8>>,
        sender: Address,
        keys: AccountKeys,
        currency: CurrencyId,
    ) -> Self {
        let mut fact = Self {
            token: token.into(),
            sender,
            keys,
            currency,
            hash: [0u8; 32],
        };
        fact.hash = fact_hash(&fact.bytes());
        fact
    }

    pub fn sender(&self) -> &Address {
        &self.sender
    }

    pub fn keys(&self) -> &AccountKeys {
        &self.keys
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

impl Fact for UpdateKeyFact {
    fact_hints!("update-key");

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
            .put_bytes(&self.keys.bytes())
            .put_str(self.currency.as_str());
        w.finish()
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        self.keys.is_valid()?;
        if self.keys.is_contract() {
            return Err(ValidationError::InvalidFormat(
                "contract key set can not be assigned".into(),
            ));
        }
        Ok(())
    }
}

impl FeeAble for UpdateKeyFact {
    fn fee_base(&self) -> FeeBase {
        zero_fee_base(&self.currency)
    }

    fn fee_payer(&self) -> &Address {
        &self.sender
    }
}
