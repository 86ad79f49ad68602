//! Node-signed currency facts: register currency, update currency, mint.

use super::{fact_hash, fact_hints, validate_items, Fact, FactItem};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::encoding::ByteWriter;
use shared_types::{
    Address, Amount, CurrencyDesign, CurrencyId, CurrencyPolicy, Hash, ValidationError,
};

pub const MAX_MINT_ITEMS: usize = 10;

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterCurrencyFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    design: CurrencyDesign,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl RegisterCurrencyFact {
    pub fn new(token: impl Into<Vec<u8>>, design: CurrencyDesign) -> Self {
        let mut fact = Self {
            token: token.into(),
            design,
            hash: [0u8; 32],
        };
        fact.hash = fact_hash(&fact.bytes());
        fact
    }

    pub fn design(&self) -> &CurrencyDesign {
        &self.design
    }
}

impl Fact for RegisterCurrencyFact {
    fact_hints!("register-currency");

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(&self.token).put_bytes(&self.design.bytes());
        w.finish()
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        self.design.is_valid()?;
        if self.design.total_supply() != self.design.initial_supply().big() {
            return Err(ValidationError::ValueOutOfRange(
                "new currency must start at its initial supply".into(),
            ));
        }
        Ok(())
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCurrencyFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    currency: CurrencyId,
    policy: CurrencyPolicy,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl UpdateCurrencyFact {
    pub fn new(token: impl Into<Vec<u8>>, currency: CurrencyId, policy: CurrencyPolicy) -> Self {
        let mut fact = Self {
            token: token.into(),
            currency,
            policy,
            hash: [0u8; 32],
        };
        fact.hash = fact_hash(&fact.bytes());
        fact
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    pub fn policy(&self) -> &CurrencyPolicy {
        &self.policy
    }
}

impl Fact for UpdateCurrencyFact {
    fact_hints!("update-currency");

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(&self.token)
            .put_str(self.currency.as_str())
            .put_bytes(&self.policy.bytes());
        w.finish()
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        self.policy.is_valid()
    }
}

/// New supply credited to `receiver`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintItem {
    receiver: Address,
    amount: Amount,
}

impl MintItem {
    pub fn new(receiver: Address, amount: Amount) -> Self {
        Self { receiver, amount }
    }

    pub fn receiver(&self) -> &Address {
        &self.receiver
    }

    pub fn amount(&self) -> &Amount {
        &self.amount
    }
}

impl FactItem for MintItem {
    fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(self.receiver.bytes())
            .put_bytes(&self.amount.bytes());
        w.finish()
    }

    fn is_valid(&self) -> Result<(), ValidationError> {
        if !self.amount.is_positive() {
            return Err(ValidationError::ValueOutOfRange(format!(
                "mint amount {} must be positive",
                self.amount
            )));
        }
        Ok(())
    }
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MintFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    items: Vec<MintItem>,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl MintFact {
    pub fn new(token: impl Into<Vec<u8>>, items: Vec<MintItem>) -> Self {
        let mut fact = Self {
            token: token.into(),
            items,
            hash: [0u8; 32],
        };
        fact.hash = fact_hash(&fact.bytes());
        fact
    }

    pub fn items(&self) -> &[MintItem] {
        &self.items
    }
}

impl Fact for MintFact {
    fact_hints!("mint");

    fn token(&self) -> &[u8] {
        &self.token
    }

    fn hash(&self) -> &Hash {
        &self.hash
    }

    fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(&self.token)
            .put_list(&self.items, FactItem::bytes);
        w.finish()
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        validate_items(
            "items",
            &self.items,
            MAX_MINT_ITEMS,
            None,
            |item| format!("{}:{}", item.receiver, item.amount.currency()),
            |_| None,
        )
    }
}
