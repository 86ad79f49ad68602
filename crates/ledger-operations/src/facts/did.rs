//! DID registry facts. The registry of a contract account is switched on by
//! `RegisterModelFact`; documents are then created, updated and deactivated
//! under it.

use super::roles::{
    zero_fee_base, ActiveContract, ActiveContractOwnerHandlerOnly, ContractActor, FeeAble,
    FeeBase, InActiveContractOwnerHandlerOnly,
};
use super::{fact_hash, fact_hints, Fact};
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::did::parse_did;
use shared_types::encoding::ByteWriter;
use shared_types::{Address, CurrencyId, DidDesign, DidDocument, Hash, PublicKey, ValidationError};

fn reject_contract_sender(sender: &Address, contract: &Address) -> Result<(), ValidationError> {
    if sender == contract {
        return Err(ValidationError::SelfTarget(format!(
            "sender {sender} is the contract"
        )));
    }
    Ok(())
}

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterModelFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    contract: Address,
    did_method: String,
    currency: CurrencyId,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl RegisterModelFact {
    pub fn new(
        token: impl Into<Vec<u8>>,
        sender: Address,
        contract: Address,
        did_method: impl Into<String>,
        currency: CurrencyId,
    ) -> Self {
        let mut fact = Self {
            token: token.into(),
            sender,
            contract,
            did_method: did_method.into(),
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

    pub fn did_method(&self) -> &str {
        &self.did_method
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

impl Fact for RegisterModelFact {
    fact_hints!("register-model");

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
            .put_str(&self.did_method)
            .put_str(self.currency.as_str());
        w.finish()
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        reject_contract_sender(&self.sender, &self.contract)?;
        DidDesign::new(self.did_method.clone()).map(|_| ())
    }
}

impl FeeAble for RegisterModelFact {
    fn fee_base(&self) -> FeeBase {
        zero_fee_base(&self.currency)
    }

    fn fee_payer(&self) -> &Address {
        &self.sender
    }
}

impl InActiveContractOwnerHandlerOnly for RegisterModelFact {
    fn inactive_owner_handler(&self) -> Vec<ContractActor> {
        vec![ContractActor::new(self.contract.clone(), self.sender.clone())]
    }
}

/// Create the sender's DID document with one key.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateDidFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    contract: Address,
    public_key: PublicKey,
    currency: CurrencyId,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl CreateDidFact {
    pub fn new(
        token: impl Into<Vec<u8>>,
        sender: Address,
        contract: Address,
        public_key: PublicKey,
        currency: CurrencyId,
    ) -> Self {
        let mut fact = Self {
            token: token.into(),
            sender,
            contract,
            public_key,
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

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

impl Fact for CreateDidFact {
    fact_hints!("create-did");

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
            .put_bytes(&self.public_key.bytes())
            .put_str(self.currency.as_str());
        w.finish()
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        reject_contract_sender(&self.sender, &self.contract)
    }
}

impl FeeAble for CreateDidFact {
    fn fee_base(&self) -> FeeBase {
        zero_fee_base(&self.currency)
    }

    fn fee_payer(&self) -> &Address {
        &self.sender
    }
}

impl ActiveContract for CreateDidFact {
    fn active_contracts(&self) -> Vec<Address> {
        vec![self.contract.clone()]
    }
}

/// Replace a DID document controlled by the sender.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDidDocumentFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    contract: Address,
    did: String,
    document: DidDocument,
    currency: CurrencyId,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl UpdateDidDocumentFact {
    pub fn new(
        token: impl Into<Vec<u8>>,
        sender: Address,
        contract: Address,
        did: impl Into<String>,
        document: DidDocument,
        currency: CurrencyId,
    ) -> Self {
        let mut fact = Self {
            token: token.into(),
            sender,
            contract,
            did: did.into(),
            document,
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

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn document(&self) -> &DidDocument {
        &self.document
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

impl Fact for UpdateDidDocumentFact {
    fact_hints!("update-did-document");

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
            .put_str(&self.did)
            .put_bytes(&self.document.bytes())
            .put_str(self.currency.as_str());
        w.finish()
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        reject_contract_sender(&self.sender, &self.contract)?;
        parse_did(&self.did)?;
        self.document.is_valid()?;
        if self.document.id() != self.did {
            return Err(ValidationError::InvalidFormat(format!(
                "document id {} differs from did {}",
                self.document.id(),
                self.did
            )));
        }
        if self.document.is_deactivated() {
            return Err(ValidationError::InvalidFormat(
                "document update can not deactivate".into(),
            ));
        }
        Ok(())
    }
}

impl FeeAble for UpdateDidDocumentFact {
    fn fee_base(&self) -> FeeBase {
        zero_fee_base(&self.currency)
    }

    fn fee_payer(&self) -> &Address {
        &self.sender
    }
}

impl ActiveContract for UpdateDidDocumentFact {
    fn active_contracts(&self) -> Vec<Address> {
        vec![self.contract.clone()]
    }
}

/// Deactivate a DID document; done by the contract owner or a handler.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeactivateDidFact {
    #[serde_as(as = "Hex")]
    token: Vec<u8>,
    sender: Address,
    contract: Address,
    did: String,
    currency: CurrencyId,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

impl DeactivateDidFact {
    pub fn new(
        token: impl Into<Vec<u8>>,
        sender: Address,
        contract: Address,
        did: impl Into<String>,
        currency: CurrencyId,
    ) -> Self {
        let mut fact = Self {
            token: token.into(),
            sender,
            contract,
            did: did.into(),
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

    pub fn did(&self) -> &str {
        &self.did
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }
}

impl Fact for DeactivateDidFact {
    fact_hints!("deactivate-did");

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
            .put_str(&self.did)
            .put_str(self.currency.as_str());
        w.finish()
    }

    fn validate_fields(&self) -> Result<(), ValidationError> {
        reject_contract_sender(&self.sender, &self.contract)?;
        parse_did(&self.did).map(|_| ())
    }
}

impl FeeAble for DeactivateDidFact {
    fn fee_base(&self) -> FeeBase {
        zero_fee_base(&self.currency)
    }

    fn fee_payer(&self) -> &Address {
        &self.sender
    }
}

impl ActiveContractOwnerHandlerOnly for DeactivateDidFact {
    fn active_owner_handler(&self) -> Vec<ContractActor> {
        vec![ContractActor::new(self.contract.clone(), self.sender.clone())]
    }
}
