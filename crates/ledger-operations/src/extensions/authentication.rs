//! DID-based authentication of the fact sender.
//!
//! `proof_data` is a signature over the fact hash made with the key of the
//! verification method `authentication_id`. The method must sit in the
//! authentication relationship of the sender's own document, and its
//! allow-list must cover every contract the fact acts on.

use crate::domain::lookup;
use crate::errors::{ProcessError, ReasonKind};
use crate::operation::Operation;
use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};
use shared_types::did::{did_for, split_method_id};
use shared_types::encoding::ByteWriter;
use shared_types::{
    Address, Hash, PublicKey, StateReader, ValidationError, VerificationMethod,
    VerificationMethodKind,
};
use shared_crypto::KeyPair;

pub const EXTENSION_TYPE: &str = "authentication";

#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authentication {
    contract: Address,
    authentication_id: String,
    #[serde_as(as = "Hex")]
    proof_data: Vec<u8>,
}

impl Authentication {
    pub fn new(
        contract: Address,
        authentication_id: impl Into<String>,
        proof_data: Vec<u8>,
    ) -> Self {
        Self {
            contract,
            authentication_id: authentication_id.into(),
            proof_data,
        }
    }

    /// Prove `fact_hash` with the key behind `authentication_id`.
    pub fn prove(
        contract: Address,
        authentication_id: impl Into<String>,
        keypair: &KeyPair,
        fact_hash: &Hash,
    ) -> Self {
        Self::new(contract, authentication_id, keypair.sign(fact_hash))
    }

    pub fn contract(&self) -> &Address {
        &self.contract
    }

    pub fn authentication_id(&self) -> &str {
        &self.authentication_id
    }

    pub fn proof_data(&self) -> &[u8] {
        &self.proof_data
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        split_method_id(&self.authentication_id)?;
        if self.proof_data.is_empty() {
            return Err(ValidationError::InvalidFormat(
                "authentication proof is empty".into(),
            ));
        }
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(self.contract.bytes())
            .put_str(&self.authentication_id)
            .put_bytes(&self.proof_data);
        w.finish()
    }

    pub fn verify(&self, op: &Operation, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let fact = op.fact();
        let sender = fact.sender().ok_or_else(|| {
            ProcessError::reason(
                ReasonKind::ValueInvalid,
                "authentication needs a sender-signed operation",
            )
        })?;

        let (did, _) = split_method_id(&self.authentication_id)?;
        let design = lookup::existing_did_design(reader, &self.contract)?;
        if did != did_for(design.method(), sender) {
            return Err(ProcessError::reason(
                ReasonKind::AccountNotAuthorized,
                format!("{did} is not the did of {sender}"),
            ));
        }
        let document = lookup::existing_did_document(reader, &self.contract, did)?;
        if document.is_deactivated() {
            return Err(ProcessError::reason(
                ReasonKind::ValueInvalid,
                format!("did {did} is deactivated"),
            ));
        }
        if document.controller() != sender {
            return Err(ProcessError::reason(
                ReasonKind::AccountNotAuthorized,
                format!("{sender} does not control {did}"),
            ));
        }

        let method = document
            .resolve_authentication(&self.authentication_id)
            .ok_or_else(|| {
                ProcessError::reason(
                    ReasonKind::StateNotFound,
                    format!("{} is not an authentication method", self.authentication_id),
                )
            })?;

        let mut contracts = fact.role_contracts();
        if contracts.is_empty() {
            contracts.push(self.contract.clone());
        }
        let operation = fact.operation_type();
        if let Some(denied) = contracts.iter().find(|c| !method.allows(c, operation)) {
            return Err(ProcessError::reason(
                ReasonKind::AccountNotAuthorized,
                format!("{} may not authorize {operation} on {denied}", method.id()),
            ));
        }

        let key = self.resolve_key(method, reader)?;
        key.verify(fact.hash(), &self.proof_data).map_err(|e| {
            ProcessError::reason(
                ReasonKind::SignatureInvalid,
                format!("{}: {e}", self.authentication_id),
            )
        })
    }

    /// Key of `method`, following one `Linked` hop inside the same contract.
    fn resolve_key(
        &self,
        method: &VerificationMethod,
        reader: &dyn StateReader,
    ) -> Result<PublicKey, ProcessError> {
        let target = match method.kind() {
            VerificationMethodKind::Ed25519 { public_key }
            | VerificationMethodKind::Secp256k1 { public_key } => return Ok(public_key.clone()),
            VerificationMethodKind::Linked { target } => target,
        };

        let (target_did, _) = split_method_id(target)?;
        let document = lookup::existing_did_document(reader, &self.contract, target_did)?;
        if document.is_deactivated() {
            return Err(ProcessError::reason(
                ReasonKind::ValueInvalid,
                format!("linked did {target_did} is deactivated"),
            ));
        }
        let linked = document.find_method(target).ok_or_else(|| {
            ProcessError::reason(
                ReasonKind::StateNotFound,
                format!("linked method {target} not found"),
            )
        })?;
        linked.public_key().cloned().ok_or_else(|| {
            ProcessError::reason(
                ReasonKind::ValueInvalid,
                format!("linked method {target} is itself linked"),
            )
        })
    }
}
