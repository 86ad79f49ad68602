//! # DID Registry Values
//!
//! A DID service is registered per contract account (`DidDesign`); documents
//! live under `did:<contract>:document:<did>`.
//!
//! - DID string: `did:<method>:<address>`
//! - Verification method id: `<did>#<fragment>`
//!
//! A verification method either carries a key or is `Linked` to a method of
//! another document. Only one hop of linking is resolved.

use crate::encoding::ByteWriter;
use crate::{Address, PublicKey, ValidationError};
use serde::{Deserialize, Serialize};
use shared_crypto::KeyKind;
use std::collections::BTreeSet;

/// Fragment of the key created with a new document.
pub const DEFAULT_KEY_FRAGMENT: &str = "key-1";
/// Maximum DID method name length.
pub const MAX_METHOD_NAME: usize = 20;

/// Build `did:<method>:<address>`.
pub fn did_for(method: &str, address: &Address) -> String {
    format!("did:{method}:{address}")
}

/// Split a DID into its method name and address.
pub fn parse_did(did: &str) -> Result<(&str, Address), ValidationError> {
    let mut parts = did.splitn(3, ':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("did"), Some(method), Some(address)) if is_method_name(method) => {
            Ok((method, Address::new(address)?))
        }
        _ => Err(ValidationError::InvalidFormat(format!("malformed did {did:?}"))),
    }
}

/// Split `<did>#<fragment>`.
pub fn split_method_id(id: &str) -> Result<(&str, &str), ValidationError> {
    match id.split_once('#') {
        Some((did, fragment)) if !fragment.is_empty() => {
            parse_did(did)?;
            Ok((did, fragment))
        }
        _ => Err(ValidationError::InvalidFormat(format!(
            "malformed verification method id {id:?}"
        ))),
    }
}

fn is_method_name(method: &str) -> bool {
    !method.is_empty()
        && method.len() <= MAX_METHOD_NAME
        && method
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

/// DID service registered on a contract account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDesign {
    method: String,
}

impl DidDesign {
    pub fn new(method: impl Into<String>) -> Result<Self, ValidationError> {
        let design = Self {
            method: method.into(),
        };
        design.is_valid()?;
        Ok(design)
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if !is_method_name(&self.method) {
            return Err(ValidationError::InvalidFormat(format!(
                "did method {:?} must be 1..={MAX_METHOD_NAME} lowercase alphanumerics",
                self.method
            )));
        }
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_str(&self.method);
        w.finish()
    }
}

/// A `(contract, operation type)` pair a verification method may authorize.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AllowedOperation {
    pub contract: Address,
    pub operation: String,
}

impl AllowedOperation {
    pub fn new(contract: Address, operation: impl Into<String>) -> Self {
        Self {
            contract,
            operation: operation.into(),
        }
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(self.contract.bytes()).put_str(&self.operation);
        w.finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum VerificationMethodKind {
    Ed25519 { public_key: PublicKey },
    Secp256k1 { public_key: PublicKey },
    /// Delegates key lookup to the method `target`.
    Linked { target: String },
}

impl VerificationMethodKind {
    pub fn from_key(public_key: PublicKey) -> Self {
        match public_key.kind() {
            KeyKind::Ed25519 => Self::Ed25519 { public_key },
            KeyKind::Secp256k1 => Self::Secp256k1 { public_key },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationMethod {
    id: String,
    controller: Address,
    kind: VerificationMethodKind,
    #[serde(default)]
    allowed: Vec<AllowedOperation>,
}

impl VerificationMethod {
    pub fn new(
        id: impl Into<String>,
        controller: Address,
        kind: VerificationMethodKind,
        allowed: Vec<AllowedOperation>,
    ) -> Self {
        Self {
            id: id.into(),
            controller,
            kind,
            allowed,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn controller(&self) -> &Address {
        &self.controller
    }

    pub fn kind(&self) -> &VerificationMethodKind {
        &self.kind
    }

    pub fn allowed(&self) -> &[AllowedOperation] {
        &self.allowed
    }

    /// Key of a non-linked method.
    pub fn public_key(&self) -> Option<&PublicKey> {
        match &self.kind {
            VerificationMethodKind::Ed25519 { public_key }
            | VerificationMethodKind::Secp256k1 { public_key } => Some(public_key),
            VerificationMethodKind::Linked { .. } => None,
        }
    }

    /// Target id of a linked method.
    pub fn linked_target(&self) -> Option<&str> {
        match &self.kind {
            VerificationMethodKind::Linked { target } => Some(target),
            _ => None,
        }
    }

    pub fn allows(&self, contract: &Address, operation: &str) -> bool {
        self.allowed
            .iter()
            .any(|a| &a.contract == contract && a.operation == operation)
    }

    pub fn with_allowed(&self, allowed: Vec<AllowedOperation>) -> Self {
        Self {
            allowed,
            ..self.clone()
        }
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        split_method_id(&self.id)?;
        match &self.kind {
            VerificationMethodKind::Ed25519 { public_key }
                if public_key.kind() != KeyKind::Ed25519 =>
            {
                return Err(ValidationError::TypeMismatch {
                    expected: "ed25519 key".into(),
                    actual: public_key.to_string(),
                })
            }
            VerificationMethodKind::Secp256k1 { public_key }
                if public_key.kind() != KeyKind::Secp256k1 =>
            {
                return Err(ValidationError::TypeMismatch {
                    expected: "secp256k1 key".into(),
                    actual: public_key.to_string(),
                })
            }
            VerificationMethodKind::Linked { target } => {
                split_method_id(target)?;
                if target == &self.id {
                    return Err(ValidationError::SelfTarget(format!(
                        "method {} links to itself",
                        self.id
                    )));
                }
            }
            _ => {}
        }
        let mut seen = BTreeSet::new();
        for allowed in &self.allowed {
            if !seen.insert(allowed) {
                return Err(ValidationError::DuplicateValue {
                    field: "allowed",
                    value: format!("{}:{}", allowed.contract, allowed.operation),
                });
            }
        }
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_str(&self.id).put_bytes(self.controller.bytes());
        match &self.kind {
            VerificationMethodKind::Ed25519 { public_key } => {
                w.put_u8(0).put_bytes(&public_key.bytes());
            }
            VerificationMethodKind::Secp256k1 { public_key } => {
                w.put_u8(1).put_bytes(&public_key.bytes());
            }
            VerificationMethodKind::Linked { target } => {
                w.put_u8(2).put_str(target);
            }
        }
        w.put_list(&self.allowed, AllowedOperation::bytes);
        w.finish()
    }
}

/// Entry of a document's authentication relationship.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthenticationEntry {
    Embedded(VerificationMethod),
    /// Id of a method in `verification_methods`.
    Reference(String),
}

impl AuthenticationEntry {
    pub fn id(&self) -> &str {
        match self {
            AuthenticationEntry::Embedded(method) => method.id(),
            AuthenticationEntry::Reference(id) => id,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DidDocument {
    id: String,
    controller: Address,
    authentication: Vec<AuthenticationEntry>,
    #[serde(default)]
    verification_methods: Vec<VerificationMethod>,
    #[serde(default)]
    deactivated: bool,
}

impl DidDocument {
    pub fn new(
        id: impl Into<String>,
        controller: Address,
        authentication: Vec<AuthenticationEntry>,
        verification_methods: Vec<VerificationMethod>,
    ) -> Self {
        Self {
            id: id.into(),
            controller,
            authentication,
            verification_methods,
            deactivated: false,
        }
    }

    /// Fresh document with a single embedded key `#key-1` and no allowed operations.
    pub fn new_with_key(
        did: impl Into<String>,
        controller: Address,
        public_key: PublicKey,
    ) -> Self {
        let did = did.into();
        let method = VerificationMethod::new(
            format!("{did}#{DEFAULT_KEY_FRAGMENT}"),
            controller.clone(),
            VerificationMethodKind::from_key(public_key),
            Vec::new(),
        );
        Self::new(
            did,
            controller,
            vec![AuthenticationEntry::Embedded(method)],
            Vec::new(),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn controller(&self) -> &Address {
        &self.controller
    }

    pub fn authentication(&self) -> &[AuthenticationEntry] {
        &self.authentication
    }

    pub fn verification_methods(&self) -> &[VerificationMethod] {
        &self.verification_methods
    }

    pub fn is_deactivated(&self) -> bool {
        self.deactivated
    }

    /// Any method of the document, embedded or listed.
    pub fn find_method(&self, id: &str) -> Option<&VerificationMethod> {
        self.authentication
            .iter()
            .filter_map(|entry| match entry {
                AuthenticationEntry::Embedded(method) => Some(method),
                AuthenticationEntry::Reference(_) => None,
            })
            .chain(self.verification_methods.iter())
            .find(|method| method.id() == id)
    }

    /// Method behind an authentication entry; `None` when `id` is not in the
    /// authentication relationship.
    pub fn resolve_authentication(&self, id: &str) -> Option<&VerificationMethod> {
        match self.authentication.iter().find(|entry| entry.id() == id)? {
            AuthenticationEntry::Embedded(method) => Some(method),
            AuthenticationEntry::Reference(reference) => self
                .verification_methods
                .iter()
                .find(|method| method.id() == reference),
        }
    }

    pub fn deactivate(&self) -> Self {
        Self {
            deactivated: true,
            ..self.clone()
        }
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        parse_did(&self.id)?;
        if self.authentication.is_empty() {
            return Err(ValidationError::ArrayLength {
                field: "authentication",
                actual: 0,
                min: 1,
                max: usize::MAX,
            });
        }

        let prefix = format!("{}#", self.id);
        let mut ids = BTreeSet::new();
        let embedded = self.authentication.iter().filter_map(|entry| match entry {
            AuthenticationEntry::Embedded(method) => Some(method),
            AuthenticationEntry::Reference(_) => None,
        });
        for method in embedded.chain(self.verification_methods.iter()) {
            method.is_valid()?;
            if !method.id().starts_with(&prefix) {
                return Err(ValidationError::InvalidFormat(format!(
                    "method {} outside document {}",
                    method.id(),
                    self.id
                )));
            }
            if !ids.insert(method.id()) {
                return Err(ValidationError::DuplicateValue {
                    field: "verification_methods",
                    value: method.id().to_string(),
                });
            }
        }
        for entry in &self.authentication {
            if let AuthenticationEntry::Reference(reference) = entry {
                if !self.verification_methods.iter().any(|m| m.id() == reference) {
                    return Err(ValidationError::InvalidFormat(format!(
                        "authentication reference {reference} not found"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_str(&self.id)
            .put_bytes(self.controller.bytes())
            .put_list(&self.authentication, |entry| match entry {
                AuthenticationEntry::Embedded(method) => {
                    let mut e = ByteWriter::new();
                    e.put_u8(0).put_bytes(&method.bytes());
                    e.finish()
                }
                AuthenticationEntry::Reference(id) => {
                    let mut e = ByteWriter::new();
                    e.put_u8(1).put_str(id);
                    e.finish()
                }
            })
            .put_list(&self.verification_methods, VerificationMethod::bytes)
            .put_bool(self.deactivated);
        w.finish()
    }
}
