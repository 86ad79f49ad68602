//! # Hint Registry
//!
//! Maps an encoded operation hint to the routine that decodes the hinted
//! JSON wire form back into an [`Operation`]. The standard table is built
//! once on first use and never changes afterwards.

use crate::errors::DecodeError;
use crate::extensions::Extensions;
use crate::facts::*;
use crate::operation::{Operation, HINT_FIELD};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use serde_with::{hex::Hex, serde_as};
use shared_types::hint::parse_hint;
use shared_types::{Hash, Sign};
use std::collections::HashMap;
use std::sync::OnceLock;

pub type DecodeFn = fn(Value) -> Result<Operation, DecodeError>;

#[serde_as]
#[derive(Deserialize)]
struct OperationBody {
    fact: Value,
    #[serde(default)]
    signs: Vec<Sign>,
    #[serde(default)]
    extensions: Extensions,
    #[serde_as(as = "Hex")]
    hash: Hash,
}

fn malformed(hint: &str, reason: impl ToString) -> DecodeError {
    DecodeError::Malformed {
        hint: hint.to_string(),
        reason: reason.to_string(),
    }
}

/// Take the `_hint` out of `value`.
fn take_hint(value: &mut Value) -> Result<String, DecodeError> {
    match value.as_object_mut().and_then(|m| m.remove(HINT_FIELD)) {
        Some(Value::String(hint)) => Ok(hint),
        _ => Err(DecodeError::MissingHint),
    }
}

fn decode_operation<F>(mut value: Value) -> Result<Operation, DecodeError>
where
    F: Fact + DeserializeOwned + Into<OperationFact>,
{
    let op_hint = F::OPERATION_HINT.to_string();
    take_hint(&mut value)?;

    let body: OperationBody =
        serde_json::from_value(value).map_err(|e| malformed(&op_hint, e))?;

    let mut fact_value = body.fact;
    let fact_hint = take_hint(&mut fact_value)?;
    if fact_hint != F::HINT.to_string() {
        return Err(malformed(
            &op_hint,
            format!("fact hint {fact_hint}, expected {}", F::HINT),
        ));
    }
    let fact: F = serde_json::from_value(fact_value).map_err(|e| malformed(&fact_hint, e))?;

    Ok(Operation::from_parts(
        fact.into(),
        body.signs,
        body.extensions,
        body.hash,
    ))
}

pub struct HintRegistry {
    decoders: HashMap<String, DecodeFn>,
}

macro_rules! register {
    ($registry:ident, $($fact:ty),* $(,)?) => {
        $(
            $registry.insert(
                <$fact as Fact>::OPERATION_HINT.to_string(),
                decode_operation::<$fact> as DecodeFn,
            );
        )*
    };
}

impl HintRegistry {
    /// Every operation this crate processes.
    pub fn standard() -> Self {
        let mut decoders = HashMap::new();
        register!(
            decoders,
            CreateAccountFact,
            TransferFact,
            UpdateKeyFact,
            CreateContractAccountFact,
            UpdateHandlerFact,
            UpdateRecipientFact,
            WithdrawFact,
            RegisterModelFact,
            CreateDidFact,
            UpdateDidDocumentFact,
            DeactivateDidFact,
            RegisterCurrencyFact,
            UpdateCurrencyFact,
            MintFact,
        );
        Self { decoders }
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn contains(&self, hint: &str) -> bool {
        self.decoders.contains_key(hint)
    }

    /// Decode a hinted operation. The result is not validated; callers run
    /// `Operation::is_valid` before processing it.
    pub fn decode(&self, value: &Value) -> Result<Operation, DecodeError> {
        let hint = value
            .get(HINT_FIELD)
            .and_then(Value::as_str)
            .ok_or(DecodeError::MissingHint)?;
        parse_hint(hint).map_err(|e| malformed(hint, e))?;
        let decode = self
            .decoders
            .get(hint)
            .ok_or_else(|| DecodeError::UnknownHint(hint.to_string()))?;
        decode(value.clone())
    }

    pub fn decode_str(&self, json: &str) -> Result<Operation, DecodeError> {
        let value: Value = serde_json::from_str(json)?;
        self.decode(&value)
    }
}

/// The standard registry, built on first use.
pub fn registry() -> &'static HintRegistry {
    static REGISTRY: OnceLock<HintRegistry> = OnceLock::new();
    REGISTRY.get_or_init(HintRegistry::standard)
}
