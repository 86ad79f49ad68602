//! # Currencies and Amounts
//!
//! Amounts are non-negative `U256` values tagged with a currency. Summation is
//! always bucketed per currency and checked for overflow.

use crate::encoding::ByteWriter;
use crate::ValidationError;
use primitive_types::U256;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Minimum currency id length.
pub const MIN_CURRENCY_ID: usize = 3;
/// Maximum currency id length.
pub const MAX_CURRENCY_ID: usize = 10;
/// Maximum number of amounts one item may carry.
pub const MAX_AMOUNTS_IN_ITEM: usize = 10;

/// Currency identifier, e.g. `MCC`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyId(String);

impl CurrencyId {
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.len() < MIN_CURRENCY_ID || s.len() > MAX_CURRENCY_ID {
            return Err(ValidationError::InvalidFormat(format!(
                "currency id {s:?} length outside {MIN_CURRENCY_ID}..={MAX_CURRENCY_ID}"
            )));
        }
        let bytes = s.as_bytes();
        let edge_ok = |b: u8| b.is_ascii_uppercase() || b.is_ascii_digit();
        let inner_ok = |b: u8| edge_ok(b) || matches!(b, b'_' | b'.' | b'!' | b'$' | b'*' | b'@');
        if !edge_ok(bytes[0])
            || !edge_ok(bytes[bytes.len() - 1])
            || !bytes.iter().all(|&b| inner_ok(b))
        {
            return Err(ValidationError::InvalidFormat(format!(
                "currency id {s:?} contains invalid characters"
            )));
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CurrencyId> for String {
    fn from(id: CurrencyId) -> Self {
        id.0
    }
}

impl fmt::Display for CurrencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A quantity of one currency.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Amount {
    big: U256,
    currency: CurrencyId,
}

impl Amount {
    pub fn new(big: impl Into<U256>, currency: CurrencyId) -> Self {
        Self {
            big: big.into(),
            currency,
        }
    }

    pub fn zero(currency: CurrencyId) -> Self {
        Self::new(U256::zero(), currency)
    }

    pub fn big(&self) -> U256 {
        self.big
    }

    pub fn currency(&self) -> &CurrencyId {
        &self.currency
    }

    pub fn is_positive(&self) -> bool {
        !self.big.is_zero()
    }

    /// Same currency, different quantity.
    pub fn with_big(&self, big: U256) -> Self {
        Self::new(big, self.currency.clone())
    }

    pub fn checked_add(&self, other: &Amount) -> Result<Amount, ValidationError> {
        self.ensure_same_currency(other)?;
        let big = self.big.checked_add(other.big).ok_or_else(|| {
            ValidationError::ValueOutOfRange(format!("{} + {} overflows", self, other))
        })?;
        Ok(self.with_big(big))
    }

    pub fn checked_sub(&self, other: &Amount) -> Result<Amount, ValidationError> {
        self.ensure_same_currency(other)?;
        let big = self.big.checked_sub(other.big).ok_or_else(|| {
            ValidationError::ValueOutOfRange(format!("{} - {} underflows", self, other))
        })?;
        Ok(self.with_big(big))
    }

    fn ensure_same_currency(&self, other: &Amount) -> Result<(), ValidationError> {
        if self.currency != other.currency {
            return Err(ValidationError::TypeMismatch {
                expected: self.currency.to_string(),
                actual: other.currency.to_string(),
            });
        }
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_u256(&self.big).put_str(self.currency.as_str());
        w.finish()
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.big, self.currency)
    }
}

/// Sum a list of quantities, failing on overflow.
pub fn checked_sum<'a>(
    values: impl IntoIterator<Item = &'a U256>,
) -> Result<U256, ValidationError> {
    values.into_iter().try_fold(U256::zero(), |acc, v| {
        acc.checked_add(*v)
            .ok_or_else(|| ValidationError::ValueOutOfRange("amount sum overflows".into()))
    })
}

/// Validate the amounts of one item: 1..=10 entries, positive, distinct currencies.
pub fn validate_item_amounts(amounts: &[Amount]) -> Result<(), ValidationError> {
    if amounts.is_empty() || amounts.len() > MAX_AMOUNTS_IN_ITEM {
        return Err(ValidationError::ArrayLength {
            field: "amounts",
            actual: amounts.len(),
            min: 1,
            max: MAX_AMOUNTS_IN_ITEM,
        });
    }

    let mut seen = BTreeSet::new();
    for amount in amounts {
        if !amount.is_positive() {
            return Err(ValidationError::ValueOutOfRange(format!(
                "amount of {} must be greater than zero",
                amount.currency
            )));
        }
        if !seen.insert(amount.currency()) {
            return Err(ValidationError::DuplicateValue {
                field: "amounts.currency",
                value: amount.currency.to_string(),
            });
        }
    }
    Ok(())
}

/// Amounts sorted by currency id, the normalized order items are rebuilt in.
pub fn sorted_amounts(amounts: &[Amount]) -> Vec<Amount> {
    let mut sorted = amounts.to_vec();
    sorted.sort_by(|a, b| a.currency.cmp(&b.currency));
    sorted
}
