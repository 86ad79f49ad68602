//! # Currency Design and Fee Policy
//!
//! | Feeer | Fee for a basis of `n` amounts |
//! |-------|-------------------------------|
//! | `Nil` | 0 |
//! | `Fixed` | `amount` once, if the basis is non-empty |
//! | `FixedItem` | `amount * n` |
//! | `Ratio` | sum of `clamp(entry * ratio_ppm / 1_000_000, min, max)` |

use crate::currency::checked_sum;
use crate::encoding::ByteWriter;
use crate::{Address, Amount, CurrencyId, ValidationError, U256};
use serde::{Deserialize, Serialize};

/// Parts-per-million denominator of `Feeer::Ratio`.
pub const RATIO_DENOMINATOR: u32 = 1_000_000;
/// Maximum number of decimal places of a currency.
pub const MAX_DECIMAL: u8 = 18;

/// Fee computation policy of a currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Feeer {
    Nil,
    Fixed {
        receiver: Address,
        amount: U256,
    },
    FixedItem {
        receiver: Address,
        amount: U256,
    },
    Ratio {
        receiver: Address,
        ratio_ppm: u32,
        min: U256,
        /// Zero means unbounded.
        max: U256,
    },
}

impl Feeer {
    /// Account credited with collected fees.
    pub fn receiver(&self) -> Option<&Address> {
        match self {
            Feeer::Nil => None,
            Feeer::Fixed { receiver, .. }
            | Feeer::FixedItem { receiver, .. }
            | Feeer::Ratio { receiver, .. } => Some(receiver),
        }
    }

    /// Fee owed for one currency's fee basis.
    pub fn fee(&self, basis: &[U256]) -> Result<U256, ValidationError> {
        match self {
            Feeer::Nil => Ok(U256::zero()),
            Feeer::Fixed { amount, .. } => {
                if basis.is_empty() {
                    Ok(U256::zero())
                } else {
                    Ok(*amount)
                }
            }
            Feeer::FixedItem { amount, .. } => amount
                .checked_mul(U256::from(basis.len()))
                .ok_or_else(|| ValidationError::ValueOutOfRange("fixed item fee overflows".into())),
            Feeer::Ratio {
                ratio_ppm,
                min,
                max,
                ..
            } => {
                let fees = basis
                    .iter()
                    .map(|entry| {
                        let scaled = entry
                            .checked_mul(U256::from(*ratio_ppm))
                            .ok_or_else(|| {
                                ValidationError::ValueOutOfRange("ratio fee overflows".into())
                            })?
                            / U256::from(RATIO_DENOMINATOR);
                        let mut fee = scaled.max(*min);
                        if !max.is_zero() {
                            fee = fee.min(*max);
                        }
                        Ok(fee)
                    })
                    .collect::<Result<Vec<_>, ValidationError>>()?;
                checked_sum(&fees)
            }
        }
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if let Feeer::Ratio {
            ratio_ppm, min, max, ..
        } = self
        {
            if *ratio_ppm > RATIO_DENOMINATOR {
                return Err(ValidationError::ValueOutOfRange(format!(
                    "ratio {ratio_ppm} ppm over {RATIO_DENOMINATOR}"
                )));
            }
            if !max.is_zero() && min > max {
                return Err(ValidationError::ValueOutOfRange(format!(
                    "ratio min {min} over max {max}"
                )));
            }
        }
        Ok(())
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        match self {
            Feeer::Nil => {
                w.put_str("nil");
            }
            Feeer::Fixed { receiver, amount } => {
                w.put_str("fixed").put_bytes(receiver.bytes()).put_u256(amount);
            }
            Feeer::FixedItem { receiver, amount } => {
                w.put_str("fixed_item")
                    .put_bytes(receiver.bytes())
                    .put_u256(amount);
            }
            Feeer::Ratio {
                receiver,
                ratio_ppm,
                min,
                max,
            } => {
                w.put_str("ratio")
                    .put_bytes(receiver.bytes())
                    .put_u32(*ratio_ppm)
                    .put_u256(min)
                    .put_u256(max);
            }
        }
        w.finish()
    }
}

/// Per-currency policy: minimum balance of new accounts and the feeer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyPolicy {
    min_balance: U256,
    feeer: Feeer,
}

impl CurrencyPolicy {
    pub fn new(min_balance: impl Into<U256>, feeer: Feeer) -> Self {
        Self {
            min_balance: min_balance.into(),
            feeer,
        }
    }

    pub fn min_balance(&self) -> U256 {
        self.min_balance
    }

    pub fn feeer(&self) -> &Feeer {
        &self.feeer
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        self.feeer.is_valid()
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_u256(&self.min_balance).put_bytes(&self.feeer.bytes());
        w.finish()
    }
}

/// Registered currency and its running total supply.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyDesign {
    initial_supply: Amount,
    genesis_account: Address,
    policy: CurrencyPolicy,
    decimal: u8,
    total_supply: U256,
}

impl CurrencyDesign {
    pub fn new(
        initial_supply: Amount,
        genesis_account: Address,
        policy: CurrencyPolicy,
        decimal: u8,
    ) -> Self {
        let total_supply = initial_supply.big();
        Self {
            initial_supply,
            genesis_account,
            policy,
            decimal,
            total_supply,
        }
    }

    pub fn currency(&self) -> &CurrencyId {
        self.initial_supply.currency()
    }

    pub fn initial_supply(&self) -> &Amount {
        &self.initial_supply
    }

    pub fn genesis_account(&self) -> &Address {
        &self.genesis_account
    }

    pub fn policy(&self) -> &CurrencyPolicy {
        &self.policy
    }

    pub fn decimal(&self) -> u8 {
        self.decimal
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply
    }

    /// Design with `amount` added to the total supply.
    pub fn add_supply(&self, amount: &U256) -> Result<Self, ValidationError> {
        let total_supply = self.total_supply.checked_add(*amount).ok_or_else(|| {
            ValidationError::ValueOutOfRange(format!(
                "total supply of {} overflows",
                self.currency()
            ))
        })?;
        Ok(Self {
            total_supply,
            ..self.clone()
        })
    }

    pub fn with_policy(&self, policy: CurrencyPolicy) -> Self {
        Self {
            policy,
            ..self.clone()
        }
    }

    pub fn is_valid(&self) -> Result<(), ValidationError> {
        if !self.initial_supply.is_positive() {
            return Err(ValidationError::ValueOutOfRange(
                "initial supply must be positive".into(),
            ));
        }
        if self.decimal > MAX_DECIMAL {
            return Err(ValidationError::ValueOutOfRange(format!(
                "decimal {} over {MAX_DECIMAL}",
                self.decimal
            )));
        }
        if self.total_supply < self.initial_supply.big() {
            return Err(ValidationError::ValueOutOfRange(
                "total supply under initial supply".into(),
            ));
        }
        self.policy.is_valid()
    }

    pub fn bytes(&self) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.put_bytes(&self.initial_supply.bytes())
            .put_bytes(self.genesis_account.bytes())
            .put_bytes(&self.policy.bytes())
            .put_u8(self.decimal)
            .put_u256(&self.total_supply);
        w.finish()
    }
}
