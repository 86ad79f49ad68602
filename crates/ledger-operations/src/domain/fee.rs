//! # Fee Aggregation
//!
//! Sender-signed operations move their fee-base amounts and pay a policy fee
//! per currency. All movements of one currency are netted per address before
//! any merge value is produced:
//!
//! | Party | Debit fact | Credit fact |
//! |-------|------------|-------------|
//! | sender | `-total` | `+total` |
//! | fee payer | `-fee` | `-fee` |
//! | feeer receiver | `+fee` | `+fee` |
//!
//! The fact's own payer needs a balance in every currency it touches, even
//! when it is only credited. A net debit requires an existing balance that
//! covers it. The fee payer is resolved by the caller (see
//! `Extensions::resolve_fee_payer`).

use crate::domain::lookup;
use crate::errors::{ProcessError, ReasonKind};
use crate::facts::{FeeAble, FeeDirection};
use shared_types::currency::checked_sum;
use shared_types::state::keys;
use shared_types::{Address, Amount, CurrencyId, StateMergeValue, StateReader, U256};
use std::collections::BTreeMap;
use tracing::debug;

/// Credits and debits of one address in one currency.
#[derive(Default)]
struct Movement {
    credit: U256,
    debit: U256,
}

impl Movement {
    fn credit(&mut self, amount: U256) -> Result<(), ProcessError> {
        self.credit = self.credit.checked_add(amount).ok_or_else(overflow)?;
        Ok(())
    }

    fn debit(&mut self, amount: U256) -> Result<(), ProcessError> {
        self.debit = self.debit.checked_add(amount).ok_or_else(overflow)?;
        Ok(())
    }
}

fn overflow() -> ProcessError {
    ProcessError::reason(ReasonKind::ValueInvalid, "amount overflow")
}

/// Fee charged in one currency.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeeCharge {
    pub currency: CurrencyId,
    /// Sum of the fee-base amounts.
    pub total: U256,
    pub fee: U256,
    pub receiver: Option<Address>,
}

/// Netted balance changes of a fee-able fact.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeePlan {
    pub charges: Vec<FeeCharge>,
    pub merges: Vec<StateMergeValue>,
}

/// Build the fee plan of `fact` with `payer` charged, checking every net
/// debit against the snapshot.
pub fn plan_fees(
    reader: &dyn StateReader,
    fact: &dyn FeeAble,
    payer: &Address,
) -> Result<FeePlan, ProcessError> {
    let sender = fact.fee_payer();
    let direction = fact.fee_direction();
    let mut plan = FeePlan::default();

    for (currency, basis) in fact.fee_base() {
        let design = lookup::existing_currency(reader, &currency)?;
        lookup::existing_balance(reader, sender, &currency)?;
        let total = checked_sum(&basis)?;
        let fee = design.policy().feeer().fee(&basis)?;
        let receiver = design.policy().feeer().receiver().cloned();

        let mut movements: BTreeMap<Address, Movement> = BTreeMap::new();
        let sender_movement = movements.entry(sender.clone()).or_default();
        match direction {
            FeeDirection::Debit => sender_movement.debit(total)?,
            FeeDirection::Credit => sender_movement.credit(total)?,
        }
        if let (Some(receiver), false) = (&receiver, fee.is_zero()) {
            movements.entry(payer.clone()).or_default().debit(fee)?;
            movements.entry(receiver.clone()).or_default().credit(fee)?;
        }

        for (address, movement) in movements {
            plan_movement(reader, &mut plan.merges, &address, &currency, movement)?;
        }

        debug!(%currency, %total, %fee, %payer, "Fee planned");
        plan.charges.push(FeeCharge {
            currency,
            total,
            fee,
            receiver,
        });
    }

    Ok(plan)
}

fn plan_movement(
    reader: &dyn StateReader,
    merges: &mut Vec<StateMergeValue>,
    address: &Address,
    currency: &CurrencyId,
    movement: Movement,
) -> Result<(), ProcessError> {
    let key = keys::balance(address, currency);
    if movement.credit > movement.debit {
        let net = movement.credit - movement.debit;
        merges.push(StateMergeValue::add_balance(
            key,
            Amount::new(net, currency.clone()),
        ));
    } else if movement.debit > movement.credit {
        let net = movement.debit - movement.credit;
        let balance = lookup::existing_balance(reader, address, currency)?;
        if balance.big() < net {
            return Err(ProcessError::reason(
                ReasonKind::InsufficientBalance,
                format!("{key}: required {net}, available {}", balance.big()),
            ));
        }
        merges.push(StateMergeValue::deduct_balance(
            key,
            Amount::new(net, currency.clone()),
        ));
    }
    Ok(())
}
