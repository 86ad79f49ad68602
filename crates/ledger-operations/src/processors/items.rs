//! # Item Processors
//!
//! | Item | Pre-process | Emits |
//! |------|-------------|-------|
//! | `CreateAccountItem` | new account absent, currencies exist, minimum met | account, balances |
//! | `CreateContractAccountItem` | as above | contract account, balances, contract status |
//! | `TransferItem` | receiver account and currencies exist | receiver balances |
//! | `WithdrawItem` | target contract allows withdrawals, balances cover | target deductions |
//!
//! An item processor holds only the current item, the fact hash and the
//! sender; `reset` clears all three before the processor is pooled again.

use crate::domain::{fan_out, lookup, Pool, ProcessContext, Reset};
use crate::errors::{FatalError, ProcessError, ReasonKind};
use crate::facts::{CreateAccountItem, CreateContractAccountItem, TransferItem, WithdrawItem};
use shared_types::state::keys;
use shared_types::{
    Account, AccountKeys, Address, Amount, BalanceStatus, ContractAccountStatus, Hash,
    StateMergeValue, StateReader, StateValue,
};
use tracing::debug;

/// Per-item half of a multi-item operation.
pub trait ItemProcessor: Reset + Default + Send {
    type Item: Clone + Sync;

    fn load(&mut self, item: &Self::Item, fact_hash: &Hash, sender: &Address);

    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), ProcessError>;

    fn process(&mut self, reader: &dyn StateReader) -> Result<Vec<StateMergeValue>, ProcessError>;
}

/// Pools of every item processor type.
pub struct ItemPools {
    pub create_account: Pool<CreateAccountItemProcessor>,
    pub create_contract_account: Pool<CreateContractAccountItemProcessor>,
    pub transfer: Pool<TransferItemProcessor>,
    pub withdraw: Pool<WithdrawItemProcessor>,
}

impl ItemPools {
    pub fn new(capacity: usize) -> Self {
        Self {
            create_account: Pool::new(capacity),
            create_contract_account: Pool::new(capacity),
            transfer: Pool::new(capacity),
            withdraw: Pool::new(capacity),
        }
    }
}

/// Shared arguments of one item fan-out.
pub struct ItemRun<'a> {
    pub ctx: &'a ProcessContext,
    pub reader: &'a dyn StateReader,
    pub fact_hash: &'a Hash,
    pub sender: &'a Address,
    pub threshold: usize,
}

/// Pre-process every item; the first failure in item order wins.
pub fn pre_process_items<P: ItemProcessor>(
    pool: &Pool<P>,
    items: &[P::Item],
    run: &ItemRun<'_>,
) -> Result<(), ProcessError> {
    fan_out(items, run.threshold, |i, item| {
        run.ctx.check()?;
        let mut processor = pool.acquire();
        processor.load(item, run.fact_hash, run.sender);
        let result = processor.pre_process(run.reader);
        processor.close();
        result.map_err(|e| e.wrap(format!("item {i}")))
    })?;
    Ok(())
}

/// Process every item and concatenate the merge values in item order.
pub fn process_items<P: ItemProcessor>(
    pool: &Pool<P>,
    items: &[P::Item],
    run: &ItemRun<'_>,
) -> Result<Vec<StateMergeValue>, ProcessError> {
    let per_item = fan_out(items, run.threshold, |i, item| {
        run.ctx.check()?;
        let mut processor = pool.acquire();
        processor.load(item, run.fact_hash, run.sender);
        let result = processor.process(run.reader);
        processor.close();
        result.map_err(|e| e.wrap(format!("item {i}")))
    })?;
    debug!(items = per_item.len(), "Items processed");
    Ok(per_item.into_iter().flatten().collect())
}

/// Currency exists, balance absent, amount reaches the policy minimum.
fn check_new_balances(
    reader: &dyn StateReader,
    address: &Address,
    amounts: &[Amount],
) -> Result<(), ProcessError> {
    for amount in amounts {
        let design = lookup::existing_currency(reader, amount.currency())?;
        lookup::ensure_absent(reader, &keys::balance(address, amount.currency()))?;
        if amount.big() < design.policy().min_balance() {
            return Err(ProcessError::reason(
                ReasonKind::ValueInvalid,
                format!(
                    "{amount} under minimum balance {} of {}",
                    design.policy().min_balance(),
                    amount.currency()
                ),
            ));
        }
    }
    Ok(())
}

fn new_balances(address: &Address, amounts: &[Amount]) -> Vec<StateMergeValue> {
    amounts
        .iter()
        .map(|amount| {
            StateMergeValue::add_balance(keys::balance(address, amount.currency()), amount.clone())
        })
        .collect()
}

/// The item an item processor currently works on.
#[derive(Debug)]
pub struct ItemSlot<I> {
    item: Option<I>,
    fact_hash: Option<Hash>,
    sender: Option<Address>,
}

impl<I> Default for ItemSlot<I> {
    fn default() -> Self {
        Self {
            item: None,
            fact_hash: None,
            sender: None,
        }
    }
}

impl<I: Clone> ItemSlot<I> {
    fn load(&mut self, item: &I, fact_hash: &Hash, sender: &Address) {
        self.item = Some(item.clone());
        self.fact_hash = Some(*fact_hash);
        self.sender = Some(sender.clone());
    }

    /// Item, fact hash and sender; fatal when nothing is loaded.
    fn get(&self) -> Result<(&I, &Hash, &Address), ProcessError> {
        match (&self.item, &self.fact_hash, &self.sender) {
            (Some(item), Some(hash), Some(sender)) => Ok((item, hash, sender)),
            _ => Err(FatalError::Internal("item processor used without an item".into()).into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.item.is_none() && self.fact_hash.is_none() && self.sender.is_none()
    }
}

impl<I> Reset for ItemSlot<I> {
    fn reset(&mut self) {
        self.item = None;
        self.fact_hash = None;
        self.sender = None;
    }
}

#[derive(Default)]
pub struct CreateAccountItemProcessor {
    slot: ItemSlot<CreateAccountItem>,
}

impl Reset for CreateAccountItemProcessor {
    fn reset(&mut self) {
        self.slot.reset();
    }
}

impl ItemProcessor for CreateAccountItemProcessor {
    type Item = CreateAccountItem;

    fn load(&mut self, item: &CreateAccountItem, fact_hash: &Hash, sender: &Address) {
        self.slot.load(item, fact_hash, sender);
    }

    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let (item, _, _) = self.slot.get()?;
        let target = item.address();
        lookup::ensure_absent(reader, &keys::account(&target))?;
        check_new_balances(reader, &target, item.amounts())
    }

    fn process(&mut self, _reader: &dyn StateReader) -> Result<Vec<StateMergeValue>, ProcessError> {
        let (item, _, _) = self.slot.get()?;
        let account = Account::new(item.keys().clone());
        let target = account.address().clone();
        let mut merges = vec![StateMergeValue::set(
            keys::account(&target),
            StateValue::Account(account),
        )];
        merges.extend(new_balances(&target, item.amounts()));
        Ok(merges)
    }
}

#[derive(Default)]
pub struct CreateContractAccountItemProcessor {
    slot: ItemSlot<CreateContractAccountItem>,
}

impl Reset for CreateContractAccountItemProcessor {
    fn reset(&mut self) {
        self.slot.reset();
    }
}

impl ItemProcessor for CreateContractAccountItemProcessor {
    type Item = CreateContractAccountItem;

    fn load(&mut self, item: &CreateContractAccountItem, fact_hash: &Hash, sender: &Address) {
        self.slot.load(item, fact_hash, sender);
    }

    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let (item, _, _) = self.slot.get()?;
        let target = item.address();
        lookup::ensure_absent(reader, &keys::account(&target))?;
        lookup::ensure_absent(reader, &keys::contract_account(&target))?;
        check_new_balances(reader, &target, item.amounts())
    }

    fn process(&mut self, _reader: &dyn StateReader) -> Result<Vec<StateMergeValue>, ProcessError> {
        let (item, _, owner) = self.slot.get()?;
        let target = item.address();
        let account = Account::with_address(target.clone(), AccountKeys::contract());
        let mut merges = vec![StateMergeValue::set(
            keys::account(&target),
            StateValue::Account(account),
        )];
        merges.extend(new_balances(&target, item.amounts()));
        merges.push(StateMergeValue::set(
            keys::contract_account(&target),
            StateValue::ContractAccount(ContractAccountStatus::new(owner.clone())),
        ));
        Ok(merges)
    }
}

#[derive(Default)]
pub struct TransferItemProcessor {
    slot: ItemSlot<TransferItem>,
}

impl Reset for TransferItemProcessor {
    fn reset(&mut self) {
        self.slot.reset();
    }
}

impl ItemProcessor for TransferItemProcessor {
    type Item = TransferItem;

    fn load(&mut self, item: &TransferItem, fact_hash: &Hash, sender: &Address) {
        self.slot.load(item, fact_hash, sender);
    }

    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let (item, _, _) = self.slot.get()?;
        lookup::existing_account(reader, item.receiver())?;
        for amount in item.amounts() {
            lookup::existing_currency(reader, amount.currency())?;
        }
        Ok(())
    }

    /// Receiver credits only; the sender debit is part of the fee plan.
    fn process(&mut self, _reader: &dyn StateReader) -> Result<Vec<StateMergeValue>, ProcessError> {
        let (item, _, _) = self.slot.get()?;
        Ok(new_balances(item.receiver(), item.amounts()))
    }
}

#[derive(Default)]
pub struct WithdrawItemProcessor {
    slot: ItemSlot<WithdrawItem>,
}

impl Reset for WithdrawItemProcessor {
    fn reset(&mut self) {
        self.slot.reset();
    }
}

impl ItemProcessor for WithdrawItemProcessor {
    type Item = WithdrawItem;

    fn load(&mut self, item: &WithdrawItem, fact_hash: &Hash, sender: &Address) {
        self.slot.load(item, fact_hash, sender);
    }

    fn pre_process(&mut self, reader: &dyn StateReader) -> Result<(), ProcessError> {
        let (item, _, _) = self.slot.get()?;
        let target = item.target();
        let account = lookup::existing_account(reader, target)?;
        if !account.is_contract() {
            return Err(ProcessError::reason(
                ReasonKind::ValueInvalid,
                format!("{target} is not a contract account"),
            ));
        }
        let status = lookup::existing_contract_status(reader, target)?;
        if status.balance_status() != BalanceStatus::Allowed {
            return Err(ProcessError::reason(
                ReasonKind::ValueInvalid,
                format!("withdrawals from {target} are blocked"),
            ));
        }

        for amount in item.amounts() {
            lookup::existing_currency(reader, amount.currency())?;
            let balance = lookup::existing_balance(reader, target, amount.currency())?;
            if balance.big() < amount.big() {
                return Err(ProcessError::reason(
                    ReasonKind::InsufficientBalance,
                    format!("{target} holds {balance}, {amount} requested"),
                ));
            }
        }
        Ok(())
    }

    fn process(&mut self, _reader: &dyn StateReader) -> Result<Vec<StateMergeValue>, ProcessError> {
        let (item, _, _) = self.slot.get()?;
        Ok(item
            .amounts()
            .iter()
            .map(|amount| {
                StateMergeValue::deduct_balance(
                    keys::balance(item.target(), amount.currency()),
                    amount.clone(),
                )
            })
            .collect())
    }
}
