//! Processors of the node-signed currency operations.
//!
//! None of them carries a fee; authority comes from the suffrage.

use super::{expect_fact, scratch_processor, OperationProcessor, ProcessorEnv};
use crate::domain::{lookup, ProcessContext};
use crate::errors::{ProcessError, ReasonKind};
use crate::operation::Operation;
use shared_types::currency::checked_sum;
use shared_types::state::keys;
use shared_types::{
    Amount, CurrencyDesign, CurrencyId, CurrencyPolicy, StateMergeValue, StateReader, StateValue,
    U256,
};
use std::collections::BTreeMap;

/// The feeer receiver of `policy`, if any, must be an existing account.
fn check_fee_receiver(
    reader: &dyn StateReader,
    policy: &CurrencyPolicy,
) -> Result<(), ProcessError> {
    if let Some(receiver) = policy.feeer().receiver() {
        lookup::existing_account(reader, receiver)?;
    }
    Ok(())
}

scratch_processor!(RegisterCurrencyProcessor);

impl OperationProcessor for RegisterCurrencyProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, RegisterCurrency);
        self.scratch.pre_process_node_signed(ctx, op, reader, env, || {
            let design = fact.design();
            if lookup::currency(reader, design.currency())?.is_some() {
                return Err(ProcessError::reason(
                    ReasonKind::StateAlreadyExists,
                    format!("currency {} already registered", design.currency()),
                ));
            }
            lookup::existing_account(reader, design.genesis_account())?;
            check_fee_receiver(reader, design.policy())
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        _reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        ctx.check()?;
        let fact = expect_fact!(op, RegisterCurrency);
        let registered = fact.design();
        let design = CurrencyDesign::new(
            registered.initial_supply().clone(),
            registered.genesis_account().clone(),
            registered.policy().clone(),
            registered.decimal(),
        );
        let currency = design.currency().clone();
        Ok(vec![
            StateMergeValue::add_balance(
                keys::balance(design.genesis_account(), &currency),
                design.initial_supply().clone(),
            ),
            StateMergeValue::set(keys::currency_design(&currency), StateValue::Currency(design)),
        ])
    }
}

scratch_processor!(UpdateCurrencyProcessor);

impl OperationProcessor for UpdateCurrencyProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, UpdateCurrency);
        self.scratch.pre_process_node_signed(ctx, op, reader, env, || {
            lookup::existing_currency(reader, fact.currency())?;
            check_fee_receiver(reader, fact.policy())
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        ctx.check()?;
        let fact = expect_fact!(op, UpdateCurrency);
        let design = lookup::existing_currency(reader, fact.currency())?;
        Ok(vec![StateMergeValue::set(
            keys::currency_design(fact.currency()),
            StateValue::Currency(design.with_policy(fact.policy().clone())),
        )])
    }
}

scratch_processor!(MintProcessor);

impl OperationProcessor for MintProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, Mint);
        self.scratch.pre_process_node_signed(ctx, op, reader, env, || {
            for item in fact.items() {
                lookup::existing_currency(reader, item.amount().currency())?;
                lookup::existing_account(reader, item.receiver())?;
            }
            Ok(())
        })
    }

    /// One balance credit per item, one supply increase per currency.
    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        _reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        ctx.check()?;
        let fact = expect_fact!(op, Mint);
        let mut supply: BTreeMap<CurrencyId, Vec<U256>> = BTreeMap::new();
        let mut merges = Vec::with_capacity(fact.items().len() + 1);

        for item in fact.items() {
            let amount = item.amount();
            merges.push(StateMergeValue::add_balance(
                keys::balance(item.receiver(), amount.currency()),
                amount.clone(),
            ));
            supply
                .entry(amount.currency().clone())
                .or_default()
                .push(amount.big());
        }

        for (currency, amounts) in supply {
            let total = checked_sum(&amounts)?;
            merges.push(StateMergeValue::add_supply(
                keys::currency_design(&currency),
                Amount::new(total, currency),
            ));
        }
        Ok(merges)
    }
}
