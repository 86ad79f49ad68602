//! Processors of the contract-account operations.

use super::items::{pre_process_items, process_items};
use super::{expect_fact, scratch_processor, OperationProcessor, ProcessorEnv};
use crate::domain::{lookup, ProcessContext};
use crate::errors::ProcessError;
use crate::operation::Operation;
use shared_types::state::keys;
use shared_types::{Address, ContractAccountStatus, StateMergeValue, StateReader, StateValue};

scratch_processor!(CreateContractAccountProcessor);

impl OperationProcessor for CreateContractAccountProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, CreateContractAccount);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |sender| {
            let run = env.item_run(ctx, op, reader, sender.address());
            pre_process_items(&env.items.create_contract_account, fact.items(), &run)
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, CreateContractAccount);
        self.scratch.process_sender_signed(ctx, op, reader, |sender| {
            let run = env.item_run(ctx, op, reader, sender.address());
            process_items(&env.items.create_contract_account, fact.items(), &run)
        })
    }
}

/// Listed addresses must be existing accounts.
fn check_listed_accounts(
    reader: &dyn StateReader,
    addresses: &[Address],
) -> Result<(), ProcessError> {
    for address in addresses {
        lookup::existing_account(reader, address)?;
    }
    Ok(())
}

fn set_status(contract: &Address, status: ContractAccountStatus) -> Vec<StateMergeValue> {
    vec![StateMergeValue::set(
        keys::contract_account(contract),
        StateValue::ContractAccount(status),
    )]
}

scratch_processor!(UpdateHandlerProcessor);

impl OperationProcessor for UpdateHandlerProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, UpdateHandler);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |_| {
            let status = lookup::existing_contract_status(reader, fact.contract())?;
            status.with_handlers(fact.handlers().to_vec())?;
            check_listed_accounts(reader, fact.handlers())
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, UpdateHandler);
        self.scratch.process_sender_signed(ctx, op, reader, |_| {
            let status = lookup::existing_contract_status(reader, fact.contract())?;
            let updated = status.with_handlers(fact.handlers().to_vec())?;
            Ok(set_status(fact.contract(), updated))
        })
    }
}

scratch_processor!(UpdateRecipientProcessor);

impl OperationProcessor for UpdateRecipientProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, UpdateRecipient);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |_| {
            let status = lookup::existing_contract_status(reader, fact.contract())?;
            status.with_recipients(fact.recipients().to_vec())?;
            check_listed_accounts(reader, fact.recipients())
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, UpdateRecipient);
        self.scratch.process_sender_signed(ctx, op, reader, |_| {
            let status = lookup::existing_contract_status(reader, fact.contract())?;
            let updated = status.with_recipients(fact.recipients().to_vec())?;
            Ok(set_status(fact.contract(), updated))
        })
    }
}

scratch_processor!(
    /// Moves contract balances to the owner; the owner credit is part of the
    /// fee plan.
    WithdrawProcessor
);

impl OperationProcessor for WithdrawProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, Withdraw);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |sender| {
            let run = env.item_run(ctx, op, reader, sender.address());
            pre_process_items(&env.items.withdraw, fact.items(), &run)
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, Withdraw);
        self.scratch.process_sender_signed(ctx, op, reader, |sender| {
            let run = env.item_run(ctx, op, reader, sender.address());
            process_items(&env.items.withdraw, fact.items(), &run)
        })
    }
}
