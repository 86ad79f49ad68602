//! Processors of the account operations: create account, transfer, update key.

use super::items::{pre_process_items, process_items};
use super::{expect_fact, scratch_processor, OperationProcessor, ProcessorEnv};
use crate::domain::ProcessContext;
use crate::errors::{ProcessError, ReasonKind};
use crate::operation::Operation;
use shared_types::state::keys;
use shared_types::{StateMergeValue, StateReader, StateValue};

scratch_processor!(CreateAccountProcessor);

impl OperationProcessor for CreateAccountProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, CreateAccount);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |sender| {
            let run = env.item_run(ctx, op, reader, sender.address());
            pre_process_items(&env.items.create_account, fact.items(), &run)
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, CreateAccount);
        self.scratch.process_sender_signed(ctx, op, reader, |sender| {
            let run = env.item_run(ctx, op, reader, sender.address());
            process_items(&env.items.create_account, fact.items(), &run)
        })
    }
}

scratch_processor!(TransferProcessor);

impl OperationProcessor for TransferProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, Transfer);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |sender| {
            let run = env.item_run(ctx, op, reader, sender.address());
            pre_process_items(&env.items.transfer, fact.items(), &run)
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, Transfer);
        self.scratch.process_sender_signed(ctx, op, reader, |sender| {
            let run = env.item_run(ctx, op, reader, sender.address());
            process_items(&env.items.transfer, fact.items(), &run)
        })
    }
}

scratch_processor!(UpdateKeyProcessor);

impl OperationProcessor for UpdateKeyProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, UpdateKey);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |sender| {
            if sender.keys().equal(fact.keys()) {
                return Err(ProcessError::reason(
                    ReasonKind::ValueInvalid,
                    format!("{} already uses these keys", sender.address()),
                ));
            }
            Ok(())
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, UpdateKey);
        self.scratch.process_sender_signed(ctx, op, reader, |sender| {
            Ok(vec![StateMergeValue::set(
                keys::account(sender.address()),
                StateValue::Account(sender.with_keys(fact.keys().clone())),
            )])
        })
    }
}
