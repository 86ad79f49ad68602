//! Processors of the DID registry operations.
//!
//! | Operation | Requires | Emits |
//! |-----------|----------|-------|
//! | RegisterModel | no DID service on the contract | DID design, contract activated |
//! | CreateDid | DID service, no document for the sender | document with `#key-1` |
//! | UpdateDidDocument | live document controlled by the sender | replaced document |
//! | DeactivateDid | live document | document marked deactivated |

use super::{expect_fact, scratch_processor, OperationProcessor, ProcessorEnv};
use crate::domain::{lookup, ProcessContext};
use crate::errors::{ProcessError, ReasonKind};
use crate::operation::Operation;
use shared_types::did::did_for;
use shared_types::state::keys;
use shared_types::{
    Address, DidDesign, DidDocument, StateMergeValue, StateReader, StateValue,
};

fn service_registered(contract: &Address) -> ProcessError {
    ProcessError::reason(
        ReasonKind::ServiceAlreadyRegistered,
        format!("contract {contract} already has a did service"),
    )
}

/// Existing, not deactivated document.
fn live_document(
    reader: &dyn StateReader,
    contract: &Address,
    did: &str,
) -> Result<DidDocument, ProcessError> {
    lookup::existing_did_design(reader, contract)?;
    let document = lookup::existing_did_document(reader, contract, did)?;
    if document.is_deactivated() {
        return Err(ProcessError::reason(
            ReasonKind::ValueInvalid,
            format!("did {did} is deactivated"),
        ));
    }
    Ok(document)
}

fn set_document(contract: &Address, document: DidDocument) -> StateMergeValue {
    StateMergeValue::set(
        keys::did_document(contract, document.id()),
        StateValue::DidDocument(document),
    )
}

scratch_processor!(RegisterModelProcessor);

impl OperationProcessor for RegisterModelProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, RegisterModel);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |_| {
            if lookup::did_design(reader, fact.contract())?.is_some() {
                return Err(service_registered(fact.contract()));
            }
            DidDesign::new(fact.did_method())?;
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
        let fact = expect_fact!(op, RegisterModel);
        self.scratch.process_sender_signed(ctx, op, reader, |_| {
            let status = lookup::existing_contract_status(reader, fact.contract())?;
            let design = DidDesign::new(fact.did_method())?;
            Ok(vec![
                StateMergeValue::set(
                    keys::did_design(fact.contract()),
                    StateValue::DidDesign(design),
                ),
                StateMergeValue::set(
                    keys::contract_account(fact.contract()),
                    StateValue::ContractAccount(status.set_active(true)),
                ),
            ])
        })
    }
}

scratch_processor!(CreateDidProcessor);

impl OperationProcessor for CreateDidProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, CreateDid);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |sender| {
            let design = lookup::existing_did_design(reader, fact.contract())?;
            let did = did_for(design.method(), sender.address());
            lookup::ensure_absent(reader, &keys::did_document(fact.contract(), &did))
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, CreateDid);
        self.scratch.process_sender_signed(ctx, op, reader, |sender| {
            let design = lookup::existing_did_design(reader, fact.contract())?;
            let did = did_for(design.method(), sender.address());
            let document =
                DidDocument::new_with_key(did, sender.address().clone(), fact.public_key().clone());
            Ok(vec![set_document(fact.contract(), document)])
        })
    }
}

scratch_processor!(UpdateDidDocumentProcessor);

impl OperationProcessor for UpdateDidDocumentProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, UpdateDidDocument);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |sender| {
            let current = live_document(reader, fact.contract(), fact.did())?;
            if current.controller() != sender.address() {
                return Err(ProcessError::reason(
                    ReasonKind::AccountNotAuthorized,
                    format!("{} does not control {}", sender.address(), fact.did()),
                ));
            }
            if fact.document().controller() != current.controller() {
                return Err(ProcessError::reason(
                    ReasonKind::ValueInvalid,
                    format!("controller of {} cannot change", fact.did()),
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
        let fact = expect_fact!(op, UpdateDidDocument);
        self.scratch.process_sender_signed(ctx, op, reader, |_| {
            Ok(vec![set_document(fact.contract(), fact.document().clone())])
        })
    }
}

scratch_processor!(
    /// Done by the contract owner or a handler, not by the controller.
    DeactivateDidProcessor
);

impl OperationProcessor for DeactivateDidProcessor {
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<(), ProcessError> {
        let fact = expect_fact!(op, DeactivateDid);
        self.scratch.pre_process_sender_signed(ctx, op, reader, |_| {
            live_document(reader, fact.contract(), fact.did()).map(|_| ())
        })
    }

    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        _env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let fact = expect_fact!(op, DeactivateDid);
        self.scratch.process_sender_signed(ctx, op, reader, |_| {
            let document = lookup::existing_did_document(reader, fact.contract(), fact.did())?;
            Ok(vec![set_document(fact.contract(), document.deactivate())])
        })
    }
}
