//! # Operation Processors
//!
//! One processor type per operation kind, each drawn from its own pool:
//!
//! ```text
//! acquire ──→ pre_process ──→ (reason error | ok) ──→ close ──→ pooled
//! acquire ──→ process ──→ merge values ──→ close ──→ pooled
//! ```
//!
//! `process` never relies on an earlier `pre_process` of the same instance;
//! it re-derives everything it emits from the snapshot it is handed.
//!
//! Multi-item operations fan their items out to pooled item processors
//! (`items`), so item checks run on the rayon pool for large operations.

pub mod account;
pub mod contract;
pub mod currency;
pub mod did;
pub mod items;

pub use account::{CreateAccountProcessor, TransferProcessor, UpdateKeyProcessor};
pub use contract::{
    CreateContractAccountProcessor, UpdateHandlerProcessor, UpdateRecipientProcessor,
    WithdrawProcessor,
};
pub use currency::{MintProcessor, RegisterCurrencyProcessor, UpdateCurrencyProcessor};
pub use did::{
    CreateDidProcessor, DeactivateDidProcessor, RegisterModelProcessor,
    UpdateDidDocumentProcessor,
};
pub use items::{ItemPools, ItemProcessor, ItemRun};

use crate::config::EngineConfig;
use crate::domain::{lookup, plan_fees, predicates, FeePlan, ProcessContext, Reset};
use crate::errors::{ProcessError, ReasonKind};
use crate::facts::OperationFact;
use crate::operation::Operation;
use shared_types::sign::check_signs_by_keys;
use shared_types::{Account, Address, StateMergeValue, StateReader, Suffrage, SuffrageProvider};
use std::sync::Arc;
use tracing::debug;

/// Collaborators shared by every processor of one engine.
pub struct ProcessorEnv {
    pub config: EngineConfig,
    pub suffrage: Arc<dyn SuffrageProvider>,
    pub items: ItemPools,
}

impl ProcessorEnv {
    pub fn new(config: EngineConfig, suffrage: Arc<dyn SuffrageProvider>) -> Self {
        let items = ItemPools::new(config.pool_capacity);
        Self {
            config,
            suffrage,
            items,
        }
    }

    pub fn network_id(&self) -> &[u8] {
        self.config.network_id_bytes()
    }

    /// Item fan-out arguments for `op` sent by `sender`.
    pub fn item_run<'a>(
        &self,
        ctx: &'a ProcessContext,
        op: &'a Operation,
        reader: &'a dyn StateReader,
        sender: &'a Address,
    ) -> ItemRun<'a> {
        ItemRun {
            ctx,
            reader,
            fact_hash: op.fact().hash(),
            sender,
            threshold: self.config.parallel_threshold,
        }
    }
}

/// Transient per-operation state of a processor.
#[derive(Debug, Default)]
pub struct Scratch {
    sender: Option<Account>,
    fee: Option<FeePlan>,
    suffrage: Option<Suffrage>,
}

impl Reset for Scratch {
    fn reset(&mut self) {
        self.sender = None;
        self.fee = None;
        self.suffrage = None;
    }
}

impl Scratch {
    pub fn sender(&self) -> Option<&Account> {
        self.sender.as_ref()
    }

    pub fn fee(&self) -> Option<&FeePlan> {
        self.fee.as_ref()
    }

    pub fn suffrage(&self) -> Option<&Suffrage> {
        self.suffrage.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.sender.is_none() && self.fee.is_none() && self.suffrage.is_none()
    }

    /// Sender checks, the operation's own `checks`, then extensions and fees.
    pub(crate) fn pre_process_sender_signed(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        checks: impl FnOnce(&Account) -> Result<(), ProcessError>,
    ) -> Result<(), ProcessError> {
        ctx.check()?;
        let sender = check_sender(op, reader)?;
        checks(&sender)?;
        ctx.check()?;
        let fee = check_extensions_and_fees(op, reader)?;
        debug!(
            sender = %sender.address(),
            currencies = fee.charges.len(),
            "Sender-signed checks passed"
        );
        self.sender = Some(sender);
        self.fee = Some(fee);
        Ok(())
    }

    /// The operation's own merge values followed by its fee plan.
    pub(crate) fn process_sender_signed(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        effects: impl FnOnce(&Account) -> Result<Vec<StateMergeValue>, ProcessError>,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        ctx.check()?;
        let sender_address = op.fact().sender().ok_or_else(|| {
            ProcessError::reason(
                ReasonKind::TypeMismatch,
                format!("{} is not sender-signed", op.fact().operation_type()),
            )
        })?;
        let sender = lookup::existing_signer_account(reader, sender_address)?;
        let mut merges = effects(&sender)?;
        ctx.check()?;
        let fee = fee_plan(op, reader)?;
        merges.extend(fee.merges.iter().cloned());
        self.sender = Some(sender);
        self.fee = Some(fee);
        Ok(merges)
    }

    /// Node signs, extensions, then the operation's own `checks`.
    pub(crate) fn pre_process_node_signed(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
        checks: impl FnOnce() -> Result<(), ProcessError>,
    ) -> Result<(), ProcessError> {
        ctx.check()?;
        let suffrage = check_node_signs(op, env)?;
        op.extensions().verify(op, reader)?;
        checks()?;
        debug!(
            nodes = suffrage.nodes().len(),
            required = suffrage.required_signs(),
            "Node signs accepted"
        );
        self.suffrage = Some(suffrage);
        Ok(())
    }
}

/// Two-phase processing of one operation kind.
pub trait OperationProcessor: Reset + Default + Send {
    /// Read-only checks; no merge values are produced.
    fn pre_process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<(), ProcessError>;

    /// Merge values the operation applies.
    fn process(
        &mut self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
        env: &ProcessorEnv,
    ) -> Result<Vec<StateMergeValue>, ProcessError>;
}

/// Extract the concrete fact a processor handles.
macro_rules! expect_fact {
    ($op:expr, $variant:ident) => {
        match $op.fact() {
            $crate::facts::OperationFact::$variant(fact) => fact,
            other => {
                return Err($crate::errors::ProcessError::reason(
                    $crate::errors::ReasonKind::TypeMismatch,
                    format!(
                        "expected {}, got {}",
                        stringify!($variant),
                        other.operation_type()
                    ),
                ))
            }
        }
    };
}
pub(crate) use expect_fact;

/// Sender, sender authority, declared roles and fee currencies of a
/// sender-signed operation. Returns the sender account.
pub(crate) fn check_sender(
    op: &Operation,
    reader: &dyn StateReader,
) -> Result<Account, ProcessError> {
    let fact = op.fact();
    let sender = fact.sender().ok_or_else(|| {
        ProcessError::reason(
            ReasonKind::TypeMismatch,
            format!("{} is not sender-signed", fact.operation_type()),
        )
    })?;
    let account = lookup::existing_signer_account(reader, sender)?;

    if op.extensions().authentication().is_none() {
        check_signs_by_keys(op.signs(), account.keys()).map_err(|e| {
            ProcessError::reason(ReasonKind::SignatureInvalid, format!("sender {sender}: {e}"))
        })?;
    }

    predicates::check_fact_roles(reader, fact)?;

    if let Some(fee_able) = fact.fee_able() {
        for currency in fee_able.fee_base().keys() {
            lookup::existing_currency(reader, currency)?;
        }
    }
    Ok(account)
}

/// Extensions, then the fee plan with its balance checks.
pub(crate) fn check_extensions_and_fees(
    op: &Operation,
    reader: &dyn StateReader,
) -> Result<FeePlan, ProcessError> {
    op.extensions().verify(op, reader)?;
    fee_plan(op, reader)
}

pub(crate) fn fee_plan(op: &Operation, reader: &dyn StateReader) -> Result<FeePlan, ProcessError> {
    match op.fact().fee_able() {
        Some(fee_able) => {
            let payer = op.extensions().resolve_fee_payer(fee_able.fee_payer());
            plan_fees(reader, fee_able, &payer)
        }
        None => Ok(FeePlan::default()),
    }
}

/// Enough distinct suffrage nodes signed the fact.
pub(crate) fn check_node_signs(
    op: &Operation,
    env: &ProcessorEnv,
) -> Result<Suffrage, ProcessError> {
    let fact: &OperationFact = op.fact();
    let suffrage = Suffrage::new(env.suffrage.current()?, env.config.suffrage_threshold_percent)?;
    suffrage
        .check_node_signs(op.signs(), env.network_id(), fact.hash())
        .map_err(|e| {
            ProcessError::reason(
                ReasonKind::SignatureInvalid,
                format!("{}: {e}", fact.operation_type()),
            )
        })?;
    Ok(suffrage)
}

/// Processor struct holding only a `Scratch`, plus its `Reset`.
macro_rules! scratch_processor {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Default)]
        pub struct $name {
            scratch: $crate::processors::Scratch,
        }

        impl $name {
            pub fn scratch(&self) -> &$crate::processors::Scratch {
                &self.scratch
            }
        }

        impl $crate::domain::Reset for $name {
            fn reset(&mut self) {
                $crate::domain::Reset::reset(&mut self.scratch);
            }
        }
    };
}
pub(crate) use scratch_processor;
