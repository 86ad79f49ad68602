//! # Operation Engine
//!
//! Entry point the host drives. The engine owns one processor pool per
//! operation kind, picks the processor matching the fact, runs one phase and
//! always closes the processor before returning.
//!
//! | Call | Produces |
//! |------|----------|
//! | `pre_process` | `Ok(())` or the reason the operation is rejected |
//! | `process` | merge values for the commit layer |
//! | `run_batch` | both phases plus commit, one operation after another |
//!
//! Reason errors reject one operation. Fatal errors abort: `run_batch` stops
//! at the first one.

use crate::config::EngineConfig;
use crate::domain::{Pool, ProcessContext};
use crate::errors::{FatalError, ProcessError, ReasonError};
use crate::facts::OperationFact;
use crate::operation::Operation;
use crate::ports::StateCommitter;
use crate::processors::*;
use parking_lot::RwLock;
use shared_types::{StateMergeValue, StateReader, SuffrageProvider};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Counters over the engine's lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub pre_processed: u64,
    pub processed: u64,
    pub rejected: u64,
    pub fatal: u64,
}

struct ProcessorPools {
    create_account: Pool<CreateAccountProcessor>,
    transfer: Pool<TransferProcessor>,
    update_key: Pool<UpdateKeyProcessor>,
    create_contract_account: Pool<CreateContractAccountProcessor>,
    update_handler: Pool<UpdateHandlerProcessor>,
    update_recipient: Pool<UpdateRecipientProcessor>,
    withdraw: Pool<WithdrawProcessor>,
    register_model: Pool<RegisterModelProcessor>,
    create_did: Pool<CreateDidProcessor>,
    update_did_document: Pool<UpdateDidDocumentProcessor>,
    deactivate_did: Pool<DeactivateDidProcessor>,
    register_currency: Pool<RegisterCurrencyProcessor>,
    update_currency: Pool<UpdateCurrencyProcessor>,
    mint: Pool<MintProcessor>,
}

impl ProcessorPools {
    fn new(capacity: usize) -> Self {
        Self {
            create_account: Pool::new(capacity),
            transfer: Pool::new(capacity),
            update_key: Pool::new(capacity),
            create_contract_account: Pool::new(capacity),
            update_handler: Pool::new(capacity),
            update_recipient: Pool::new(capacity),
            withdraw: Pool::new(capacity),
            register_model: Pool::new(capacity),
            create_did: Pool::new(capacity),
            update_did_document: Pool::new(capacity),
            deactivate_did: Pool::new(capacity),
            register_currency: Pool::new(capacity),
            update_currency: Pool::new(capacity),
            mint: Pool::new(capacity),
        }
    }
}

/// Run `f` on a pooled processor and close it whatever the outcome.
fn with_pooled<P: OperationProcessor, R>(pool: &Pool<P>, f: impl FnOnce(&mut P) -> R) -> R {
    let mut processor = pool.acquire();
    let result = f(&mut processor);
    processor.close();
    result
}

/// Dispatch on the fact kind to the matching pool.
macro_rules! dispatch {
    ($pools:expr, $fact:expr, $p:ident => $body:expr) => {
        match $fact {
            OperationFact::CreateAccount(_) => with_pooled(&$pools.create_account, |$p| $body),
            OperationFact::Transfer(_) => with_pooled(&$pools.transfer, |$p| $body),
            OperationFact::UpdateKey(_) => with_pooled(&$pools.update_key, |$p| $body),
            OperationFact::CreateContractAccount(_) => {
                with_pooled(&$pools.create_contract_account, |$p| $body)
            }
            OperationFact::UpdateHandler(_) => with_pooled(&$pools.update_handler, |$p| $body),
            OperationFact::UpdateRecipient(_) => with_pooled(&$pools.update_recipient, |$p| $body),
            OperationFact::Withdraw(_) => with_pooled(&$pools.withdraw, |$p| $body),
            OperationFact::RegisterModel(_) => with_pooled(&$pools.register_model, |$p| $body),
            OperationFact::CreateDid(_) => with_pooled(&$pools.create_did, |$p| $body),
            OperationFact::UpdateDidDocument(_) => {
                with_pooled(&$pools.update_did_document, |$p| $body)
            }
            OperationFact::DeactivateDid(_) => with_pooled(&$pools.deactivate_did, |$p| $body),
            OperationFact::RegisterCurrency(_) => {
                with_pooled(&$pools.register_currency, |$p| $body)
            }
            OperationFact::UpdateCurrency(_) => with_pooled(&$pools.update_currency, |$p| $body),
            OperationFact::Mint(_) => with_pooled(&$pools.mint, |$p| $body),
        }
    };
}

/// Result of one operation in a batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Merge values committed for the operation.
    Accepted(Vec<StateMergeValue>),
    Rejected(ReasonError),
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted(_))
    }
}

pub struct OperationEngine {
    env: ProcessorEnv,
    pools: ProcessorPools,
    stats: RwLock<EngineStats>,
}

impl OperationEngine {
    pub fn new(
        config: EngineConfig,
        suffrage: Arc<dyn SuffrageProvider>,
    ) -> Result<Self, FatalError> {
        config.validate()?;
        info!(
            network_id = %config.network_id,
            parallel_threshold = config.parallel_threshold,
            suffrage_threshold = config.suffrage_threshold_percent,
            "Operation engine ready"
        );
        let pools = ProcessorPools::new(config.pool_capacity);
        Ok(Self {
            env: ProcessorEnv::new(config, suffrage),
            pools,
            stats: RwLock::new(EngineStats::default()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.env.config
    }

    pub fn env(&self) -> &ProcessorEnv {
        &self.env
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.read().clone()
    }

    /// Validate `op` and check it against the snapshot without producing
    /// merge values.
    #[instrument(skip_all, fields(op = op.fact().operation_type(), hash = %hex::encode(op.hash())))]
    pub fn pre_process(
        &self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<(), ProcessError> {
        let result = op
            .is_valid(self.env.network_id())
            .map_err(ProcessError::from)
            .and_then(|()| {
                dispatch!(self.pools, op.fact(), p => p.pre_process(ctx, op, reader, &self.env))
            })
            .map_err(|e| e.wrap(op.fact().operation_type()));

        self.stats.write().pre_processed += 1;
        self.record(&result);
        if result.is_ok() {
            debug!("Operation pre-processed");
        }
        result
    }

    /// Merge values of `op` against the snapshot.
    #[instrument(skip_all, fields(op = op.fact().operation_type(), hash = %hex::encode(op.hash())))]
    pub fn process(
        &self,
        ctx: &ProcessContext,
        op: &Operation,
        reader: &dyn StateReader,
    ) -> Result<Vec<StateMergeValue>, ProcessError> {
        let result = dispatch!(self.pools, op.fact(), p => p.process(ctx, op, reader, &self.env))
            .map_err(|e| e.wrap(op.fact().operation_type()));

        self.stats.write().processed += 1;
        self.record(&result);
        if let Ok(merges) = &result {
            debug!(merges = merges.len(), "Operation processed");
        }
        result
    }

    fn record<T>(&self, result: &Result<T, ProcessError>) {
        match result {
            Ok(_) => {}
            Err(ProcessError::Reason(reason)) => {
                self.stats.write().rejected += 1;
                warn!(kind = %reason.kind, detail = %reason.detail, "Operation rejected");
            }
            Err(ProcessError::Fatal(fatal)) => {
                self.stats.write().fatal += 1;
                error!(error = %fatal, "Operation processing aborted");
            }
        }
    }

    /// Pre-process, process and commit each operation in order, so later
    /// operations see the effects of earlier ones. A failed commit rejects
    /// only its operation.
    #[instrument(skip_all, fields(height = ctx.height, operations = ops.len()))]
    pub fn run_batch<S>(
        &self,
        ctx: &ProcessContext,
        ops: &[Operation],
        store: &S,
    ) -> Result<Vec<Outcome>, FatalError>
    where
        S: StateReader + StateCommitter,
    {
        let mut outcomes = Vec::with_capacity(ops.len());
        for op in ops {
            ctx.check()?;
            let merges = match self
                .pre_process(ctx, op, store)
                .and_then(|()| self.process(ctx, op, store))
            {
                Ok(merges) => merges,
                Err(ProcessError::Reason(reason)) => {
                    outcomes.push(Outcome::Rejected(reason));
                    continue;
                }
                Err(ProcessError::Fatal(fatal)) => return Err(fatal),
            };

            match store.commit(ctx.height, *op.hash(), merges.clone()) {
                Ok(()) => outcomes.push(Outcome::Accepted(merges)),
                Err(e) => match ProcessError::from(e) {
                    ProcessError::Reason(reason) => outcomes.push(Outcome::Rejected(reason)),
                    ProcessError::Fatal(fatal) => return Err(fatal),
                },
            }
        }

        let accepted = outcomes.iter().filter(|o| o.is_accepted()).count();
        info!(accepted, rejected = outcomes.len() - accepted, "Batch processed");
        Ok(outcomes)
    }

    /// Idle processors across every operation pool.
    pub fn idle_processors(&self) -> usize {
        let p = &self.pools;
        p.create_account.idle()
            + p.transfer.idle()
            + p.update_key.idle()
            + p.create_contract_account.idle()
            + p.update_handler.idle()
            + p.update_recipient.idle()
            + p.withdraw.idle()
            + p.register_model.idle()
            + p.create_did.idle()
            + p.update_did_document.idle()
            + p.deactivate_did.idle()
            + p.register_currency.idle()
            + p.update_currency.idle()
            + p.mint.idle()
    }
}
