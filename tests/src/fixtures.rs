//! Ledger harness shared by the integration flows and benchmarks.
//!
//! `Ledger` pairs a `MemoryStateStore` with an `OperationEngine` and applies
//! operations the way a host does: pre-process, process, commit, one height
//! per operation.

use ledger_operations::prelude::*;
use shared_crypto::KeyPair;
use shared_types::state::keys;
use shared_types::{
    Account, AccountKeys, Address, Amount, CurrencyDesign, CurrencyId, CurrencyPolicy, Feeer,
    PublicKey, StateMergeValue, StateValue, SuffrageNode, U256,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub const NETWORK: &str = "ledger-testnet";
pub const GENESIS: &str = "genesismca";

pub fn mcc() -> CurrencyId {
    CurrencyId::new("MCC").unwrap()
}

pub fn amount(n: u64) -> Amount {
    Amount::new(n, mcc())
}

/// Deterministic key pair for `n`.
pub fn keypair(n: u32) -> KeyPair {
    let mut seed = [7u8; 32];
    seed[..4].copy_from_slice(&n.to_be_bytes());
    KeyPair::ed25519_from_seed(seed)
}

pub fn public_key(kp: &KeyPair) -> PublicKey {
    PublicKey::from_keypair(kp)
}

pub fn keys_of(kp: &KeyPair) -> AccountKeys {
    AccountKeys::single(public_key(kp)).unwrap()
}

pub fn address_of(kp: &KeyPair) -> Address {
    Address::from_keys(&keys_of(kp))
}

pub fn addr(body: &str) -> Address {
    Address::new(format!("{body}mca")).unwrap()
}

pub struct Ledger {
    pub store: Arc<MemoryStateStore>,
    pub engine: OperationEngine,
    height: AtomicU64,
}

impl Ledger {
    /// MCC registered with no fee.
    pub fn new() -> Self {
        Self::with_feeer(Feeer::Nil)
    }

    pub fn with_feeer(feeer: Feeer) -> Self {
        Self::with_config(EngineConfig::with_network_id(NETWORK), feeer)
    }

    pub fn with_config(config: EngineConfig, feeer: Feeer) -> Self {
        let store = Arc::new(MemoryStateStore::new());
        let design = CurrencyDesign::new(
            amount(1_000_000_000),
            Address::new(GENESIS).unwrap(),
            CurrencyPolicy::new(0u64, feeer),
            0,
        );
        store.insert(keys::currency_design(&mcc()), StateValue::Currency(design));
        let engine = OperationEngine::new(config, store.clone()).unwrap();
        Self {
            store,
            engine,
            height: AtomicU64::new(0),
        }
    }

    /// Account for `kp` holding `balance` MCC.
    pub fn fund(&self, kp: &KeyPair, balance: u64) -> Address {
        let account = Account::new(keys_of(kp));
        let address = account.address().clone();
        self.store
            .insert(keys::account(&address), StateValue::Account(account));
        self.store.insert(
            keys::balance(&address, &mcc()),
            StateValue::Balance(amount(balance)),
        );
        address
    }

    /// Plain account without any balance, e.g. a fee receiver.
    pub fn open(&self, address: &Address, kp: &KeyPair) {
        self.store.insert(
            keys::account(address),
            StateValue::Account(Account::with_address(address.clone(), keys_of(kp))),
        );
    }

    pub fn sign(&self, fact: impl Into<OperationFact>, kp: &KeyPair) -> Operation {
        let mut op = Operation::new(fact);
        op.sign(kp, NETWORK.as_bytes(), 1);
        op
    }

    pub fn next_context(&self) -> ProcessContext {
        ProcessContext::new(self.height.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Pre-process, process and commit `op` at the next height.
    pub fn apply(&self, op: &Operation) -> Result<Vec<StateMergeValue>, ProcessError> {
        let ctx = self.next_context();
        self.engine.pre_process(&ctx, op, &*self.store)?;
        let merges = self.engine.process(&ctx, op, &*self.store)?;
        self.store.commit(ctx.height, *op.hash(), merges.clone())?;
        Ok(merges)
    }

    /// Reason kind `op` is rejected with; panics when it is accepted or fatal.
    pub fn rejection(&self, op: &Operation) -> ReasonKind {
        match self.apply(op) {
            Err(ProcessError::Reason(reason)) => reason.kind,
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    pub fn balance(&self, address: &Address) -> Option<U256> {
        match self.store.value(&keys::balance(address, &mcc())) {
            Some(StateValue::Balance(amount)) => Some(amount.big()),
            None => None,
            Some(other) => panic!("unexpected {other:?}"),
        }
    }

    pub fn account(&self, address: &Address) -> Option<Account> {
        match self.store.value(&keys::account(address)) {
            Some(StateValue::Account(account)) => Some(account),
            None => None,
            Some(other) => panic!("unexpected {other:?}"),
        }
    }

    pub fn total_supply(&self) -> U256 {
        match self.store.value(&keys::currency_design(&mcc())) {
            Some(StateValue::Currency(design)) => design.total_supply(),
            other => panic!("unexpected {other:?}"),
        }
    }

    /// Install `count` suffrage nodes and return their keys and addresses.
    pub fn nodes(&self, count: u32) -> Vec<(KeyPair, Address)> {
        let nodes: Vec<(KeyPair, Address)> = (0..count)
            .map(|i| (keypair(1000 + i), addr(&format!("node{i}"))))
            .collect();
        self.store.set_suffrage(
            nodes
                .iter()
                .map(|(kp, address)| SuffrageNode::new(address.clone(), public_key(kp)))
                .collect(),
        );
        nodes
    }

    pub fn node_sign(
        &self,
        fact: impl Into<OperationFact>,
        signers: &[(KeyPair, Address)],
    ) -> Operation {
        let mut op = Operation::new(fact);
        for (kp, address) in signers {
            op.node_sign(kp, address.clone(), NETWORK.as_bytes(), 1);
        }
        op
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
