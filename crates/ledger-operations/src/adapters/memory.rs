//! # In-Memory State Store
//!
//! `StateReader` and `StateCommitter` over a `HashMap`, with a suffrage node
//! set for node-signed operations. Used by tests and local tooling.

use crate::ports::StateCommitter;
use parking_lot::RwLock;
use shared_types::{
    Hash, MergeError, State, StateMergeValue, StateReadError, StateReader, StateValue,
    SuffrageNode, SuffrageProvider,
};
use std::collections::HashMap;
use tracing::debug;

#[derive(Default)]
pub struct MemoryStateStore {
    states: RwLock<HashMap<String, State>>,
    suffrage: RwLock<Vec<SuffrageNode>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a state at height 0.
    pub fn insert(&self, key: impl Into<String>, value: StateValue) {
        let key = key.into();
        self.states
            .write()
            .insert(key.clone(), State::new(key, value, 0, Vec::new()));
    }

    pub fn value(&self, key: &str) -> Option<StateValue> {
        self.states.read().get(key).map(|s| s.value.clone())
    }

    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }

    pub fn set_suffrage(&self, nodes: Vec<SuffrageNode>) {
        *self.suffrage.write() = nodes;
    }
}

impl StateReader for MemoryStateStore {
    fn get_state(&self, key: &str) -> Result<Option<State>, StateReadError> {
        Ok(self.states.read().get(key).cloned())
    }
}

impl StateCommitter for MemoryStateStore {
    /// Merges are applied in order against a staged copy of the touched
    /// states; nothing is written when one of them fails.
    fn commit(
        &self,
        height: u64,
        operation: Hash,
        merges: Vec<StateMergeValue>,
    ) -> Result<(), MergeError> {
        let mut states = self.states.write();
        let mut staged: HashMap<String, State> = HashMap::new();

        for smv in &merges {
            let current = staged.get(&smv.key).or_else(|| states.get(&smv.key));
            let value = smv.merge(current)?;
            let mut operations = current.map(|s| s.operations.clone()).unwrap_or_default();
            if current.map(|s| s.height) != Some(height) {
                operations.clear();
            }
            if !operations.contains(&operation) {
                operations.push(operation);
            }
            staged.insert(
                smv.key.clone(),
                State::new(smv.key.clone(), value, height, operations),
            );
        }

        debug!(height, states = staged.len(), "Committed merge values");
        states.extend(staged);
        Ok(())
    }
}

impl SuffrageProvider for MemoryStateStore {
    fn current(&self) -> Result<Vec<SuffrageNode>, StateReadError> {
        Ok(self.suffrage.read().clone())
    }
}
