//! # Suffrage
//!
//! The node set allowed to sign privileged operations. A node-signed
//! operation needs signs from at least `ceil(nodes * threshold_percent / 100)`
//! distinct nodes.

use crate::sign::Sign;
use crate::{Address, Hash, PublicKey, StateReadError, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuffrageNode {
    pub address: Address,
    pub public_key: PublicKey,
}

impl SuffrageNode {
    pub fn new(address: Address, public_key: PublicKey) -> Self {
        Self {
            address,
            public_key,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suffrage {
    nodes: Vec<SuffrageNode>,
    threshold_percent: u8,
}

impl Suffrage {
    pub fn new(nodes: Vec<SuffrageNode>, threshold_percent: u8) -> Result<Self, ValidationError> {
        if threshold_percent == 0 || threshold_percent > 100 {
            return Err(ValidationError::ValueOutOfRange(format!(
                "suffrage threshold {threshold_percent}% outside 1..=100"
            )));
        }
        let mut seen = BTreeSet::new();
        for node in &nodes {
            if !seen.insert(&node.address) {
                return Err(ValidationError::DuplicateValue {
                    field: "suffrage",
                    value: node.address.to_string(),
                });
            }
        }
        Ok(Self {
            nodes,
            threshold_percent,
        })
    }

    pub fn nodes(&self) -> &[SuffrageNode] {
        &self.nodes
    }

    pub fn threshold_percent(&self) -> u8 {
        self.threshold_percent
    }

    pub fn node(&self, address: &Address) -> Option<&SuffrageNode> {
        self.nodes.iter().find(|n| &n.address == address)
    }

    /// Distinct node signs needed, rounded up.
    pub fn required_signs(&self) -> usize {
        let n = self.nodes.len() * usize::from(self.threshold_percent);
        n.div_ceil(100)
    }

    /// Number of distinct suffrage nodes that produced a valid sign with
    /// their registered key.
    pub fn count_node_signs(&self, signs: &[Sign], network_id: &[u8], fact_hash: &Hash) -> usize {
        signs
            .iter()
            .filter_map(|sign| {
                let node = self.node(sign.node()?)?;
                if &node.public_key != sign.signer() {
                    return None;
                }
                sign.verify(network_id, fact_hash).ok()?;
                Some(&node.address)
            })
            .collect::<BTreeSet<_>>()
            .len()
    }

    pub fn check_node_signs(
        &self,
        signs: &[Sign],
        network_id: &[u8],
        fact_hash: &Hash,
    ) -> Result<(), ValidationError> {
        let signed = self.count_node_signs(signs, network_id, fact_hash);
        let required = self.required_signs();
        if self.nodes.is_empty() || signed < required {
            return Err(ValidationError::ValueOutOfRange(format!(
                "{signed} node signs, {required} of {} nodes required",
                self.nodes.len()
            )));
        }
        Ok(())
    }
}

/// Source of the node set current at processing time. The signing
/// threshold is engine configuration, not part of the node set.
pub trait SuffrageProvider: Send + Sync {
    fn current(&self) -> Result<Vec<SuffrageNode>, StateReadError>;
}

impl SuffrageProvider for Vec<SuffrageNode> {
    fn current(&self) -> Result<Vec<SuffrageNode>, StateReadError> {
        Ok(self.clone())
    }
}

impl<T: SuffrageProvider + ?Sized> SuffrageProvider for Arc<T> {
    fn current(&self) -> Result<Vec<SuffrageNode>, StateReadError> {
        (**self).current()
    }
}
