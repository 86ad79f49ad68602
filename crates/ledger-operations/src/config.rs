//! # Engine Configuration
//!
//! Defaults suit a local network; hosts override them from the environment.
//!
//! | Variable | Field | Default |
//! |----------|-------|---------|
//! | `LEDGER_NETWORK_ID` | `network_id` | `ledger-local` |
//! | `LEDGER_PARALLEL_THRESHOLD` | `parallel_threshold` | 4 |
//! | `LEDGER_SUFFRAGE_THRESHOLD` | `suffrage_threshold_percent` | 67 |
//! | `LEDGER_POOL_CAPACITY` | `pool_capacity` | 64 |

use crate::errors::FatalError;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

pub const DEFAULT_NETWORK_ID: &str = "ledger-local";
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;
pub const DEFAULT_SUFFRAGE_THRESHOLD_PERCENT: u8 = 67;
pub const DEFAULT_POOL_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Mixed into every signed message.
    pub network_id: String,
    /// Item count from which item work runs on the rayon pool.
    pub parallel_threshold: usize,
    /// Share of suffrage nodes that must sign node-signed operations.
    pub suffrage_threshold_percent: u8,
    /// Idle processors kept per pool.
    pub pool_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            network_id: DEFAULT_NETWORK_ID.to_string(),
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            suffrage_threshold_percent: DEFAULT_SUFFRAGE_THRESHOLD_PERCENT,
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }
}

impl EngineConfig {
    pub fn with_network_id(network_id: impl Into<String>) -> Self {
        Self {
            network_id: network_id.into(),
            ..Self::default()
        }
    }

    /// Defaults overridden by `LEDGER_*` variables. Unparsable values are
    /// ignored with a warning.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(network_id) = env::var("LEDGER_NETWORK_ID") {
            config.network_id = network_id;
        }
        if let Ok(value) = env::var("LEDGER_PARALLEL_THRESHOLD") {
            match value.parse() {
                Ok(v) => config.parallel_threshold = v,
                Err(_) => warn!(value = %value, "Ignoring invalid LEDGER_PARALLEL_THRESHOLD"),
            }
        }
        if let Ok(value) = env::var("LEDGER_SUFFRAGE_THRESHOLD") {
            match value.parse() {
                Ok(v) => config.suffrage_threshold_percent = v,
                Err(_) => warn!(value = %value, "Ignoring invalid LEDGER_SUFFRAGE_THRESHOLD"),
            }
        }
        if let Ok(value) = env::var("LEDGER_POOL_CAPACITY") {
            match value.parse() {
                Ok(v) => config.pool_capacity = v,
                Err(_) => warn!(value = %value, "Ignoring invalid LEDGER_POOL_CAPACITY"),
            }
        }

        config
    }

    pub fn network_id_bytes(&self) -> &[u8] {
        self.network_id.as_bytes()
    }

    pub fn validate(&self) -> Result<(), FatalError> {
        if self.network_id.is_empty() {
            return Err(FatalError::Config("network_id must not be empty".into()));
        }
        if self.parallel_threshold == 0 {
            return Err(FatalError::Config(
                "parallel_threshold must be at least 1".into(),
            ));
        }
        if self.suffrage_threshold_percent == 0 || self.suffrage_threshold_percent > 100 {
            return Err(FatalError::Config(format!(
                "suffrage_threshold_percent {} outside 1..=100",
                self.suffrage_threshold_percent
            )));
        }
        Ok(())
    }
}
