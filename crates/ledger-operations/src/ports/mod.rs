//! # Ports
//!
//! | Port | Direction | Implemented by |
//! |------|-----------|----------------|
//! | `StateReader` | outbound, read-only snapshot | host storage, `MemoryStateStore` |
//! | `SuffrageProvider` | outbound, current node set | host consensus, `MemoryStateStore` |
//! | `StateCommitter` | host side, merge at a height | host storage, `MemoryStateStore` |
//!
//! The engine itself only reads. `StateCommitter` describes what the host
//! does with the merge values it is handed.

pub use shared_types::{StateReader, SuffrageProvider};

use shared_types::{Hash, MergeError, StateMergeValue};

pub trait StateCommitter: Send + Sync {
    /// Merge `merges` produced by `operation` at `height`, all or nothing.
    fn commit(
        &self,
        height: u64,
        operation: Hash,
        merges: Vec<StateMergeValue>,
    ) -> Result<(), MergeError>;
}
