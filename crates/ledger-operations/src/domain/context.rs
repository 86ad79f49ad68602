//! Per-call processing context.

use crate::errors::FatalError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cancellation flag shared between the host and in-flight processing.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Context the host passes to `pre_process` and `process`.
#[derive(Clone, Debug, Default)]
pub struct ProcessContext {
    /// Height the resulting merge values will be committed at.
    pub height: u64,
    pub cancel: CancelFlag,
}

impl ProcessContext {
    pub fn new(height: u64) -> Self {
        Self {
            height,
            cancel: CancelFlag::new(),
        }
    }

    pub fn with_cancel(height: u64, cancel: CancelFlag) -> Self {
        Self { height, cancel }
    }

    /// Fail with `Cancelled` once the host cancelled.
    pub fn check(&self) -> Result<(), FatalError> {
        if self.cancel.is_cancelled() {
            return Err(FatalError::Cancelled);
        }
        Ok(())
    }
}
