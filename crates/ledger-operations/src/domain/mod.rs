//! Domain building blocks shared by the processors.

pub mod context;
pub mod fee;
pub mod lookup;
pub mod parallel;
pub mod pool;
pub mod predicates;

pub use context::{CancelFlag, ProcessContext};
pub use fee::{plan_fees, FeeCharge, FeePlan};
pub use parallel::fan_out;
pub use pool::{Pool, Pooled, Reset};
