//! Adapters implementing the engine's outbound ports.

pub mod memory;

pub use memory::MemoryStateStore;
