//! Storage Module
//!
//! Host backend abstraction and the in-memory reference backend.

pub mod memory;
pub mod traits;

pub use memory::MemoryBackend;
pub use traits::{CustodyTransfer, LedgerBackend, StateChange, StorageError, StorageResult};
