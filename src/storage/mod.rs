//! Persistence for staffdrill.
//!
//! This module provides storage for the deck, review counters, and training
//! config, with file-based and in-memory backends.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::{ConfigStore, CounterStore, ItemStore, TrainerStore};
