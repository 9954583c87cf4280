//! In-memory storage for testing.
//!
//! Thread-safe implementation of every store trait, with a switch that makes
//! writes fail so fail-open paths can be exercised.

use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::TrainingConfig;
use crate::core::item::LearningItem;
use crate::error::{Result, StaffError};
use crate::stats::PersistedCounters;
use crate::storage::{ConfigStore, CounterStore, ItemStore};

#[derive(Debug, Default)]
struct Contents {
    items: Vec<LearningItem>,
    counters: Option<PersistedCounters>,
    config: Option<TrainingConfig>,
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    contents: RwLock<Contents>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following write fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn read(&self) -> RwLockReadGuard<'_, Contents> {
        // A panicking writer cannot leave Contents half-updated.
        self.contents.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Contents>> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StaffError::from(io::Error::other("memory store writes disabled")));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(self.contents.write().unwrap_or_else(|e| e.into_inner()))
    }
}

impl ItemStore for MemoryStore {
    fn load_items(&self) -> Result<Vec<LearningItem>> {
        Ok(self.read().items.clone())
    }

    fn save_items(&self, items: &[LearningItem]) -> Result<()> {
        self.write()?.items = items.to_vec();
        Ok(())
    }
}

impl CounterStore for MemoryStore {
    fn load_counters(&self) -> Result<Option<PersistedCounters>> {
        Ok(self.read().counters)
    }

    fn save_counters(&self, counters: &PersistedCounters) -> Result<()> {
        self.write()?.counters = Some(*counters);
        Ok(())
    }
}

impl ConfigStore for MemoryStore {
    fn load_config(&self) -> Result<Option<TrainingConfig>> {
        Ok(self.read().config.clone())
    }

    fn save_config(&self, config: &TrainingConfig) -> Result<()> {
        self.write()?.config = Some(config.clone());
        Ok(())
    }
}
