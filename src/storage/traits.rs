//! Storage traits for staffdrill.
//!
//! The trainer persists three things: the deck, the review counters, and the
//! training config. Each has its own trait so hosts can mix backends; most
//! use one type implementing all three, which makes it a [`TrainerStore`].
//!
//! Writes are best effort. Callers route them through
//! [`FailOpen`](crate::error::FailOpen) so a failed save never blocks a
//! review.

use std::sync::Arc;

use crate::config::TrainingConfig;
use crate::core::item::LearningItem;
use crate::error::Result;
use crate::stats::PersistedCounters;

/// Persistence for the item collection.
pub trait ItemStore: Send + Sync {
    /// Load all items. A store with nothing saved returns an empty list.
    fn load_items(&self) -> Result<Vec<LearningItem>>;

    /// Replace the stored items.
    fn save_items(&self, items: &[LearningItem]) -> Result<()>;
}

/// Persistence for review counters.
pub trait CounterStore: Send + Sync {
    /// Load counters. Returns `Ok(None)` if none were saved.
    fn load_counters(&self) -> Result<Option<PersistedCounters>>;

    /// Replace the stored counters.
    fn save_counters(&self, counters: &PersistedCounters) -> Result<()>;
}

/// Persistence for the training config.
pub trait ConfigStore: Send + Sync {
    /// Load the config. Returns `Ok(None)` if none was saved.
    fn load_config(&self) -> Result<Option<TrainingConfig>>;

    /// Replace the stored config.
    fn save_config(&self, config: &TrainingConfig) -> Result<()>;
}

/// Everything the trainer needs from storage.
pub trait TrainerStore: ItemStore + CounterStore + ConfigStore {}

impl<T: ItemStore + CounterStore + ConfigStore + ?Sized> TrainerStore for T {}

/// Blanket implementations for Arc-wrapped stores.
///
/// This allows sharing one store between a trainer's save subscribers and
/// test assertions.
impl<T: ItemStore + ?Sized> ItemStore for Arc<T> {
    fn load_items(&self) -> Result<Vec<LearningItem>> {
        (**self).load_items()
    }

    fn save_items(&self, items: &[LearningItem]) -> Result<()> {
        (**self).save_items(items)
    }
}

impl<T: CounterStore + ?Sized> CounterStore for Arc<T> {
    fn load_counters(&self) -> Result<Option<PersistedCounters>> {
        (**self).load_counters()
    }

    fn save_counters(&self, counters: &PersistedCounters) -> Result<()> {
        (**self).save_counters(counters)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn load_config(&self) -> Result<Option<TrainingConfig>> {
        (**self).load_config()
    }

    fn save_config(&self, config: &TrainingConfig) -> Result<()> {
        (**self).save_config(config)
    }
}

/// Test utilities for store implementations.
#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::core::deck::ItemCollection;
    use crate::core::pitch::{Clef, PitchRange};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample_items() -> Vec<LearningItem> {
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 9, 0, 0).unwrap();
        let mut config = TrainingConfig::default();
        config.ranges.set(PitchRange::new(Clef::Treble, "C4", "E4"));
        config.ranges.set(PitchRange::new(Clef::Bass, "A3", "B3"));
        ItemCollection::from_config(&config, now).as_slice().to_vec()
    }

    /// Verify item persistence.
    pub fn test_item_store<S: ItemStore>(store: &S) {
        assert!(store.load_items().unwrap().is_empty());

        let items = sample_items();
        store.save_items(&items).unwrap();
        assert_eq!(store.load_items().unwrap(), items);

        // Saving replaces, it does not append.
        store.save_items(&items[..2]).unwrap();
        assert_eq!(store.load_items().unwrap(), items[..2].to_vec());

        // An empty deck is saved as an empty list.
        store.save_items(&[]).unwrap();
        assert!(store.load_items().unwrap().is_empty());
    }

    /// Verify counter persistence.
    pub fn test_counter_store<S: CounterStore>(store: &S) {
        assert!(store.load_counters().unwrap().is_none());

        let today = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let mut counters = PersistedCounters::new(today);
        counters.record(4, true, today);
        store.save_counters(&counters).unwrap();
        assert_eq!(store.load_counters().unwrap(), Some(counters));

        let fresh = PersistedCounters::new(today);
        store.save_counters(&fresh).unwrap();
        assert_eq!(store.load_counters().unwrap(), Some(fresh));
    }

    /// Verify config persistence.
    pub fn test_config_store<S: ConfigStore>(store: &S) {
        assert!(store.load_config().unwrap().is_none());

        let mut config = TrainingConfig::default();
        config.four_note_mode = true;
        config.enabled_clefs = vec![Clef::Bass];
        config.ranges.treble = None;
        store.save_config(&config).unwrap();
        assert_eq!(store.load_config().unwrap(), Some(config));
    }

    /// Run every conformance check against fresh stores from `make`.
    pub fn test_trainer_store<S: TrainerStore>(make: impl Fn() -> S) {
        test_item_store(&make());
        test_counter_store(&make());
        test_config_store(&make());
    }
}
