//! Reset command for staffdrill.
//!
//! Clears the deck and the review counters. The config is kept.

use serde::{Deserialize, Serialize};

use crate::cli::{to_json, Clock};
use crate::core::Trainer;
use crate::storage::TrainerStore;

/// Options for the reset command.
#[derive(Debug, Clone, Default)]
pub struct ResetOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Confirm the reset.
    pub yes: bool,
}

/// Output format for the reset command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetOutput {
    /// Whether the reset happened.
    pub success: bool,
    /// Cards removed.
    pub removed_cards: usize,
    /// Reviews discarded from the counters.
    pub discarded_reviews: u64,
    /// Error message if the reset was refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResetOutput {
    /// Create a successful output.
    pub fn success(removed_cards: usize, discarded_reviews: u64) -> Self {
        Self {
            success: true,
            removed_cards,
            discarded_reviews,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            removed_cards: 0,
            discarded_reviews: 0,
            error: Some(error.into()),
        }
    }
}

/// The reset command implementation.
pub struct ResetCommand<S: TrainerStore + Clone + 'static> {
    store: S,
    clock: Clock,
}

impl<S: TrainerStore + Clone + 'static> ResetCommand<S> {
    /// Create a new reset command.
    pub fn new(store: S, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Run the reset command.
    pub fn run(&self, options: &ResetOptions) -> ResetOutput {
        if !options.yes {
            return ResetOutput::failure(
                "Reset deletes all cards and review history. Pass --yes to confirm.",
            );
        }

        let mut trainer = Trainer::open(self.store.clone(), self.clock.today);
        let removed = trainer.items().len();
        let discarded = trainer.counters().total_reviews;
        trainer.reset(self.clock.today);
        ResetOutput::success(removed, discarded)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ResetOutput, options: &ResetOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return to_json(output);
        }

        match &output.error {
            Some(error) => format!("Reset refused: {}", error),
            None => format!(
                "Removed {} cards and {} recorded reviews.",
                output.removed_cards, output.discarded_reviews
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::clock;
    use crate::config::TrainingConfig;
    use crate::core::deck::ItemCollection;
    use crate::stats::PersistedCounters;
    use crate::storage::{ConfigStore, CounterStore, ItemStore, MemoryStore};
    use std::sync::Arc;

    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let mut config = TrainingConfig::default();
        config.infinite_mode = true;
        store.save_config(&config).unwrap();
        let deck = ItemCollection::from_config(&config, clock().now);
        store.save_items(deck.as_slice()).unwrap();
        let mut counters = PersistedCounters::new(clock().today);
        counters.record(6, true, clock().today);
        store.save_counters(&counters).unwrap();
        store
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let store = seeded_store();
        let cmd = ResetCommand::new(Arc::clone(&store), clock());

        let output = cmd.run(&ResetOptions::default());
        assert!(!output.success);
        assert!(output.error.unwrap().contains("--yes"));
        assert_eq!(store.load_items().unwrap().len(), 34);
    }

    #[test]
    fn test_reset_clears_deck_and_counters() {
        let store = seeded_store();
        let cmd = ResetCommand::new(Arc::clone(&store), clock());

        let output = cmd.run(&ResetOptions {
            yes: true,
            ..Default::default()
        });
        assert!(output.success);
        assert_eq!(output.removed_cards, 34);
        assert_eq!(output.discarded_reviews, 6);

        assert!(store.load_items().unwrap().is_empty());
        assert_eq!(
            store.load_counters().unwrap(),
            Some(PersistedCounters::new(clock().today))
        );
        // Config survives.
        assert!(store.load_config().unwrap().unwrap().infinite_mode);
    }

    #[test]
    fn test_format_output() {
        let cmd = ResetCommand::new(Arc::new(MemoryStore::new()), clock());
        let human = cmd.format_output(&ResetOutput::success(3, 9), &ResetOptions::default());
        assert_eq!(human, "Removed 3 cards and 9 recorded reviews.");

        let refused = cmd.format_output(&ResetOutput::failure("no"), &ResetOptions::default());
        assert_eq!(refused, "Reset refused: no");
    }
}
