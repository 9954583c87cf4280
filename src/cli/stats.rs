//! Stats command for staffdrill.
//!
//! Prints the study snapshot plus a per-clef breakdown.

use serde::{Deserialize, Serialize};

use crate::cli::{to_json, Clock};
use crate::core::pitch::Clef;
use crate::core::scheduler;
use crate::core::Trainer;
use crate::stats::StudyStats;
use crate::storage::TrainerStore;

/// Options for the stats command.
#[derive(Debug, Clone, Default)]
pub struct StatsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Card counts for one clef.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClefSummary {
    pub clef: Clef,
    pub total: usize,
    pub due: usize,
}

/// Output format for the stats command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOutput {
    /// Whether stats were computed.
    pub success: bool,
    /// The snapshot.
    #[serde(flatten)]
    pub stats: StudyStats,
    /// Per-clef counts for enabled clefs.
    pub clefs: Vec<ClefSummary>,
    /// Total reviews ever recorded.
    pub total_reviews: u64,
    /// Error message if stats failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StatsOutput {
    /// Create a successful output.
    pub fn success(stats: StudyStats, clefs: Vec<ClefSummary>, total_reviews: u64) -> Self {
        Self {
            success: true,
            stats,
            clefs,
            total_reviews,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            stats: StudyStats::default(),
            clefs: Vec::new(),
            total_reviews: 0,
            error: Some(error.into()),
        }
    }
}

/// The stats command implementation.
pub struct StatsCommand<S: TrainerStore + Clone + 'static> {
    store: S,
    clock: Clock,
}

impl<S: TrainerStore + Clone + 'static> StatsCommand<S> {
    /// Create a new stats command.
    pub fn new(store: S, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Run the stats command.
    pub fn run(&self, _options: &StatsOptions) -> StatsOutput {
        let trainer = Trainer::open(self.store.clone(), self.clock.today);
        let stats = trainer.stats(self.clock.now, self.clock.today);

        let clefs = trainer
            .config()
            .enabled_clefs
            .iter()
            .map(|&clef| ClefSummary {
                clef,
                total: trainer.items().count_for_clef(clef),
                due: trainer
                    .items()
                    .for_clef(clef)
                    .filter(|item| scheduler::is_due(item, self.clock.now))
                    .count(),
            })
            .collect();

        StatsOutput::success(stats, clefs, trainer.counters().total_reviews)
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatsOutput, options: &StatsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            to_json(output)
        } else {
            self.format_human_readable(output)
        }
    }

    /// Format output as human-readable text.
    fn format_human_readable(&self, output: &StatsOutput) -> String {
        if !output.success {
            return format!(
                "Stats failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let stats = &output.stats;
        if stats.total_cards == 0 {
            return "No cards yet. Run `staffdrill init` to build a deck.".to_string();
        }

        let mut lines = Vec::new();
        lines.push("=== staffdrill stats ===".to_string());
        lines.push(format!(
            "Cards:    {} total | {} new | {} learning | {} due",
            stats.total_cards, stats.new_cards, stats.learning_cards, stats.review_cards
        ));
        for summary in &output.clefs {
            lines.push(format!(
                "  {:<7} {} cards, {} due",
                summary.clef.as_str(),
                summary.total,
                summary.due
            ));
        }
        lines.push(format!("Today:    {} reviewed", stats.cards_studied_today));
        lines.push(format!(
            "Accuracy: {}% over {} reviews",
            stats.accuracy_rate, output.total_reviews
        ));
        lines.join("\n")
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

    fn setup() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn test_stats_empty_store() {
        let cmd = StatsCommand::new(setup(), clock());
        let output = cmd.run(&StatsOptions::default());

        assert!(output.success);
        assert_eq!(output.stats, StudyStats::default());
        let human = cmd.format_output(&output, &StatsOptions::default());
        assert!(human.contains("staffdrill init"));
    }

    #[test]
    fn test_stats_with_deck_and_counters() {
        let store = setup();
        let mut config = TrainingConfig::default();
        config.enabled_clefs = vec![Clef::Bass];
        store.save_config(&config).unwrap();
        let deck = ItemCollection::from_config(&config, clock().now);
        store.save_items(deck.as_slice()).unwrap();

        let mut counters = PersistedCounters::new(clock().today);
        counters.record(3, true, clock().today);
        counters.record(1, false, clock().today);
        store.save_counters(&counters).unwrap();

        let cmd = StatsCommand::new(Arc::clone(&store), clock());
        let output = cmd.run(&StatsOptions::default());

        assert_eq!(output.stats.total_cards, 17);
        assert_eq!(output.stats.cards_studied_today, 4);
        assert_eq!(output.stats.accuracy_rate, 75);
        assert_eq!(output.total_reviews, 4);
        assert_eq!(
            output.clefs,
            vec![ClefSummary {
                clef: Clef::Bass,
                total: 17,
                due: 17
            }]
        );

        let human = cmd.format_output(&output, &StatsOptions::default());
        assert!(human.contains("17 total"));
        assert!(human.contains("Accuracy: 75%"));
    }

    #[test]
    fn test_stats_json_is_flat() {
        let cmd = StatsCommand::new(setup(), clock());
        let output = cmd.run(&StatsOptions::default());
        let json = cmd.format_output(
            &output,
            &StatsOptions {
                json: true,
                ..Default::default()
            },
        );

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["total_cards"], 0);
        assert_eq!(value["accuracy_rate"], 0);
    }

    #[test]
    fn test_stats_failure_output() {
        let cmd = StatsCommand::new(setup(), clock());
        let output = StatsOutput::failure("disk gone");
        let human = cmd.format_output(&output, &StatsOptions::default());
        assert_eq!(human, "Stats failed: disk gone");
    }
}
