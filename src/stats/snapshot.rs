//! Study statistics derived from the deck and counters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::deck::ItemCollection;
use crate::core::scheduler;
use crate::stats::counters::PersistedCounters;

/// Display snapshot. Recomputed on demand, never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyStats {
    pub total_cards: usize,
    /// Items never reviewed successfully.
    pub new_cards: usize,
    /// Items with one or two successful reviews in a row.
    pub learning_cards: usize,
    /// Items due now.
    pub review_cards: usize,
    pub cards_studied_today: u64,
    /// Rounded percentage of correct reviews, 0 with no reviews.
    pub accuracy_rate: u32,
}

impl StudyStats {
    /// Derive a snapshot at `now` for the local day `today`.
    pub fn derive(
        items: &ItemCollection,
        counters: &PersistedCounters,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Self {
        let mut stats = StudyStats {
            total_cards: items.len(),
            cards_studied_today: counters.studied_on(today),
            accuracy_rate: counters.accuracy_percent(),
            ..Default::default()
        };

        for item in items.iter() {
            if scheduler::is_new(item) {
                stats.new_cards += 1;
            }
            if scheduler::is_learning(item) {
                stats.learning_cards += 1;
            }
            if scheduler::is_due(item, now) {
                stats.review_cards += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrainingConfig;
    use crate::core::item::{LearningItem, Rating, ReviewOutcome};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-05-20T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 20).unwrap()
    }

    fn good() -> ReviewOutcome {
        ReviewOutcome::new(Rating::Good, std::time::Duration::from_secs(2))
    }

    #[test]
    fn test_empty_deck() {
        let stats = StudyStats::derive(
            &ItemCollection::default(),
            &PersistedCounters::new(today()),
            now(),
            today(),
        );
        assert_eq!(stats, StudyStats::default());
    }

    #[test]
    fn test_fresh_deck() {
        let items = ItemCollection::from_config(&TrainingConfig::default(), now());
        let stats = StudyStats::derive(&items, &PersistedCounters::new(today()), now(), today());

        assert_eq!(stats.total_cards, 34);
        assert_eq!(stats.new_cards, 34);
        assert_eq!(stats.learning_cards, 0);
        assert_eq!(stats.review_cards, 34);
        assert_eq!(stats.accuracy_rate, 0);
    }

    #[test]
    fn test_mixed_deck() {
        let mut items = ItemCollection::from_config(&TrainingConfig::default(), now());
        let ids: Vec<_> = items.iter().take(3).map(|i| i.id).collect();

        // One item reviewed once, one twice, one three times.
        let mut updated: Vec<LearningItem> = Vec::new();
        for (n, id) in ids.iter().enumerate() {
            let mut item = items.get(*id).unwrap().clone();
            for _ in 0..=n {
                item = scheduler::advance(&item, &good(), now());
            }
            updated.push(item);
        }
        items.apply(&updated);

        let stats = StudyStats::derive(&items, &PersistedCounters::new(today()), now(), today());
        assert_eq!(stats.new_cards, 31);
        assert_eq!(stats.learning_cards, 2);
        assert_eq!(stats.review_cards, 31);

        let later = StudyStats::derive(
            &items,
            &PersistedCounters::new(today()),
            now() + Duration::days(1),
            today(),
        );
        assert_eq!(later.review_cards, 32);
    }

    #[test]
    fn test_counters_feed_snapshot() {
        let items = ItemCollection::default();
        let mut counters = PersistedCounters::new(today());
        counters.record(4, true, today());
        counters.record(1, false, today());

        let stats = StudyStats::derive(&items, &counters, now(), today());
        assert_eq!(stats.cards_studied_today, 5);
        assert_eq!(stats.accuracy_rate, 80);

        let tomorrow = today().succ_opt().unwrap();
        let stats = StudyStats::derive(&items, &counters, now(), tomorrow);
        assert_eq!(stats.cards_studied_today, 0);
        assert_eq!(stats.accuracy_rate, 80);
    }
}
