//! The item collection (deck).
//!
//! Items keep their insertion order. Order matters only for the new-item cap
//! in session composition, which takes the first new items encountered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::TrainingConfig;
use crate::core::catalog;
use crate::core::item::LearningItem;
use crate::core::pitch::Clef;
use crate::core::scheduler;

/// Ordered collection of learning items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemCollection {
    items: Vec<LearningItem>,
}

impl ItemCollection {
    /// Wrap already loaded items.
    pub fn from_items(items: Vec<LearningItem>) -> Self {
        Self { items }
    }

    /// Build a fresh deck from the training config.
    ///
    /// One item per pitch in each enabled clef's range, clefs in the order
    /// they are enabled. A clef without a configured range uses the default.
    pub fn from_config(config: &TrainingConfig, now: DateTime<Utc>) -> Self {
        let mut items = Vec::new();
        for &clef in &config.enabled_clefs {
            let range = config
                .ranges
                .get(clef)
                .cloned()
                .unwrap_or_else(|| catalog::default_range(clef));
            items.extend(
                catalog::filter_range(clef, &range)
                    .into_iter()
                    .map(|pitch| LearningItem::new(pitch, now)),
            );
        }
        tracing::info!(count = items.len(), "built deck from config");
        Self { items }
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the deck is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &LearningItem> {
        self.items.iter()
    }

    /// Items as a slice, for persistence.
    pub fn as_slice(&self) -> &[LearningItem] {
        &self.items
    }

    /// Look up an item by id.
    pub fn get(&self, id: Uuid) -> Option<&LearningItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items of one clef, in collection order.
    pub fn for_clef(&self, clef: Clef) -> impl Iterator<Item = &LearningItem> {
        self.items.iter().filter(move |item| item.clef() == clef)
    }

    /// Due items at `now`.
    pub fn due(&self, now: DateTime<Utc>) -> impl Iterator<Item = &LearningItem> {
        self.items
            .iter()
            .filter(move |item| scheduler::is_due(item, now))
    }

    /// New items (zero repetitions).
    pub fn new_items(&self) -> impl Iterator<Item = &LearningItem> {
        self.items.iter().filter(|item| scheduler::is_new(item))
    }

    /// Count of items of one clef.
    pub fn count_for_clef(&self, clef: Clef) -> usize {
        self.for_clef(clef).count()
    }

    /// Replace stored items with updated versions, matched by id.
    ///
    /// Updates for ids that are not in the deck are ignored. Returns how many
    /// items were replaced.
    pub fn apply(&mut self, updated: &[LearningItem]) -> usize {
        let mut replaced = 0;
        for new in updated {
            if let Some(slot) = self.items.iter_mut().find(|item| item.id == new.id) {
                *slot = new.clone();
                replaced += 1;
            } else {
                tracing::warn!(item = %new.id, "update for unknown item ignored");
            }
        }
        replaced
    }

    /// Remove every item.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::presets;
    use crate::core::catalog::PITCHES_PER_CLEF;
    use crate::core::item::{Rating, ReviewOutcome};
    use crate::core::pitch::{Letter, Pitch, PitchRange};
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-01-15T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_from_default_config() {
        let deck = ItemCollection::from_config(&TrainingConfig::default(), now());

        assert_eq!(deck.len(), 2 * PITCHES_PER_CLEF);
        assert_eq!(deck.count_for_clef(Clef::Treble), PITCHES_PER_CLEF);
        assert_eq!(deck.count_for_clef(Clef::Bass), PITCHES_PER_CLEF);
        assert!(deck.iter().all(|item| item.repetitions == 0));
        assert!(deck.iter().all(|item| item.next_due == now()));
    }

    #[test]
    fn test_from_config_respects_ranges_and_order() {
        let mut config = TrainingConfig::default();
        config.enabled_clefs = vec![Clef::Bass, Clef::Treble];
        config.ranges.treble = Some(PitchRange::new(Clef::Treble, "C4", "G4"));
        config.ranges.bass = Some(PitchRange::new(Clef::Bass, "F3", "C4"));

        let deck = ItemCollection::from_config(&config, now());
        let labels: Vec<String> = deck.iter().map(|i| i.pitch.label()).collect();

        assert_eq!(
            labels,
            vec!["F3", "G3", "A3", "B3", "C4", "C4", "D4", "E4", "F4", "G4"]
        );
        assert_eq!(deck.as_slice()[0].clef(), Clef::Bass);
        assert_eq!(deck.as_slice()[9].clef(), Clef::Treble);
    }

    #[test]
    fn test_from_config_missing_range_uses_default() {
        let mut config = TrainingConfig::default();
        config.enabled_clefs = vec![Clef::Treble];
        config.ranges.treble = None;

        let deck = ItemCollection::from_config(&config, now());
        assert_eq!(deck.len(), PITCHES_PER_CLEF);
    }

    #[test]
    fn test_from_preset() {
        let config = presets::find("beginner").unwrap().apply(&TrainingConfig::default());
        let deck = ItemCollection::from_config(&config, now());
        assert_eq!(deck.count_for_clef(Clef::Treble), 5);
        assert_eq!(deck.count_for_clef(Clef::Bass), 5);
    }

    #[test]
    fn test_due_and_new_queries() {
        let mut deck = ItemCollection::from_config(&TrainingConfig::default(), now());
        assert_eq!(deck.due(now()).count(), deck.len());
        assert_eq!(deck.new_items().count(), deck.len());

        let first = deck.as_slice()[0].clone();
        let reviewed = scheduler::advance(
            &first,
            &ReviewOutcome::new(Rating::Good, std::time::Duration::ZERO),
            now(),
        );
        assert_eq!(deck.apply(&[reviewed]), 1);

        assert_eq!(deck.due(now()).count(), deck.len() - 1);
        assert_eq!(deck.new_items().count(), deck.len() - 1);
        assert_eq!(deck.due(now() + Duration::days(1)).count(), deck.len());
    }

    #[test]
    fn test_apply_ignores_unknown_ids() {
        let mut deck = ItemCollection::from_config(&TrainingConfig::default(), now());
        let stranger = LearningItem::new(Pitch::new(Letter::A, 4, Clef::Treble), now());
        let before = deck.clone();

        assert_eq!(deck.apply(&[stranger]), 0);
        assert_eq!(deck, before);
    }

    #[test]
    fn test_apply_preserves_order() {
        let mut deck = ItemCollection::from_config(&TrainingConfig::default(), now());
        let ids: Vec<Uuid> = deck.iter().map(|i| i.id).collect();

        let mut changed = deck.as_slice()[5].clone();
        changed.repetitions = 4;
        deck.apply(&[changed]);

        let after: Vec<Uuid> = deck.iter().map(|i| i.id).collect();
        assert_eq!(ids, after);
        assert_eq!(deck.get(ids[5]).unwrap().repetitions, 4);
    }

    #[test]
    fn test_clear() {
        let mut deck = ItemCollection::from_config(&TrainingConfig::default(), now());
        deck.clear();
        assert!(deck.is_empty());
    }

    #[test]
    fn test_serializes_as_plain_array() {
        let deck = ItemCollection::from_config(&TrainingConfig::default(), now());
        let json = serde_json::to_value(&deck).unwrap();
        assert!(json.is_array());
        let parsed: ItemCollection = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, deck);
    }
}
