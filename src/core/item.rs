//! Learning item and review outcome types.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::pitch::{Clef, Pitch};
use crate::error::{Result, StaffError};

/// Ease factor given to every fresh item.
pub const INITIAL_EASE_FACTOR: f64 = 2.5;

/// Lowest ease factor an item can reach.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// One flashcard: a pitch to identify plus its SM-2 schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningItem {
    /// Stable identity across saves.
    pub id: Uuid,
    /// The pitch the user must name.
    pub pitch: Pitch,
    /// SM-2 ease factor, never below [`MIN_EASE_FACTOR`].
    pub ease_factor: f64,
    /// Current interval in days.
    pub interval: u32,
    /// Consecutive successful reviews since the last failure.
    pub repetitions: u32,
    /// When the item is next due.
    pub next_due: DateTime<Utc>,
    /// When the item was last graded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed: Option<DateTime<Utc>>,
}

impl LearningItem {
    /// Create a fresh, immediately due item for a pitch.
    pub fn new(pitch: Pitch, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            pitch,
            ease_factor: INITIAL_EASE_FACTOR,
            interval: 0,
            repetitions: 0,
            next_due: now,
            last_reviewed: None,
        }
    }

    /// Clef this item belongs to.
    pub fn clef(&self) -> Clef {
        self.pitch.clef
    }
}

/// User's self-assessment after answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    /// Forgot or answered wrong.
    Again,
    /// Correct with serious difficulty.
    Hard,
    /// Correct after hesitation.
    Good,
    /// Correct without effort.
    Easy,
}

impl Rating {
    /// Get all ratings from worst to best.
    pub fn all() -> &'static [Rating] {
        &[Rating::Again, Rating::Hard, Rating::Good, Rating::Easy]
    }

    /// Get the display name for this rating.
    pub fn display_name(&self) -> &'static str {
        match self {
            Rating::Again => "again",
            Rating::Hard => "hard",
            Rating::Good => "good",
            Rating::Easy => "easy",
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Rating {
    type Err = StaffError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "again" | "a" => Ok(Rating::Again),
            "hard" | "h" => Ok(Rating::Hard),
            "good" | "g" => Ok(Rating::Good),
            "easy" | "e" => Ok(Rating::Easy),
            other => Err(StaffError::invalid_state(format!(
                "unknown rating '{}' (expected again, hard, good, or easy)",
                other
            ))),
        }
    }
}

/// A graded review: the rating and how long the user spent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub rating: Rating,
    pub elapsed: Duration,
}

impl ReviewOutcome {
    /// Create a new outcome.
    pub fn new(rating: Rating, elapsed: Duration) -> Self {
        Self { rating, elapsed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::pitch::Letter;

    #[test]
    fn test_new_item_defaults() {
        let now = Utc::now();
        let item = LearningItem::new(Pitch::new(Letter::C, 4, Clef::Treble), now);

        assert_eq!(item.ease_factor, INITIAL_EASE_FACTOR);
        assert_eq!(item.interval, 0);
        assert_eq!(item.repetitions, 0);
        assert_eq!(item.next_due, now);
        assert!(item.last_reviewed.is_none());
        assert_eq!(item.clef(), Clef::Treble);
    }

    #[test]
    fn test_new_items_have_distinct_ids() {
        let now = Utc::now();
        let pitch = Pitch::new(Letter::C, 4, Clef::Treble);
        assert_ne!(LearningItem::new(pitch, now).id, LearningItem::new(pitch, now).id);
    }

    #[test]
    fn test_item_timestamps_serialize_as_iso8601() {
        let now = DateTime::parse_from_rfc3339("2026-03-01T09:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let item = LearningItem::new(Pitch::new(Letter::G, 2, Clef::Bass), now);

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["next_due"], "2026-03-01T09:30:00Z");
        assert!(json.get("last_reviewed").is_none());

        let parsed: LearningItem = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, item);
    }

    #[test]
    fn test_rating_from_str() {
        assert_eq!("again".parse::<Rating>().unwrap(), Rating::Again);
        assert_eq!("H".parse::<Rating>().unwrap(), Rating::Hard);
        assert_eq!(" good".parse::<Rating>().unwrap(), Rating::Good);
        assert_eq!("e".parse::<Rating>().unwrap(), Rating::Easy);
        assert!("perfect".parse::<Rating>().is_err());
    }

    #[test]
    fn test_rating_serialization() {
        for &rating in Rating::all() {
            let json = serde_json::to_string(&rating).unwrap();
            assert_eq!(json, format!("\"{}\"", rating));
        }
    }
}
