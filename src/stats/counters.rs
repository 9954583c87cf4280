//! Persisted review counters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Running totals kept across sessions.
///
/// Totals only grow. `reviews_today` restarts when the first review of a new
/// day is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedCounters {
    /// Reviews recorded on `last_review_day`.
    pub reviews_today: u64,
    /// Local calendar day of the most recent review.
    pub last_review_day: NaiveDate,
    /// Every review ever recorded.
    pub total_reviews: u64,
    /// Reviews judged correct.
    pub correct_reviews: u64,
}

impl PersistedCounters {
    /// Zeroed counters dated `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self {
            reviews_today: 0,
            last_review_day: today,
            total_reviews: 0,
            correct_reviews: 0,
        }
    }

    /// Record one grading action covering `count` items.
    ///
    /// A four-note batch is one action with a count of four.
    pub fn record(&mut self, count: u64, correct: bool, today: NaiveDate) {
        if self.last_review_day != today {
            self.reviews_today = count;
            self.last_review_day = today;
        } else {
            self.reviews_today += count;
        }
        self.total_reviews += count;
        if correct {
            self.correct_reviews += count;
        }
    }

    /// Reviews done on `today`, or zero if the last review was another day.
    pub fn studied_on(&self, today: NaiveDate) -> u64 {
        if self.last_review_day == today {
            self.reviews_today
        } else {
            0
        }
    }

    /// Correct share of all reviews as a rounded percentage.
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_reviews == 0 {
            return 0;
        }
        (self.correct_reviews as f64 / self.total_reviews as f64 * 100.0).round() as u32
    }
}
