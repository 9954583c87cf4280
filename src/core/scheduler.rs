//! SM-2 spaced repetition scheduling.
//!
//! Quality scores follow SuperMemo 2. The four ratings map to:
//! - again: 0 (complete blackout)
//! - hard: 3 (correct with serious difficulty)
//! - good: 4 (correct after hesitation)
//! - easy: 5 (perfect response)
//!
//! Everything here is a pure function of its inputs, including the clock.

use chrono::{DateTime, Duration, Utc};

use crate::core::item::{LearningItem, Rating, ReviewOutcome, MIN_EASE_FACTOR};

/// Quality below which a review counts as a failure.
const PASSING_QUALITY: u8 = 3;

/// Longest interval ever scheduled, about a hundred years.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Map a rating to its SM-2 quality score.
pub fn quality(rating: Rating) -> u8 {
    match rating {
        Rating::Again => 0,
        Rating::Hard => 3,
        Rating::Good => 4,
        Rating::Easy => 5,
    }
}

/// Ease factor after a review of the given quality.
///
/// EF' = max(1.3, EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)))
pub fn next_ease_factor(ease_factor: f64, quality: u8) -> f64 {
    let miss = f64::from(5 - quality.min(5));
    (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR)
}

/// Advance an item's schedule after a graded review at `now`.
///
/// The ease factor is updated on every review, failures included. A failure
/// resets repetitions and schedules the item for tomorrow. Successes step
/// through 1 day, 6 days, then grow by the new ease factor, capped at
/// [`MAX_INTERVAL_DAYS`].
pub fn advance(item: &LearningItem, outcome: &ReviewOutcome, now: DateTime<Utc>) -> LearningItem {
    let q = quality(outcome.rating);
    let ease_factor = next_ease_factor(item.ease_factor, q);

    let (repetitions, interval) = if q < PASSING_QUALITY {
        (0, 1)
    } else {
        let repetitions = item.repetitions + 1;
        let interval = match repetitions {
            1 => 1,
            2 => 6,
            // f64::round rounds half away from zero.
            _ => ((f64::from(item.interval) * ease_factor).round() as u32)
                .clamp(1, MAX_INTERVAL_DAYS),
        };
        (repetitions, interval)
    };

    tracing::debug!(
        item = %item.id,
        rating = %outcome.rating,
        ease_factor,
        interval,
        repetitions,
        "advanced schedule"
    );

    LearningItem {
        ease_factor,
        interval,
        repetitions,
        next_due: now
            .checked_add_signed(Duration::days(i64::from(interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
        last_reviewed: Some(now),
        ..item.clone()
    }
}

/// Whether the item is due at `now`.
pub fn is_due(item: &LearningItem, now: DateTime<Utc>) -> bool {
    item.next_due <= now
}

/// Whether the item has never been successfully reviewed since its last reset.
pub fn is_new(item: &LearningItem) -> bool {
    item.repetitions == 0
}

/// Whether the item is still in its first two successful steps.
pub fn is_learning(item: &LearningItem) -> bool {
    (1..=2).contains(&item.repetitions)
}

/// Intervals each rating would produce, in order again, hard, good, easy.
pub fn preview_intervals(item: &LearningItem, now: DateTime<Utc>) -> [u32; 4] {
    let mut intervals = [0; 4];
    for (slot, &rating) in intervals.iter_mut().zip(Rating::all()) {
        let outcome = ReviewOutcome::new(rating, std::time::Duration::ZERO);
        *slot = advance(item, &outcome, now).interval;
    }
    intervals
}

/// Format an interval in days for display.
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}
