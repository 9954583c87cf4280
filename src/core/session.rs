//! Session composition, answer checking, and grading.
//!
//! A session is a shuffled list of item ids for one clef plus a cursor. It is
//! consumed one item at a time, or in batches of four in four-note mode, and
//! loops back to the start when it runs out. A new shuffle only happens when
//! [`compose`] is called again.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

use crate::config::TrainingConfig;
use crate::core::deck::ItemCollection;
use crate::core::item::{LearningItem, ReviewOutcome};
use crate::core::pitch::{Clef, Letter};
use crate::core::scheduler;

/// Items per batch in four-note mode.
pub const BATCH_SIZE: usize = 4;

/// Maximum number of new items added to a normal-mode session.
pub const NEW_ITEM_LIMIT: usize = 10;

/// How the session is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// One item per prompt.
    Single,
    /// Four consecutive items per prompt, graded together.
    FourNote,
}

impl SessionMode {
    /// Items shown per prompt.
    pub fn batch_size(&self) -> usize {
        match self {
            SessionMode::Single => 1,
            SessionMode::FourNote => BATCH_SIZE,
        }
    }
}

/// Result of composing a session.
#[derive(Debug, Clone, PartialEq)]
pub enum Composition {
    /// A session is ready to run.
    Ready(Session),
    /// The clef has no items at all.
    NoCards,
    /// Single mode: the clef has items but none are due or new.
    NothingDue,
    /// Four-note mode: fewer than [`BATCH_SIZE`] items are eligible, zero
    /// included. Four-note mode never reports [`Composition::NothingDue`].
    InsufficientCards { available: usize },
}

/// Ids eligible for a session, in collection order, before shuffling.
///
/// Infinite mode takes every item of the clef. Normal mode takes the due
/// items plus the first [`NEW_ITEM_LIMIT`] new items, without duplicates.
pub fn candidates(
    items: &ItemCollection,
    config: &TrainingConfig,
    clef: Clef,
    now: DateTime<Utc>,
) -> Vec<Uuid> {
    if config.infinite_mode {
        return items.for_clef(clef).map(|item| item.id).collect();
    }

    let mut ids: Vec<Uuid> = items
        .due(now)
        .filter(|item| item.clef() == clef)
        .map(|item| item.id)
        .collect();

    let fresh = items
        .new_items()
        .filter(|item| item.clef() == clef)
        .take(NEW_ITEM_LIMIT)
        .map(|item| item.id);
    for id in fresh {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

/// Build a session for `clef`, shuffled with `rng`.
///
/// Production code passes `rand::rng()`; tests pass a seeded `StdRng` to get
/// a reproducible order.
pub fn compose<R: Rng + ?Sized>(
    items: &ItemCollection,
    config: &TrainingConfig,
    clef: Clef,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Composition {
    if items.count_for_clef(clef) == 0 {
        return Composition::NoCards;
    }

    let mut order = candidates(items, config, clef, now);
    let mode = if config.four_note_mode {
        SessionMode::FourNote
    } else {
        SessionMode::Single
    };
    if order.len() < mode.batch_size() {
        return match mode {
            SessionMode::Single => Composition::NothingDue,
            SessionMode::FourNote => Composition::InsufficientCards {
                available: order.len(),
            },
        };
    }

    order.shuffle(rng);
    tracing::debug!(%clef, ?mode, len = order.len(), "composed session");
    Composition::Ready(Session::new(clef, mode, order))
}

/// Response to a submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Feedback {
    /// Four-note mode is still collecting answers for the batch.
    Pending { answered: usize, total: usize },
    /// All answers for the current prompt are in.
    Judged {
        /// True only if every answer matched its target.
        correct: bool,
        /// Target letters in prompt order.
        expected: Vec<Letter>,
        /// Submitted letters in prompt order.
        given: Vec<Letter>,
    },
    /// The prompt was already judged; grade or retry first.
    Ignored,
}

/// What a grade call did.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    /// Items after scheduling, in prompt order.
    pub updated: Vec<LearningItem>,
    /// Whether the prompt had been judged correct.
    pub correct: bool,
}

impl GradeReport {
    /// Number of items graded in this action.
    pub fn count(&self) -> usize {
        self.updated.len()
    }
}

/// An ordered working set for one training round.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    clef: Clef,
    mode: SessionMode,
    order: Vec<Uuid>,
    cursor: usize,
    answers: Vec<Letter>,
    verdict: Option<bool>,
}

impl Session {
    /// Create a session over an already ordered list of ids.
    ///
    /// Four-note sessions must hold at least [`BATCH_SIZE`] ids; use
    /// [`compose`] to get that check.
    pub fn new(clef: Clef, mode: SessionMode, order: Vec<Uuid>) -> Self {
        Self {
            clef,
            mode,
            order,
            cursor: 0,
            answers: Vec::new(),
            verdict: None,
        }
    }

    pub fn clef(&self) -> Clef {
        self.clef
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Session order.
    pub fn order(&self) -> &[Uuid] {
        &self.order
    }

    /// Number of items in the session.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the session holds no items.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Zero-based position of the current prompt's first item.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Ids of the current prompt: one item, or a full batch of four.
    pub fn current(&self) -> &[Uuid] {
        let end = (self.cursor + self.mode.batch_size()).min(self.order.len());
        &self.order[self.cursor..end]
    }

    /// Resolve the current prompt against the deck.
    ///
    /// Returns `None` if any id is missing from the deck, which only happens
    /// when the deck was rebuilt under a running session.
    pub fn current_items<'a>(&self, items: &'a ItemCollection) -> Option<Vec<&'a LearningItem>> {
        self.current().iter().map(|&id| items.get(id)).collect()
    }

    /// Letters submitted so far for the current prompt.
    pub fn answers(&self) -> &[Letter] {
        &self.answers
    }

    /// Verdict for the current prompt, once all answers are in.
    pub fn verdict(&self) -> Option<bool> {
        self.verdict
    }

    /// Submit a letter for the current prompt.
    ///
    /// Single mode judges immediately. Four-note mode collects one letter per
    /// item and judges the batch on the fourth; the batch is correct only if
    /// all four match.
    pub fn submit_answer(&mut self, items: &ItemCollection, letter: Letter) -> Feedback {
        if self.verdict.is_some() {
            return Feedback::Ignored;
        }
        let Some(targets) = self.current_items(items) else {
            tracing::warn!("session refers to items missing from the deck");
            return Feedback::Ignored;
        };

        self.answers.push(letter);
        if self.answers.len() < targets.len() {
            return Feedback::Pending {
                answered: self.answers.len(),
                total: targets.len(),
            };
        }

        let correct = targets
            .iter()
            .zip(&self.answers)
            .all(|(item, &given)| item.pitch.matches_letter(given));
        self.verdict = Some(correct);

        Feedback::Judged {
            correct,
            expected: targets.iter().map(|item| item.pitch.letter).collect(),
            given: self.answers.clone(),
        }
    }

    /// Discard answers and verdict for the current prompt.
    pub fn retry(&mut self) {
        self.answers.clear();
        self.verdict = None;
    }

    /// Grade the current prompt and move on.
    ///
    /// The same outcome is applied to every item of the prompt, so a
    /// four-note batch is scheduled as a unit. An unjudged prompt counts as
    /// incorrect. The deck is updated in place.
    pub fn grade(
        &mut self,
        items: &mut ItemCollection,
        outcome: &ReviewOutcome,
        now: DateTime<Utc>,
    ) -> GradeReport {
        let correct = self.verdict.unwrap_or(false);
        let updated: Vec<LearningItem> = self
            .current()
            .iter()
            .filter_map(|&id| items.get(id))
            .map(|item| scheduler::advance(item, outcome, now))
            .collect();
        items.apply(&updated);

        self.step();
        GradeReport { updated, correct }
    }

    /// Move the cursor to the next prompt, wrapping to the start.
    fn step(&mut self) {
        self.answers.clear();
        self.verdict = None;

        let size = self.mode.batch_size();
        let next = self.cursor + size;
        // Only start a batch that fits; a short tail waits for the next shuffle.
        self.cursor = if next + size <= self.order.len() {
            next
        } else {
            0
        };
    }
}
