//! The trainer: state cells, stores, and the pure core wired together.
//!
//! The deck and counters live in [`StateCell`]s. On open, each cell gets a
//! subscriber that saves the new value through the store. Saves are fail-open:
//! a broken store is logged and the in-memory state stays authoritative.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;

use crate::config::TrainingConfig;
use crate::core::deck::ItemCollection;
use crate::core::item::{LearningItem, Rating, ReviewOutcome};
use crate::core::pitch::{Clef, Letter};
use crate::core::scheduler;
use crate::core::session::{self, Composition, Feedback, GradeReport, Session};
use crate::core::state::StateCell;
use crate::error::{FailOpen, Result, StaffError};
use crate::stats::{PersistedCounters, StudyStats};
use crate::storage::TrainerStore;

/// A training process over one store.
pub struct Trainer<S: TrainerStore + 'static> {
    store: Arc<S>,
    config: TrainingConfig,
    items: StateCell<ItemCollection>,
    counters: StateCell<PersistedCounters>,
    session: Option<Session>,
}

impl<S: TrainerStore + 'static> Trainer<S> {
    /// Load state from `store` and start persisting changes to it.
    ///
    /// Unreadable data falls back to defaults: no items, zero counters dated
    /// `today`, and the default config.
    pub fn open(store: S, today: NaiveDate) -> Self {
        let store = Arc::new(store);

        let config = store
            .load_config()
            .fail_open_with("loading config", None)
            .unwrap_or_default();
        let items = store.load_items().fail_open_default("loading items");
        let counters = store
            .load_counters()
            .fail_open_with("loading counters", None)
            .unwrap_or_else(|| PersistedCounters::new(today));

        let mut items = StateCell::new(ItemCollection::from_items(items));
        let sink = Arc::clone(&store);
        items.subscribe(Box::new(move |items: &ItemCollection| {
            sink.save_items(items.as_slice())
                .fail_open_default("saving items");
        }));

        let mut counters = StateCell::new(counters);
        let sink = Arc::clone(&store);
        counters.subscribe(Box::new(move |counters: &PersistedCounters| {
            sink.save_counters(counters)
                .fail_open_default("saving counters");
        }));

        tracing::debug!(items = items.get().len(), "opened trainer");
        Self {
            store,
            config,
            items,
            counters,
            session: None,
        }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn items(&self) -> &ItemCollection {
        self.items.get()
    }

    pub fn counters(&self) -> &PersistedCounters {
        self.counters.get()
    }

    /// The running session, if any.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a deck exists.
    pub fn has_deck(&self) -> bool {
        !self.items.get().is_empty()
    }

    /// Apply environment overrides to the in-memory config without saving.
    pub fn apply_env_overrides(&mut self) {
        self.config.apply_env_overrides();
    }

    /// Replace the config and save it.
    ///
    /// The deck is left alone. Returns true if the new config selects
    /// different clefs or ranges, meaning the deck should be rebuilt with
    /// [`initialize_deck`](Self::initialize_deck).
    pub fn set_config(&mut self, mut config: TrainingConfig) -> bool {
        config.normalize();
        let stale = self.config.changes_deck(&config);

        self.store
            .save_config(&config)
            .fail_open_default("saving config");
        self.config = config;
        self.session = None;
        stale
    }

    /// Build a fresh deck from the config, replacing any existing one.
    ///
    /// Returns the number of items created.
    pub fn initialize_deck(&mut self, now: DateTime<Utc>) -> usize {
        let deck = ItemCollection::from_config(&self.config, now);
        let count = deck.len();
        self.items.set(deck);
        self.session = None;
        tracing::info!(count, "initialized deck");
        count
    }

    /// Clear the deck and the counters.
    pub fn reset(&mut self, today: NaiveDate) {
        self.items.update(ItemCollection::clear);
        self.counters.set(PersistedCounters::new(today));
        self.session = None;
        tracing::info!("reset deck and counters");
    }

    /// Compose a session for `clef` and make it the active one.
    ///
    /// Any previous session is dropped, even if composition fails.
    pub fn start_session<R: Rng + ?Sized>(
        &mut self,
        clef: Clef,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Composition {
        let composition = session::compose(self.items.get(), &self.config, clef, now, rng);
        self.session = match &composition {
            Composition::Ready(session) => Some(session.clone()),
            _ => None,
        };
        composition
    }

    /// Items of the current prompt.
    pub fn current_prompt(&self) -> Option<Vec<&LearningItem>> {
        self.session.as_ref()?.current_items(self.items.get())
    }

    /// Intervals each rating would give the first item of the prompt.
    pub fn preview(&self, now: DateTime<Utc>) -> Option<[u32; 4]> {
        let prompt = self.current_prompt()?;
        prompt
            .first()
            .map(|item| scheduler::preview_intervals(item, now))
    }

    /// Submit a letter for the current prompt.
    pub fn submit_answer(&mut self, letter: Letter) -> Result<Feedback> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| StaffError::invalid_state("no active session"))?;
        Ok(session.submit_answer(self.items.get(), letter))
    }

    /// Clear answers for the current prompt without grading.
    pub fn retry(&mut self) -> Result<()> {
        self.active_session()?.retry();
        Ok(())
    }

    /// Grade the current prompt, update the deck and counters, and move on.
    pub fn grade(
        &mut self,
        rating: Rating,
        elapsed: Duration,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<GradeReport> {
        let outcome = ReviewOutcome::new(rating, elapsed);
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| StaffError::invalid_state("no active session"))?;
        let report = self
            .items
            .update(|items| session.grade(items, &outcome, now));

        if report.count() > 0 {
            self.counters
                .update(|counters| counters.record(report.count() as u64, report.correct, today));
        }
        tracing::debug!(%rating, count = report.count(), correct = report.correct, "graded");
        Ok(report)
    }

    /// Current study statistics.
    pub fn stats(&self, now: DateTime<Utc>, today: NaiveDate) -> StudyStats {
        StudyStats::derive(self.items.get(), self.counters.get(), now, today)
    }

    fn active_session(&mut self) -> Result<&mut Session> {
        self.session
            .as_mut()
            .ok_or_else(|| StaffError::invalid_state("no active session"))
    }
}
