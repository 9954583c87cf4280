//! Init command for staffdrill.
//!
//! Builds the deck from the stored config and writes a default config file
//! if none exists yet.

use serde::{Deserialize, Serialize};

use crate::cli::{to_json, Clock};
use crate::config::TrainingConfig;
use crate::core::pitch::Clef;
use crate::core::Trainer;
use crate::error::FailOpen;
use crate::storage::TrainerStore;

/// Options for the init command.
#[derive(Debug, Clone, Default)]
pub struct InitOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Rebuild even if a deck exists.
    pub force: bool,
}

/// Output format for the init command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitOutput {
    /// Whether initialization was successful.
    pub success: bool,
    /// Items created.
    pub created: usize,
    /// Treble items in the new deck.
    pub treble: usize,
    /// Bass items in the new deck.
    pub bass: usize,
    /// Whether an existing deck was replaced.
    pub replaced: bool,
    /// Error message if initialization failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl InitOutput {
    /// Create a successful output.
    pub fn success(treble: usize, bass: usize, replaced: bool) -> Self {
        Self {
            success: true,
            created: treble + bass,
            treble,
            bass,
            replaced,
            error: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            created: 0,
            treble: 0,
            bass: 0,
            replaced: false,
            error: Some(error.into()),
        }
    }
}

/// The init command implementation.
pub struct InitCommand<S: TrainerStore + Clone + 'static> {
    store: S,
    clock: Clock,
}

impl<S: TrainerStore + Clone + 'static> InitCommand<S> {
    /// Create a new init command.
    pub fn new(store: S, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Run the init command.
    pub fn run(&self, options: &InitOptions) -> InitOutput {
        // Leave an editable config file behind on first run.
        let stored = self
            .store
            .load_config()
            .fail_open_with("loading config", None);
        if stored.is_none() {
            self.store
                .save_config(&TrainingConfig::default())
                .fail_open_default("writing default config");
        }

        let mut trainer = Trainer::open(self.store.clone(), self.clock.today);
        let existing = trainer.items().len();
        if existing > 0 && !options.force {
            return InitOutput::failure(format!(
                "A deck with {} cards already exists. Use --force to rebuild it (progress is lost).",
                existing
            ));
        }

        trainer.initialize_deck(self.clock.now);
        let items = trainer.items();
        InitOutput::success(
            items.count_for_clef(Clef::Treble),
            items.count_for_clef(Clef::Bass),
            existing > 0,
        )
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &InitOutput, options: &InitOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return to_json(output);
        }

        if !output.success {
            return format!(
                "Init failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let verb = if output.replaced { "Rebuilt" } else { "Created" };
        format!(
            "{} deck with {} cards ({} treble, {} bass).\nRun `staffdrill train` to start.",
            verb, output.created, output.treble, output.bass
        )
    }
}
