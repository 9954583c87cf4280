//! Config command for staffdrill.
//!
//! Shows or edits the stored training config. Edits never touch the deck;
//! when clefs or ranges change the output says the deck is stale.

use serde::{Deserialize, Serialize};

use crate::cli::{to_json, Clock};
use crate::config::{presets, TrainingConfig};
use crate::core::pitch::{Clef, PitchRange};
use crate::core::Trainer;
use crate::storage::TrainerStore;

/// What to do with the config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigAction {
    /// Print the current config.
    Show,
    /// Apply a named preset.
    Preset(String),
    /// Set the range of one clef.
    Range {
        clef: Clef,
        start: String,
        end: String,
    },
    /// Enable or disable a clef.
    ToggleClef(Clef),
    /// Turn infinite mode on or off.
    Infinite(bool),
    /// Turn four-note mode on or off.
    FourNote(bool),
}

/// Options for the config command.
#[derive(Debug, Clone, Default)]
pub struct ConfigOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// One changed setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigChange {
    pub key: String,
    pub old: String,
    pub new: String,
}

/// Output format for the config command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOutput {
    /// Whether the action succeeded.
    pub success: bool,
    /// Config after the action.
    pub config: TrainingConfig,
    /// Settings that changed.
    pub changes: Vec<ConfigChange>,
    /// Whether the deck no longer matches the clefs and ranges.
    pub deck_stale: bool,
    /// Error message if the action failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConfigOutput {
    /// Create a successful output.
    pub fn success(config: TrainingConfig, changes: Vec<ConfigChange>, deck_stale: bool) -> Self {
        Self {
            success: true,
            config,
            changes,
            deck_stale,
            error: None,
        }
    }

    /// Create a failed output carrying the unchanged config.
    pub fn failure(config: TrainingConfig, error: impl Into<String>) -> Self {
        Self {
            success: false,
            config,
            changes: Vec::new(),
            deck_stale: false,
            error: Some(error.into()),
        }
    }
}

/// The config command implementation.
pub struct ConfigCommand<S: TrainerStore + Clone + 'static> {
    store: S,
    clock: Clock,
}

impl<S: TrainerStore + Clone + 'static> ConfigCommand<S> {
    /// Create a new config command.
    pub fn new(store: S, clock: Clock) -> Self {
        Self { store, clock }
    }

    /// Run the config command.
    pub fn run(&self, action: &ConfigAction, _options: &ConfigOptions) -> ConfigOutput {
        let mut trainer = Trainer::open(self.store.clone(), self.clock.today);
        let current = trainer.config().clone();

        let next = match self.apply(action, &current) {
            Ok(Some(next)) => next,
            Ok(None) => return ConfigOutput::success(current, Vec::new(), false),
            Err(message) => return ConfigOutput::failure(current, message),
        };

        let changes = current
            .diff(&next)
            .into_iter()
            .map(|(key, old, new)| ConfigChange { key, old, new })
            .collect();
        let stale = trainer.set_config(next) && trainer.has_deck();
        ConfigOutput::success(trainer.config().clone(), changes, stale)
    }

    /// Compute the config an action leads to. `None` means nothing to save.
    fn apply(
        &self,
        action: &ConfigAction,
        current: &TrainingConfig,
    ) -> Result<Option<TrainingConfig>, String> {
        let mut next = current.clone();
        match action {
            ConfigAction::Show => return Ok(None),
            ConfigAction::Preset(id) => {
                let preset = presets::find(id).ok_or_else(|| {
                    let known: Vec<&str> = presets::all().iter().map(|p| p.id).collect();
                    format!("Unknown preset '{}'. Available: {}", id, known.join(", "))
                })?;
                next = preset.apply(current);
            }
            ConfigAction::Range { clef, start, end } => {
                next.set_range(PitchRange::new(*clef, start.as_str(), end.as_str()))
                    .map_err(|e| e.to_string())?;
            }
            ConfigAction::ToggleClef(clef) => {
                if !next.toggle_clef(*clef) {
                    return Err(format!(
                        "Cannot disable {} clef: at least one clef must stay enabled",
                        clef
                    ));
                }
            }
            ConfigAction::Infinite(on) => next.infinite_mode = *on,
            ConfigAction::FourNote(on) => next.four_note_mode = *on,
        }
        Ok(Some(next))
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ConfigOutput, options: &ConfigOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            return to_json(output);
        }

        if !output.success {
            return format!(
                "Config failed: {}",
                output.error.as_deref().unwrap_or("unknown error")
            );
        }

        let mut lines = Vec::new();
        if output.changes.is_empty() {
            lines.push(describe(&output.config));
            lines.push(String::new());
            lines.push("Presets:".to_string());
            for preset in presets::all() {
                lines.push(format!("  {:<13} {}", preset.id, preset.description));
            }
        } else {
            for change in &output.changes {
                lines.push(format!("{}: {} -> {}", change.key, change.old, change.new));
            }
        }

        if output.deck_stale {
            lines.push(String::new());
            lines.push(
                "The deck no longer matches these settings. Run `staffdrill init --force` to rebuild it."
                    .to_string(),
            );
        }
        lines.join("\n")
    }
}

/// Human-readable summary of a config.
fn describe(config: &TrainingConfig) -> String {
    let mut lines = Vec::new();
    for &clef in Clef::all() {
        let state = if config.is_clef_enabled(clef) {
            "on "
        } else {
            "off"
        };
        lines.push(format!(
            "{:<7} {}  range {}",
            clef.as_str(),
            state,
            config.ranges.effective(clef)
        ));
    }
    lines.push(format!("infinite mode:  {}", on_off(config.infinite_mode)));
    lines.push(format!("four-note mode: {}", on_off(config.four_note_mode)));
    lines.join("\n")
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
