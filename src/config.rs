//! Training configuration for staffdrill.
//!
//! Configuration follows a precedence chain:
//! 1. Environment variables (highest priority)
//! 2. Stored config (`<home>/config.toml`)
//! 3. Defaults (lowest priority)
//!
//! All configuration is optional. A missing file means both clefs over their
//! full range with both modes off.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

use crate::core::catalog;
use crate::core::pitch::{Clef, PitchRange};
use crate::error::{Result, StaffError};

/// Environment variable that overrides infinite mode.
pub const ENV_INFINITE: &str = "STAFFDRILL_INFINITE";

/// Environment variable that overrides four-note mode.
pub const ENV_FOUR_NOTE: &str = "STAFFDRILL_FOUR_NOTE";

/// Environment variable that overrides the home directory.
pub const ENV_HOME: &str = "STAFFDRILL_HOME";

/// What to practise and how.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrainingConfig {
    /// Clefs with items in the deck, in deck order. Never empty once normalized.
    pub enabled_clefs: Vec<Clef>,
    /// Practise every item regardless of schedule.
    pub infinite_mode: bool,
    /// Present four items at a time and grade them together.
    pub four_note_mode: bool,
    /// Practice range per clef.
    pub ranges: ClefRanges,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            enabled_clefs: Clef::all().to_vec(),
            infinite_mode: false,
            four_note_mode: false,
            ranges: ClefRanges::default(),
        }
    }
}

/// Optional practice range for each clef.
///
/// A clef without a range uses [`catalog::default_range`]. A missing
/// `[ranges]` table means both defaults; a table naming one clef leaves the
/// other unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClefRanges {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treble: Option<PitchRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bass: Option<PitchRange>,
}

impl Default for ClefRanges {
    fn default() -> Self {
        Self {
            treble: Some(catalog::default_range(Clef::Treble)),
            bass: Some(catalog::default_range(Clef::Bass)),
        }
    }
}

impl ClefRanges {
    /// Configured range for a clef.
    pub fn get(&self, clef: Clef) -> Option<&PitchRange> {
        match clef {
            Clef::Treble => self.treble.as_ref(),
            Clef::Bass => self.bass.as_ref(),
        }
    }

    /// Range for a clef, falling back to the default.
    pub fn effective(&self, clef: Clef) -> PitchRange {
        self.get(clef)
            .cloned()
            .unwrap_or_else(|| catalog::default_range(clef))
    }

    /// Store a range in the slot of its clef.
    pub fn set(&mut self, range: PitchRange) {
        match range.clef {
            Clef::Treble => self.treble = Some(range),
            Clef::Bass => self.bass = Some(range),
        }
    }

    fn slot_mut(&mut self, clef: Clef) -> &mut Option<PitchRange> {
        match clef {
            Clef::Treble => &mut self.treble,
            Clef::Bass => &mut self.bass,
        }
    }
}

impl TrainingConfig {
    /// Parse a config from TOML and normalize it.
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: TrainingConfig =
            toml::from_str(content).map_err(|e| StaffError::config(e.to_string()))?;
        config.normalize();
        Ok(config)
    }

    /// Serialize to pretty TOML.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| StaffError::config(e.to_string()))
    }

    /// Repair a config loaded from disk.
    ///
    /// Duplicate clefs are dropped, an empty clef list is reset to the
    /// default, and each range is tagged with the clef of its slot.
    pub fn normalize(&mut self) {
        let mut seen = Vec::with_capacity(self.enabled_clefs.len());
        for &clef in &self.enabled_clefs {
            if !seen.contains(&clef) {
                seen.push(clef);
            }
        }
        self.enabled_clefs = seen;

        if self.enabled_clefs.is_empty() {
            tracing::warn!("config enables no clefs, using default clef list");
            self.enabled_clefs = Clef::all().to_vec();
        }

        for &clef in Clef::all() {
            if let Some(range) = self.ranges.slot_mut(clef) {
                if range.clef != clef {
                    tracing::warn!(%clef, "range stored under the wrong clef, retagging");
                    range.clef = clef;
                }
                if let Err(err) = range.validate() {
                    tracing::warn!(%clef, %range, error = %err, "range will include the whole clef");
                }
            }
        }
    }

    /// Whether a clef is part of the deck.
    pub fn is_clef_enabled(&self, clef: Clef) -> bool {
        self.enabled_clefs.contains(&clef)
    }

    /// Enable or disable a clef.
    ///
    /// Returns false and leaves the config unchanged when asked to disable
    /// the last enabled clef.
    pub fn toggle_clef(&mut self, clef: Clef) -> bool {
        if let Some(pos) = self.enabled_clefs.iter().position(|&c| c == clef) {
            if self.enabled_clefs.len() == 1 {
                return false;
            }
            self.enabled_clefs.remove(pos);
        } else {
            self.enabled_clefs.push(clef);
        }
        true
    }

    /// Set the practice range of a clef after checking both labels.
    pub fn set_range(&mut self, range: PitchRange) -> Result<()> {
        let (low, high) = range.bounds()?;
        if low > high {
            return Err(StaffError::config(format!(
                "range {} for {} clef starts above its end",
                range, range.clef
            )));
        }
        self.ranges.set(range);
        Ok(())
    }

    /// Apply environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var(ENV_INFINITE) {
            match parse_flag(&val) {
                Some(flag) => self.infinite_mode = flag,
                None => tracing::warn!(
                    "invalid {} value '{}', expected true or false; keeping '{}'",
                    ENV_INFINITE,
                    val,
                    self.infinite_mode
                ),
            }
        }

        if let Ok(val) = env::var(ENV_FOUR_NOTE) {
            match parse_flag(&val) {
                Some(flag) => self.four_note_mode = flag,
                None => tracing::warn!(
                    "invalid {} value '{}', expected true or false; keeping '{}'",
                    ENV_FOUR_NOTE,
                    val,
                    self.four_note_mode
                ),
            }
        }
    }

    /// Changed values between two configs as (key, old, new).
    pub fn diff(&self, other: &TrainingConfig) -> Vec<(String, String, String)> {
        let mut changes = Vec::new();

        if self.enabled_clefs != other.enabled_clefs {
            changes.push((
                "enabled_clefs".to_string(),
                clef_list(&self.enabled_clefs),
                clef_list(&other.enabled_clefs),
            ));
        }

        for &clef in Clef::all() {
            let old = self.ranges.effective(clef);
            let new = other.ranges.effective(clef);
            if old != new {
                changes.push((format!("ranges.{}", clef), old.to_string(), new.to_string()));
            }
        }

        if self.infinite_mode != other.infinite_mode {
            changes.push((
                "infinite_mode".to_string(),
                self.infinite_mode.to_string(),
                other.infinite_mode.to_string(),
            ));
        }
        if self.four_note_mode != other.four_note_mode {
            changes.push((
                "four_note_mode".to_string(),
                self.four_note_mode.to_string(),
                other.four_note_mode.to_string(),
            ));
        }

        changes
    }

    /// Whether the deck would need rebuilding to reflect `other`.
    ///
    /// Mode flags only affect composition; clefs and ranges decide which
    /// items exist.
    pub fn changes_deck(&self, other: &TrainingConfig) -> bool {
        self.enabled_clefs != other.enabled_clefs
            || Clef::all()
                .iter()
                .any(|&clef| self.ranges.effective(clef) != other.ranges.effective(clef))
    }
}

fn clef_list(clefs: &[Clef]) -> String {
    clefs
        .iter()
        .map(Clef::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a boolean flag as accepted on the command line and in the environment.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Named starting configurations.
pub mod presets {
    use super::TrainingConfig;
    use crate::core::pitch::{Clef, PitchRange};

    /// A named set of clefs and ranges.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Preset {
        /// Name used on the command line.
        pub id: &'static str,
        /// Display name.
        pub name: &'static str,
        /// One-line description.
        pub description: &'static str,
        /// Treble range, if the preset includes the treble clef.
        pub treble: Option<(&'static str, &'static str)>,
        /// Bass range, if the preset includes the bass clef.
        pub bass: Option<(&'static str, &'static str)>,
    }

    const PRESETS: &[Preset] = &[
        Preset {
            id: "beginner",
            name: "Beginner",
            description: "Five notes around middle C in each clef",
            treble: Some(("C4", "G4")),
            bass: Some(("F3", "C4")),
        },
        Preset {
            id: "intermediate",
            name: "Intermediate",
            description: "Two octaves per clef",
            treble: Some(("C4", "C6")),
            bass: Some(("C2", "C4")),
        },
        Preset {
            id: "advanced",
            name: "Advanced",
            description: "Full range including ledger lines",
            treble: Some(("C4", "E6")),
            bass: Some(("E2", "G4")),
        },
        Preset {
            id: "treble-only",
            name: "Treble only",
            description: "Full treble range",
            treble: Some(("C4", "E6")),
            bass: None,
        },
        Preset {
            id: "bass-only",
            name: "Bass only",
            description: "Full bass range",
            treble: None,
            bass: Some(("E2", "G4")),
        },
    ];

    /// All presets in display order.
    pub fn all() -> &'static [Preset] {
        PRESETS
    }

    /// Look up a preset by id, ignoring case.
    pub fn find(id: &str) -> Option<&'static Preset> {
        PRESETS.iter().find(|p| p.id.eq_ignore_ascii_case(id.trim()))
    }

    impl Preset {
        /// Clefs the preset enables, in deck order.
        pub fn enabled_clefs(&self) -> Vec<Clef> {
            let mut clefs = Vec::new();
            if self.treble.is_some() {
                clefs.push(Clef::Treble);
            }
            if self.bass.is_some() {
                clefs.push(Clef::Bass);
            }
            clefs
        }

        /// A copy of `config` with this preset's clefs and ranges.
        ///
        /// Mode flags are kept.
        pub fn apply(&self, config: &TrainingConfig) -> TrainingConfig {
            let mut next = config.clone();
            next.enabled_clefs = self.enabled_clefs();
            next.ranges.treble = self
                .treble
                .map(|(start, end)| PitchRange::new(Clef::Treble, start, end));
            next.ranges.bass = self
                .bass
                .map(|(start, end)| PitchRange::new(Clef::Bass, start, end));
            next
        }
    }
}

/// Get the staffdrill home directory.
///
/// Uses `STAFFDRILL_HOME` if set and non-empty, else `~/.staffdrill`.
/// Without a home directory a per-user path under `/tmp` is used.
pub fn staffdrill_home() -> PathBuf {
    if let Ok(home) = env::var(ENV_HOME) {
        if home.is_empty() {
            tracing::warn!("{} is empty, using default", ENV_HOME);
        } else {
            let path = PathBuf::from(&home);
            if path.is_absolute() {
                return path;
            }
            if let Ok(canonical) = path.canonicalize() {
                return canonical;
            }
            tracing::warn!("{} is relative and doesn't exist, using as-is", ENV_HOME);
            return path;
        }
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".staffdrill");
    }

    let fallback = fallback_home();
    tracing::warn!("HOME not set, using fallback location: {}", fallback.display());
    fallback
}

#[cfg(unix)]
fn fallback_home() -> PathBuf {
    use std::os::unix::fs::MetadataExt;
    let uid = std::fs::metadata("/").map(|m| m.uid()).unwrap_or(0);
    PathBuf::from(format!("/tmp/staffdrill-{}", uid))
}

#[cfg(not(unix))]
fn fallback_home() -> PathBuf {
    std::env::temp_dir().join("staffdrill")
}

/// Path of the crash log written by the panic hook.
pub fn crash_log_path() -> PathBuf {
    staffdrill_home().join("crash.log")
}
