//! staffdrill - spaced-repetition trainer for reading notes on the staff
//!
//! Each natural pitch in a configured treble or bass range is a card. Cards
//! are scheduled with SM-2; a session drills the due and new cards one at a
//! time or in batches of four.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod stats;
pub mod storage;

pub use config::TrainingConfig;
pub use core::{
    Clef, Composition, Feedback, ItemCollection, LearningItem, Letter, Pitch, PitchRange,
    Rating, Session, SessionMode, Trainer,
};
pub use error::{Result, StaffError};
pub use stats::{PersistedCounters, StudyStats};
pub use storage::{ConfigStore, CounterStore, FileStore, ItemStore, MemoryStore, TrainerStore};

// CLI commands
pub use cli::{ConfigCommand, InitCommand, ResetCommand, StatsCommand, TrainCommand};
