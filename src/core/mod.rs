//! Core types and logic for staffdrill.
//!
//! This module contains the pitch model and catalog, the SM-2 scheduler,
//! the deck, session composition, and the trainer that ties them to storage.

pub mod catalog;
pub mod deck;
pub mod item;
pub mod pitch;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod trainer;

pub use deck::ItemCollection;
pub use item::{LearningItem, Rating, ReviewOutcome, INITIAL_EASE_FACTOR, MIN_EASE_FACTOR};
pub use pitch::{Clef, Letter, Pitch, PitchRange};
pub use session::{Composition, Feedback, GradeReport, Session, SessionMode, BATCH_SIZE};
pub use state::{StateCell, SubscriptionId};
pub use trainer::Trainer;
