//! Review counters and the study statistics derived from them.
//!
//! Counters are the only persisted stats. Everything else is recomputed from
//! the deck when asked for.

pub mod counters;
pub mod snapshot;

pub use counters::PersistedCounters;
pub use snapshot::StudyStats;
