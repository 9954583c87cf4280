//! CLI commands for staffdrill.
//!
//! Each command is a struct over a store with an options type, a
//! serializable output, `run`, and `format_output` (JSON or human readable).
//! Commands take a [`Clock`] so tests can pin the date.

pub mod config_cmd;
pub mod init;
pub mod reset;
pub mod stats;
pub mod train;

use chrono::{DateTime, Local, NaiveDate, Utc};

pub use config_cmd::{ConfigAction, ConfigCommand};
pub use init::InitCommand;
pub use reset::ResetCommand;
pub use stats::StatsCommand;
pub use train::TrainCommand;

/// Point in time a command runs at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clock {
    /// Instant used for scheduling.
    pub now: DateTime<Utc>,
    /// Local calendar day used for daily counters.
    pub today: NaiveDate,
}

impl Clock {
    /// The system clock.
    pub fn system() -> Self {
        Self {
            now: Utc::now(),
            today: Local::now().date_naive(),
        }
    }

    /// A fixed clock.
    pub fn fixed(now: DateTime<Utc>, today: NaiveDate) -> Self {
        Self { now, today }
    }
}

/// Render output as pretty JSON.
pub(crate) fn to_json<T: serde::Serialize>(output: &T) -> String {
    serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
}
