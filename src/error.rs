//! Scheduler error types.

use thiserror::Error;

/// Errors that abort a scheduling run. A failed run never yields a partial timeline.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid time '{0}': expected HH:MM or HH:MM:SS")]
    InvalidTimeFormat(String),

    #[error("invalid window for '{clip}': {reason}")]
    InvalidWindow { clip: String, reason: String },

    #[error("schedule overbooked: {committed}s of clips committed, only {total}s available")]
    ScheduleOverbooked { committed: u64, total: u32 },

    #[error("no filler clips available to cover the remaining {remaining}s")]
    NoFillerAvailable { remaining: u64 },

    #[error("clip '{clip}' must have a positive duration")]
    NonPositiveDuration { clip: String },

    #[error("clip '{clip}' must have a positive frequency")]
    NonPositiveFrequency { clip: String },

    #[error("clip '{clip}': invalid {field} '{value}'")]
    InvalidField {
        clip: String,
        field: &'static str,
        value: String,
    },

    #[error("malformed catalog: {0}")]
    MalformedCatalog(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("schedule runs past midnight (ends at {end}s)")]
    DayOverflow { end: u64 },

    #[error("'{clip}' starts at {start}, outside its window {window}")]
    WindowMissed {
        clip: String,
        start: String,
        window: String,
    },
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
