use chrono::NaiveDate;
use thiserror::Error;

/// Errors produced by scheduling, placement and cache synchronization
///
/// Every failure is local and recoverable: callers report it and let the user
/// retry. `Validation`, `OutOfRangeDate` and `IncompatiblePattern` are always
/// raised before any service call is made, so they never leave partial state
/// behind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevisitError {
    /// Malformed input caught before reaching the service
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// A pattern whose steps cannot produce a schedule
    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    /// A manual reschedule outside `[earliest, latest]`
    #[error("Requested date {requested} is outside {earliest}..={latest}")]
    OutOfRangeDate {
        requested: NaiveDate,
        earliest: NaiveDate,
        latest: NaiveDate,
    },

    /// The target box binds a pattern that would invalidate completed reviews
    #[error("Box pattern {box_pattern} is incompatible with item pattern {item_pattern}")]
    IncompatiblePattern {
        item_pattern: String,
        box_pattern: String,
    },

    /// A referenced pattern, box, category, item or review date does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Network or server failure; never retried automatically
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RevisitError {
    /// Shorthand for a field-level validation failure
    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        RevisitError::Validation {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error was raised before any service call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            RevisitError::Validation { .. }
                | RevisitError::InvalidPattern(_)
                | RevisitError::OutOfRangeDate { .. }
                | RevisitError::IncompatiblePattern { .. }
        )
    }
}

impl From<reqwest::Error> for RevisitError {
    fn from(err: reqwest::Error) -> Self {
        RevisitError::Transport(err.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, RevisitError>;
