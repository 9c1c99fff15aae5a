//! Error types for slot-engine operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("Invalid slot '{id}': {reason}")]
    InvalidSlot { id: String, reason: String },

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Invalid clock time: {0}")]
    InvalidClockTime(String),
}

impl EngineError {
    pub(crate) fn invalid_slot(id: &str, reason: impl Into<String>) -> Self {
        EngineError::InvalidSlot {
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
