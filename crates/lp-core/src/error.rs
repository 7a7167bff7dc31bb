//! # AppError
//!
//! Centralized error handling for the Loop+ core.
//! Storage trouble is normally absorbed where it happens; what reaches a
//! caller is mostly input validation.

use thiserror::Error;

/// The primary error type for all lp-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// User input rejected (e.g., blank display name, origin too short).
    /// The message is meant to be shown inline next to the field.
    #[error("{0}")]
    Validation(String),

    /// Resource not found (e.g., thread, ride)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// The key-value backend refused a read or write
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),

    /// A payload could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

/// A specialized Result type for Loop+ logic.
pub type Result<T> = std::result::Result<T, AppError>;
