//! Error types used throughout the laundry

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the event laundry
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum LaunderError {
    /// The interval key is not registered in the catalog.
    #[error("Unknown laundry interval: {0}")]
    UnknownInterval(String),

    /// A stored timestamp or timezone could not be parsed or converted.
    #[error("Date conversion error: {0}")]
    Conversion(String),

    /// A settings submission carried a missing or invalid request token.
    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LaunderError {
    /// Stable label suitable for logging and skip reports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::UnknownInterval(_) => "unknown_interval",
            Self::Conversion(_) => "conversion",
            Self::Authorization(_) => "authorization",
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Scheduler(_) => "scheduler",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::Internal(_) => "internal",
        }
    }
}

/// Result type alias for laundry operations
pub type Result<T> = std::result::Result<T, LaunderError>;
