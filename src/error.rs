//! Error types for the catalog-bot crate.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while handling a single conversation turn.
///
/// These never reach the messaging channel: the engine logs them and
/// answers with a generic "try a new query" reply instead.
#[derive(Debug)]
pub enum BotError {
    /// The session store failed to read or write.
    Store(String),
}

impl fmt::Display for BotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(msg) => write!(f, "Session store error: {msg}"),
        }
    }
}

impl std::error::Error for BotError {}

/// Errors that abort catalog loading. There is no partial catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("catalog is not a JSON array of rows: {0}")]
    Json(#[from] serde_json::Error),

    /// Row numbers are 1-based, matching the spreadsheet's data rows.
    #[error("invalid catalog row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("catalog contains no products")]
    Empty,
}

/// Invalid environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },
}
