//! Error types for fpl-eo
//!
//! This module provides the crate-wide error taxonomy:
//! - Configuration errors (reported before any work starts)
//! - Network and API errors from the Fantasy Premier League endpoints
//! - Serialization and file output errors
//! - Internal errors raised when the task pool's own bookkeeping is
//!   inconsistent
//!
//! Per-task fetch failures are deliberately *not* represented here: the task
//! pool contains them at the task boundary and records a failure marker in
//! the result list instead of propagating the error.

use thiserror::Error;

/// Result type alias for fpl-eo operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fpl-eo
///
/// Each variant includes contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "concurrency")
        key: Option<String>,
    },

    /// Network error (connection, timeout, malformed response body)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status code
    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus {
        /// HTTP status code returned by the API
        status: u16,
        /// The URL that produced the response
        url: String,
    },

    /// Invalid API base URL
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The task pool's internal bookkeeping reached an inconsistent state
    #[error("internal error: {0}")]
    Internal(String),
}
