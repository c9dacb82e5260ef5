//! Common error types for the songbook catalog

use thiserror::Error;

/// Common result type for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error kinds surfaced by the catalog core
///
/// Every variant keeps its kind when it crosses a layer; the HTTP layer
/// decides the status code from the variant alone.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed identifier, missing required field, bad date format
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Entity absent or soft-deleted
    #[error("Not found: {0}")]
    NotFound(String),

    /// A foreign reference (e.g. a song's group) does not resolve to a live entity
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// Stored lyrics document could not be decoded
    #[error("Malformed lyrics document: {0}")]
    MalformedDocument(#[source] serde_json::Error),

    /// Storage call failed (wraps sqlx::Error)
    #[error("Gateway error: {0}")]
    Gateway(#[from] sqlx::Error),

    /// Storage call exceeded its time bound
    #[error("Gateway call timed out after {0} ms")]
    Timeout(u64),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant violation
    #[error("Internal error: {0}")]
    Internal(String),
}
