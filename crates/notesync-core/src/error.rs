//! Error types for notesync-core

use thiserror::Error;

/// Result type alias using notesync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notesync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// `SQLite` error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Store failure reported by a non-SQLite record store
    #[error("Store error: {0}")]
    Store(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Record not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// An identifier that must refer to a persisted record was not positive,
    /// or a persisted identifier was reassigned
    #[error("Invalid record id: {0}")]
    InvalidRecordId(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A sync pass is already running on this service
    #[error("Sync already in progress")]
    SyncInProgress,

    /// Remote task service error
    #[error(transparent)]
    Remote(#[from] crate::sync::RemoteError),
}
