//! Error types for quire-core

use thiserror::Error;

/// Result type alias for quire operations
pub type Result<T> = std::result::Result<T, QuireError>;

/// Main error type for quire operations
#[derive(Error, Debug)]
pub enum QuireError {
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Actor is not permitted to perform the operation
    #[error("Not authorized: {0}")]
    Authorization(String),

    /// Request is well-formed but semantically invalid
    #[error("Validation error: {0}")]
    Validation(String),

    /// Identifier generation exhausted its retry budget or hit an
    /// existing slug
    #[error("Identifier collision: {0}")]
    Collision(String),

    /// Persistence-related errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Notification-related errors
    #[error("Notification error: {0}")]
    Notification(#[from] NotificationError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Persistence-specific errors
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Migration error
    #[error("Migration error: {0}")]
    Migration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),

    /// Schema version mismatch
    #[error("Schema version mismatch: expected {expected}, got {actual}")]
    SchemaVersionMismatch { expected: u32, actual: u32 },
}

/// Notification-specific errors
#[derive(Error, Debug)]
pub enum NotificationError {
    /// SMTP transport error
    #[error("SMTP error: {0}")]
    Smtp(String),

    /// Malformed email address
    #[error("Invalid address: {0}")]
    Address(String),
}

impl From<rusqlite::Error> for PersistenceError {
    fn from(err: rusqlite::Error) -> Self {
        PersistenceError::Database(err.to_string())
    }
}

impl From<std::io::Error> for PersistenceError {
    fn from(err: std::io::Error) -> Self {
        PersistenceError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        PersistenceError::Serialization(err.to_string())
    }
}

impl From<rusqlite::Error> for QuireError {
    fn from(err: rusqlite::Error) -> Self {
        QuireError::Persistence(PersistenceError::Database(err.to_string()))
    }
}

impl From<serde_json::Error> for QuireError {
    fn from(err: serde_json::Error) -> Self {
        QuireError::Persistence(PersistenceError::Serialization(err.to_string()))
    }
}
