//! Error types for the eventlens ecosystem.

use thiserror::Error;

/// Errors that can occur in eventlens operations.
#[derive(Error, Debug)]
pub enum EventLensError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("Incorrect password. Please try again.")]
    IncorrectPassword,

    #[error("Password is required.")]
    PasswordRequired,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Too many password attempts for '{0}', try again later")]
    RateLimited(String),

    #[error("Backend error: {0}")]
    Transient(String),

    #[error("Failed to sign URL: {0}")]
    Signing(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Upload too large: {0}")]
    UploadTooLarge(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for eventlens operations.
pub type EventLensResult<T> = Result<T, EventLensError>;
