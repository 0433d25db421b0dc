use thiserror::Error;

/// Error for ChirpBody validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChirpBodyError {
    #[error("Chirp is too long: {length} characters, maximum {max}")]
    TooLong { length: usize, max: usize },
}

/// Error for ChirpId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChirpIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Top-level error for all chirp-related operations
#[derive(Debug, Clone, Error)]
pub enum ChirpError {
    #[error("Invalid chirp: {0}")]
    InvalidBody(#[from] ChirpBodyError),

    #[error("Chirp not found: {0}")]
    NotFound(String),

    /// The requester does not own the chirp.
    #[error("Forbidden")]
    Forbidden,

    #[error("Database error: {0}")]
    DatabaseError(String),
}
