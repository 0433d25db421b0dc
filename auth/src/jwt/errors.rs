use thiserror::Error;

/// Error type for access token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessTokenError {
    #[error("Failed to sign token: {0}")]
    SigningFailed(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    BadSignature,

    #[error("Unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
}
