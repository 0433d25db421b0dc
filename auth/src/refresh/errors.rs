use thiserror::Error;

/// Error type for refresh token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshTokenError {
    #[error("Secure random source failed: {0}")]
    RandomnessFailure(String),

    #[error("Refresh token persistence failed: {0}")]
    PersistenceFailure(String),

    #[error("Refresh token storage timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("Refresh token not found")]
    NotFound,

    #[error("Refresh token is expired")]
    Expired,

    #[error("Refresh token has been revoked")]
    Revoked,
}

impl RefreshTokenError {
    /// True for failures of the machinery rather than of the presented token.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            RefreshTokenError::RandomnessFailure(_)
                | RefreshTokenError::PersistenceFailure(_)
                | RefreshTokenError::Timeout(_)
        )
    }
}
