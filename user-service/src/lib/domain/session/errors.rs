use auth::AuthenticationError;
use thiserror::Error;

/// Error for session operations (login, refresh, revoke, request authentication).
///
/// Denials carry no detail so callers cannot tell which check failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthenticationError> for SessionError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::Unauthorized => SessionError::Unauthorized,
            AuthenticationError::Internal(message) => SessionError::Internal(message),
        }
    }
}
