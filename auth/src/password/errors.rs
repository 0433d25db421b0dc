use thiserror::Error;

/// Error type for password operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Password must not be empty")]
    EmptyPassword,

    #[error("Password hashing task failed: {0}")]
    TaskFailed(String),
}
