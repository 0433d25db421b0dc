use std::fmt;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier of an end user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    ///
    /// # Returns
    /// UserId with random UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from its canonical string form.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Error for UserId parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UserIdError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// The slice of a user record the auth core is allowed to read.
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: UserId,
    pub password_hash: String,
}

/// Error for identity store lookups.
#[derive(Debug, Clone, Error)]
pub enum IdentityStoreError {
    #[error("Identity store unavailable: {0}")]
    Unavailable(String),

    #[error("Identity store lookup timed out after {0:?}")]
    Timeout(std::time::Duration),
}

/// Read-only access to the users owned by the hosting service.
///
/// The auth core never writes through this port.
#[async_trait]
pub trait IdentityStore: Send + Sync + 'static {
    /// Look up a user by email address.
    ///
    /// # Returns
    /// Identity if a user with this email exists
    ///
    /// # Errors
    /// * `Unavailable` - Backing storage failed
    async fn find_user_by_email(&self, email: &str)
        -> Result<Option<Identity>, IdentityStoreError>;

    /// Look up a user by identifier.
    ///
    /// # Returns
    /// Identity if the user exists
    ///
    /// # Errors
    /// * `Unavailable` - Backing storage failed
    async fn find_user_by_id(&self, id: &UserId) -> Result<Option<Identity>, IdentityStoreError>;
}
