use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;

use super::errors::RefreshTokenError;
use super::models::RefreshToken;

/// Persistence operations for refresh tokens.
///
/// Implementations must read from the source of truth on every call; a
/// revocation has to be visible to the very next `find_by_token`.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    /// Persist a newly issued token.
    ///
    /// # Errors
    /// * `PersistenceFailure` - Write failed, including a duplicate token value
    async fn insert(&self, token: &RefreshToken) -> Result<(), RefreshTokenError>;

    /// Retrieve a token by its exact value.
    ///
    /// # Returns
    /// Optional token record (None if not found)
    ///
    /// # Errors
    /// * `PersistenceFailure` - Read failed
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, RefreshTokenError>;

    /// Stamp `revoked_at` on a token that is not yet revoked.
    ///
    /// # Returns
    /// Whether a record changed (false if unknown or already revoked)
    ///
    /// # Errors
    /// * `PersistenceFailure` - Write failed
    async fn mark_revoked(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<bool, RefreshTokenError>;
}
