use async_trait::async_trait;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::Session;
use crate::domain::user::models::UserId;

/// Port for session operations.
///
/// Every method taking `authorization` expects the raw `Authorization`
/// header value, an empty string when the header is absent.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Verify credentials and issue an access/refresh token pair.
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown email or wrong password
    /// * `Internal` - Storage or signing failure
    async fn login(&self, command: LoginCommand) -> Result<Session, SessionError>;

    /// Exchange the `Bearer` refresh token for a new access token.
    ///
    /// # Errors
    /// * `Unauthorized` - Header malformed, token unknown, expired or revoked
    /// * `Internal` - Storage or signing failure
    async fn refresh(&self, authorization: &str) -> Result<String, SessionError>;

    /// Revoke the `Bearer` refresh token.
    ///
    /// # Errors
    /// * `Unauthorized` - Header malformed or token does not currently resolve
    /// * `Internal` - Storage failure
    async fn revoke(&self, authorization: &str) -> Result<(), SessionError>;

    /// Verify the `Bearer` access token and return its user.
    ///
    /// # Errors
    /// * `Unauthorized` - Header malformed, token invalid or expired
    fn authenticate(&self, authorization: &str) -> Result<UserId, SessionError>;

    /// Check the `ApiKey` header presented by the payment provider webhook.
    ///
    /// # Errors
    /// * `Unauthorized` - Header missing, malformed or key mismatch
    fn verify_webhook_key(&self, authorization: &str) -> Result<(), SessionError>;
}
