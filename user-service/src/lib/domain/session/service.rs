use std::sync::Arc;

use async_trait::async_trait;
use auth::extract_credential;
use auth::ApiKey;
use auth::AuthScheme;
use auth::Authenticator;
use auth::IdentityStore;
use auth::RefreshTokenRepository;
use chrono::Duration;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::LoginCommand;
use crate::domain::session::models::Session;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::user::models::UserId;

// Upper bound for client-supplied lifetimes before they become a chrono Duration.
const MAX_REQUESTED_TTL_SECONDS: i64 = 60 * 60 * 24 * 365;

/// Session service backed by the auth core.
pub struct SessionService<I, R>
where
    I: IdentityStore,
    R: RefreshTokenRepository,
{
    authenticator: Arc<Authenticator<I, R>>,
    webhook_key: ApiKey,
}

impl<I, R> SessionService<I, R>
where
    I: IdentityStore,
    R: RefreshTokenRepository,
{
    /// Create a new session service.
    ///
    /// # Arguments
    /// * `authenticator` - Configured auth core
    /// * `webhook_key` - Pre-shared key of the payment provider
    pub fn new(authenticator: Arc<Authenticator<I, R>>, webhook_key: ApiKey) -> Self {
        Self {
            authenticator,
            webhook_key,
        }
    }
}

fn bearer(authorization: &str) -> Result<&str, SessionError> {
    extract_credential(authorization, AuthScheme::Bearer).map_err(|e| {
        tracing::debug!(error = %e, "Authorization header rejected");
        SessionError::Unauthorized
    })
}

#[async_trait]
impl<I, R> SessionServicePort for SessionService<I, R>
where
    I: IdentityStore,
    R: RefreshTokenRepository,
{
    async fn login(&self, command: LoginCommand) -> Result<Session, SessionError> {
        let requested_ttl = command
            .expires_in_seconds
            .map(|seconds| Duration::seconds(seconds.clamp(0, MAX_REQUESTED_TTL_SECONDS)));

        let result = self
            .authenticator
            .login(&command.email, &command.password, requested_ttl)
            .await?;

        Ok(Session {
            user_id: result.user_id,
            access_token: result.access_token,
            refresh_token: result.refresh_token.token,
        })
    }

    async fn refresh(&self, authorization: &str) -> Result<String, SessionError> {
        let token = bearer(authorization)?;
        Ok(self.authenticator.refresh_access_token(token).await?)
    }

    async fn revoke(&self, authorization: &str) -> Result<(), SessionError> {
        let token = bearer(authorization)?;
        Ok(self.authenticator.revoke(token).await?)
    }

    fn authenticate(&self, authorization: &str) -> Result<UserId, SessionError> {
        Ok(self.authenticator.authenticate_header(authorization)?)
    }

    fn verify_webhook_key(&self, authorization: &str) -> Result<(), SessionError> {
        self.webhook_key.verify_header(authorization).map_err(|e| {
            tracing::warn!(error = %e, "Webhook request rejected");
            SessionError::Unauthorized
        })
    }
}
