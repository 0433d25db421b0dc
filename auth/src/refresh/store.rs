use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use rand::rngs::OsRng;
use rand::RngCore;

use super::errors::RefreshTokenError;
use super::models::encode_hex;
use super::models::RefreshToken;
use super::models::RefreshTokenState;
use super::models::TOKEN_BYTES;
use super::ports::RefreshTokenRepository;
use crate::clock::Clock;
use crate::identity::UserId;

/// Issues, resolves and revokes storage-backed refresh tokens.
///
/// Holds no token state of its own: every resolve reads the repository, so
/// a revocation is honoured by the next request that presents the token.
pub struct RefreshTokenStore<R>
where
    R: RefreshTokenRepository,
{
    repository: Arc<R>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    timeout: StdDuration,
}

impl<R> RefreshTokenStore<R>
where
    R: RefreshTokenRepository,
{
    /// Create a store over a repository.
    ///
    /// # Arguments
    /// * `repository` - Refresh token persistence implementation
    /// * `ttl` - Lifetime of issued tokens
    /// * `timeout` - Deadline for each repository call
    /// * `clock` - Time source for creation, expiry and revocation stamps
    pub fn new(
        repository: Arc<R>,
        ttl: Duration,
        timeout: StdDuration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            clock,
            ttl,
            timeout,
        }
    }

    /// Issue and persist a fresh token for `user_id`.
    ///
    /// # Errors
    /// * `RandomnessFailure` - OS random source failed
    /// * `PersistenceFailure` / `Timeout` - Token could not be stored
    pub async fn issue(&self, user_id: UserId) -> Result<RefreshToken, RefreshTokenError> {
        let created_at = self.clock.now();
        let token = RefreshToken {
            token: generate_token_value()?,
            user_id,
            created_at,
            expires_at: created_at + self.ttl,
            revoked_at: None,
        };

        self.within(self.repository.insert(&token)).await?;
        tracing::debug!(user_id = %user_id, expires_at = %token.expires_at, "Refresh token issued");

        Ok(token)
    }

    /// Resolve a presented token value to its owner.
    ///
    /// # Errors
    /// * `NotFound` - No token with this value
    /// * `Revoked` - Token was revoked
    /// * `Expired` - Token lifetime has elapsed
    /// * `PersistenceFailure` / `Timeout` - Lookup failed
    pub async fn resolve(&self, token: &str) -> Result<UserId, RefreshTokenError> {
        let record = self
            .within(self.repository.find_by_token(token))
            .await?
            .ok_or(RefreshTokenError::NotFound)?;

        match record.state_at(self.clock.now()) {
            RefreshTokenState::Active => Ok(record.user_id),
            RefreshTokenState::Expired => Err(RefreshTokenError::Expired),
            RefreshTokenState::Revoked => Err(RefreshTokenError::Revoked),
        }
    }

    /// Revoke a token.
    ///
    /// Unknown and already-revoked tokens are left untouched and still
    /// reported as success.
    ///
    /// # Errors
    /// * `PersistenceFailure` / `Timeout` - Write failed
    pub async fn revoke(&self, token: &str) -> Result<(), RefreshTokenError> {
        let revoked_at = self.clock.now();
        let changed = self
            .within(self.repository.mark_revoked(token, revoked_at))
            .await?;

        if changed {
            tracing::debug!(revoked_at = %revoked_at, "Refresh token revoked");
        } else {
            tracing::debug!("Refresh token unknown or already revoked");
        }

        Ok(())
    }

    async fn within<T>(
        &self,
        operation: impl Future<Output = Result<T, RefreshTokenError>>,
    ) -> Result<T, RefreshTokenError> {
        tokio::time::timeout(self.timeout, operation)
            .await
            .map_err(|_| RefreshTokenError::Timeout(self.timeout))?
    }
}

fn generate_token_value() -> Result<String, RefreshTokenError> {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| RefreshTokenError::RandomnessFailure(e.to_string()))?;
    Ok(encode_hex(&bytes))
}
