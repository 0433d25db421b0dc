use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::Duration;
use tokio::sync::OnceCell;

use crate::clock::Clock;
use crate::credentials::extract_credential;
use crate::credentials::AuthScheme;
use crate::credentials::CredentialError;
use crate::identity::Identity;
use crate::identity::IdentityStore;
use crate::identity::IdentityStoreError;
use crate::identity::UserId;
use crate::jwt::AccessTokenCodec;
use crate::jwt::AccessTokenError;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::refresh::RefreshToken;
use crate::refresh::RefreshTokenError;
use crate::refresh::RefreshTokenRepository;
use crate::refresh::RefreshTokenStore;
use crate::settings::AuthSettings;

/// Authentication coordinator combining password verification, access
/// tokens and refresh tokens.
///
/// Provides the login, refresh and revoke flows on top of a read-only
/// identity store and a refresh token repository.
pub struct Authenticator<I, R>
where
    I: IdentityStore,
    R: RefreshTokenRepository,
{
    identities: Arc<I>,
    password_hasher: PasswordHasher,
    access_tokens: AccessTokenCodec,
    refresh_tokens: RefreshTokenStore<R>,
    persistence_timeout: StdDuration,
    decoy_hash: OnceCell<Option<String>>,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    pub user_id: UserId,
    /// Signed access token
    pub access_token: String,
    pub refresh_token: RefreshToken,
}

/// Authentication operation errors.
///
/// The cause of a denial is logged, never carried to the caller.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal authentication failure: {0}")]
    Internal(String),
}

impl From<CredentialError> for AuthenticationError {
    fn from(_: CredentialError) -> Self {
        AuthenticationError::Unauthorized
    }
}

impl From<AccessTokenError> for AuthenticationError {
    fn from(err: AccessTokenError) -> Self {
        match err {
            AccessTokenError::SigningFailed(_) => AuthenticationError::Internal(err.to_string()),
            _ => AuthenticationError::Unauthorized,
        }
    }
}

impl From<RefreshTokenError> for AuthenticationError {
    fn from(err: RefreshTokenError) -> Self {
        if err.is_internal() {
            AuthenticationError::Internal(err.to_string())
        } else {
            AuthenticationError::Unauthorized
        }
    }
}

impl From<IdentityStoreError> for AuthenticationError {
    fn from(err: IdentityStoreError) -> Self {
        AuthenticationError::Internal(err.to_string())
    }
}

impl From<PasswordError> for AuthenticationError {
    fn from(err: PasswordError) -> Self {
        AuthenticationError::Internal(err.to_string())
    }
}

impl<I, R> Authenticator<I, R>
where
    I: IdentityStore,
    R: RefreshTokenRepository,
{
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `settings` - Signing secret, lifetimes and storage deadline
    /// * `identities` - Read-only user lookup
    /// * `refresh_tokens` - Refresh token persistence
    /// * `clock` - Time source shared by every component
    pub fn new(
        settings: &AuthSettings,
        identities: Arc<I>,
        refresh_tokens: Arc<R>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            identities,
            password_hasher: PasswordHasher::new(),
            access_tokens: AccessTokenCodec::new(
                settings.jwt_secret.as_bytes(),
                settings.access_token_ttl(),
                Arc::clone(&clock),
            ),
            refresh_tokens: RefreshTokenStore::new(
                refresh_tokens,
                settings.refresh_token_ttl(),
                settings.persistence_timeout(),
                clock,
            ),
            persistence_timeout: settings.persistence_timeout(),
            decoy_hash: OnceCell::new(),
        }
    }

    /// Hash a password for storage. Runs on the blocking thread pool.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed or password is empty
    pub async fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.spawn_hash(password).await
    }

    /// Verify credentials and issue an access/refresh token pair.
    ///
    /// # Arguments
    /// * `email` - Email the user registered with
    /// * `password` - Plaintext password to verify
    /// * `requested_ttl` - Optional shorter access token lifetime
    ///
    /// # Errors
    /// * `Unauthorized` - Unknown email or wrong password (indistinguishable)
    /// * `Internal` - Storage, signing or randomness failure
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        requested_ttl: Option<Duration>,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        let identity = match self.lookup(self.identities.find_user_by_email(email)).await? {
            Some(identity) => identity,
            None => {
                self.burn_decoy_verification(password).await;
                tracing::debug!("Login rejected: no user with this email");
                return Err(AuthenticationError::Unauthorized);
            }
        };

        let verified = self
            .password_hasher
            .spawn_verify(password, &identity.password_hash)
            .await
            .map_err(|e| internal("Password verification failed", e))?;

        if !verified {
            tracing::debug!(user_id = %identity.user_id, "Login rejected: password mismatch");
            return Err(AuthenticationError::Unauthorized);
        }

        let ttl = requested_ttl.unwrap_or_else(|| self.access_tokens.max_ttl());
        let access_token = self
            .access_tokens
            .issue(&identity.user_id, ttl)
            .map_err(|e| internal("Access token signing failed", e))?;

        let refresh_token = self
            .refresh_tokens
            .issue(identity.user_id)
            .await
            .map_err(|e| internal("Refresh token issue failed", e))?;

        tracing::info!(user_id = %identity.user_id, "User logged in");

        Ok(AuthenticationResult {
            user_id: identity.user_id,
            access_token,
            refresh_token,
        })
    }

    /// Exchange a refresh token for a new access token with the default
    /// lifetime. The refresh token itself is not rotated.
    ///
    /// # Errors
    /// * `Unauthorized` - Token unknown, expired, revoked, or its user is gone
    /// * `Internal` - Storage or signing failure
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<String, AuthenticationError> {
        let user_id = self.resolve_refresh_token(refresh_token).await?;

        if self
            .lookup(self.identities.find_user_by_id(&user_id))
            .await?
            .is_none()
        {
            tracing::warn!(user_id = %user_id, "Refresh rejected: user no longer exists");
            return Err(AuthenticationError::Unauthorized);
        }

        let access_token = self
            .access_tokens
            .issue(&user_id, self.access_tokens.max_ttl())
            .map_err(|e| internal("Access token signing failed", e))?;

        tracing::debug!(user_id = %user_id, "Access token refreshed");
        Ok(access_token)
    }

    /// Revoke a refresh token that currently authenticates.
    ///
    /// # Errors
    /// * `Unauthorized` - Token does not currently resolve
    /// * `Internal` - Storage failure
    pub async fn revoke(&self, refresh_token: &str) -> Result<(), AuthenticationError> {
        let user_id = self.resolve_refresh_token(refresh_token).await?;

        self.refresh_tokens
            .revoke(refresh_token)
            .await
            .map_err(|e| internal("Refresh token revocation failed", e))?;

        tracing::info!(user_id = %user_id, "Refresh token revoked");
        Ok(())
    }

    /// Verify an access token and return the user it asserts.
    ///
    /// # Errors
    /// * `Unauthorized` - Token is expired, forged, malformed or uses another algorithm
    pub fn authenticate(&self, access_token: &str) -> Result<UserId, AuthenticationError> {
        self.access_tokens.verify(access_token).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            AuthenticationError::from(e)
        })
    }

    /// Verify the access token carried by a `Bearer` authorization header.
    pub fn authenticate_header(&self, header: &str) -> Result<UserId, AuthenticationError> {
        let token = extract_credential(header, AuthScheme::Bearer).map_err(|e| {
            tracing::debug!(error = %e, "Authorization header rejected");
            AuthenticationError::from(e)
        })?;
        self.authenticate(token)
    }

    async fn resolve_refresh_token(&self, token: &str) -> Result<UserId, AuthenticationError> {
        self.refresh_tokens.resolve(token).await.map_err(|e| {
            if e.is_internal() {
                internal("Refresh token lookup failed", e)
            } else {
                tracing::debug!(error = %e, "Refresh token rejected");
                AuthenticationError::from(e)
            }
        })
    }

    async fn lookup(
        &self,
        lookup: impl Future<Output = Result<Option<Identity>, IdentityStoreError>>,
    ) -> Result<Option<Identity>, AuthenticationError> {
        let result = match tokio::time::timeout(self.persistence_timeout, lookup).await {
            Ok(result) => result,
            Err(_) => Err(IdentityStoreError::Timeout(self.persistence_timeout)),
        };

        result.map_err(|e| internal("Identity lookup failed", e))
    }

    // Spend the same hashing work on unknown emails as on real ones.
    async fn burn_decoy_verification(&self, password: &str) {
        let decoy = self
            .decoy_hash
            .get_or_init(|| async { self.password_hasher.spawn_hash("decoy-password").await.ok() })
            .await;

        if let Some(hash) = decoy {
            let _ = self.password_hasher.spawn_verify(password, hash).await;
        }
    }
}

fn internal<E>(context: &str, err: E) -> AuthenticationError
where
    E: std::fmt::Display + Into<AuthenticationError>,
{
    tracing::error!(error = %err, "{}", context);
    err.into()
}
