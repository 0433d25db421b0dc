use std::collections::HashMap;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use super::errors::RefreshTokenError;
use super::models::RefreshToken;
use super::ports::RefreshTokenRepository;

/// Process-local refresh token repository.
///
/// For tests and single-process development; tokens do not survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryRefreshTokenRepository {
    tokens: RwLock<HashMap<String, RefreshToken>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn insert(&self, token: &RefreshToken) -> Result<(), RefreshTokenError> {
        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token) {
            return Err(RefreshTokenError::PersistenceFailure(
                "duplicate refresh token value".to_string(),
            ));
        }
        tokens.insert(token.token.clone(), token.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, RefreshTokenError> {
        Ok(self.tokens.read().await.get(token).cloned())
    }

    async fn mark_revoked(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<bool, RefreshTokenError> {
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(token) {
            Some(record) if record.revoked_at.is_none() => {
                record.revoked_at = Some(revoked_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
