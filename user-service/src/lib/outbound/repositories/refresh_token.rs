use async_trait::async_trait;
use auth::RefreshToken;
use auth::RefreshTokenError;
use auth::RefreshTokenRepository;
use auth::UserId;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

/// Refresh token persistence on the `refresh_tokens` table.
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl From<RefreshTokenRow> for RefreshToken {
    fn from(row: RefreshTokenRow) -> Self {
        RefreshToken {
            token: row.token,
            user_id: UserId(row.user_id),
            created_at: row.created_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

fn persistence_failure(e: sqlx::Error) -> RefreshTokenError {
    tracing::error!(error = %e, "Refresh token query failed");
    RefreshTokenError::PersistenceFailure(e.to_string())
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn insert(&self, token: &RefreshToken) -> Result<(), RefreshTokenError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, created_at, updated_at, expires_at, revoked_at)
            VALUES ($1, $2, $3, $3, $4, $5)
            "#,
        )
        .bind(&token.token)
        .bind(token.user_id.0)
        .bind(token.created_at)
        .bind(token.expires_at)
        .bind(token.revoked_at)
        .execute(&self.pool)
        .await
        .map_err(persistence_failure)?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, RefreshTokenError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT token, user_id, created_at, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(persistence_failure)?;

        Ok(row.map(RefreshToken::from))
    }

    async fn mark_revoked(
        &self,
        token: &str,
        revoked_at: DateTime<Utc>,
    ) -> Result<bool, RefreshTokenError> {
        let result = sqlx::query(
            r#"
            UPDATE refresh_tokens
            SET revoked_at = $2, updated_at = $2
            WHERE token = $1 AND revoked_at IS NULL
            "#,
        )
        .bind(token)
        .bind(revoked_at)
        .execute(&self.pool)
        .await
        .map_err(persistence_failure)?;

        Ok(result.rows_affected() == 1)
    }
}
