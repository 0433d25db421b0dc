use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::identity::UserId;

/// Issuer stamped into every access token.
pub const ISSUER: &str = "chirpy";

/// Payload of an access token.
///
/// Timestamps are Unix seconds, as in RFC 7519.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessTokenClaims {
    /// Issuer
    pub iss: String,

    /// Subject (user ID in canonical UUID form)
    pub sub: String,

    /// Issued at
    pub iat: i64,

    /// Expiration time
    pub exp: i64,
}

impl AccessTokenClaims {
    /// Claims for `user_id` valid from `issued_at` for `ttl`.
    pub fn for_user(user_id: &UserId, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            iss: ISSUER.to_string(),
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        }
    }

    /// A token stops being valid at the instant `exp` is reached.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        current_timestamp >= self.exp
    }
}
