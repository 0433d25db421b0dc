use std::fmt;
use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::Deserialize;

const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;
const DEFAULT_REFRESH_TOKEN_TTL_DAYS: i64 = 60;
const DEFAULT_PERSISTENCE_TIMEOUT_MS: u64 = 5000;

/// Configuration handed to every auth component at construction.
#[derive(Clone, Deserialize)]
pub struct AuthSettings {
    /// HMAC secret used to sign access tokens.
    pub jwt_secret: String,

    /// Default and maximum access token lifetime.
    #[serde(default = "default_access_token_ttl_seconds")]
    pub access_token_ttl_seconds: i64,

    #[serde(default = "default_refresh_token_ttl_days")]
    pub refresh_token_ttl_days: i64,

    /// Deadline applied to every storage round trip.
    #[serde(default = "default_persistence_timeout_ms")]
    pub persistence_timeout_ms: u64,
}

impl AuthSettings {
    /// Settings with the documented defaults and the given signing secret.
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_token_ttl_seconds: DEFAULT_ACCESS_TOKEN_TTL_SECONDS,
            refresh_token_ttl_days: DEFAULT_REFRESH_TOKEN_TTL_DAYS,
            persistence_timeout_ms: DEFAULT_PERSISTENCE_TIMEOUT_MS,
        }
    }

    pub fn access_token_ttl(&self) -> Duration {
        Duration::seconds(self.access_token_ttl_seconds)
    }

    pub fn refresh_token_ttl(&self) -> Duration {
        Duration::days(self.refresh_token_ttl_days)
    }

    pub fn persistence_timeout(&self) -> StdDuration {
        StdDuration::from_millis(self.persistence_timeout_ms)
    }
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_ttl_seconds", &self.access_token_ttl_seconds)
            .field("refresh_token_ttl_days", &self.refresh_token_ttl_days)
            .field("persistence_timeout_ms", &self.persistence_timeout_ms)
            .finish()
    }
}

fn default_access_token_ttl_seconds() -> i64 {
    DEFAULT_ACCESS_TOKEN_TTL_SECONDS
}

fn default_refresh_token_ttl_days() -> i64 {
    DEFAULT_REFRESH_TOKEN_TTL_DAYS
}

fn default_persistence_timeout_ms() -> u64 {
    DEFAULT_PERSISTENCE_TIMEOUT_MS
}
