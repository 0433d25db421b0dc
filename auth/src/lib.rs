//! Authentication and authorization core
//!
//! Provides the credential machinery a multi-tenant HTTP service needs:
//! - Password hashing (Argon2id)
//! - `Authorization` header parsing for the `Bearer` and `ApiKey` schemes
//! - Short-lived signed access tokens (HS256 JWT)
//! - Long-lived, revocable, storage-backed refresh tokens
//! - Login / refresh / revoke coordination
//!
//! Storage stays with the hosting service: it implements [`IdentityStore`]
//! (read-only user lookup) and [`RefreshTokenRepository`]. Secrets and
//! lifetimes arrive through [`AuthSettings`]; time through a [`Clock`].
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash));
//! assert!(!hasher.verify("other_password", &hash));
//! ```
//!
//! ## Authorization Headers
//! ```
//! use auth::{extract_credential, AuthScheme};
//!
//! assert_eq!(extract_credential("Bearer abc123", AuthScheme::Bearer).unwrap(), "abc123");
//! assert!(extract_credential("Basic abc123", AuthScheme::Bearer).is_err());
//! ```
//!
//! ## Access Tokens
//! ```
//! use std::sync::Arc;
//!
//! use auth::{AccessTokenCodec, SystemClock, UserId};
//! use chrono::Duration;
//!
//! let codec = AccessTokenCodec::new(
//!     b"secret_key_at_least_32_bytes_long!",
//!     Duration::hours(1),
//!     Arc::new(SystemClock),
//! );
//! let user_id = UserId::new();
//! let token = codec.issue(&user_id, Duration::minutes(5)).unwrap();
//! assert_eq!(codec.verify(&token).unwrap(), user_id);
//! ```

pub mod authenticator;
pub mod clock;
pub mod credentials;
pub mod identity;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod settings;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use clock::Clock;
pub use clock::ManualClock;
pub use clock::SystemClock;
pub use credentials::extract_credential;
pub use credentials::ApiKey;
pub use credentials::AuthScheme;
pub use credentials::CredentialError;
pub use identity::Identity;
pub use identity::IdentityStore;
pub use identity::IdentityStoreError;
pub use identity::UserId;
pub use identity::UserIdError;
pub use jwt::AccessTokenClaims;
pub use jwt::AccessTokenCodec;
pub use jwt::AccessTokenError;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use refresh::InMemoryRefreshTokenRepository;
pub use refresh::RefreshToken;
pub use refresh::RefreshTokenError;
pub use refresh::RefreshTokenRepository;
pub use refresh::RefreshTokenStore;
pub use settings::AuthSettings;
