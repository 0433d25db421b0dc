use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Password hashing implementation.
///
/// Argon2id v19 with a fixed work factor: 19 MiB of memory
/// (`m=19456`), two passes (`t=2`), one lane (`p=1`). Hashes are emitted in
/// PHC string format, so salt and parameters travel with the hash and
/// verification keeps working if the work factor is raised later.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a new password hasher instance.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT),
        }
    }

    /// Hash a plaintext password securely with a fresh random salt.
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `EmptyPassword` - Plaintext is empty
    /// * `HashingFailed` - Password hashing operation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::EmptyPassword);
        }

        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Wrong passwords, empty inputs and unparseable hashes all yield
    /// `false`; callers cannot tell them apart. The digest comparison itself
    /// is constant-time.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        if password.is_empty() || hash.is_empty() {
            return false;
        }

        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is not a valid PHC string");
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl PasswordHasher {
    /// Hash on the blocking thread pool so async workers keep serving other tasks.
    ///
    /// # Errors
    /// * `EmptyPassword` - Plaintext is empty
    /// * `HashingFailed` - Password hashing operation failed
    /// * `TaskFailed` - Blocking task panicked or was cancelled
    pub async fn spawn_hash(&self, password: &str) -> Result<String, PasswordError> {
        let hasher = self.clone();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
    }

    /// Verify on the blocking thread pool. Same outcomes as [`PasswordHasher::verify`].
    ///
    /// # Errors
    /// * `TaskFailed` - Blocking task panicked or was cancelled
    pub async fn spawn_verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| PasswordError::TaskFailed(e.to_string()))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let password = "my_secure_password";

        let hash = hasher.hash(password).expect("Failed to hash password");

        assert!(hasher.verify(password, &hash));
        assert!(!hasher.verify("wrong_password", &hash));
    }

    #[test]
    fn test_hash_is_self_describing() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("password").expect("Failed to hash password");

        assert!(hash.starts_with("$argon2id$v=19$m=19456,t=2,p=1$"));
    }

    #[test]
    fn test_same_password_gets_distinct_salts() {
        let hasher = PasswordHasher::new();
        let first = hasher.hash("password").expect("Failed to hash password");
        let second = hasher.hash("password").expect("Failed to hash password");

        assert_ne!(first, second);
        assert!(hasher.verify("password", &first));
        assert!(hasher.verify("password", &second));
    }

    #[test]
    fn test_verify_against_hash_of_other_password() {
        let hasher = PasswordHasher::new();
        let hash1 = hasher.hash("password").expect("Failed to hash password");
        let hash2 = hasher.hash("password2").expect("Failed to hash password");

        assert!(!hasher.verify("password2", &hash1));
        assert!(!hasher.verify("password", &hash2));
    }

    #[test]
    fn test_verify_empty_inputs() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash("password").expect("Failed to hash password");

        assert!(!hasher.verify("", &hash));
        assert!(!hasher.verify("password", ""));
    }

    #[test]
    fn test_verify_invalid_hash() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify("password", "invalid_hash"));
        assert!(!hasher.verify("password", "$argon2id$v=19$garbage"));
    }

    #[tokio::test]
    async fn test_spawned_hash_and_verify() {
        let hasher = PasswordHasher::new();

        let hash = hasher.spawn_hash("04234").await.unwrap();

        assert!(hasher.spawn_verify("04234", &hash).await.unwrap());
        assert!(!hasher.spawn_verify("04235", &hash).await.unwrap());
        assert!(!hasher.spawn_verify("04234", "invalid_hash").await.unwrap());
        assert!(matches!(
            hasher.spawn_hash("").await,
            Err(PasswordError::EmptyPassword)
        ));
    }

    #[test]
    fn test_hash_rejects_empty_password() {
        let hasher = PasswordHasher::new();
        assert!(matches!(hasher.hash(""), Err(PasswordError::EmptyPassword)));
    }
}
