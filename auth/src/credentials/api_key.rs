use std::fmt;

use super::errors::CredentialError;
use super::extractor::extract_credential;
use super::extractor::AuthScheme;

/// Static pre-shared secret presented with the `ApiKey` scheme.
#[derive(Clone)]
pub struct ApiKey {
    key: String,
}

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Check a raw credential against the configured key.
    ///
    /// An empty configured key never matches.
    ///
    /// # Errors
    /// * `ApiKeyMismatch` - Credential differs from the configured key
    pub fn verify(&self, presented: &str) -> Result<(), CredentialError> {
        if !self.key.is_empty() && constant_time_eq(self.key.as_bytes(), presented.as_bytes()) {
            Ok(())
        } else {
            Err(CredentialError::ApiKeyMismatch)
        }
    }

    /// Extract an `ApiKey` credential from a header value and verify it.
    pub fn verify_header(&self, header: &str) -> Result<(), CredentialError> {
        let presented = extract_credential(header, AuthScheme::ApiKey)?;
        self.verify(presented)
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

// Runtime depends only on the length of the inputs.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
