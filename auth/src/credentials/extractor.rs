use std::fmt;

use super::errors::CredentialError;

/// Authorization schemes understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Signed access token or refresh token value.
    Bearer,
    /// Static pre-shared secret.
    ApiKey,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Bearer",
            AuthScheme::ApiKey => "ApiKey",
        }
    }
}

impl fmt::Display for AuthScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Split an `Authorization` header value into scheme and credential.
///
/// The header is split on the first ASCII space. The scheme must match
/// `expected` exactly (case-sensitive); the credential is returned as-is,
/// without trimming.
///
/// # Errors
/// * `MissingHeader` - Header value is empty
/// * `MalformedHeader` - No space separator, or scheme differs from `expected`
pub fn extract_credential(header: &str, expected: AuthScheme) -> Result<&str, CredentialError> {
    if header.is_empty() {
        return Err(CredentialError::MissingHeader);
    }

    match header.split_once(' ') {
        Some((scheme, credential)) if scheme == expected.as_str() => Ok(credential),
        _ => Err(CredentialError::MalformedHeader {
            expected: expected.as_str(),
        }),
    }
}
