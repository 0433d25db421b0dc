use thiserror::Error;

/// Error type for reading credentials out of an `Authorization` header.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Missing Authorization header")]
    MissingHeader,

    #[error("Malformed Authorization header, expected `{expected} <credential>`")]
    MalformedHeader { expected: &'static str },

    #[error("API key does not match")]
    ApiKeyMismatch,
}
