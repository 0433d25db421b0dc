use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::AccessTokenClaims;
use super::claims::ISSUER;
use super::errors::AccessTokenError;
use crate::clock::Clock;
use crate::identity::UserId;

/// The only algorithm tokens are signed or accepted with.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Issues and verifies short-lived access tokens.
///
/// Tokens are compact JWS strings signed with HMAC-SHA256 under a symmetric
/// secret. Expiry is judged against the injected clock rather than the
/// system time.
pub struct AccessTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    max_ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl AccessTokenCodec {
    /// Create a codec for one signing secret.
    ///
    /// # Arguments
    /// * `secret` - Symmetric signing secret
    /// * `max_ttl` - Default token lifetime and upper bound for requested lifetimes
    /// * `clock` - Time source for `iat`/`exp` and expiry checks
    pub fn new(secret: &[u8], max_ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            max_ttl,
            clock,
        }
    }

    pub fn max_ttl(&self) -> Duration {
        self.max_ttl
    }

    /// Lifetime actually granted for a requested one.
    ///
    /// Requests shorter than one second or longer than the maximum get the
    /// maximum.
    pub fn effective_ttl(&self, requested: Duration) -> Duration {
        if requested.num_seconds() <= 0 || requested > self.max_ttl {
            self.max_ttl
        } else {
            requested
        }
    }

    /// Issue a signed token asserting `user_id`.
    ///
    /// # Errors
    /// * `SigningFailed` - Token encoding failed
    pub fn issue(&self, user_id: &UserId, ttl: Duration) -> Result<String, AccessTokenError> {
        let claims =
            AccessTokenClaims::for_user(user_id, self.clock.now(), self.effective_ttl(ttl));

        encode(&Header::new(ALGORITHM), &claims, &self.encoding_key)
            .map_err(|e| AccessTokenError::SigningFailed(e.to_string()))
    }

    /// Verify a token and return the user it was issued to.
    ///
    /// # Errors
    /// * `UnsupportedAlgorithm` - Header names any algorithm other than HS256
    /// * `Malformed` - Token cannot be parsed, claims are missing, the issuer
    ///   is foreign or the subject is not a user ID
    /// * `BadSignature` - Signature does not verify under this secret
    /// * `Expired` - Current time is at or past `exp`
    pub fn verify(&self, token: &str) -> Result<UserId, AccessTokenError> {
        ensure_supported_algorithm(token)?;

        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.set_issuer(&[ISSUER]);

        let claims = decode::<AccessTokenClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AccessTokenError::BadSignature,
                ErrorKind::InvalidAlgorithm => {
                    AccessTokenError::UnsupportedAlgorithm("unknown".to_string())
                }
                _ => AccessTokenError::Malformed(e.to_string()),
            })?;

        if claims.is_expired(self.clock.now().timestamp()) {
            return Err(AccessTokenError::Expired);
        }

        UserId::from_string(&claims.sub).map_err(|e| AccessTokenError::Malformed(e.to_string()))
    }
}

/// Reject tokens whose header asks for anything but the pinned algorithm.
///
/// Done on the raw header so that names the JWT library cannot represent
/// (such as `none`) are reported as unsupported rather than unparseable.
fn ensure_supported_algorithm(token: &str) -> Result<(), AccessTokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(AccessTokenError::Malformed(format!(
            "expected 3 segments, found {}",
            segments.len()
        )));
    }

    let header = URL_SAFE_NO_PAD
        .decode(segments[0])
        .map_err(|e| AccessTokenError::Malformed(format!("header encoding: {e}")))?;
    let header: serde_json::Value = serde_json::from_slice(&header)
        .map_err(|e| AccessTokenError::Malformed(format!("header json: {e}")))?;

    match header.get("alg").and_then(serde_json::Value::as_str) {
        Some("HS256") => Ok(()),
        Some(other) => Err(AccessTokenError::UnsupportedAlgorithm(other.to_string())),
        None => Err(AccessTokenError::Malformed("header has no alg".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;
    use serde_json::json;

    use super::*;
    use crate::clock::ManualClock;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap(),
        ))
    }

    fn codec(secret: &[u8], clock: Arc<ManualClock>) -> AccessTokenCodec {
        AccessTokenCodec::new(secret, Duration::seconds(3600), clock)
    }

    fn segment(value: serde_json::Value) -> String {
        URL_SAFE_NO_PAD.encode(value.to_string())
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = codec(SECRET, clock());
        let user_id = UserId::new();

        let token = codec
            .issue(&user_id, Duration::seconds(60))
            .expect("Failed to issue token");

        assert_eq!(token.split('.').count(), 3);
        assert_eq!(codec.verify(&token), Ok(user_id));
    }

    #[test]
    fn test_expires_exactly_at_ttl() {
        let clock = clock();
        let codec = codec(SECRET, clock.clone());
        let user_id = UserId::new();

        let token = codec
            .issue(&user_id, Duration::seconds(60))
            .expect("Failed to issue token");

        clock.advance(Duration::seconds(59));
        assert_eq!(codec.verify(&token), Ok(user_id));

        clock.advance(Duration::seconds(1));
        assert_eq!(codec.verify(&token), Err(AccessTokenError::Expired));

        clock.advance(Duration::days(1));
        assert_eq!(codec.verify(&token), Err(AccessTokenError::Expired));
    }

    #[test]
    fn test_wrong_secret() {
        let clock = clock();
        let issuer = codec(b"secret1_at_least_32_bytes_long_key!", clock.clone());
        let verifier = codec(b"secret2_at_least_32_bytes_long_key!", clock);

        let token = issuer
            .issue(&UserId::new(), Duration::seconds(60))
            .expect("Failed to issue token");

        assert_eq!(verifier.verify(&token), Err(AccessTokenError::BadSignature));
    }

    #[test]
    fn test_tampered_claims() {
        let clock = clock();
        let codec = codec(SECRET, clock.clone());
        let token = codec
            .issue(&UserId::new(), Duration::seconds(60))
            .expect("Failed to issue token");

        let now = clock.now().timestamp();
        let forged_claims = segment(json!({
            "iss": ISSUER,
            "sub": UserId::new().to_string(),
            "iat": now,
            "exp": now + 60,
        }));
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_claims, parts[2]);

        assert_eq!(codec.verify(&forged), Err(AccessTokenError::BadSignature));
    }

    #[test]
    fn test_rejects_alg_none() {
        let clock = clock();
        let codec = codec(SECRET, clock.clone());
        let now = clock.now().timestamp();

        let token = format!(
            "{}.{}.",
            segment(json!({"alg": "none", "typ": "JWT"})),
            segment(json!({
                "iss": ISSUER,
                "sub": UserId::new().to_string(),
                "iat": now,
                "exp": now + 60,
            }))
        );

        assert_eq!(
            codec.verify(&token),
            Err(AccessTokenError::UnsupportedAlgorithm("none".to_string()))
        );
    }

    #[test]
    fn test_rejects_other_hmac_algorithm() {
        let clock = clock();
        let codec = codec(SECRET, clock.clone());
        let claims =
            AccessTokenClaims::for_user(&UserId::new(), clock.now(), Duration::seconds(60));

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        assert_eq!(
            codec.verify(&token),
            Err(AccessTokenError::UnsupportedAlgorithm("HS512".to_string()))
        );
    }

    #[test]
    fn test_malformed_tokens() {
        let codec = codec(SECRET, clock());

        for token in ["", "invalid", "invalid.token.here", "a.b", "a.b.c.d"] {
            assert!(
                matches!(codec.verify(token), Err(AccessTokenError::Malformed(_))),
                "expected malformed for {token:?}"
            );
        }
    }

    #[test]
    fn test_subject_must_be_user_id() {
        let clock = clock();
        let codec = codec(SECRET, clock.clone());
        let now = clock.now().timestamp();

        let token = encode(
            &Header::new(ALGORITHM),
            &json!({"iss": ISSUER, "sub": "not-a-uuid", "iat": now, "exp": now + 60}),
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        assert!(matches!(
            codec.verify(&token),
            Err(AccessTokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_expiry_claim() {
        let clock = clock();
        let codec = codec(SECRET, clock.clone());

        let token = encode(
            &Header::new(ALGORITHM),
            &json!({"iss": ISSUER, "sub": UserId::new().to_string(), "iat": 1}),
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        assert!(matches!(
            codec.verify(&token),
            Err(AccessTokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_foreign_issuer() {
        let clock = clock();
        let codec = codec(SECRET, clock.clone());
        let now = clock.now().timestamp();

        let token = encode(
            &Header::new(ALGORITHM),
            &json!({"iss": "someone-else", "sub": UserId::new().to_string(), "iat": now, "exp": now + 60}),
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token");

        assert!(matches!(
            codec.verify(&token),
            Err(AccessTokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_requested_ttl_is_clamped() {
        let codec = codec(SECRET, clock());

        assert_eq!(
            codec.effective_ttl(Duration::seconds(120)),
            Duration::seconds(120)
        );
        assert_eq!(
            codec.effective_ttl(Duration::seconds(3600)),
            Duration::seconds(3600)
        );
        assert_eq!(
            codec.effective_ttl(Duration::seconds(7200)),
            Duration::seconds(3600)
        );
        assert_eq!(codec.effective_ttl(Duration::zero()), Duration::seconds(3600));
        assert_eq!(
            codec.effective_ttl(Duration::seconds(-5)),
            Duration::seconds(3600)
        );
    }

    #[test]
    fn test_issued_token_carries_clamped_expiry() {
        let clock = clock();
        let codec = codec(SECRET, clock.clone());
        let user_id = UserId::new();

        let token = codec
            .issue(&user_id, Duration::days(2))
            .expect("Failed to issue token");

        clock.advance(Duration::seconds(3599));
        assert_eq!(codec.verify(&token), Ok(user_id));
        clock.advance(Duration::seconds(1));
        assert_eq!(codec.verify(&token), Err(AccessTokenError::Expired));
    }
}
