//! Token Codec
//!
//! Signs and verifies the JWTs this service issues. Tokens are
//! self-contained: subject id, denormalized display fields, a type
//! discriminator, fixed issuer/audience markers and an expiry.
//!
//! Verification checks signature, issuer, audience and expiry together,
//! with zero leeway. An expired-but-authentic token is reported
//! differently from every other failure because the two produce
//! different client-facing messages.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use kernel::id::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::AuthError;

/// Issuer marker embedded in and required of every token
pub const ISSUER: &str = "parapraxis-api";

/// Audience marker embedded in and required of every token
pub const AUDIENCE: &str = "parapraxis-app";

/// Token type discriminator
///
/// An access token must never be accepted where a refresh token is
/// expected, and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Token codec errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Signature is valid but the expiry has passed
    #[error("token has expired")]
    Expired,

    /// Any other verification failure: bad signature, wrong
    /// issuer/audience, malformed structure
    #[error("invalid token")]
    Invalid,

    /// Signing failed
    #[error("token generation failed: {0}")]
    Creation(String),
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AuthError::TokenExpired,
            TokenError::Invalid => AuthError::TokenInvalid,
            TokenError::Creation(msg) => AuthError::Internal(msg),
        }
    }
}

/// Claims carried by every token
///
/// `email` and `name` are denormalized for client convenience and are
/// not authoritative - the user row is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: numeric user id
    pub sub: i64,
    /// Denormalized email
    pub email: String,
    /// Denormalized display name (access tokens only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Type discriminator
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issuer marker
    pub iss: String,
    /// Audience marker
    pub aud: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiry (unix seconds)
    pub exp: i64,
}

impl Claims {
    fn base(
        user_id: UserId,
        email: &str,
        name: Option<&str>,
        token_type: TokenType,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.as_i64(),
            email: email.to_string(),
            name: name.map(str::to_string),
            token_type,
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
        }
    }

    /// Claims for a short-lived access token
    pub fn access(user_id: UserId, email: &str, name: Option<&str>, ttl: Duration) -> Self {
        Self::base(user_id, email, name, TokenType::Access, ttl)
    }

    /// Claims for a long-lived refresh token (no display name)
    pub fn refresh(user_id: UserId, email: &str, ttl: Duration) -> Self {
        Self::base(user_id, email, None, TokenType::Refresh, ttl)
    }

    /// The subject as a typed id
    pub fn subject(&self) -> UserId {
        UserId::from_i64(self.sub)
    }
}

/// Signs and verifies tokens with a single shared secret
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Build a codec from the shared secret
    ///
    /// The secret itself is a startup precondition; the binary refuses
    /// to boot without one, so an empty slice never reaches this point
    /// in a configured deployment.
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "iss", "aud"]);
        // Zero leeway: a token is expired the second its exp passes
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign claims into a compact token
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| TokenError::Creation(e.to_string()))
    }

    /// Verify signature, issuer, audience and expiry together
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }

    /// Read claims without any verification
    ///
    /// Only for mirroring the `exp` claim into the refresh record at
    /// issuance. Never an authorization decision.
    pub fn decode_unverified(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(3600);

    fn codec() -> TokenCodec {
        TokenCodec::new(b"test-secret")
    }

    fn user() -> UserId {
        UserId::from_i64(1)
    }

    #[test]
    fn test_sign_and_verify_roundtrip() {
        let codec = codec();
        let claims = Claims::access(user(), "alice@example.com", Some("alice"), TTL);
        let token = codec.sign(&claims).unwrap();

        let verified = codec.verify(&token).unwrap();
        assert_eq!(verified.sub, 1);
        assert_eq!(verified.email, "alice@example.com");
        assert_eq!(verified.name.as_deref(), Some("alice"));
        assert_eq!(verified.token_type, TokenType::Access);
        assert_eq!(verified.iss, ISSUER);
        assert_eq!(verified.aud, AUDIENCE);
        assert_eq!(verified.exp, verified.iat + 3600);
    }

    #[test]
    fn test_refresh_claims_omit_name() {
        let codec = codec();
        let token = codec
            .sign(&Claims::refresh(user(), "alice@example.com", TTL))
            .unwrap();

        let verified = codec.verify(&token).unwrap();
        assert_eq!(verified.token_type, TokenType::Refresh);
        assert!(verified.name.is_none());
    }

    #[test]
    fn test_expired_token_is_distinguishable() {
        let codec = codec();
        let mut claims = Claims::access(user(), "alice@example.com", None, TTL);
        claims.exp = claims.iat - 10;

        let token = codec.sign(&claims).unwrap();
        assert_eq!(codec.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_wrong_secret_is_invalid_even_when_fresh() {
        let claims = Claims::access(user(), "alice@example.com", None, TTL);
        let token = TokenCodec::new(b"other-secret").sign(&claims).unwrap();

        assert_eq!(codec().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_wrong_secret_is_invalid_even_when_expired() {
        // A bad signature must not be reported as mere expiry
        let mut claims = Claims::access(user(), "alice@example.com", None, TTL);
        claims.exp = claims.iat - 10;
        let token = TokenCodec::new(b"other-secret").sign(&claims).unwrap();

        assert_eq!(codec().verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_wrong_issuer_or_audience_is_invalid() {
        let codec = codec();

        let mut claims = Claims::access(user(), "alice@example.com", None, TTL);
        claims.iss = "someone-else".to_string();
        let token = codec.sign(&claims).unwrap();
        assert_eq!(codec.verify(&token), Err(TokenError::Invalid));

        let mut claims = Claims::access(user(), "alice@example.com", None, TTL);
        claims.aud = "another-app".to_string();
        let token = codec.sign(&claims).unwrap();
        assert_eq!(codec.verify(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_tampered_payload_is_invalid() {
        let codec = codec();
        let token = codec
            .sign(&Claims::access(user(), "alice@example.com", None, TTL))
            .unwrap();

        // Swap the payload segment for a different (validly encoded) one
        let other = codec
            .sign(&Claims::access(UserId::from_i64(2), "mallory@example.com", None, TTL))
            .unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let tampered = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(codec.verify(&tampered), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(codec().verify("not-a-token"), Err(TokenError::Invalid));
        assert_eq!(codec().verify(""), Err(TokenError::Invalid));
    }

    #[test]
    fn test_decode_unverified_reads_expired_tokens() {
        let codec = codec();
        let mut claims = Claims::refresh(user(), "alice@example.com", TTL);
        claims.exp = claims.iat - 10;
        let token = codec.sign(&claims).unwrap();

        // verify() refuses it, decode_unverified() still reads exp
        assert!(codec.verify(&token).is_err());
        let decoded = codec.decode_unverified(&token).unwrap();
        assert_eq!(decoded.exp, claims.exp);
    }

    #[test]
    fn test_decode_unverified_rejects_garbage() {
        assert!(codec().decode_unverified("garbage").is_none());
    }
}
