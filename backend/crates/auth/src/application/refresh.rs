//! Refresh Use Case
//!
//! Exchanges a valid refresh token for a fresh access token, rotating
//! the refresh token in the same step.
//!
//! Two checkpoints must both pass, in order:
//! 1. the presented token string exists in the store and its stored
//!    expiry is not past;
//! 2. the token passes cryptographic verification and its type claim is
//!    `refresh` - an access token is never accepted here.
//!
//! Rotation means a leaked refresh token stops working the moment its
//! legitimate holder refreshes: the old record is deleted and a new one
//! inserted in one operation.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::domain::entity::refresh_token::RefreshRecord;
use crate::domain::repository::RefreshTokenRepository;
use crate::error::{AuthError, AuthResult};
use crate::token::{Claims, TokenCodec, TokenType};

/// Refresh output
#[derive(Debug)]
pub struct RefreshOutput {
    /// Newly minted access token
    pub access_token: String,
    /// Rotated refresh token (goes back out in the cookie)
    pub refresh_token: String,
}

/// Refresh use case
pub struct RefreshUseCase<R>
where
    R: RefreshTokenRepository,
{
    refresh_repo: Arc<R>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<R> RefreshUseCase<R>
where
    R: RefreshTokenRepository,
{
    pub fn new(refresh_repo: Arc<R>, codec: Arc<TokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            refresh_repo,
            codec,
            config,
        }
    }

    pub async fn execute(&self, presented: &str) -> AuthResult<RefreshOutput> {
        // Checkpoint 1: persisted record, unexpired
        let record = self
            .refresh_repo
            .find_by_token(presented)
            .await?
            .ok_or(AuthError::RefreshRejected("Invalid or expired refresh token"))?;

        if record.is_expired() {
            return Err(AuthError::RefreshRejected("Invalid or expired refresh token"));
        }

        // Checkpoint 2: signature, issuer, audience, expiry, type
        let claims = self
            .codec
            .verify(presented)
            .map_err(|_| AuthError::RefreshRejected("Invalid refresh token"))?;

        if claims.token_type != TokenType::Refresh {
            return Err(AuthError::RefreshRejected("Invalid refresh token type"));
        }

        // Mint the new access token from the refresh token's embedded
        // identity claims - no user lookup on this path
        let access_token = self.codec.sign(&Claims::access(
            claims.subject(),
            &claims.email,
            claims.name.as_deref(),
            self.config.access_token_ttl,
        ))?;

        // Rotate: replace the record, full TTL restarts
        let refresh_token = self.codec.sign(&Claims::refresh(
            claims.subject(),
            &claims.email,
            self.config.refresh_token_ttl,
        ))?;

        let expires_at = self.record_expiry(&refresh_token)?;

        self.refresh_repo
            .replace(
                presented,
                &RefreshRecord::new(refresh_token.clone(), claims.subject(), expires_at),
            )
            .await?;

        tracing::debug!(user_id = %claims.subject(), "Access token refreshed");

        Ok(RefreshOutput {
            access_token,
            refresh_token,
        })
    }

    fn record_expiry(&self, refresh_token: &str) -> AuthResult<DateTime<Utc>> {
        let exp = self
            .codec
            .decode_unverified(refresh_token)
            .map(|claims| claims.exp)
            .ok_or_else(|| AuthError::Internal("Issued refresh token is unreadable".to_string()))?;

        DateTime::<Utc>::from_timestamp(exp, 0)
            .ok_or_else(|| AuthError::Internal("Refresh token exp out of range".to_string()))
    }
}
