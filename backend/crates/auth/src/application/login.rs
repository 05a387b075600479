//! Login Use Case
//!
//! Authenticates a user and issues the access/refresh token pair.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::refresh_token::RefreshRecord;
use crate::domain::entity::user::User;
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};
use crate::token::{Claims, TokenCodec};

/// Login input
pub struct LoginInput {
    pub email: Email,
    pub password: ClearTextPassword,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
}

/// Login use case
pub struct LoginUseCase<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    user_repo: Arc<U>,
    refresh_repo: Arc<R>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U, R> LoginUseCase<U, R>
where
    U: UserRepository,
    R: RefreshTokenRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        refresh_repo: Arc<R>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            refresh_repo,
            codec,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        // Unknown email and wrong password take the same exit so the
        // response cannot be used to probe for accounts
        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !user.password_hash.verify(&input.password) {
            return Err(AuthError::InvalidCredentials);
        }

        let access_token = self.codec.sign(&Claims::access(
            user.id,
            user.email.as_str(),
            Some(user.name.as_str()),
            self.config.access_token_ttl,
        ))?;

        let refresh_token = self.codec.sign(&Claims::refresh(
            user.id,
            user.email.as_str(),
            self.config.refresh_token_ttl,
        ))?;

        // Mirror the token's own exp claim into the record so the two
        // expiries cannot drift
        let expires_at = self.record_expiry(&refresh_token)?;

        self.refresh_repo
            .create(&RefreshRecord::new(refresh_token.clone(), user.id, expires_at))
            .await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutput {
            user,
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
