//! Logout Use Case
//!
//! Deletes the refresh record(s) matching the presented token value.
//! Idempotent: a second logout with the same (now-deleted) cookie is
//! not an error, and a missing cookie is not an error either.

use std::sync::Arc;

use crate::domain::repository::RefreshTokenRepository;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<R>
where
    R: RefreshTokenRepository,
{
    refresh_repo: Arc<R>,
}

impl<R> LogoutUseCase<R>
where
    R: RefreshTokenRepository,
{
    pub fn new(refresh_repo: Arc<R>) -> Self {
        Self { refresh_repo }
    }

    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<()> {
        if let Some(token) = refresh_token {
            let deleted = self.refresh_repo.delete_by_token(token).await?;
            tracing::info!(records_deleted = deleted, "User logged out");
        }

        Ok(())
    }
}
