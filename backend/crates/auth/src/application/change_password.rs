//! Change Password Use Case
//!
//! Unlike login, a wrong current password here gets its own message:
//! the caller is already authenticated, so there is nothing to
//! enumerate.

use std::sync::Arc;

use kernel::id::UserId;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::error::{AuthError, AuthResult};

/// Change password input
pub struct ChangePasswordInput {
    /// Current password, policy-exempt (it was stored under whatever
    /// rules applied at the time)
    pub current_password: ClearTextPassword,
    /// New password, already policy-checked
    pub new_password: ClearTextPassword,
}

/// Change password use case
pub struct ChangePasswordUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> ChangePasswordUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, user_id: UserId, input: ChangePasswordInput) -> AuthResult<()> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.password_hash.verify(&input.current_password) {
            tracing::warn!(user_id = %user.id, "Password change with wrong current password");
            return Err(AuthError::WrongPassword);
        }

        let new_hash = input
            .new_password
            .hash(self.config.hash_cost)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        user.set_password_hash(new_hash);
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "Password changed");

        Ok(())
    }
}
