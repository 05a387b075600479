//! Register Use Case
//!
//! Creates a new user account.

use std::sync::Arc;

use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{display_name::DisplayName, email::Email};
use crate::error::{AuthError, AuthResult};

/// Register input (already validated at the presentation boundary)
pub struct RegisterInput {
    pub name: DisplayName,
    pub email: Email,
    pub password: ClearTextPassword,
}

/// Register use case
pub struct RegisterUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> RegisterUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<User> {
        // Pre-check for a friendly conflict error; the unique index
        // still backstops concurrent registrations
        if self.user_repo.exists_by_email(&input.email).await? {
            tracing::warn!(email = %input.email, "Registration with taken email");
            return Err(AuthError::EmailTaken);
        }

        let password_hash = input
            .password
            .hash(self.config.hash_cost)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let user = self
            .user_repo
            .create(&NewUser {
                name: input.name,
                email: input.email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");

        Ok(user)
    }
}
