//! Update Profile Use Case
//!
//! Partial update of name and/or email. A changed email is re-checked
//! for uniqueness before the write.

use std::sync::Arc;

use kernel::id::UserId;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{display_name::DisplayName, email::Email};
use crate::error::{AuthError, AuthResult};

/// Update profile input (validated at the presentation boundary)
pub struct UpdateProfileInput {
    pub name: Option<DisplayName>,
    pub email: Option<Email>,
}

/// Update profile use case
pub struct UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
}

impl<U> UpdateProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>) -> Self {
        Self { user_repo }
    }

    pub async fn execute(&self, user_id: UserId, input: UpdateProfileInput) -> AuthResult<User> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if let Some(email) = input.email {
            // Only re-check uniqueness when the email actually changes;
            // a no-op update must not conflict with the user's own row
            if email != user.email {
                if self.user_repo.exists_by_email(&email).await? {
                    return Err(AuthError::EmailTaken);
                }
                user.set_email(email);
            }
        }

        if let Some(name) = input.name {
            user.set_name(name);
        }

        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user.id, "User profile updated");

        Ok(user)
    }
}
