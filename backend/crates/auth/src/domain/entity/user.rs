//! User Entity

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;

use crate::domain::value_object::{display_name::DisplayName, email::Email};

/// User entity
///
/// Carries the password hash; anything leaving the service goes through
/// a summary DTO that omits it.
#[derive(Debug, Clone)]
pub struct User {
    /// Database-assigned identifier
    pub id: UserId,
    /// Display name
    pub name: DisplayName,
    /// Normalized email (unique)
    pub email: Email,
    /// Argon2id hash, PHC string
    pub password_hash: HashedPassword,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Update the display name
    pub fn set_name(&mut self, name: DisplayName) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    /// Update the email
    pub fn set_email(&mut self, email: Email) {
        self.email = email;
        self.updated_at = Utc::now();
    }

    /// Replace the password hash
    pub fn set_password_hash(&mut self, hash: HashedPassword) {
        self.password_hash = hash;
        self.updated_at = Utc::now();
    }
}

/// A user that has not been persisted yet
///
/// The id and timestamps are assigned by the database on insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: DisplayName,
    pub email: Email,
    pub password_hash: HashedPassword,
}
