//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::UserId;

use crate::domain::entity::{refresh_token::RefreshRecord, user::{NewUser, User}};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Persist a new user, returning the stored row
    ///
    /// A concurrent insert with the same email surfaces as
    /// [`crate::error::AuthError::EmailTaken`].
    async fn create(&self, user: &NewUser) -> AuthResult<User>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>>;

    /// Find user by normalized email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Update user (profile fields and/or password hash)
    async fn update(&self, user: &User) -> AuthResult<()>;
}

/// Refresh record repository trait
#[trait_variant::make(RefreshTokenRepository: Send)]
pub trait LocalRefreshTokenRepository {
    /// Persist a new refresh record
    async fn create(&self, record: &RefreshRecord) -> AuthResult<()>;

    /// Find a record by its exact token string
    async fn find_by_token(&self, token: &str) -> AuthResult<Option<RefreshRecord>>;

    /// Atomically replace one record with another (rotation)
    async fn replace(&self, old_token: &str, record: &RefreshRecord) -> AuthResult<()>;

    /// Delete record(s) matching a token string
    ///
    /// Returns the number of rows deleted; zero is not an error.
    async fn delete_by_token(&self, token: &str) -> AuthResult<u64>;

    /// Delete all records whose stored expiry has passed
    async fn delete_expired(&self) -> AuthResult<u64>;
}
