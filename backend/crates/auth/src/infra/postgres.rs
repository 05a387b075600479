//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::id::UserId;
use platform::password::HashedPassword;
use sqlx::PgPool;

use crate::domain::entity::refresh_token::RefreshRecord;
use crate::domain::entity::user::{NewUser, User};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::domain::value_object::{display_name::DisplayName, email::Email};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired refresh records
    ///
    /// Run at startup; errors should not prevent the server from booting.
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = self.delete_expired().await?;

        tracing::info!(records_deleted = deleted, "Cleaned up expired refresh tokens");

        Ok(deleted)
    }
}

// ============================================================================
// Row types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        Ok(User {
            id: UserId::from_i64(self.id),
            name: DisplayName::from_db(self.name),
            email: Email::from_db(self.email),
            password_hash: HashedPassword::from_phc_string(self.password_hash)
                .map_err(|e| AuthError::Internal(format!("Corrupt password hash: {e}")))?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RefreshRow {
    token: String,
    user_id: i64,
    expires_at: DateTime<Utc>,
}

impl RefreshRow {
    fn into_record(self) -> RefreshRecord {
        RefreshRecord {
            token: self.token,
            user_id: UserId::from_i64(self.user_id),
            expires_at: self.expires_at,
        }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &NewUser) -> AuthResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            // Concurrent registration with the same email loses the race
            // at the unique index, not at the pre-check
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::EmailTaken,
            _ => AuthError::from(e),
        })?;

        row.into_user()
    }

    async fn find_by_id(&self, user_id: UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_i64())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, name, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET name = $2, email = $3, password_hash = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_i64())
        .bind(user.name.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::EmailTaken,
            _ => AuthError::from(e),
        })?;

        Ok(())
    }
}

// ============================================================================
// Refresh Token Repository Implementation
// ============================================================================

impl RefreshTokenRepository for PgAuthRepository {
    async fn create(&self, record: &RefreshRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&record.token)
        .bind(record.user_id.as_i64())
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<RefreshRecord>> {
        let row = sqlx::query_as::<_, RefreshRow>(
            r#"
            SELECT token, user_id, expires_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RefreshRow::into_record))
    }

    async fn replace(&self, old_token: &str, record: &RefreshRecord) -> AuthResult<()> {
        // Delete + insert in one transaction so rotation never leaves
        // zero or two live tokens behind
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(old_token)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (token, user_id, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(&record.token)
        .bind(record.user_id.as_i64())
        .bind(record.expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn delete_by_token(&self, token: &str) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}
