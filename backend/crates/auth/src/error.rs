//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Bad login credentials. Deliberately identical for unknown email
    /// and wrong password so responses cannot be used to enumerate
    /// accounts.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Email already registered
    #[error("Email already registered")]
    EmailTaken,

    /// Missing or unparseable Authorization header
    #[error("Authentication token required")]
    TokenRequired,

    /// Token signature is valid but the expiry has passed
    #[error("Token has expired")]
    TokenExpired,

    /// Token failed verification for any non-expiry reason
    #[error("Invalid token")]
    TokenInvalid,

    /// A valid token referenced an account that no longer exists
    #[error("User not found")]
    PrincipalGone,

    /// Refresh token rejected (missing cookie, unknown/expired record,
    /// or failed cryptographic check)
    #[error("{0}")]
    RefreshRejected(&'static str),

    /// User record not found
    #[error("User not found")]
    UserNotFound,

    /// Current password did not match during a password change
    #[error("Current password is incorrect")]
    WrongPassword,

    /// Request body failed validation; carries the per-field error map
    #[error("Validation failed")]
    Validation(BTreeMap<String, String>),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::TokenRequired
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::PrincipalGone
            | AuthError::RefreshRejected(_)
            | AuthError::WrongPassword => StatusCode::UNAUTHORIZED,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::TokenRequired
            | AuthError::TokenExpired
            | AuthError::TokenInvalid
            | AuthError::PrincipalGone
            | AuthError::RefreshRejected(_)
            | AuthError::WrongPassword => ErrorKind::Unauthorized,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Validation(_) => ErrorKind::UnprocessableEntity,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Validation(fields) => {
                AppError::new(self.kind(), "Validation failed").with_fields(fields.clone())
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RefreshRejected(reason) => {
                tracing::warn!(reason = %reason, "Refresh token rejected");
            }
            AuthError::PrincipalGone => {
                tracing::warn!("Token presented for a deleted account");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(AuthError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            AuthError::Validation(BTreeMap::new()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_token_failures_are_distinguishable() {
        // Same status, different detail - the client relies on the text
        assert_eq!(
            AuthError::TokenExpired.status_code(),
            AuthError::TokenInvalid.status_code()
        );
        assert_ne!(
            AuthError::TokenExpired.to_string(),
            AuthError::TokenInvalid.to_string()
        );
    }

    #[test]
    fn test_validation_carries_field_map() {
        let mut fields = BTreeMap::new();
        fields.insert("email".to_string(), "Please provide a valid email".to_string());

        let app_err = AuthError::Validation(fields).to_app_error();
        assert_eq!(app_err.status_code(), 422);
        assert!(app_err.fields().is_some_and(|f| f.contains_key("email")));
    }
}
