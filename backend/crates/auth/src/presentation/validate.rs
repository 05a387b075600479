//! Request Body Validation
//!
//! Checks every field and collects all failures into one map, so the
//! client gets the complete picture in a single 422 instead of fixing
//! errors one at a time.

use std::collections::BTreeMap;

use platform::password::ClearTextPassword;

use crate::application::change_password::ChangePasswordInput;
use crate::application::login::LoginInput;
use crate::application::register::RegisterInput;
use crate::application::update_profile::UpdateProfileInput;
use crate::domain::value_object::{display_name::DisplayName, email::Email};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
};

type FieldErrors = BTreeMap<String, String>;

fn fail_if_any<T>(errors: FieldErrors, ok: T) -> AuthResult<T> {
    if errors.is_empty() {
        Ok(ok)
    } else {
        Err(AuthError::Validation(errors))
    }
}

/// Validate a register request into typed use-case input
pub fn register(req: RegisterRequest) -> AuthResult<RegisterInput> {
    let mut errors = FieldErrors::new();

    let name = DisplayName::new(req.name)
        .map_err(|e| errors.insert("name".into(), e.message().to_string()))
        .ok();

    let email = Email::new(req.email)
        .map_err(|e| errors.insert("email".into(), e.message().to_string()))
        .ok();

    if req.confirm_password.is_empty() {
        errors.insert(
            "confirmPassword".into(),
            "Confirm password is required".into(),
        );
    } else if req.confirm_password != req.password {
        errors.insert("confirmPassword".into(), "Passwords must match".into());
    }

    let password = ClearTextPassword::new(req.password)
        .map_err(|e| errors.insert("password".into(), e.to_string()))
        .ok();

    match (name, email, password) {
        (Some(name), Some(email), Some(password)) => fail_if_any(
            errors,
            RegisterInput {
                name,
                email,
                password,
            },
        ),
        _ => Err(AuthError::Validation(errors)),
    }
}

/// Validate a login request into typed use-case input
///
/// Login only checks shape (valid email, non-empty password); the
/// stored-password policy never applies here.
pub fn login(req: LoginRequest) -> AuthResult<LoginInput> {
    let mut errors = FieldErrors::new();

    let email = Email::new(req.email)
        .map_err(|e| errors.insert("email".into(), e.message().to_string()))
        .ok();

    if req.password.is_empty() {
        errors.insert("password".into(), "Password is required".into());
    }

    match email {
        Some(email) if errors.is_empty() => Ok(LoginInput {
            email,
            password: ClearTextPassword::for_verification(req.password),
        }),
        _ => Err(AuthError::Validation(errors)),
    }
}

/// Validate an update-profile request into typed use-case input
pub fn update_profile(req: UpdateProfileRequest) -> AuthResult<UpdateProfileInput> {
    let mut errors = FieldErrors::new();

    let name = match req.name {
        Some(raw) => DisplayName::new(raw)
            .map_err(|e| errors.insert("name".into(), e.message().to_string()))
            .ok(),
        None => None,
    };

    let email = match req.email {
        Some(raw) => Email::new(raw)
            .map_err(|e| errors.insert("email".into(), e.message().to_string()))
            .ok(),
        None => None,
    };

    fail_if_any(errors, UpdateProfileInput { name, email })
}

/// Validate a change-password request into typed use-case input
pub fn change_password(req: ChangePasswordRequest) -> AuthResult<ChangePasswordInput> {
    let mut errors = FieldErrors::new();

    if req.current_password.is_empty() {
        errors.insert(
            "currentPassword".into(),
            "Current password is required".into(),
        );
    }

    if req.confirm_password.is_empty() {
        errors.insert(
            "confirmPassword".into(),
            "Confirm password is required".into(),
        );
    } else if req.confirm_password != req.new_password {
        errors.insert("confirmPassword".into(), "Passwords must match".into());
    }

    let new_password = ClearTextPassword::new(req.new_password)
        .map_err(|e| errors.insert("newPassword".into(), e.to_string()))
        .ok();

    match new_password {
        Some(new_password) if errors.is_empty() => Ok(ChangePasswordInput {
            current_password: ClearTextPassword::for_verification(req.current_password),
            new_password,
        }),
        _ => Err(AuthError::Validation(errors)),
    }
}
