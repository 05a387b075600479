//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::IntoResponse;
use axum::Extension;
use std::sync::Arc;

use crate::application::config::{AuthConfig, REFRESH_COOKIE_NAME};
use crate::application::{
    ChangePasswordUseCase, CurrentUserUseCase, LoginUseCase, LogoutUseCase, RefreshUseCase,
    RegisterUseCase, UpdateProfileUseCase,
};
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChangePasswordRequest, LoginRequest, LoginResponse, MessageResponse, RefreshResponse,
    RegisterRequest, UpdateProfileRequest, UserResponse,
};
use crate::presentation::middleware::CurrentUser;
use crate::presentation::validate;
use crate::token::TokenCodec;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub codec: Arc<TokenCodec>,
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let input = validate::register(req)?;

    let use_case = RegisterUseCase::new(state.repo.clone(), state.config.clone());
    let user = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R>(
    State(state): State<AuthAppState<R>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let input = validate::login(req)?;

    let use_case = LoginUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(input).await?;

    // The refresh token rides out twice: in the body for clients that
    // manage tokens explicitly, and as an HttpOnly cookie for browsers
    let cookie = state
        .config
        .refresh_cookie()
        .build_set_cookie(&output.refresh_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            user: UserResponse::from(&output.user),
            access_token: output.access_token,
            refresh_token: output.refresh_token,
        }),
    ))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
///
/// Cookie-driven: the browser sends the refresh cookie automatically,
/// no bearer token is required (the access token is typically expired
/// when this is called).
pub async fn refresh<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let presented = platform::cookie::extract_cookie(&headers, REFRESH_COOKIE_NAME)
        .ok_or(AuthError::RefreshRejected("No refresh token provided"))?;

    let use_case = RefreshUseCase::new(state.repo.clone(), state.codec.clone(), state.config.clone());
    let output = use_case.execute(&presented).await?;

    // Rotation: the replacement refresh token goes back out in the cookie
    let cookie = state
        .config
        .refresh_cookie()
        .build_set_cookie(&output.refresh_token);

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(RefreshResponse {
            access_token: output.access_token,
        }),
    ))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /api/auth/me
pub async fn me<R>(
    State(state): State<AuthAppState<R>>,
    Extension(current): Extension<CurrentUser>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let use_case = CurrentUserUseCase::new(state.repo.clone());
    let user = use_case.execute(current.0.id).await?;

    Ok(Json(UserResponse::from(&user)))
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    Extension(current): Extension<CurrentUser>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let presented = platform::cookie::extract_cookie(&headers, REFRESH_COOKIE_NAME);

    let use_case = LogoutUseCase::new(state.repo.clone());
    use_case.execute(presented.as_deref()).await?;

    tracing::debug!(user_id = %current.0.id, "Logout completed");

    let cookie = state.config.refresh_cookie().build_delete_cookie();

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(MessageResponse {
            message: "Logout successful",
        }),
    ))
}

// ============================================================================
// Change Password
// ============================================================================

/// POST /api/auth/change-password
pub async fn change_password<R>(
    State(state): State<AuthAppState<R>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let input = validate::change_password(req)?;

    let use_case = ChangePasswordUseCase::new(state.repo.clone(), state.config.clone());
    use_case.execute(current.0.id, input).await?;

    Ok(Json(MessageResponse {
        message: "Password changed successfully",
    }))
}

// ============================================================================
// Profile
// ============================================================================

/// GET /api/users/profile
pub async fn get_profile<R>(
    State(state): State<AuthAppState<R>>,
    Extension(current): Extension<CurrentUser>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let use_case = CurrentUserUseCase::new(state.repo.clone());
    let user = use_case.execute(current.0.id).await?;

    Ok(Json(UserResponse::from(&user)))
}

/// PUT /api/users/profile
pub async fn update_profile<R>(
    State(state): State<AuthAppState<R>>,
    Extension(current): Extension<CurrentUser>,
    Json(req): Json<UpdateProfileRequest>,
) -> AuthResult<Json<UserResponse>>
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let input = validate::update_profile(req)?;

    let use_case = UpdateProfileUseCase::new(state.repo.clone());
    let user = use_case.execute(current.0.id, input).await?;

    Ok(Json(UserResponse::from(&user)))
}
