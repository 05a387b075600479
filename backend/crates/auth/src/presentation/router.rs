//! Auth Router

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{RefreshTokenRepository, UserRepository};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_auth};
use crate::token::TokenCodec;

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    auth_router_generic(repo, config)
}

/// Create the user-profile router with PostgreSQL repository
pub fn user_router(repo: PgAuthRepository, config: AuthConfig) -> Router {
    user_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let (state, mw_state) = build_state(repo, config);

    // me, logout and change-password require a bearer token;
    // register/login/refresh are reachable without one
    let protected = Router::new()
        .route("/me", get(handlers::me::<R>))
        .route("/logout", post(handlers::logout::<R>))
        .route("/change-password", post(handlers::change_password::<R>))
        .route_layer(middleware::from_fn_with_state(mw_state, require_auth::<R>));

    Router::new()
        .route("/register", post(handlers::register::<R>))
        .route("/login", post(handlers::login::<R>))
        .route("/refresh", post(handlers::refresh::<R>))
        .merge(protected)
        .with_state(state)
}

/// Create a generic user-profile router for any repository implementation
pub fn user_router_generic<R>(repo: R, config: AuthConfig) -> Router
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let (state, mw_state) = build_state(repo, config);

    Router::new()
        .route(
            "/profile",
            get(handlers::get_profile::<R>).put(handlers::update_profile::<R>),
        )
        .route_layer(middleware::from_fn_with_state(mw_state, require_auth::<R>))
        .with_state(state)
}

fn build_state<R>(repo: R, config: AuthConfig) -> (AuthAppState<R>, AuthMiddlewareState<R>)
where
    R: UserRepository + RefreshTokenRepository + Clone + Send + Sync + 'static,
{
    let codec = Arc::new(TokenCodec::new(&config.token_secret));
    let repo = Arc::new(repo);

    let state = AuthAppState {
        repo: repo.clone(),
        config: Arc::new(config),
        codec: codec.clone(),
    };

    let mw_state = AuthMiddlewareState { repo, codec };

    (state, mw_state)
}
