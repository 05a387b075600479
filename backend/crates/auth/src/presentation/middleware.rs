//! Auth Middleware
//!
//! Gates protected routes on a bearer access token. Stateless with
//! respect to the token itself - only the user row is looked up, to
//! catch accounts deleted after issuance.

use axum::body::Body;
use axum::extract::State;
use axum::http::{Request, header};
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::error::AuthError;
use crate::token::TokenCodec;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState<U>
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<U>,
    pub codec: Arc<TokenCodec>,
}

/// The authenticated user, attached to the request for handlers
#[derive(Clone)]
pub struct CurrentUser(pub User);

/// Middleware that requires a valid bearer access token
///
/// Failure modes are machine-distinguishable by the response detail:
/// missing/odd header, expired token, invalid token - all 401.
pub async fn require_auth<U>(
    State(state): State<AuthMiddlewareState<U>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError>
where
    U: UserRepository + Clone + Send + Sync + 'static,
{
    let token = bearer_token(&req).ok_or(AuthError::TokenRequired)?;

    let claims = state.codec.verify(token)?;

    // A valid token for a vanished account is an auth failure, not a 404
    let user = state
        .repo
        .find_by_id(claims.subject())
        .await?
        .ok_or(AuthError::PrincipalGone)?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

fn bearer_token(req: &Request<Body>) -> Option<&str> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")?;

    if token.is_empty() { None } else { Some(token) }
}
