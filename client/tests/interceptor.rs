//! Interceptor behavior tests
//!
//! Drive the client against a real axum server on an ephemeral port and
//! count what actually hits the wire: exactly one refresh and one
//! replay per authorization failure, no loops on the refresh/logout
//! paths, and one shared refresh under concurrency.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use url::Url;

use client::ApiClient;

const FRESH: &str = "fresh-access-token";

#[derive(Clone)]
struct ServerState {
    refresh_calls: Arc<AtomicUsize>,
    protected_calls: Arc<AtomicUsize>,
    /// Whether the refresh endpoint succeeds
    refresh_ok: bool,
    /// Bearer value the protected endpoints accept
    accepted_token: &'static str,
    /// Artificial latency on refresh, to widen race windows
    refresh_delay: Option<Duration>,
}

impl Default for ServerState {
    fn default() -> Self {
        Self {
            refresh_calls: Arc::new(AtomicUsize::new(0)),
            protected_calls: Arc::new(AtomicUsize::new(0)),
            refresh_ok: true,
            accepted_token: FRESH,
            refresh_delay: None,
        }
    }
}

fn problem(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

fn profile_body() -> Json<serde_json::Value> {
    Json(json!({ "id": 1, "name": "alice", "email": "alice@example.com" }))
}

async fn refresh(State(state): State<ServerState>) -> Response {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    if let Some(delay) = state.refresh_delay {
        tokio::time::sleep(delay).await;
    }

    if state.refresh_ok {
        Json(json!({ "accessToken": FRESH })).into_response()
    } else {
        problem(StatusCode::UNAUTHORIZED, "Invalid or expired refresh token")
    }
}

async fn protected(State(state): State<ServerState>, headers: HeaderMap) -> Response {
    state.protected_calls.fetch_add(1, Ordering::SeqCst);

    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {}", state.accepted_token));

    if authorized {
        profile_body().into_response()
    } else {
        problem(StatusCode::UNAUTHORIZED, "Token has expired")
    }
}

async fn login() -> Response {
    Json(json!({
        "user": { "id": 1, "name": "alice", "email": "alice@example.com" },
        "accessToken": FRESH,
        "refreshToken": "refresh-token",
    }))
    .into_response()
}

async fn logout() -> Response {
    Json(json!({ "message": "Logout successful" })).into_response()
}

async fn spawn_server(state: ServerState) -> SocketAddr {
    let app = Router::new()
        .route("/api/auth/refresh", post(refresh))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(protected))
        .route("/api/users/profile", get(protected))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

fn client_for(addr: SocketAddr) -> ApiClient {
    ApiClient::new(Url::parse(&format!("http://{addr}/api/")).unwrap()).unwrap()
}

#[tokio::test]
async fn one_refresh_and_one_replay_on_401() {
    let state = ServerState::default();
    let refresh_calls = state.refresh_calls.clone();
    let protected_calls = state.protected_calls.clone();

    let addr = spawn_server(state).await;
    let client = client_for(addr);
    client.token_cache().set("stale-access-token");

    let profile = client.profile().await.unwrap();
    assert_eq!(profile.email, "alice@example.com");

    // One failed attempt, one refresh, one successful replay
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(protected_calls.load(Ordering::SeqCst), 2);
    assert_eq!(client.token_cache().get().as_deref(), Some(FRESH));
}

#[tokio::test]
async fn second_401_after_replay_does_not_refresh_again() {
    let state = ServerState {
        // Nothing the client can present will ever be accepted
        accepted_token: "token-nobody-has",
        ..Default::default()
    };
    let refresh_calls = state.refresh_calls.clone();
    let protected_calls = state.protected_calls.clone();

    let addr = spawn_server(state).await;
    let client = client_for(addr);
    client.token_cache().set("stale-access-token");

    let err = client.profile().await.unwrap_err();
    assert!(err.is_unauthorized());

    // One refresh, one replay, then give up - never recurse
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(protected_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn failed_refresh_clears_cache_and_propagates() {
    let state = ServerState {
        refresh_ok: false,
        ..Default::default()
    };
    let refresh_calls = state.refresh_calls.clone();
    let protected_calls = state.protected_calls.clone();

    let addr = spawn_server(state).await;
    let client = client_for(addr);
    client.token_cache().set("stale-access-token");

    let err = client.profile().await.unwrap_err();
    assert!(err.is_unauthorized());

    // No replay after a failed refresh, and the cache is gone
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(protected_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.token_cache().get(), None);
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    let state = ServerState {
        refresh_delay: Some(Duration::from_millis(100)),
        ..Default::default()
    };
    let refresh_calls = state.refresh_calls.clone();
    let protected_calls = state.protected_calls.clone();

    let addr = spawn_server(state).await;
    let client = Arc::new(client_for(addr));
    client.token_cache().set("stale-access-token");

    let (a, b) = tokio::join!(client.profile(), client.profile());
    assert!(a.is_ok());
    assert!(b.is_ok());

    // Two failures, one shared refresh, two replays
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(protected_calls.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn hydrate_recovers_a_session_from_the_cookie() {
    let state = ServerState::default();
    let refresh_calls = state.refresh_calls.clone();

    let addr = spawn_server(state).await;
    let client = client_for(addr);

    // Cold start: empty cache, hydration fills it
    assert_eq!(client.token_cache().get(), None);
    let user = client.hydrate().await.unwrap().expect("session expected");
    assert_eq!(user.name, "alice");
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.token_cache().get().as_deref(), Some(FRESH));
}

#[tokio::test]
async fn hydrate_gives_up_quietly_without_a_session() {
    let state = ServerState {
        refresh_ok: false,
        ..Default::default()
    };
    let refresh_calls = state.refresh_calls.clone();

    let addr = spawn_server(state).await;
    let client = client_for(addr);

    // The refresh endpoint 401s and is never retried
    let user = client.hydrate().await.unwrap();
    assert!(user.is_none());
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
    assert_eq!(client.token_cache().get(), None);
}

#[tokio::test]
async fn logout_suppresses_exactly_one_hydration() {
    let state = ServerState::default();
    let refresh_calls = state.refresh_calls.clone();

    let addr = spawn_server(state).await;
    let client = client_for(addr);

    client.login("alice@example.com", "Password123!").await.unwrap();
    assert_eq!(client.token_cache().get().as_deref(), Some(FRESH));

    client.logout().await.unwrap();
    assert_eq!(client.token_cache().get(), None);

    // First hydrate after logout: suppressed, no network traffic
    let user = client.hydrate().await.unwrap();
    assert!(user.is_none());
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 0);

    // The flag is one-shot: the next hydrate proceeds normally
    let user = client.hydrate().await.unwrap();
    assert!(user.is_some());
    assert_eq!(refresh_calls.load(Ordering::SeqCst), 1);
}
