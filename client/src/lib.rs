//! API Client
//!
//! The client half of the session protocol:
//! - attaches the cached access token as a bearer header
//! - on a single authorization failure, refreshes once and replays the
//!   original request once - never recursively
//! - coalesces concurrent refreshes behind a single-flight gate
//! - hydrates on startup by exchanging the refresh cookie for a fresh
//!   access token, unless the user just explicitly logged out
//!
//! The refresh token itself is never touched here: it lives in an
//! HttpOnly cookie managed by the HTTP stack's cookie store, exactly
//! like a browser.

pub mod dto;
pub mod error;
pub mod token;

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::dto::{LoginResponse, ProblemBody, RefreshResponse, UserProfile};
use crate::error::ClientError;
use crate::token::TokenCache;

/// API client with credential attachment and refresh-once recovery
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    cache: TokenCache,
    /// Single-flight gate: concurrent 401s share one refresh
    refresh_gate: tokio::sync::Mutex<()>,
    /// One-shot flag set by logout, consumed by the next hydrate
    skip_next_hydration: AtomicBool,
}

impl ApiClient {
    /// Create a client for the given API base URL
    /// (e.g. `http://localhost:3333/api/`)
    pub fn new(mut base_url: Url) -> Result<Self, ClientError> {
        // Url::join treats a path without a trailing slash as a file;
        // normalize so "auth/login" lands under the base path
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let http = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            http,
            base_url,
            cache: TokenCache::new(),
            refresh_gate: tokio::sync::Mutex::new(()),
            skip_next_hydration: AtomicBool::new(false),
        })
    }

    /// The in-memory access token cache
    pub fn token_cache(&self) -> &TokenCache {
        &self.cache
    }

    // ========================================================================
    // Auth operations
    // ========================================================================

    /// Register a new account
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<UserProfile, ClientError> {
        let response = self
            .dispatch(
                Method::POST,
                "auth/register",
                Some(&json!({
                    "name": name,
                    "email": email,
                    "password": password,
                    "confirmPassword": confirm_password,
                })),
                None,
            )
            .await?;

        Self::expect_json(response).await
    }

    /// Log in and cache the returned access token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let response = self
            .dispatch(
                Method::POST,
                "auth/login",
                Some(&json!({ "email": email, "password": password })),
                None,
            )
            .await?;

        let body: LoginResponse = Self::expect_json(response).await?;

        self.cache.set(&body.access_token);
        self.skip_next_hydration.store(false, Ordering::SeqCst);

        Ok(body)
    }

    /// Log out: invalidate the server-side record, clear local state,
    /// and suppress the next hydration attempt
    ///
    /// Never goes through the retry path - a 401 here must not trigger
    /// a refresh of the session being torn down.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let token = self.cache.get();
        let response = self
            .dispatch(Method::POST, "auth/logout", None, token.as_deref())
            .await?;

        let _: Value = Self::expect_json(response).await?;

        self.skip_next_hydration.store(true, Ordering::SeqCst);
        self.cache.clear();

        Ok(())
    }

    /// Current user via `GET /api/auth/me` (intercepted)
    pub async fn me(&self) -> Result<UserProfile, ClientError> {
        let response = self.send(Method::GET, "auth/me", None).await?;
        Self::expect_json(response).await
    }

    /// Current profile via `GET /api/users/profile` (intercepted)
    pub async fn profile(&self) -> Result<UserProfile, ClientError> {
        let response = self.send(Method::GET, "users/profile", None).await?;
        Self::expect_json(response).await
    }

    /// Generic token-bearing GET for domain resources (intercepted)
    pub async fn get(&self, path: &str) -> Result<Value, ClientError> {
        let response = self.send(Method::GET, path, None).await?;
        Self::expect_json(response).await
    }

    /// Generic token-bearing POST for domain resources (intercepted)
    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ClientError> {
        let response = self.send(Method::POST, path, Some(body)).await?;
        Self::expect_json(response).await
    }

    /// Startup hydration: silently turn the refresh cookie into an
    /// access token and the current user
    ///
    /// Returns `Ok(None)` when there is no session to recover - no or
    /// stale cookie, or hydration was suppressed by a just-completed
    /// logout. Transport failures still surface as errors.
    pub async fn hydrate(&self) -> Result<Option<UserProfile>, ClientError> {
        if self.skip_next_hydration.swap(false, Ordering::SeqCst) {
            tracing::debug!("Hydration suppressed after logout");
            return Ok(None);
        }

        match self.call_refresh().await {
            Ok(token) => {
                self.cache.set(&token);
                let user = self.me().await?;
                Ok(Some(user))
            }
            Err(ClientError::Api { .. }) => {
                // Expected when no cookie is present; keep quiet
                self.cache.clear();
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Interceptor
    // ========================================================================

    /// Send a request with the cached token attached; on a single 401,
    /// refresh once and replay once
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Response, ClientError> {
        let sent_with = self.cache.get();
        let response = self
            .dispatch(method.clone(), path, body.as_ref(), sent_with.as_deref())
            .await?;

        if response.status() != StatusCode::UNAUTHORIZED || Self::is_retry_exempt(path) {
            return Ok(response);
        }

        // Exactly one refresh-and-replay; a second 401 just comes back
        // to the caller
        let fresh = self.refresh_access_token(sent_with).await?;

        tracing::debug!(path, "Replaying request after refresh");
        self.dispatch(method, path, body.as_ref(), Some(&fresh)).await
    }

    /// Refresh and logout calls are never replayed: retrying them on
    /// 401 would loop
    fn is_retry_exempt(path: &str) -> bool {
        path.contains("auth/refresh") || path.contains("auth/logout")
    }

    /// Single-flight refresh: the caller that loses the race reuses the
    /// winner's token instead of issuing a duplicate call
    async fn refresh_access_token(&self, stale: Option<String>) -> Result<String, ClientError> {
        let _guard = self.refresh_gate.lock().await;

        // Someone else may have rotated the token while we waited
        if let Some(current) = self.cache.get() {
            if stale.as_ref() != Some(&current) {
                return Ok(current);
            }
        }

        match self.call_refresh().await {
            Ok(token) => {
                self.cache.set(&token);
                Ok(token)
            }
            Err(e) => {
                // Failed recovery ends the session locally
                self.cache.clear();
                Err(e)
            }
        }
    }

    /// `POST /api/auth/refresh` - the cookie store supplies the
    /// refresh token, no bearer header is attached
    async fn call_refresh(&self) -> Result<String, ClientError> {
        let response = self
            .dispatch(Method::POST, "auth/refresh", None, None)
            .await?;

        let body: RefreshResponse = Self::expect_json(response).await?;
        Ok(body.access_token)
    }

    // ========================================================================
    // Plumbing
    // ========================================================================

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        token: Option<&str>,
    ) -> Result<Response, ClientError> {
        let url = self.base_url.join(path)?;

        let mut request = self.http.request(method, url);

        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        Ok(request.send().await?)
    }

    async fn expect_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<ProblemBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = ApiClient::new(Url::parse("http://localhost:3333/api").unwrap()).unwrap();
        assert_eq!(
            client.base_url.join("auth/login").unwrap().as_str(),
            "http://localhost:3333/api/auth/login"
        );
    }

    #[test]
    fn test_retry_exemptions() {
        assert!(ApiClient::is_retry_exempt("auth/refresh"));
        assert!(ApiClient::is_retry_exempt("auth/logout"));
        assert!(!ApiClient::is_retry_exempt("auth/me"));
        assert!(!ApiClient::is_retry_exempt("users/profile"));
        assert!(!ApiClient::is_retry_exempt("journals"));
    }
}
