//! Application Configuration
//!
//! Configuration for the Auth application layer. All durations are
//! deployment tunables; the defaults mirror the production deployment
//! (7-day access tokens, 30-day refresh tokens).

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::password::HashCost;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Name of the refresh token cookie
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Shared signing secret for the token codec
    ///
    /// A startup precondition: the binary refuses to boot without it.
    pub token_secret: Vec<u8>,
    /// Access token TTL (short-lived, stateless)
    pub access_token_ttl: Duration,
    /// Refresh token TTL (long-lived, mirrored server-side)
    pub refresh_token_ttl: Duration,
    /// Whether to require Secure on the refresh cookie (production)
    pub cookie_secure: bool,
    /// SameSite policy for the refresh cookie
    pub cookie_same_site: SameSite,
    /// Argon2id cost parameters
    pub hash_cost: HashCost,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: Vec::new(),
            access_token_ttl: Duration::from_secs(7 * 24 * 3600), // 7 days
            refresh_token_ttl: Duration::from_secs(30 * 24 * 3600), // 30 days
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            hash_cost: HashCost::default(),
        }
    }
}

impl AuthConfig {
    /// Create config with the given signing secret
    pub fn with_secret(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            token_secret: secret.into(),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie, fixed secret)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_secret("development-only-secret")
        }
    }

    /// Cookie configuration for setting the refresh token
    ///
    /// Max-Age matches the refresh TTL, scope is the whole origin.
    pub fn refresh_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: REFRESH_COOKIE_NAME.to_string(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.refresh_token_ttl.as_secs() as i64),
        }
    }
}
