//! API response shapes the client cares about
//!
//! Unknown fields are ignored on purpose; the client only binds to the
//! parts of a payload it actually uses.

use serde::Deserialize;

/// User summary as returned by the API
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Response of `POST /api/auth/login`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: UserProfile,
    pub access_token: String,
    pub refresh_token: String,
}

/// Response of `POST /api/auth/refresh`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub access_token: String,
}

/// RFC 7807 problem body, as far as the client reads it
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemBody {
    pub detail: Option<String>,
}
