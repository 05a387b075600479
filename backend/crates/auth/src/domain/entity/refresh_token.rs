//! Refresh Record Entity
//!
//! Server-side mirror of an issued refresh token. The stored expiry is
//! copied from the token's own `exp` claim at issuance so the database
//! expiry and the cryptographic expiry cannot drift.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

/// Persisted refresh token record
#[derive(Debug, Clone)]
pub struct RefreshRecord {
    /// The refresh token string (unique)
    pub token: String,
    /// Owning user
    pub user_id: UserId,
    /// Expiry, mirrored from the token's `exp` claim
    pub expires_at: DateTime<Utc>,
}

impl RefreshRecord {
    pub fn new(token: String, user_id: UserId, expires_at: DateTime<Utc>) -> Self {
        Self {
            token,
            user_id,
            expires_at,
        }
    }

    /// Check if the stored expiry has passed
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expiry() {
        let user = UserId::from_i64(1);

        let live = RefreshRecord::new("t".into(), user, Utc::now() + Duration::days(30));
        assert!(!live.is_expired());

        let dead = RefreshRecord::new("t".into(), user, Utc::now() - Duration::seconds(1));
        assert!(dead.is_expired());
    }
}
