//! Client Token Cache
//!
//! Holds the current access token in memory only - never in persisted
//! storage, to keep it out of reach of anything that can read disk.
//! A cold start always begins empty; recovery goes through hydration.

use std::fmt;
use std::sync::Mutex;

/// In-memory holder for the current access token
///
/// One cell, explicit set/get/clear. The only writers are the
/// login/hydration flows and the interceptor's refresh path.
#[derive(Default)]
pub struct TokenCache {
    cell: Mutex<Option<String>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new access token
    pub fn set(&self, token: impl Into<String>) {
        *self.cell.lock().unwrap() = Some(token.into());
    }

    /// Current access token, if any
    pub fn get(&self) -> Option<String> {
        self.cell.lock().unwrap().clone()
    }

    /// Drop the cached token
    pub fn clear(&self) {
        *self.cell.lock().unwrap() = None;
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.get().is_some() {
            "[TOKEN]"
        } else {
            "empty"
        };
        f.debug_tuple("TokenCache").field(&state).finish()
    }
}
