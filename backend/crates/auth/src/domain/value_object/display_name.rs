//! Display Name Value Object

use kernel::error::app_error::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimum display name length
const NAME_MIN_LENGTH: usize = 2;

/// Maximum display name length
const NAME_MAX_LENGTH: usize = 50;

/// User display name value object
///
/// Trimmed on construction; no canonical form beyond that - display
/// names are not used for lookups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayName(String);

impl DisplayName {
    /// Create a new display name with validation
    pub fn new(name: impl Into<String>) -> AppResult<Self> {
        let name = name.into().trim().to_string();

        if name.is_empty() {
            return Err(AppError::bad_request("Name is required"));
        }

        let char_count = name.chars().count();

        if char_count < NAME_MIN_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must be at least {} characters",
                NAME_MIN_LENGTH
            )));
        }

        if char_count > NAME_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Name must not exceed {} characters",
                NAME_MAX_LENGTH
            )));
        }

        Ok(Self(name))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to string for database storage
    pub fn into_db(self) -> String {
        self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
