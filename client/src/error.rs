//! Client Error Types

use thiserror::Error;

/// Errors surfaced by the API client
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network / protocol level failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Malformed request URL
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),

    /// The server answered with a non-success status
    #[error("{message} (status {status})")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// HTTP status, when the server answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this is an authorization failure (401)
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessors() {
        let err = ClientError::Api {
            status: 401,
            message: "Token has expired".into(),
        };
        assert_eq!(err.status(), Some(401));
        assert!(err.is_unauthorized());

        let err = ClientError::Api {
            status: 409,
            message: "Email already registered".into(),
        };
        assert!(!err.is_unauthorized());
    }
}
