//! Error types for client operations
//!
//! Every failure surfaced by the bindings is a [`ClientError`]. Failures reported
//! by the remote API keep their HTTP status so callers (and the dispatcher) can
//! classify them without parsing messages.

use thiserror::Error;

/// HTTP status used by the API when a caller is throttled.
pub const TOO_MANY_REQUESTS: u16 = 429;

/// Client error types.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Required configuration is missing or unusable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The action path or its parameters do not match the fetched schema
    #[error("Schema resolution failed for [{keys}]: {message}")]
    SchemaResolution {
        /// Action key path, joined with `/`
        keys: String,
        /// What did not match
        message: String,
    },

    /// The API answered with a non-success status
    #[error("{title}: {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Status line, always prefixed by the status code (e.g. `429 Too Many Requests`)
        title: String,
        /// Raw response body
        body: String,
    },

    /// A lookup expected exactly one result and found none
    #[error("Not found: {0}")]
    NotFound(String),

    /// A lookup expected exactly one result and found several
    #[error("Multiple objects returned: {0}")]
    MultipleFound(String),

    /// A facade method was called with unusable arguments
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// HTTP request failed before a response was received
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Build an API error from a status code, deriving the title from it.
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status");

        ClientError::Api {
            status,
            title: format!("{} {}", status, reason),
            body: body.into(),
        }
    }

    /// Build a schema resolution error for a key path.
    pub fn schema(keys: &[String], message: impl Into<String>) -> Self {
        ClientError::SchemaResolution {
            keys: keys.join("/"),
            message: message.into(),
        }
    }

    /// HTTP status reported by the API, if this error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Human-readable title whose prefix is the HTTP status code, if any.
    pub fn title(&self) -> Option<&str> {
        match self {
            ClientError::Api { title, .. } => Some(title),
            _ => None,
        }
    }

    /// Whether the server throttled the request.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(TOO_MANY_REQUESTS)
    }

    /// Get a stable error code for logs and metrics.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Configuration(_) => "CONFIGURATION_ERROR",
            ClientError::SchemaResolution { .. } => "SCHEMA_RESOLUTION_ERROR",
            ClientError::Api { status, .. } if *status == TOO_MANY_REQUESTS => "RATE_LIMITED",
            ClientError::Api { .. } => "API_ERROR",
            ClientError::NotFound(_) => "NOT_FOUND",
            ClientError::MultipleFound(_) => "MULTIPLE_FOUND",
            ClientError::InvalidArgument(_) => "INVALID_ARGUMENT",
            ClientError::Request(_) => "REQUEST_FAILED",
            ClientError::InvalidResponse(_) => "INVALID_RESPONSE",
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::InvalidResponse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_title_prefix() {
        let err = ClientError::api(429, "slow down");
        assert_eq!(err.title(), Some("429 Too Many Requests"));
        assert_eq!(err.status(), Some(429));
        assert!(err.is_rate_limited());
        assert_eq!(err.error_code(), "RATE_LIMITED");
    }

    #[test]
    fn test_other_errors_are_not_rate_limited() {
        assert!(!ClientError::api(500, "boom").is_rate_limited());
        assert!(!ClientError::Configuration("x".to_string()).is_rate_limited());
        assert!(!ClientError::NotFound("x".to_string()).is_rate_limited());
    }

    #[test]
    fn test_unknown_status_title() {
        let err = ClientError::api(599, "");
        assert_eq!(err.title(), Some("599 Unknown Status"));
    }

    #[test]
    fn test_schema_error_joins_keys() {
        let keys = vec!["users".to_string(), "user_read".to_string()];
        let err = ClientError::schema(&keys, "missing");
        assert_eq!(
            err.to_string(),
            "Schema resolution failed for [users/user_read]: missing"
        );
    }
}
