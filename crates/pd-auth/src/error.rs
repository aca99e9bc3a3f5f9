//! Error types for pipedash-auth.
//!
//! Error messages are designed to avoid exposing sensitive credential data.

/// Result type alias for pipedash-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pipedash-auth operations.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }
}

/// The kind of error that occurred.
///
/// Error messages avoid including credential values.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// Non-2xx response from the token endpoint, with the upstream
    /// status and parsed error body.
    #[error("OAuth error ({status}): {error} - {description}")]
    Oauth {
        status: u16,
        error: String,
        description: String,
    },

    /// Invalid flow configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// HTTP error during authentication.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Form serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Sanitize the error message to avoid exposing URLs with tokens
        let message = err.to_string();
        let sanitized = if message.contains("access_token") || message.contains("token=") {
            "HTTP request failed (details redacted for security)".to_string()
        } else {
            message
        };
        Error::with_source(ErrorKind::Http(sanitized), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::with_source(ErrorKind::Json(err.to_string()), err)
    }
}

impl From<serde_urlencoded::ser::Error> for Error {
    fn from(err: serde_urlencoded::ser::Error) -> Self {
        Error::with_source(ErrorKind::Serialization(err.to_string()), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        let err = ErrorKind::Oauth {
            status: 400,
            error: "invalid_grant".to_string(),
            description: "expired authorization code".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "OAuth error (400): invalid_grant - expired authorization code"
        );
    }

    #[test]
    fn test_error_messages_dont_contain_credentials() {
        let err = Error::new(ErrorKind::Http("request failed".to_string()));
        let msg = err.to_string();
        assert!(!msg.contains("Bearer"));
        assert!(!msg.contains("access_token"));
    }
}
