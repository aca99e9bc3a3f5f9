//! Error types for pipedash-dashboard.
//!
//! Authorization failures (`Unauthenticated`, `SessionExpired`) are
//! distinguishable from upstream platform failures (`Query`) and from
//! parameter validation failures (`Validation`). Route plumbing maps
//! [`Error::is_auth_error`] to its "please log in" signal.

/// Result type alias for pipedash-dashboard operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for pipedash-dashboard operations.
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

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation(message.into()))
    }

    /// Returns true if the caller must (re-)authenticate: either no
    /// usable session, or the upstream rejected the access token.
    pub fn is_auth_error(&self) -> bool {
        match &self.kind {
            ErrorKind::Unauthenticated | ErrorKind::SessionExpired => true,
            ErrorKind::Query(err) => err.is_auth_error(),
            _ => false,
        }
    }

    /// Returns true if this is a parameter validation failure, rejected
    /// before any upstream call.
    pub fn is_validation_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation(_))
    }
}

/// The kind of error that occurred.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// No session reference was provided in live mode.
    #[error("Not authenticated - please log in")]
    Unauthenticated,

    /// A session reference was provided but no longer resolves.
    #[error("Session expired - please log in again")]
    SessionExpired,

    /// Malformed pagination/filter parameters, rejected before any
    /// upstream call.
    #[error("Invalid parameter: {0}")]
    Validation(String),

    /// Upstream query failure from the live path.
    #[error("Upstream query error: {0}")]
    Query(pipedash_client::Error),

    /// Offline dataset missing or unreadable at first use. Fatal for
    /// offline mode.
    #[error("Offline dataset load failed: {0}")]
    DataLoad(String),
}

impl From<pipedash_client::Error> for Error {
    fn from(err: pipedash_client::Error) -> Self {
        Error::new(ErrorKind::Query(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_errors_are_distinguishable() {
        assert!(Error::new(ErrorKind::Unauthenticated).is_auth_error());
        assert!(Error::new(ErrorKind::SessionExpired).is_auth_error());
        assert!(!Error::validation("limit out of range").is_auth_error());
        assert!(!Error::new(ErrorKind::DataLoad("missing".into())).is_auth_error());
    }

    #[test]
    fn test_upstream_token_rejection_counts_as_auth() {
        let inner = pipedash_client::Error::new(pipedash_client::ErrorKind::Authentication(
            "token rejected".into(),
        ));
        assert!(Error::from(inner).is_auth_error());

        let inner = pipedash_client::Error::new(pipedash_client::ErrorKind::Timeout);
        assert!(!Error::from(inner).is_auth_error());
    }

    #[test]
    fn test_validation_error() {
        let err = Error::validation("limit must be between 1 and 200");
        assert!(err.is_validation_error());
        assert!(err.to_string().contains("limit"));
    }

    #[test]
    fn test_user_facing_messages() {
        assert_eq!(
            Error::new(ErrorKind::Unauthenticated).to_string(),
            "Not authenticated - please log in"
        );
        assert_eq!(
            Error::new(ErrorKind::SessionExpired).to_string(),
            "Session expired - please log in again"
        );
    }
}
