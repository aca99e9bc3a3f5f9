//! # pipedash-auth
//!
//! Authentication for the dashboard gateway: OAuth 2.0 Web Server Flow
//! against the CRM platform, plus the process-lifetime session store
//! that maps opaque session identifiers to token bundles.
//!
//! ## Security
//!
//! - Sensitive data (tokens, secrets, codes) are redacted in Debug output
//! - Tracing spans skip credential parameters
//! - Error messages sanitize any credential data
//! - Session identifiers carry 256 bits of entropy, URL-safe encoded
//!
//! ## Example
//!
//! ```rust,ignore
//! use pipedash_auth::{OAuthConfig, OAuthFlow, SessionStore, TokenBundle};
//!
//! let flow = OAuthFlow::new(
//!     OAuthConfig::new("client_id", "https://app.example.com/auth/callback")
//!         .with_secret("client_secret"),
//! )?;
//!
//! // 1. Redirect the user
//! let url = flow.authorization_url("anti-csrf-state");
//!
//! // 2. Exchange the callback code, store the bundle
//! let token = flow.exchange_code(&code).await?;
//! let store = SessionStore::new();
//! let session_id = store.create(TokenBundle::from(token));
//! ```

mod error;
mod oauth;
mod session;

pub use error::{Error, ErrorKind, Result};
pub use oauth::{OAuthConfig, OAuthFlow, TokenResponse};
pub use session::{SessionPatch, SessionStore, TokenBundle, SESSION_COOKIE_MAX_AGE};

/// Default CRM login URL for production.
pub const PRODUCTION_LOGIN_URL: &str = "https://login.salesforce.com";

/// Default CRM login URL for sandbox orgs.
pub const SANDBOX_LOGIN_URL: &str = "https://test.salesforce.com";
