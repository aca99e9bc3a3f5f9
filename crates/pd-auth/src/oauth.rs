//! OAuth 2.0 Web Server Flow against the CRM platform.
//!
//! One flow covers the dashboard's needs: build the authorization
//! redirect, exchange the callback code for tokens, and refresh an
//! access token from a refresh token. Token exchange and refresh are
//! single POSTs and are never retried automatically (the grant is
//! consumed on first use).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{Error, ErrorKind, Result};

/// OAuth 2.0 configuration for a connected app.
///
/// `client_secret` is redacted in Debug output to prevent accidental
/// exposure in logs.
#[derive(Clone)]
pub struct OAuthConfig {
    /// Consumer key (client_id).
    pub client_id: String,
    /// Consumer secret (client_secret). Optional for some org policies.
    client_secret: Option<String>,
    /// Redirect URI registered with the connected app.
    pub redirect_uri: String,
    /// Login URL (authorize and token endpoints live under it).
    pub login_url: String,
    /// Scopes to request.
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("login_url", &self.login_url)
            .field("scopes", &self.scopes)
            .finish()
    }
}

impl OAuthConfig {
    /// Create a new OAuth config with the default production login URL
    /// and the `api refresh_token` scope pair.
    pub fn new(client_id: impl Into<String>, redirect_uri: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            redirect_uri: redirect_uri.into(),
            login_url: crate::PRODUCTION_LOGIN_URL.to_string(),
            scopes: vec!["api".to_string(), "refresh_token".to_string()],
        }
    }

    /// Set the client secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(secret.into());
        self
    }

    /// Set the login URL (e.g. a sandbox or My Domain URL).
    pub fn with_login_url(mut self, url: impl Into<String>) -> Self {
        self.login_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn client_secret(&self) -> Option<&str> {
        self.client_secret.as_deref()
    }
}

/// OAuth 2.0 Web Server Flow client.
#[derive(Clone)]
pub struct OAuthFlow {
    config: OAuthConfig,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for OAuthFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuthFlow")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl OAuthFlow {
    /// Create a new web flow client.
    pub fn new(config: OAuthConfig) -> Result<Self> {
        if config.client_id.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "client_id is required for the web server flow".to_string(),
            )));
        }
        if config.redirect_uri.is_empty() {
            return Err(Error::new(ErrorKind::Config(
                "redirect_uri is required for the web server flow".to_string(),
            )));
        }

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Get the OAuth config.
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization URL to redirect users to.
    ///
    /// `state` is the anti-CSRF value the caller must generate and
    /// later compare against the callback; it is deliberately not
    /// optional.
    pub fn authorization_url(&self, state: &str) -> String {
        let scopes = self.config.scopes.join(" ");

        format!(
            "{}/services/oauth2/authorize?response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
            self.config.login_url,
            urlencoding::encode(&self.config.client_id),
            urlencoding::encode(&self.config.redirect_uri),
            urlencoding::encode(&scopes),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for a token bundle.
    ///
    /// The code parameter is not logged to prevent credential exposure.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse> {
        let mut params = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.config.client_id),
            ("redirect_uri", &self.config.redirect_uri),
        ];

        if let Some(secret) = self.config.client_secret() {
            params.push(("client_secret", secret));
        }

        self.token_request(&params).await
    }

    /// Refresh an access token using a refresh token.
    ///
    /// Nothing in the gateway invokes this automatically on token
    /// expiry; callers decide when to refresh.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse> {
        let mut params = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", &self.config.client_id),
        ];

        if let Some(secret) = self.config.client_secret() {
            params.push(("client_secret", secret));
        }

        self.token_request(&params).await
    }

    /// Single form POST to the token endpoint. Never retried.
    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse> {
        let body = serde_urlencoded::to_string(params)?;

        let response = self
            .http_client
            .post(format!("{}/services/oauth2/token", self.config.login_url))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let (error, description) = match serde_json::from_str::<OAuthErrorResponse>(&body) {
                Ok(parsed) => (parsed.error, parsed.error_description),
                Err(_) => ("invalid_response".to_string(), body),
            };
            return Err(Error::new(ErrorKind::Oauth {
                status: status.as_u16(),
                error,
                description,
            }));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token)
    }
}

/// Token response from the OAuth token endpoint.
///
/// `access_token` and `refresh_token` are redacted in Debug output.
#[derive(Clone, Deserialize, Serialize)]
pub struct TokenResponse {
    /// Access token.
    pub access_token: String,
    /// Refresh token (present when the `refresh_token` scope was granted).
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Instance URL all subsequent API calls go to.
    pub instance_url: String,
    /// Token type (usually "Bearer").
    #[serde(default)]
    pub token_type: Option<String>,
    /// Issued at timestamp (epoch milliseconds as a string).
    #[serde(default)]
    pub issued_at: Option<String>,
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("instance_url", &self.instance_url)
            .field("token_type", &self.token_type)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

/// OAuth error response body.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    error_description: String,
}
