//! Backend selection: demo mode serves the offline dataset, live mode
//! resolves a session and binds a live provider to its token.

use std::sync::Arc;

use tracing::{debug, instrument};

use pipedash_auth::{OAuthConfig, SessionStore, PRODUCTION_LOGIN_URL};

use crate::error::{Error, ErrorKind, Result};
use crate::live::LiveProvider;
use crate::offline::OfflineProvider;
use crate::provider::Provider;

/// Deployment configuration for the gateway.
///
/// Credentials are optional on purpose: a deployment with no OAuth
/// client configured falls back to demo mode instead of failing.
#[derive(Clone)]
pub struct DashboardConfig {
    pub client_id: String,
    client_secret: String,
    pub redirect_uri: String,
    pub login_url: String,
    /// Forces the offline dataset even when credentials are present.
    pub demo_mode: bool,
}

impl std::fmt::Debug for DashboardConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("redirect_uri", &self.redirect_uri)
            .field("login_url", &self.login_url)
            .field("demo_mode", &self.demo_mode)
            .finish()
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:8000/auth/callback".to_string(),
            login_url: PRODUCTION_LOGIN_URL.to_string(),
            demo_mode: false,
        }
    }
}

impl DashboardConfig {
    /// Read configuration from `SF_CLIENT_ID`, `SF_CLIENT_SECRET`,
    /// `SF_REDIRECT_URI`, `SF_LOGIN_URL`, and `DEMO_MODE`.
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).unwrap_or_default();
        let defaults = Self::default();
        Self {
            client_id: var("SF_CLIENT_ID"),
            client_secret: var("SF_CLIENT_SECRET"),
            redirect_uri: match var("SF_REDIRECT_URI") {
                uri if uri.is_empty() => defaults.redirect_uri,
                uri => uri,
            },
            login_url: match var("SF_LOGIN_URL") {
                url if url.is_empty() => defaults.login_url,
                url => url,
            },
            demo_mode: matches!(var("DEMO_MODE").to_ascii_lowercase().as_str(), "1" | "true"),
        }
    }

    /// Set the OAuth client credentials.
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        self.client_id = client_id.into();
        self.client_secret = client_secret.into();
        self
    }

    /// Force demo mode.
    pub fn with_demo_mode(mut self, demo_mode: bool) -> Self {
        self.demo_mode = demo_mode;
        self
    }

    /// True when demo mode is forced or no OAuth client is configured.
    pub fn is_demo(&self) -> bool {
        self.demo_mode || self.client_id.is_empty() || self.client_secret.is_empty()
    }

    /// OAuth configuration for the login flow. Only meaningful when
    /// [`is_demo`](Self::is_demo) is false.
    pub fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig::new(self.client_id.clone(), self.redirect_uri.clone())
            .with_secret(self.client_secret.clone())
            .with_login_url(self.login_url.clone())
    }
}

/// Per-request backend selector.
///
/// Demo mode resolves every request to the shared offline dataset and
/// never consults the session store; live mode requires a session
/// identifier that still resolves, and binds a [`LiveProvider`] to the
/// session's instance URL and access token.
#[derive(Debug, Clone)]
pub struct Gateway {
    config: DashboardConfig,
    sessions: Arc<SessionStore>,
    offline: Option<Arc<OfflineProvider>>,
}

impl Gateway {
    /// Build a gateway. In demo mode the bundled dataset is loaded
    /// eagerly so a broken dataset fails startup, not the first
    /// request.
    pub fn new(config: DashboardConfig, sessions: Arc<SessionStore>) -> Result<Self> {
        let offline = if config.is_demo() {
            debug!("demo mode active, loading bundled dataset");
            Some(Arc::new(OfflineProvider::from_embedded()?))
        } else {
            None
        };
        Ok(Self {
            config,
            sessions,
            offline,
        })
    }

    /// Build a demo-mode gateway over an explicit dataset.
    pub fn with_offline_provider(
        config: DashboardConfig,
        sessions: Arc<SessionStore>,
        offline: OfflineProvider,
    ) -> Self {
        Self {
            config,
            sessions,
            offline: Some(Arc::new(offline)),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Resolve the backend for one request.
    #[instrument(skip(self, session_id), fields(demo = self.config.is_demo()))]
    pub fn provider(&self, session_id: Option<&str>) -> Result<Provider> {
        if let Some(ref offline) = self.offline {
            return Ok(Provider::Offline(Arc::clone(offline)));
        }

        let session_id = session_id.ok_or_else(|| Error::new(ErrorKind::Unauthenticated))?;
        let session = self
            .sessions
            .get(session_id)
            .ok_or_else(|| Error::new(ErrorKind::SessionExpired))?;

        let live = LiveProvider::new(session.instance_url, session.access_token)?;
        Ok(Provider::Live(live))
    }
}
