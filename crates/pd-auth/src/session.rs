//! In-memory session store.
//!
//! Token bundles are stored keyed by a cryptographically random,
//! URL-safe session identifier. The store lives for the process
//! lifetime and enforces no TTL: a session is valid until it is
//! explicitly deleted or the process restarts. `expires_at` exists on
//! the bundle as a first-class field for transports that want a hint,
//! but nothing here enforces it.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use rand::RngCore;

use crate::oauth::TokenResponse;

/// Nominal lifetime hint for the session cookie (8 hours).
///
/// Transport-layer only: the store itself never expires sessions.
pub const SESSION_COOKIE_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 8);

/// The token bundle held by one session.
///
/// Tokens are redacted in Debug output.
#[derive(Clone)]
pub struct TokenBundle {
    /// Access token for the CRM instance.
    pub access_token: String,
    /// Refresh token, when one was granted.
    pub refresh_token: Option<String>,
    /// Instance URL all API calls for this session go to.
    pub instance_url: String,
    /// When the bundle was issued.
    pub created_at: DateTime<Utc>,
    /// Advisory expiry. Not enforced by the store.
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for TokenBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenBundle")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("instance_url", &self.instance_url)
            .field("created_at", &self.created_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl TokenBundle {
    /// Create a bundle issued now, with no advisory expiry.
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        instance_url: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
            instance_url: instance_url.into(),
            created_at: Utc::now(),
            expires_at: None,
        }
    }
}

impl From<TokenResponse> for TokenBundle {
    fn from(token: TokenResponse) -> Self {
        Self::new(token.access_token, token.refresh_token, token.instance_url)
    }
}

/// Partial update applied to an existing session's bundle.
///
/// `None` fields are left untouched, mirroring an explicit refresh:
/// a new access token always arrives, a new refresh token sometimes.
#[derive(Debug, Default, Clone)]
pub struct SessionPatch {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub instance_url: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Concurrency-safe, process-lifetime session store.
///
/// Shared mutable state across all in-flight requests; every operation
/// takes the internal lock. For production use beyond a single
/// process, swap this for Redis or a database-backed store.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, TokenBundle>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a bundle under a new cryptographically random identifier
    /// and return the identifier.
    ///
    /// The identifier is 32 random bytes (256 bits) encoded URL-safe
    /// without padding. An identifier already present in the store is
    /// never reused.
    pub fn create(&self, bundle: TokenBundle) -> String {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        loop {
            let session_id = generate_session_id();
            // Collisions are cryptographically implausible, but the
            // contract is strict: never hand out an existing id.
            if sessions.contains_key(&session_id) {
                continue;
            }
            sessions.insert(session_id.clone(), bundle);
            return session_id;
        }
    }

    /// Retrieve the bundle for a session, or `None` if unknown.
    pub fn get(&self, session_id: &str) -> Option<TokenBundle> {
        let sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions.get(session_id).cloned()
    }

    /// Merge a patch into an existing session's bundle. No-op when the
    /// session is unknown.
    pub fn update(&self, session_id: &str, patch: SessionPatch) {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        if let Some(bundle) = sessions.get_mut(session_id) {
            if let Some(access_token) = patch.access_token {
                bundle.access_token = access_token;
            }
            if let Some(refresh_token) = patch.refresh_token {
                bundle.refresh_token = Some(refresh_token);
            }
            if let Some(instance_url) = patch.instance_url {
                bundle.instance_url = instance_url;
            }
            if let Some(expires_at) = patch.expires_at {
                bundle.expires_at = Some(expires_at);
            }
        }
    }

    /// Remove a session. Idempotent.
    pub fn delete(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions.remove(session_id);
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        let sessions = self.sessions.lock().expect("session store lock poisoned");
        sessions.len()
    }

    /// Whether the store holds no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Generate a URL-safe session identifier with 256 bits of entropy.
fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
