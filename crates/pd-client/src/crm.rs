//! High-level CRM client: query execution with bounded pagination.
//!
//! ## Security
//!
//! - Access tokens are redacted in Debug output
//! - Statements are URL-encoded before hitting the query endpoint

use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::config::ClientConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::http::CrmHttpClient;
use crate::DEFAULT_API_VERSION;

/// Hard upper bound on continuation pages followed by [`CrmClient::query_all`].
///
/// At the platform's default 2,000-record page size this allows 100k
/// records, far beyond any dashboard query; a misbehaving upstream
/// that never reports `done` fails with `PaginationOverrun` instead
/// of looping forever.
pub const MAX_QUERY_PAGES: u32 = 50;

/// Client bound to one authenticated CRM session.
///
/// Holds the instance URL and access token issued by the OAuth flow
/// and executes SOQL statements against the query endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use pipedash_client::CrmClient;
///
/// let client = CrmClient::new("https://na1.example.com", "access_token")?;
/// let result: QueryResult<serde_json::Value> =
///     client.query("SELECT Id, Name FROM Opportunity LIMIT 10").await?;
/// ```
#[derive(Clone)]
pub struct CrmClient {
    http: CrmHttpClient,
    instance_url: String,
    access_token: String,
    api_version: String,
}

impl std::fmt::Debug for CrmClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrmClient")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish_non_exhaustive()
    }
}

impl CrmClient {
    /// Create a new client with the given instance URL and access token.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        Self::with_config(instance_url, access_token, ClientConfig::default())
    }

    /// Create a new client with custom HTTP configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let http = CrmHttpClient::new(config)?;
        Ok(Self {
            http,
            instance_url: instance_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    /// Set the API version (e.g., "59.0").
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Get the instance URL.
    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    /// Get the API version.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Build the query endpoint URL for a statement.
    fn query_url(&self, soql: &str) -> String {
        format!(
            "{}/services/data/v{}/query?q={}",
            self.instance_url,
            self.api_version,
            urlencoding::encode(soql)
        )
    }

    /// Resolve a continuation path against the instance URL.
    fn continuation_url(&self, next: &str) -> String {
        if next.starts_with("http://") || next.starts_with("https://") {
            next.to_string()
        } else if next.starts_with('/') {
            format!("{}{}", self.instance_url, next)
        } else {
            format!("{}/{}", self.instance_url, next)
        }
    }

    /// Execute a single SOQL statement and return the first result page.
    #[instrument(skip(self), fields(instance = %self.instance_url))]
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResult<T>> {
        self.http
            .get_json(&self.query_url(soql), &self.access_token)
            .await
    }

    /// Execute a SOQL statement and follow continuation pages until the
    /// platform reports completion, concatenating records in page order.
    ///
    /// Pages are fetched strictly sequentially (continuation tokens are
    /// order-dependent). Fails with [`ErrorKind::PaginationOverrun`] if
    /// more than [`MAX_QUERY_PAGES`] continuations are needed.
    #[instrument(skip(self), fields(instance = %self.instance_url))]
    pub async fn query_all<T: DeserializeOwned>(&self, soql: &str) -> Result<Vec<T>> {
        let mut result: QueryResult<T> = self.query(soql).await?;
        let mut all_records = result.records;
        let mut pages = 1u32;

        while !result.done {
            if pages >= MAX_QUERY_PAGES {
                return Err(Error::new(ErrorKind::PaginationOverrun {
                    pages: MAX_QUERY_PAGES,
                }));
            }

            let next = match result.next_records_url {
                Some(ref next) => self.continuation_url(next),
                // done=false with no continuation URL is a malformed response
                None => {
                    return Err(Error::new(ErrorKind::Other(
                        "Query result not done but no continuation URL provided".to_string(),
                    )))
                }
            };

            result = self.http.get_json(&next, &self.access_token).await?;
            all_records.append(&mut result.records);
            pages += 1;
        }

        Ok(all_records)
    }
}

/// Result of a SOQL query.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct QueryResult<T> {
    /// Total number of records matching the query.
    #[serde(rename = "totalSize")]
    pub total_size: u64,

    /// Whether all records are returned (no more pages).
    pub done: bool,

    /// Path to fetch the next batch of results, relative to the instance URL.
    #[serde(rename = "nextRecordsUrl", default)]
    pub next_records_url: Option<String>,

    /// The records.
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
}
