//! # pipedash-client
//!
//! Core HTTP infrastructure for talking to the CRM platform.
//!
//! This crate provides the foundational client used by the dashboard
//! gateway:
//! - Automatic retry with exponential backoff and jitter (idempotent
//!   GETs only)
//! - Explicit request and connect timeouts on every upstream call
//! - Rate limit detection (429 + Retry-After)
//! - SOQL query execution with bounded pagination
//! - Escaping helpers for building query text from untrusted values
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │              pipedash-dashboard (providers)            │
//! └────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌────────────────────────────────────────────────────────┐
//! │                       CrmClient                        │
//! │  - Holds instance URL + access token                   │
//! │  - query / query_all (bounded continuation follow)     │
//! └────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌────────────────────────────────────────────────────────┐
//! │                     CrmHttpClient                      │
//! │  - Raw HTTP with retry, timeouts, rate limiting        │
//! │  - Status code -> error taxonomy mapping               │
//! └────────────────────────────────────────────────────────┘
//! ```

mod config;
mod crm;
mod error;
mod http;
mod retry;
pub mod security;

pub use config::{ClientConfig, ClientConfigBuilder};
pub use crm::{CrmClient, QueryResult, MAX_QUERY_PAGES};
pub use error::{Error, ErrorKind, Result};
pub use http::CrmHttpClient;
pub use retry::{BackoffStrategy, RetryConfig, RetryPolicy};

/// Default CRM REST API version.
pub const DEFAULT_API_VERSION: &str = "59.0";

/// User-Agent string for the client.
pub const USER_AGENT: &str = concat!("pipedash-api/", env!("CARGO_PKG_VERSION"));
