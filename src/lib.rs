//! # pipedash-api
//!
//! Data-access layer for a sales-pipeline dashboard over a
//! Salesforce-style CRM.
//!
//! This facade re-exports the three underlying crates:
//!
//! - [`client`] (pipedash-client): HTTP plumbing, retries, SOQL query
//!   execution with bounded pagination, escaping helpers
//! - [`auth`] (pipedash-auth): OAuth 2.0 Web Server Flow and the
//!   in-memory session store
//! - [`dashboard`] (pipedash-dashboard): the four aggregate operations,
//!   live and offline providers, and the gateway that picks between
//!   them
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use pipedash_api::auth::SessionStore;
//! use pipedash_api::dashboard::{DashboardConfig, DashboardProvider, Gateway};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let gateway = Gateway::new(DashboardConfig::from_env(), Arc::new(SessionStore::new()))?;
//!
//! // Demo mode needs no session; live mode resolves the cookie value.
//! let provider = gateway.provider(None)?;
//! let kpis = provider.kpi_summary().await?;
//! println!("open pipeline: {} deals", kpis.open_pipeline.count);
//! # Ok(())
//! # }
//! ```

pub use pipedash_auth as auth;
pub use pipedash_client as client;
pub use pipedash_dashboard as dashboard;

// The types most callers need, at the top level.
pub use pipedash_auth::{OAuthConfig, OAuthFlow, SessionStore, TokenBundle};
pub use pipedash_dashboard::{
    DashboardConfig, DashboardProvider, Gateway, KpiSummary, ListParams, OpportunityList,
    PipelineDataPoint, Provider, SortDirection, StageBreakdown,
};
