//! # pipedash-dashboard
//!
//! The data-access gateway behind the sales-pipeline dashboard.
//!
//! Four aggregate operations (KPI summary, stage breakdown, monthly
//! pipeline trend, and the paginated opportunity list) are exposed
//! through one trait, [`DashboardProvider`], with two implementations:
//!
//! - [`LiveProvider`] composes SOQL statements against an
//!   authenticated CRM session
//! - [`OfflineProvider`] serves a fixed in-memory dataset with the
//!   same grouping, ordering, windowing, and pagination rules
//!
//! [`Gateway`] is the single decision point that picks one per call:
//! demo mode (explicit flag or absent credentials) serves offline with
//! no session required; live mode requires a session identifier that
//! resolves in the [`SessionStore`](pipedash_auth::SessionStore).
//! Both backends produce byte-identical response shapes.
//!
//! ## Example
//!
//! ```rust,ignore
//! use pipedash_dashboard::{DashboardConfig, DashboardProvider, Gateway};
//! use pipedash_auth::SessionStore;
//! use std::sync::Arc;
//!
//! let gateway = Gateway::new(DashboardConfig::from_env(), Arc::new(SessionStore::new()))?;
//! let provider = gateway.provider(session_cookie.as_deref())?;
//! let kpis = provider.kpi_summary().await?;
//! ```

mod error;
mod gateway;
mod live;
mod models;
mod offline;
mod params;
mod provider;
pub mod window;

pub use error::{Error, ErrorKind, Result};
pub use gateway::{DashboardConfig, Gateway};
pub use live::LiveProvider;
pub use models::{
    KpiMetric, KpiSummary, OpenPipeline, OpportunityList, OpportunityRecord, PipelineDataPoint,
    StageBreakdown,
};
pub use offline::{OfflineProvider, OpportunityRow};
pub use params::{ListParams, SortDirection, MAX_PAGE_SIZE};
pub use provider::{DashboardProvider, Provider};
