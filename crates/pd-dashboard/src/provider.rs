//! The provider trait and the enum both backends dispatch through.

use std::sync::Arc;

use crate::error::Result;
use crate::live::LiveProvider;
use crate::models::{KpiSummary, OpportunityList, PipelineDataPoint, StageBreakdown};
use crate::offline::OfflineProvider;
use crate::params::ListParams;

/// The four dashboard aggregate operations.
///
/// Both implementations return identical response shapes for identical
/// logical inputs, so callers never branch on the backend.
#[allow(async_fn_in_trait)]
pub trait DashboardProvider {
    /// Headline metrics: open pipeline, won and lost this quarter.
    async fn kpi_summary(&self) -> Result<KpiSummary>;

    /// Open opportunities grouped by stage, ordered by stage name.
    async fn stage_breakdown(&self) -> Result<Vec<StageBreakdown>>;

    /// Monthly pipeline totals for a trailing window, ordered
    /// chronologically.
    async fn pipeline_over_time(&self, months: u32) -> Result<Vec<PipelineDataPoint>>;

    /// One page of the filtered, sorted opportunity list.
    async fn list_opportunities(&self, params: &ListParams) -> Result<OpportunityList>;
}

/// A resolved backend for one request.
///
/// Produced by [`Gateway::provider`](crate::Gateway::provider); holds
/// either a per-request live provider bound to a session's token, or a
/// shared handle to the process-wide offline dataset.
#[derive(Debug, Clone)]
pub enum Provider {
    Live(LiveProvider),
    Offline(Arc<OfflineProvider>),
}

impl DashboardProvider for Provider {
    async fn kpi_summary(&self) -> Result<KpiSummary> {
        match self {
            Provider::Live(p) => p.kpi_summary().await,
            Provider::Offline(p) => p.kpi_summary().await,
        }
    }

    async fn stage_breakdown(&self) -> Result<Vec<StageBreakdown>> {
        match self {
            Provider::Live(p) => p.stage_breakdown().await,
            Provider::Offline(p) => p.stage_breakdown().await,
        }
    }

    async fn pipeline_over_time(&self, months: u32) -> Result<Vec<PipelineDataPoint>> {
        match self {
            Provider::Live(p) => p.pipeline_over_time(months).await,
            Provider::Offline(p) => p.pipeline_over_time(months).await,
        }
    }

    async fn list_opportunities(&self, params: &ListParams) -> Result<OpportunityList> {
        match self {
            Provider::Live(p) => p.list_opportunities(params).await,
            Provider::Offline(p) => p.list_opportunities(params).await,
        }
    }
}
