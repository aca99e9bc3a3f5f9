//! Dashboard response shapes.
//!
//! These types are the one result contract both providers normalize
//! to: live and offline answers serialize to identical JSON shapes,
//! including the defaults for absent fields (amount -> 0, date -> "").

use serde::Serialize;

/// One opportunity as returned by the list operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityRecord {
    pub id: String,
    pub name: String,
    pub stage_name: String,
    /// Absent amounts are reported as 0.
    pub amount: f64,
    /// ISO date (`YYYY-MM-DD`); absent dates are reported as "".
    pub close_date: String,
    pub probability: f64,
    pub owner_name: String,
    pub account_name: String,
    #[serde(rename = "type")]
    pub opportunity_type: String,
}

impl OpportunityRecord {
    /// Normalize a raw CRM record (with nested `Owner.Name` /
    /// `Account.Name` relationships) into the dashboard shape.
    pub(crate) fn from_crm_json(value: &serde_json::Value) -> Self {
        let text = |v: &serde_json::Value| v.as_str().unwrap_or_default().to_string();
        Self {
            id: text(&value["Id"]),
            name: text(&value["Name"]),
            stage_name: text(&value["StageName"]),
            amount: value["Amount"].as_f64().unwrap_or(0.0),
            close_date: text(&value["CloseDate"]),
            probability: value["Probability"].as_f64().unwrap_or(0.0),
            owner_name: text(&value["Owner"]["Name"]),
            account_name: text(&value["Account"]["Name"]),
            opportunity_type: text(&value["Type"]),
        }
    }
}

/// One page of the filtered opportunity list.
///
/// `total` reflects the full filtered count, independent of page size;
/// `offset + records.len() <= total` always holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityList {
    pub records: Vec<OpportunityRecord>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
}

/// Count/total pair for a closed-quarter KPI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KpiMetric {
    pub count: u64,
    pub total: f64,
}

/// Open-pipeline KPI with the mean deal size.
///
/// `average` is 0 when `count` is 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OpenPipeline {
    pub count: u64,
    pub total: f64,
    pub average: f64,
}

/// The dashboard's headline metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct KpiSummary {
    pub open_pipeline: OpenPipeline,
    pub won_this_quarter: KpiMetric,
    pub lost_this_quarter: KpiMetric,
}

/// One open stage's share of the pipeline. Rows are ordered by
/// `stage_name` ascending; closed stages never appear.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageBreakdown {
    pub stage_name: String,
    pub count: u64,
    pub total_amount: f64,
}

/// One (year, month) bucket of the pipeline trend, ordered
/// chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PipelineDataPoint {
    pub month: u32,
    pub year: i32,
    pub total: f64,
    pub count: u64,
}
