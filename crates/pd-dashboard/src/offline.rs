//! Offline provider: the same four aggregates computed over a fixed
//! in-memory dataset.
//!
//! Grouping, ordering, windowing, and pagination mirror the live
//! provider's SOQL semantics so responses from the two backends are
//! interchangeable. The date windows come from [`crate::window`],
//! which approximates the platform's quarter and trailing-month
//! literals.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Error, ErrorKind, Result};
use crate::models::{
    KpiMetric, KpiSummary, OpenPipeline, OpportunityList, OpportunityRecord, PipelineDataPoint,
    StageBreakdown,
};
use crate::params::{validate_months, ListParams, SortDirection, SortKey};
use crate::provider::DashboardProvider;
use crate::window;

/// One opportunity in the offline dataset.
#[derive(Debug, Clone, Deserialize)]
pub struct OpportunityRow {
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "StageName")]
    pub stage_name: String,
    /// Empty cells deserialize to `None`, mirroring a null `Amount`.
    #[serde(rename = "Amount")]
    pub amount: Option<f64>,
    /// `None` for an empty cell; such rows fall outside every date
    /// window and render as `""` in list output.
    #[serde(rename = "CloseDate")]
    pub close_date: Option<NaiveDate>,
    #[serde(rename = "Probability")]
    pub probability: Option<f64>,
    #[serde(rename = "OwnerId")]
    pub owner_id: String,
    #[serde(rename = "Owner.Name")]
    pub owner_name: String,
    #[serde(rename = "Account.Name")]
    pub account_name: String,
    #[serde(rename = "Type")]
    pub opportunity_type: String,
    #[serde(rename = "IsClosed")]
    pub is_closed: bool,
    #[serde(rename = "IsWon")]
    pub is_won: bool,
}

impl OpportunityRow {
    fn to_record(&self) -> OpportunityRecord {
        OpportunityRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            stage_name: self.stage_name.clone(),
            amount: self.amount.unwrap_or(0.0),
            close_date: self
                .close_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            probability: self.probability.unwrap_or(0.0),
            owner_name: self.owner_name.clone(),
            account_name: self.account_name.clone(),
            opportunity_type: self.opportunity_type.clone(),
        }
    }
}

/// Dashboard provider backed by the bundled sample dataset.
///
/// Loaded once at startup and shared across requests; never performs
/// I/O after construction.
#[derive(Debug, Clone)]
pub struct OfflineProvider {
    rows: Vec<OpportunityRow>,
}

impl OfflineProvider {
    /// Load the dataset bundled into the binary.
    pub fn from_embedded() -> Result<Self> {
        Self::from_csv(include_str!("../data/demo_opportunities.csv"))
    }

    /// Parse a dataset from CSV text. Any unreadable row fails the
    /// whole load.
    pub fn from_csv(data: &str) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(data.as_bytes());
        let mut rows = Vec::new();
        for record in reader.deserialize::<OpportunityRow>() {
            let row = record.map_err(|err| {
                Error::with_source(ErrorKind::DataLoad(err.to_string()), err)
            })?;
            rows.push(row);
        }
        if rows.is_empty() {
            return Err(Error::new(ErrorKind::DataLoad(
                "dataset contains no rows".to_string(),
            )));
        }
        Ok(Self { rows })
    }

    /// Build a provider over explicit rows.
    pub fn with_rows(rows: Vec<OpportunityRow>) -> Self {
        Self { rows }
    }

    /// Number of rows in the dataset.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn kpi_summary_at(&self, today: NaiveDate) -> KpiSummary {
        let (q_start, q_end) = window::fiscal_quarter_window(today);
        // A row without a close date never falls inside the window
        let in_quarter = |row: &OpportunityRow| {
            row.close_date
                .is_some_and(|date| date >= q_start && date < q_end)
        };

        let mut open = OpenPipeline::default();
        let mut won = KpiMetric::default();
        let mut lost = KpiMetric::default();

        for row in &self.rows {
            let amount = match row.amount {
                Some(amount) => amount,
                None => continue,
            };
            if !row.is_closed {
                open.count += 1;
                open.total += amount;
            } else if in_quarter(row) {
                if row.is_won {
                    won.count += 1;
                    won.total += amount;
                } else {
                    lost.count += 1;
                    lost.total += amount;
                }
            }
        }

        if open.count > 0 {
            open.average = open.total / open.count as f64;
        }

        KpiSummary {
            open_pipeline: open,
            won_this_quarter: won,
            lost_this_quarter: lost,
        }
    }

    fn pipeline_over_time_at(&self, today: NaiveDate, months: u32) -> Vec<PipelineDataPoint> {
        let cutoff = window::trailing_months_cutoff(today, months);
        // (year, month) keys iterate in chronological order
        let mut buckets: BTreeMap<(i32, u32), (f64, u64)> = BTreeMap::new();
        let dated = self
            .rows
            .iter()
            .filter_map(|row| row.close_date.map(|date| (row, date)))
            .filter(|(_, date)| *date >= cutoff);
        for (row, date) in dated {
            let bucket = buckets.entry((date.year(), date.month())).or_default();
            bucket.0 += row.amount.unwrap_or(0.0);
            bucket.1 += 1;
        }
        buckets
            .into_iter()
            .map(|((year, month), (total, count))| PipelineDataPoint {
                month,
                year,
                total,
                count,
            })
            .collect()
    }

    fn matches_filters(row: &OpportunityRow, params: &ListParams) -> bool {
        let amount = match row.amount {
            Some(amount) => amount,
            None => return false,
        };
        if let Some(ref stage) = params.stage {
            if row.stage_name != *stage {
                return false;
            }
        }
        if let Some(ref owner_id) = params.owner_id {
            if row.owner_id != *owner_id {
                return false;
            }
        }
        if let Some(min_amount) = params.min_amount {
            if amount < min_amount {
                return false;
            }
        }
        true
    }

    fn compare(a: &OpportunityRow, b: &OpportunityRow, key: SortKey) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        let float = |x: f64, y: f64| x.partial_cmp(&y).unwrap_or(Ordering::Equal);
        match key {
            SortKey::CloseDate => a.close_date.cmp(&b.close_date),
            SortKey::Amount => float(a.amount.unwrap_or(0.0), b.amount.unwrap_or(0.0)),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::StageName => a.stage_name.cmp(&b.stage_name),
            SortKey::Probability => float(a.probability.unwrap_or(0.0), b.probability.unwrap_or(0.0)),
            SortKey::OwnerName => a.owner_name.cmp(&b.owner_name),
            SortKey::AccountName => a.account_name.cmp(&b.account_name),
        }
    }
}

impl DashboardProvider for OfflineProvider {
    #[instrument(skip(self))]
    async fn kpi_summary(&self) -> Result<KpiSummary> {
        Ok(self.kpi_summary_at(Utc::now().date_naive()))
    }

    #[instrument(skip(self))]
    async fn stage_breakdown(&self) -> Result<Vec<StageBreakdown>> {
        // BTreeMap gives the ORDER BY StageName ordering
        let mut stages: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
        for row in self.rows.iter().filter(|row| !row.is_closed) {
            let entry = stages.entry(row.stage_name.as_str()).or_default();
            entry.0 += 1;
            entry.1 += row.amount.unwrap_or(0.0);
        }
        Ok(stages
            .into_iter()
            .map(|(stage_name, (count, total_amount))| StageBreakdown {
                stage_name: stage_name.to_string(),
                count,
                total_amount,
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn pipeline_over_time(&self, months: u32) -> Result<Vec<PipelineDataPoint>> {
        validate_months(months)?;
        Ok(self.pipeline_over_time_at(Utc::now().date_naive(), months))
    }

    #[instrument(skip(self), fields(limit = params.limit, offset = params.offset))]
    async fn list_opportunities(&self, params: &ListParams) -> Result<OpportunityList> {
        params.validate()?;
        let sort_key = params.sort_key()?;

        let mut filtered: Vec<&OpportunityRow> = self
            .rows
            .iter()
            .filter(|row| Self::matches_filters(row, params))
            .collect();

        // Stable sort keeps dataset order between ties
        filtered.sort_by(|a, b| {
            let ordering = Self::compare(a, b, sort_key);
            match params.sort_dir {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        let total = filtered.len() as u64;
        let start = (params.offset as usize).min(filtered.len());
        let end = (start + params.limit as usize).min(filtered.len());
        let records = filtered[start..end]
            .iter()
            .map(|row| row.to_record())
            .collect();

        Ok(OpportunityList {
            records,
            total,
            limit: params.limit,
            offset: params.offset,
        })
    }
}
