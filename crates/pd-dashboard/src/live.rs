//! Live provider: dashboard aggregates composed as SOQL against an
//! authenticated CRM session.
//!
//! ## Security
//!
//! Every string filter value passes through
//! [`pipedash_client::security::soql::escape_string`] before
//! interpolation, numeric filters are validated as finite numbers, and
//! the ORDER BY column comes from the sort whitelist, never from raw
//! caller input.

use serde::Deserialize;
use tracing::instrument;

use pipedash_client::security::soql;
use pipedash_client::{ClientConfig, CrmClient, QueryResult};

use crate::error::Result;
use crate::models::{
    KpiMetric, KpiSummary, OpenPipeline, OpportunityList, OpportunityRecord, PipelineDataPoint,
    StageBreakdown,
};
use crate::params::{validate_months, ListParams};
use crate::provider::DashboardProvider;

/// Dashboard provider backed by the CRM query endpoint.
///
/// Bound to one session's instance URL and access token; cheap to
/// construct per request.
#[derive(Debug, Clone)]
pub struct LiveProvider {
    client: CrmClient,
}

impl LiveProvider {
    /// Create a provider for the given session credentials.
    pub fn new(instance_url: impl Into<String>, access_token: impl Into<String>) -> Result<Self> {
        let client = CrmClient::new(instance_url, access_token)?;
        Ok(Self { client })
    }

    /// Create a provider with custom HTTP configuration.
    pub fn with_config(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self> {
        let client = CrmClient::with_config(instance_url, access_token, config)?;
        Ok(Self { client })
    }

    /// WHERE clause shared by the list count and page queries.
    fn list_filter(params: &ListParams) -> String {
        let mut conditions = vec!["Amount != null".to_string()];
        if let Some(ref stage) = params.stage {
            conditions.push(format!("StageName = '{}'", soql::escape_string(stage)));
        }
        if let Some(ref owner_id) = params.owner_id {
            conditions.push(format!("OwnerId = '{}'", soql::escape_string(owner_id)));
        }
        if let Some(min_amount) = params.min_amount {
            conditions.push(format!("Amount >= {}", min_amount));
        }
        conditions.join(" AND ")
    }
}

/// Aggregate row for the stage breakdown query.
#[derive(Debug, Deserialize)]
struct StageRow {
    #[serde(rename = "StageName")]
    stage_name: String,
    #[serde(default)]
    cnt: u64,
    // SUM over all-null amounts comes back as null
    #[serde(default)]
    total_amount: Option<f64>,
}

/// Aggregate row for the monthly trend query.
#[derive(Debug, Deserialize)]
struct PipelineRow {
    month: u32,
    year: i32,
    #[serde(default)]
    total: Option<f64>,
    #[serde(default)]
    cnt: u64,
}

/// Aggregate row for the KPI queries.
#[derive(Debug, Default, Deserialize)]
struct KpiRow {
    #[serde(default)]
    cnt: u64,
    #[serde(default)]
    total: Option<f64>,
    #[serde(default)]
    avg_amount: Option<f64>,
}

impl DashboardProvider for LiveProvider {
    #[instrument(skip(self))]
    async fn kpi_summary(&self) -> Result<KpiSummary> {
        let soql_open = "SELECT COUNT(Id) cnt, SUM(Amount) total, AVG(Amount) avg_amount \
             FROM Opportunity \
             WHERE IsClosed = false AND Amount != null";
        let soql_won = "SELECT COUNT(Id) cnt, SUM(Amount) total \
             FROM Opportunity \
             WHERE IsWon = true AND Amount != null \
             AND CloseDate = THIS_FISCAL_QUARTER";
        let soql_lost = "SELECT COUNT(Id) cnt, SUM(Amount) total \
             FROM Opportunity \
             WHERE IsWon = false AND IsClosed = true AND Amount != null \
             AND CloseDate = THIS_FISCAL_QUARTER";

        // The three aggregates are independent; issue them concurrently.
        let (open_result, won_result, lost_result) = tokio::try_join!(
            self.client.query::<KpiRow>(soql_open),
            self.client.query::<KpiRow>(soql_won),
            self.client.query::<KpiRow>(soql_lost),
        )?;

        let first = |mut r: QueryResult<KpiRow>| {
            if r.records.is_empty() {
                KpiRow::default()
            } else {
                r.records.swap_remove(0)
            }
        };
        let open = first(open_result);
        let won = first(won_result);
        let lost = first(lost_result);

        Ok(KpiSummary {
            open_pipeline: OpenPipeline {
                count: open.cnt,
                total: open.total.unwrap_or(0.0),
                average: open.avg_amount.unwrap_or(0.0),
            },
            won_this_quarter: KpiMetric {
                count: won.cnt,
                total: won.total.unwrap_or(0.0),
            },
            lost_this_quarter: KpiMetric {
                count: lost.cnt,
                total: lost.total.unwrap_or(0.0),
            },
        })
    }

    #[instrument(skip(self))]
    async fn stage_breakdown(&self) -> Result<Vec<StageBreakdown>> {
        let soql = "SELECT StageName, COUNT(Id) cnt, SUM(Amount) total_amount \
             FROM Opportunity \
             WHERE IsClosed = false \
             GROUP BY StageName \
             ORDER BY StageName";
        let result: QueryResult<StageRow> = self.client.query(soql).await?;
        Ok(result
            .records
            .into_iter()
            .map(|row| StageBreakdown {
                stage_name: row.stage_name,
                count: row.cnt,
                total_amount: row.total_amount.unwrap_or(0.0),
            })
            .collect())
    }

    #[instrument(skip(self))]
    async fn pipeline_over_time(&self, months: u32) -> Result<Vec<PipelineDataPoint>> {
        validate_months(months)?;
        let soql = format!(
            "SELECT CALENDAR_MONTH(CloseDate) month, \
             CALENDAR_YEAR(CloseDate) year, \
             SUM(Amount) total, COUNT(Id) cnt \
             FROM Opportunity \
             WHERE CloseDate = LAST_N_MONTHS:{months} \
             GROUP BY CALENDAR_MONTH(CloseDate), CALENDAR_YEAR(CloseDate) \
             ORDER BY CALENDAR_YEAR(CloseDate), CALENDAR_MONTH(CloseDate)"
        );
        let result: QueryResult<PipelineRow> = self.client.query(&soql).await?;
        Ok(result
            .records
            .into_iter()
            .map(|row| PipelineDataPoint {
                month: row.month,
                year: row.year,
                total: row.total.unwrap_or(0.0),
                count: row.cnt,
            })
            .collect())
    }

    #[instrument(skip(self), fields(limit = params.limit, offset = params.offset))]
    async fn list_opportunities(&self, params: &ListParams) -> Result<OpportunityList> {
        params.validate()?;
        let sort_key = params.sort_key()?;
        let filter = Self::list_filter(params);

        let count_soql = format!("SELECT COUNT() FROM Opportunity WHERE {filter}");
        let count_result: QueryResult<serde_json::Value> =
            self.client.query(&count_soql).await?;
        let total = count_result.total_size;

        let page_soql = format!(
            "SELECT Id, Name, StageName, Amount, CloseDate, \
             Probability, Owner.Name, Account.Name, Type \
             FROM Opportunity WHERE {filter} \
             ORDER BY {column} {direction} \
             LIMIT {limit} OFFSET {offset}",
            column = sort_key.soql_column(),
            direction = params.sort_dir.as_soql(),
            limit = params.limit,
            offset = params.offset,
        );
        let page_result: QueryResult<serde_json::Value> = self.client.query(&page_soql).await?;

        Ok(OpportunityList {
            records: page_result
                .records
                .iter()
                .map(OpportunityRecord::from_crm_json)
                .collect(),
            total,
            limit: params.limit,
            offset: params.offset,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SortDirection;
    use wiremock::matchers::{method, path, query_param, query_param_contains};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base: &str) -> LiveProvider {
        LiveProvider::with_config(
            base,
            "test-token",
            ClientConfig::builder().without_retry().build(),
        )
        .unwrap()
    }

    #[test]
    fn test_list_filter_defaults_to_amount_not_null() {
        let params = ListParams::default();
        assert_eq!(LiveProvider::list_filter(&params), "Amount != null");
    }

    #[test]
    fn test_list_filter_combines_conditions() {
        let params = ListParams {
            stage: Some("Proposal/Price Quote".to_string()),
            owner_id: Some("005A0000001".to_string()),
            min_amount: Some(10000.0),
            ..ListParams::default()
        };
        assert_eq!(
            LiveProvider::list_filter(&params),
            "Amount != null AND StageName = 'Proposal/Price Quote' \
             AND OwnerId = '005A0000001' AND Amount >= 10000"
        );
    }

    #[test]
    fn test_list_filter_escapes_quotes() {
        let params = ListParams {
            stage: Some("x' OR Name != '".to_string()),
            ..ListParams::default()
        };
        let filter = LiveProvider::list_filter(&params);
        assert_eq!(filter, "Amount != null AND StageName = 'x\\' OR Name != \\''");
    }

    #[tokio::test]
    async fn test_stage_breakdown_maps_aggregate_rows() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/services/data/v59.0/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 2,
                "done": true,
                "records": [
                    {"StageName": "Negotiation/Review", "cnt": 3, "total_amount": 150000.0},
                    {"StageName": "Prospecting", "cnt": 5, "total_amount": null}
                ]
            })))
            .mount(&mock_server)
            .await;

        let rows = provider(&mock_server.uri()).stage_breakdown().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stage_name, "Negotiation/Review");
        assert_eq!(rows[0].count, 3);
        assert_eq!(rows[1].total_amount, 0.0);
    }

    #[tokio::test]
    async fn test_kpi_summary_three_queries() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/services/data/v59.0/query"))
            .and(query_param_contains("q", "IsClosed = false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 1,
                "done": true,
                "records": [{"cnt": 10, "total": 500000.0, "avg_amount": 50000.0}]
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/services/data/v59.0/query"))
            .and(query_param_contains("q", "IsWon = true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 1,
                "done": true,
                "records": [{"cnt": 4, "total": 200000.0}]
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/services/data/v59.0/query"))
            .and(query_param_contains("q", "IsWon = false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 1,
                "done": true,
                "records": [{"cnt": 2, "total": 80000.0}]
            })))
            .mount(&mock_server)
            .await;

        let summary = provider(&mock_server.uri()).kpi_summary().await.unwrap();
        assert_eq!(summary.open_pipeline.count, 10);
        assert_eq!(summary.open_pipeline.average, 50000.0);
        assert_eq!(summary.won_this_quarter.total, 200000.0);
        assert_eq!(summary.lost_this_quarter.count, 2);
    }

    #[tokio::test]
    async fn test_kpi_summary_empty_result_yields_zeros() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/services/data/v59.0/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 0,
                "done": true,
                "records": []
            })))
            .mount(&mock_server)
            .await;

        let summary = provider(&mock_server.uri()).kpi_summary().await.unwrap();
        assert_eq!(summary.open_pipeline.count, 0);
        assert_eq!(summary.open_pipeline.total, 0.0);
        assert_eq!(summary.open_pipeline.average, 0.0);
    }

    #[tokio::test]
    async fn test_pipeline_over_time_uses_trailing_window_literal() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/services/data/v59.0/query"))
            .and(query_param_contains("q", "LAST_N_MONTHS:6"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 2,
                "done": true,
                "records": [
                    {"month": 7, "year": 2026, "total": 90000.0, "cnt": 3},
                    {"month": 8, "year": 2026, "total": 120000.0, "cnt": 4}
                ]
            })))
            .mount(&mock_server)
            .await;

        let points = provider(&mock_server.uri())
            .pipeline_over_time(6)
            .await
            .unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].month, 7);
        assert_eq!(points[1].total, 120000.0);
    }

    #[tokio::test]
    async fn test_pipeline_over_time_rejects_zero_months() {
        let err = provider("https://na1.example.com")
            .pipeline_over_time(0)
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
    }

    #[tokio::test]
    async fn test_list_opportunities_count_then_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/services/data/v59.0/query"))
            .and(query_param(
                "q",
                "SELECT COUNT() FROM Opportunity WHERE Amount != null",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 57,
                "done": true,
                "records": []
            })))
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/services/data/v59.0/query"))
            .and(query_param_contains("q", "ORDER BY Amount DESC"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "totalSize": 2,
                "done": true,
                "records": [
                    {
                        "Id": "006A", "Name": "Big Deal", "StageName": "Negotiation/Review",
                        "Amount": 250000.0, "CloseDate": "2026-09-15", "Probability": 80.0,
                        "Owner": {"Name": "Sarah Johnson"},
                        "Account": {"Name": "Acme Corp"}, "Type": "New Customer"
                    },
                    {
                        "Id": "006B", "Name": "Smaller Deal", "StageName": "Prospecting",
                        "Amount": 40000.0, "CloseDate": "2026-11-01", "Probability": 20.0,
                        "Owner": {"Name": "James Wilson"},
                        "Account": {"Name": "Initech"}, "Type": "New Customer"
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let params = ListParams {
            sort_by: "Amount".to_string(),
            sort_dir: SortDirection::Desc,
            limit: 2,
            ..ListParams::default()
        };
        let list = provider(&mock_server.uri())
            .list_opportunities(&params)
            .await
            .unwrap();

        assert_eq!(list.total, 57);
        assert_eq!(list.limit, 2);
        assert_eq!(list.records.len(), 2);
        assert_eq!(list.records[0].name, "Big Deal");
        assert_eq!(list.records[0].owner_name, "Sarah Johnson");
    }

    #[tokio::test]
    async fn test_list_opportunities_rejects_bad_params_before_any_call() {
        let params = ListParams {
            limit: 0,
            ..ListParams::default()
        };
        let err = provider("https://na1.example.com")
            .list_opportunities(&params)
            .await
            .unwrap_err();
        assert!(err.is_validation_error());
    }
}
