//! Prints the four dashboard views from the bundled sample dataset.
//!
//! ```sh
//! cargo run --bin demo-dashboard
//! ```

use std::sync::Arc;

use pipedash_api::auth::SessionStore;
use pipedash_api::dashboard::{DashboardConfig, DashboardProvider, Gateway, ListParams};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = DashboardConfig::from_env().with_demo_mode(true);
    let gateway = Gateway::new(config, Arc::new(SessionStore::new()))?;
    let provider = gateway.provider(None)?;

    let kpis = provider.kpi_summary().await?;
    println!("== KPI summary ==");
    println!(
        "open pipeline: {} deals, ${:.0} total, ${:.0} average",
        kpis.open_pipeline.count, kpis.open_pipeline.total, kpis.open_pipeline.average
    );
    println!(
        "won this quarter: {} deals, ${:.0}",
        kpis.won_this_quarter.count, kpis.won_this_quarter.total
    );
    println!(
        "lost this quarter: {} deals, ${:.0}",
        kpis.lost_this_quarter.count, kpis.lost_this_quarter.total
    );

    println!("\n== Pipeline by stage ==");
    for stage in provider.stage_breakdown().await? {
        println!(
            "{:<22} {:>3} deals  ${:.0}",
            stage.stage_name, stage.count, stage.total_amount
        );
    }

    println!("\n== Pipeline over time (12 months) ==");
    for point in provider.pipeline_over_time(12).await? {
        println!(
            "{}-{:02}  {:>3} deals  ${:.0}",
            point.year, point.month, point.count, point.total
        );
    }

    println!("\n== Top opportunities by amount ==");
    let params = ListParams {
        sort_by: "Amount".to_string(),
        limit: 10,
        ..ListParams::default()
    };
    let list = provider.list_opportunities(&params).await?;
    for record in &list.records {
        println!(
            "{:<48} {:<22} ${:.0}  closes {}",
            record.name, record.stage_name, record.amount, record.close_date
        );
    }
    println!("({} of {} shown)", list.records.len(), list.total);

    Ok(())
}
