mod api;
mod attributes;
mod config;
mod error;
mod export;
mod hypotheses;
mod loader;
mod overview;
mod report;
mod stats;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::hypotheses::{HypothesisResult, Unit};
use crate::report::Report;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Load and clean ---
    let dataset = loader::load_path(&cfg.data_path).await?;
    info!(
        "Loaded {} properties from {} ({} duplicate sales dropped)",
        dataset.records.len(),
        cfg.data_path,
        dataset.duplicates_removed,
    );

    // --- Recommendation pipeline ---
    let report = Report::build(dataset);

    for h in &report.hypotheses {
        log_hypothesis(h);
    }

    let f = &report.finance;
    info!(
        event = "FINANCE",
        total_cost = f.total_cost,
        total_revenue = f.total_revenue,
        net_profit = f.net_profit,
        "Total purchase will cost US$ {:.2} | total sale will generate US$ {:.2} | total profit will be US$ {:.2}",
        f.total_cost, f.total_revenue, f.net_profit,
    );

    // --- Exports ---
    let (purchase_path, selling_path) = export::write_reports(&cfg.output_dir, &report).await?;
    info!(
        "Wrote {} purchase recommendations to {} and {} selling recommendations to {}",
        report.purchases.len(),
        purchase_path.display(),
        report.sellings.len(),
        selling_path.display(),
    );

    if !cfg.serve_api {
        return Ok(());
    }

    // --- HTTP API server ---
    let app = router(ApiState::new(Arc::new(report)));
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}

fn log_hypothesis(h: &HypothesisResult) {
    let unit = match h.unit {
        Unit::Percent => "%",
        Unit::Years => " years",
    };
    match (h.observed, h.holds) {
        (Some(observed), Some(holds)) => info!(
            event = "HYPOTHESIS",
            number = h.number,
            observed,
            holds,
            "H{} {} | observed: {:.2}{} | {}",
            h.number,
            h.claim,
            observed,
            unit,
            if holds { "TRUE" } else { "FALSE" },
        ),
        _ => warn!(
            event = "HYPOTHESIS",
            number = h.number,
            "H{} {} | not enough data to compare groups",
            h.number,
            h.claim,
        ),
    }
}
