//! Liveness payload for the /health endpoint.

use std::time::Instant;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::routes::ApiState;
use crate::types::ReportWarning;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
    pub records: usize,
    pub duplicates_removed: usize,
    pub purchases: usize,
    pub warnings: Vec<ReportWarning>,
}

/// When the server started serving the report.
#[derive(Debug, Clone, Copy)]
pub struct HealthState {
    started_at: Instant,
}

impl HealthState {
    pub fn new() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn health(State(state): State<ApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.health.uptime_secs(),
        records: state.report.records.len(),
        duplicates_removed: state.report.duplicates_removed,
        purchases: state.report.purchases.len(),
        warnings: state.report.warnings.clone(),
    })
}
