use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::api::health::{health, HealthState};
use crate::error::{AppError, Result};
use crate::hypotheses::{growth_table, GrowthRow, HypothesisResult};
use crate::overview::{
    average_metrics, mean_price_by, AttributeMean, DatasetFilter, PriceAttribute, ZipMetrics,
};
use crate::report::{Report, SeasonMedianRow, ZipMedianRow};
use crate::types::{FinanceSummary, Flag, PurchaseRecommendation, SellingRecommendation};

#[derive(Clone)]
pub struct ApiState {
    pub report: Arc<Report>,
    pub health: HealthState,
}

impl ApiState {
    pub fn new(report: Arc<Report>) -> Self {
        Self {
            report,
            health: HealthState::new(),
        }
    }
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/dataset", get(get_dataset))
        .route("/zip-medians", get(get_zip_medians))
        .route("/season-medians", get(get_season_medians))
        .route("/purchases", get(get_purchases))
        .route("/sellings", get(get_sellings))
        .route("/finance", get(get_finance))
        .route("/hypotheses", get(get_hypotheses))
        .route("/metrics/average", get(get_average_metrics))
        .route("/metrics/price-by/:attribute", get(get_price_by))
        .route("/growth/yr-built", get(get_growth_yr_built))
        .route("/growth/year-month", get(get_growth_year_month))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Query param structs
// ---------------------------------------------------------------------------

/// Comma-separated lists; absent or empty means no restriction.
#[derive(Debug, Default, Deserialize)]
pub struct DatasetQuery {
    pub zipcodes: Option<String>,
    pub water_view: Option<String>,
    pub condition_good: Option<String>,
    pub columns: Option<String>,
}

impl DatasetQuery {
    fn into_filter(self) -> Result<DatasetFilter> {
        Ok(DatasetFilter {
            zipcodes: split_list("zipcodes", self.zipcodes.as_deref())?,
            water_view: split_list("water_view", self.water_view.as_deref())?,
            condition_good: split_list("condition_good", self.condition_good.as_deref())?,
            columns: split_list("columns", self.columns.as_deref())?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub min: Option<i64>,
    pub max: Option<i64>,
    pub zipcodes: Option<String>,
    pub water_view: Option<String>,
    pub condition_good: Option<String>,
}

impl RangeQuery {
    fn filter(&self) -> Result<DatasetFilter> {
        DatasetQuery {
            zipcodes: self.zipcodes.clone(),
            water_view: self.water_view.clone(),
            condition_good: self.condition_good.clone(),
            columns: None,
        }
        .into_filter()
    }
}

#[derive(Debug, Deserialize)]
pub struct GrowthQuery {
    pub bathrooms: Option<f64>,
    pub renovated: Option<String>,
}

fn split_list<T>(field: &str, raw: Option<&str>) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|e| AppError::InvalidQuery(format!("{field}: '{s}': {e}")))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn get_dataset(
    State(state): State<ApiState>,
    Query(params): Query<DatasetQuery>,
) -> Result<Json<Vec<Value>>> {
    let filter = params.into_filter()?;
    Ok(Json(filter.select(&state.report.records)?))
}

async fn get_zip_medians(State(state): State<ApiState>) -> Json<Vec<ZipMedianRow>> {
    Json(state.report.zip_median_rows())
}

async fn get_season_medians(State(state): State<ApiState>) -> Json<Vec<SeasonMedianRow>> {
    Json(state.report.season_median_rows())
}

async fn get_purchases(State(state): State<ApiState>) -> Json<Vec<PurchaseRecommendation>> {
    Json(state.report.purchases.clone())
}

async fn get_sellings(State(state): State<ApiState>) -> Json<Vec<SellingRecommendation>> {
    Json(state.report.sellings.clone())
}

async fn get_finance(State(state): State<ApiState>) -> Json<FinanceSummary> {
    Json(state.report.finance)
}

async fn get_hypotheses(State(state): State<ApiState>) -> Json<Vec<HypothesisResult>> {
    Json(state.report.hypotheses.clone())
}

async fn get_average_metrics(
    State(state): State<ApiState>,
    Query(params): Query<DatasetQuery>,
) -> Result<Json<Vec<ZipMetrics>>> {
    let filter = params.into_filter()?;
    Ok(Json(average_metrics(filter.apply(&state.report.records))))
}

async fn get_price_by(
    State(state): State<ApiState>,
    Path(attribute): Path<String>,
    Query(params): Query<RangeQuery>,
) -> Result<Json<Vec<AttributeMean>>> {
    let attribute: PriceAttribute = attribute.parse()?;
    let filter = params.filter()?;
    Ok(Json(mean_price_by(
        filter.apply(&state.report.records),
        attribute,
        params.min,
        params.max,
    )))
}

async fn get_growth_yr_built(State(state): State<ApiState>) -> Json<Vec<GrowthRow<i32>>> {
    Json(growth_table(&state.report.records, |r| r.yr_built))
}

async fn get_growth_year_month(
    State(state): State<ApiState>,
    Query(params): Query<GrowthQuery>,
) -> Result<Json<Vec<GrowthRow<String>>>> {
    let renovated: Vec<Flag> = split_list("renovated", params.renovated.as_deref())?;
    let records = state.report.records.iter().filter(|r| {
        params.bathrooms.map_or(true, |b| r.bathrooms == b)
            && (renovated.is_empty() || renovated.contains(&r.renovated))
    });
    Ok(Json(growth_table(records, |r| r.year_month.clone())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_reader;
    use crate::loader::tests::{csv_of, row};
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    fn app() -> Router {
        let data = csv_of(&[
            row(1, "2014-06-01", 100.0, 98001, 1, 5),
            row(2, "2014-06-02", 200.0, 98001, 1, 5),
            row(3, "2014-12-01", 300.0, 98002, 0, 3),
        ]);
        let report = Report::build(load_reader(data.as_bytes()).unwrap());
        router(ApiState::new(Arc::new(report)))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let (status, json) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(json["records"], 3);
        assert_eq!(json["purchases"], 1);
    }

    #[tokio::test]
    async fn serves_recommendations() {
        let (status, json) = get_json("/purchases").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["id"], 1);
        assert_eq!(json[0]["median_price"], 150.0);

        let (_, json) = get_json("/sellings").await;
        assert_eq!(json[0]["selling_moment"], "good");
        assert_eq!(json[0]["season"], "Jun to Aug");

        let (_, json) = get_json("/finance").await;
        assert_eq!(json["total_cost"], 100.0);

        let (_, json) = get_json("/zip-medians").await;
        assert_eq!(json[0]["zipcode"], 98001);
        assert_eq!(json[1]["median_price"], 300.0);

        let (_, json) = get_json("/season-medians").await;
        assert_eq!(json[0]["season"], "Jun to Aug");
        assert_eq!(json[0]["median_price"], 150.0);

        let (_, json) = get_json("/hypotheses").await;
        assert_eq!(json.as_array().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn dataset_filters_and_projects() {
        let (status, json) = get_json("/dataset?zipcodes=98002&columns=id,water_view").await;
        assert_eq!(status, StatusCode::OK);
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["id"], 3);
        assert_eq!(rows[0]["water_view"], "no");
        assert!(rows[0].get("price").is_none());

        let (_, json) = get_json("/dataset?water_view=yes&condition_good=yes").await;
        assert_eq!(json.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn bad_queries_are_rejected() {
        let (status, _) = get_json("/dataset?columns=colour").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json("/dataset?water_view=perhaps").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get_json("/metrics/price-by/sqft").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn metrics_and_growth() {
        let (_, json) = get_json("/metrics/average?zipcodes=98001").await;
        assert_eq!(json[0]["total_ids"], 2);
        assert_eq!(json[0]["avg_price"], 150.0);

        let (_, json) = get_json("/metrics/price-by/month?min=12&max=12").await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["mean_price"], 300.0);

        let (_, json) = get_json("/growth/year-month?bathrooms=2").await;
        let rows = json.as_array().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["key"], "2014-06");
        assert_eq!(rows[0]["growth_pct"], 0.0);
        assert_eq!(rows[1]["growth_pct"], 100.0);

        let (_, json) = get_json("/growth/year-month?renovated=yes").await;
        assert!(json.as_array().unwrap().is_empty());

        let (_, json) = get_json("/growth/yr-built").await;
        assert_eq!(json.as_array().unwrap().len(), 1);
    }
}
