use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use fundamental_analysis::{
    compute_valuation_scores, AesyScoreResult, MetricReport, QualitativeAssessment, ValuationInput,
    ValuationScoresResult,
};
use serde::Deserialize;

use crate::{AppError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AesyScoreRequest {
    pub ticker: String,
    pub qualitative: Option<QualitativeAssessment>,
}

pub fn scoring_routes() -> Router<AppState> {
    Router::new()
        .route("/api/valuation-scores", post(valuation_scores))
        .route("/api/aesy-score", post(aesy_score))
        .route("/api/metrics/:symbol", get(metric_report))
}

/// Pure: scores the supplied inputs without touching the data provider.
async fn valuation_scores(
    payload: Result<Json<ValuationInput>, JsonRejection>,
) -> Result<Json<ValuationScoresResult>, AppError> {
    let Json(input) = payload?;
    Ok(Json(compute_valuation_scores(&input)))
}

async fn aesy_score(
    State(state): State<AppState>,
    payload: Result<Json<AesyScoreRequest>, JsonRejection>,
) -> Result<Json<AesyScoreResult>, AppError> {
    let Json(request) = payload?;
    let result = state
        .orchestrator
        .aesy_score(&request.ticker, request.qualitative)
        .await?;
    Ok(Json(result))
}

async fn metric_report(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<MetricReport>, AppError> {
    Ok(Json(state.orchestrator.metric_report(&symbol).await?))
}
