use analysis_orchestrator::BatchAnalysisResult;
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use fundamental_analysis::MarketId;
use serde::Deserialize;

use crate::{AppError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchAnalyzeRequest {
    pub symbols: Vec<String>,
    /// Defaults to `US` when omitted.
    pub market_id: Option<String>,
    pub force_refresh: bool,
}

pub fn batch_routes() -> Router<AppState> {
    Router::new().route("/api/batch-analyze", post(batch_analyze))
}

async fn batch_analyze(
    State(state): State<AppState>,
    payload: Result<Json<BatchAnalyzeRequest>, JsonRejection>,
) -> Result<Json<BatchAnalysisResult>, AppError> {
    let Json(request) = payload?;
    let market = match request.market_id.as_deref() {
        Some(id) => id.parse::<MarketId>()?,
        None => MarketId::Us,
    };
    let result = state
        .orchestrator
        .batch_analyze(&request.symbols, market, request.force_refresh)
        .await?;
    Ok(Json(result))
}

#[cfg(test)]
mod tests {
    use crate::test_support::post;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_batch_reports_failures_inline() {
        let (status, body) = post(
            "/api/batch-analyze",
            json!({ "symbols": ["QUAL", "GONE"], "marketId": "US" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["results"][0]["symbol"], "QUAL");
        assert_eq!(body["results"][0]["maxScore"], 9);
        assert_eq!(body["failures"][0]["symbol"], "GONE");
        assert_eq!(body["failures"][0]["error"], "API_ERROR");
    }

    #[tokio::test]
    async fn test_batch_suffixes_symbols() {
        let (status, body) = post(
            "/api/batch-analyze",
            json!({ "symbols": ["sap"], "marketId": "DE", "forceRefresh": true }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["failures"][0]["symbol"], "SAP.DE");
    }

    #[tokio::test]
    async fn test_batch_rejects_bad_market_and_empty_list() {
        let (status, body) = post("/api/batch-analyze", json!({ "symbols": ["QUAL"], "marketId": "JP" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INVALID_INPUT");

        let (status, _) = post("/api/batch-analyze", json!({ "symbols": [] })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }
}
