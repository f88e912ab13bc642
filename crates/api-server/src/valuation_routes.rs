use analysis_core::{ValuationMode, ValuationResult};
use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;
use valuation_engine::ValuationRequest;

use crate::{AppError, AppState};

/// Body of `POST /api/valuation`; the GET variant reads the same fields from the query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValuationParams {
    pub ticker: String,
    pub mode: String,
    pub current_price: Option<f64>,
    pub include_tangible_book: bool,
}

impl ValuationParams {
    fn into_request(self) -> Result<(String, ValuationRequest), AppError> {
        let mode: ValuationMode = self.mode.parse()?;
        let request = ValuationRequest {
            mode,
            current_price: self.current_price,
            include_tangible_book: self.include_tangible_book,
        };
        Ok((self.ticker, request))
    }
}

pub fn valuation_routes() -> Router<AppState> {
    Router::new().route("/api/valuation", get(get_valuation).post(post_valuation))
}

async fn run_valuation(state: &AppState, params: ValuationParams) -> Result<Json<ValuationResult>, AppError> {
    let (ticker, request) = params.into_request()?;
    info!(ticker = %ticker, mode = %request.mode, "Valuation requested");
    let result = state.orchestrator.valuation(&ticker, &request).await?;
    Ok(Json(result))
}

async fn post_valuation(
    State(state): State<AppState>,
    payload: Result<Json<ValuationParams>, JsonRejection>,
) -> Result<Json<ValuationResult>, AppError> {
    let Json(params) = payload?;
    run_valuation(&state, params).await
}

async fn get_valuation(
    State(state): State<AppState>,
    query: Result<Query<ValuationParams>, QueryRejection>,
) -> Result<Json<ValuationResult>, AppError> {
    let Query(params) = query?;
    run_valuation(&state, params).await
}

#[cfg(test)]
mod tests {
    use crate::test_support::{get, post};
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_post_valuation() {
        let (status, body) = post("/api/valuation", json!({ "ticker": "qual", "mode": "EPS_WO_NRI" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "QUAL");
        assert_eq!(body["mode"], "EPS_WO_NRI");
        assert!(body["fairValuePerShare"].as_f64().unwrap() > 0.0);
        assert!(body["warnings"].is_array());
    }

    #[tokio::test]
    async fn test_get_valuation_with_price_override() {
        let (status, body) = get("/api/valuation?ticker=QUAL&mode=FCF&currentPrice=25").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "FCF_PER_SHARE");
        assert_eq!(body["price"], 25.0);
    }

    #[tokio::test]
    async fn test_invalid_mode() {
        let (status, body) = post("/api/valuation", json!({ "ticker": "QUAL", "mode": "DCF" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INVALID_MODE");

        let (status, body) = post("/api/valuation", json!({ "ticker": "QUAL" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INVALID_MODE");
    }

    #[tokio::test]
    async fn test_insufficient_data_and_upstream_failure() {
        let (status, body) = post("/api/valuation", json!({ "ticker": "EMPTY", "mode": "EPS_WO_NRI" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INSUFFICIENT_DATA");

        let (status, body) = post("/api/valuation", json!({ "ticker": "GONE", "mode": "EPS_WO_NRI" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "API_ERROR");
        assert!(body["details"].as_str().unwrap().contains("GONE"));
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let (status, body) = post("/api/valuation", json!({ "ticker": 5 })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INVALID_INPUT");
    }
}
