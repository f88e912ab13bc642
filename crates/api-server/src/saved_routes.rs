use analysis_core::{SavedAnalysis, ValuationMode};
use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use serde::Deserialize;

use crate::{AppError, AppState};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptureRequest {
    pub ticker: String,
    pub title: String,
    /// Valuation basis for the frozen DCF part; `EPS_WO_NRI` when omitted.
    pub mode: Option<String>,
}

pub fn saved_routes() -> Router<AppState> {
    Router::new().route("/api/saved-analyses", post(capture_analysis))
}

/// Returns a frozen copy of the current analysis. Persisting it is the caller's job.
async fn capture_analysis(
    State(state): State<AppState>,
    payload: Result<Json<CaptureRequest>, JsonRejection>,
) -> Result<Json<SavedAnalysis>, AppError> {
    let Json(request) = payload?;
    let mode = match request.mode.as_deref() {
        Some(mode) => mode.parse::<ValuationMode>()?,
        None => ValuationMode::EpsWoNri,
    };
    let saved = state
        .orchestrator
        .capture_analysis(&request.ticker, &request.title, mode)
        .await?;
    Ok(Json(saved))
}

#[cfg(test)]
mod tests {
    use crate::test_support::post;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_capture() {
        let (status, body) = post(
            "/api/saved-analyses",
            json!({ "ticker": "QUAL", "title": "Q4 check", "mode": "FCF_PER_SHARE" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["title"], "Q4 check");
        assert_eq!(body["snapshot"]["dcfData"]["mode"], "FCF_PER_SHARE");
        assert!(body["savedAt"].is_string());
    }

    #[tokio::test]
    async fn test_capture_requires_title() {
        let (status, body) = post("/api/saved-analyses", json!({ "ticker": "QUAL" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], "INVALID_INPUT");
    }
}
