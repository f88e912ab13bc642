//! HTTP surface for valuation, scoring and batch screening.

use analysis_core::AnalysisError;
use analysis_orchestrator::{AnalysisOrchestrator, InMemoryFundamentalsCache};
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use fmp_client::FmpClient;
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use valuation_engine::ValuationEngine;

pub mod batch_routes;
pub mod config;
pub mod saved_routes;
pub mod scoring_routes;
pub mod valuation_routes;

pub use config::ServerConfig;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<AnalysisOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: AnalysisOrchestrator) -> Self {
        Self { orchestrator: Arc::new(orchestrator) }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub details: String,
}

/// Error returned by every handler; renders as `{ error, details }`.
#[derive(Debug)]
pub struct AppError(pub AnalysisError);

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self(AnalysisError::InvalidInput(rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self(AnalysisError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::UNPROCESSABLE_ENTITY
        } else {
            error!(code = self.0.code(), error = %self.0, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };
        let body = ErrorBody {
            error: self.0.code(),
            details: self.0.details().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .merge(valuation_routes::valuation_routes())
        .merge(scoring_routes::scoring_routes())
        .merge(batch_routes::batch_routes())
        .merge(saved_routes::saved_routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub fn build_state(config: &ServerConfig) -> AppState {
    let mut client = FmpClient::new(config.fmp_api_key.clone(), config.fmp_rate_limit);
    if let Some(base_url) = &config.fmp_base_url {
        client = client.with_base_url(base_url.clone());
    }
    let orchestrator = AnalysisOrchestrator::new(
        Arc::new(client),
        Arc::new(InMemoryFundamentalsCache::new(config.cache_ttl_secs)),
        ValuationEngine::new(config.valuation),
    )
    .with_batch_concurrency(config.batch_concurrency);
    AppState::new(orchestrator)
}

pub async fn run_server() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;
    let app = build_router(build_state(&config));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "API server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
