use async_trait::async_trait;
use std::sync::Arc;

use crate::{AnalysisError, FundamentalsSnapshot};

/// Source of raw fundamentals for a ticker (the upstream data provider).
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalsSnapshot, AnalysisError>;
}

/// Cache collaborator for fetched snapshots, injected into the orchestrator.
#[async_trait]
pub trait FundamentalsCache: Send + Sync {
    async fn get(&self, symbol: &str) -> Option<Arc<FundamentalsSnapshot>>;
    async fn put(&self, symbol: &str, snapshot: Arc<FundamentalsSnapshot>);
}
