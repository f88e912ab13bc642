//! Buffett screening over many symbols with bounded concurrency.

use analysis_core::AnalysisError;
use fundamental_analysis::{BuffettAnalysis, MarketId};
use futures_util::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::AnalysisOrchestrator;

pub const DEFAULT_BATCH_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchFailure {
    pub symbol: String,
    pub error: String,
    pub details: String,
}

impl BatchFailure {
    fn new(symbol: String, err: &AnalysisError) -> Self {
        Self {
            symbol,
            error: err.code().to_string(),
            details: err.details().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchAnalysisResult {
    pub results: Vec<BuffettAnalysis>,
    pub failures: Vec<BatchFailure>,
}

impl AnalysisOrchestrator {
    /// Screen `symbols` on `market`. One failing symbol never aborts the
    /// batch; it is reported in `failures` instead. Results keep input order.
    pub async fn batch_analyze(
        &self,
        symbols: &[String],
        market: MarketId,
        force_refresh: bool,
    ) -> Result<BatchAnalysisResult, AnalysisError> {
        if symbols.is_empty() {
            return Err(AnalysisError::InvalidInput("symbols must not be empty".to_string()));
        }
        info!(count = symbols.len(), market = %market, force_refresh, "Starting batch analysis");

        let mut outcomes: Vec<(usize, String, Result<BuffettAnalysis, AnalysisError>)> =
            stream::iter(symbols.iter().cloned().enumerate())
                .map(|(idx, raw)| async move {
                    let symbol = market.resolve_symbol(&raw);
                    let outcome = self.buffett_analysis(&symbol, force_refresh).await;
                    (idx, symbol, outcome)
                })
                .buffer_unordered(self.batch_concurrency())
                .collect()
                .await;
        outcomes.sort_by_key(|(idx, _, _)| *idx);

        let mut batch = BatchAnalysisResult::default();
        for (_, symbol, outcome) in outcomes {
            match outcome {
                Ok(analysis) => batch.results.push(analysis),
                Err(e) => {
                    warn!(symbol = %symbol, error = %e, "Batch symbol failed");
                    batch.failures.push(BatchFailure::new(symbol, &e));
                }
            }
        }
        info!(
            succeeded = batch.results.len(),
            failed = batch.failures.len(),
            "Batch analysis complete"
        );
        Ok(batch)
    }
}
