//! Ties the data provider, the snapshot cache and the pure scoring and
//! valuation engines together behind one async facade.

use analysis_core::{
    freeze, AnalysisError, AnalysisSnapshot, FundamentalsCache, FundamentalsProvider,
    FundamentalsSnapshot, SavedAnalysis, ValuationMode, ValuationResult,
};
use fundamental_analysis::{
    AesyScoreResult, BuffettAnalysis, FundamentalAnalysisEngine, MetricReport,
    QualitativeAssessment,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};
use valuation_engine::wacc::wacc_for_snapshot;
use valuation_engine::{ValuationEngine, ValuationRequest};

pub mod batch;
pub mod cache;

pub use batch::{BatchAnalysisResult, BatchFailure, DEFAULT_BATCH_CONCURRENCY};
pub use cache::{InMemoryFundamentalsCache, DEFAULT_CACHE_TTL_SECS, MAX_CACHE_TTL_SECS};

/// Header block stored with a saved analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockInfo {
    pub symbol: String,
    pub company_name: Option<String>,
    pub price: Option<f64>,
    pub currency: String,
    pub sector: Option<String>,
    pub industry: Option<String>,
}

impl StockInfo {
    fn from_snapshot(snap: &FundamentalsSnapshot) -> Self {
        Self {
            symbol: snap.symbol.clone(),
            company_name: snap.profile.name.clone(),
            price: snap.price(),
            currency: snap.currency().to_string(),
            sector: snap.profile.sector.clone(),
            industry: snap.profile.industry.clone(),
        }
    }
}

pub struct AnalysisOrchestrator {
    provider: Arc<dyn FundamentalsProvider>,
    cache: Arc<dyn FundamentalsCache>,
    fundamental_analyzer: FundamentalAnalysisEngine,
    valuation_engine: ValuationEngine,
    batch_concurrency: usize,
}

fn normalize_symbol(symbol: &str) -> Result<String, AnalysisError> {
    let symbol = symbol.trim().to_uppercase();
    if symbol.is_empty() {
        return Err(AnalysisError::InvalidInput("ticker is required".to_string()));
    }
    Ok(symbol)
}

impl AnalysisOrchestrator {
    pub fn new(
        provider: Arc<dyn FundamentalsProvider>,
        cache: Arc<dyn FundamentalsCache>,
        valuation_engine: ValuationEngine,
    ) -> Self {
        Self {
            provider,
            cache,
            fundamental_analyzer: FundamentalAnalysisEngine::new(),
            valuation_engine,
            batch_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Cap on in-flight symbols during [`batch_analyze`](Self::batch_analyze). Zero is treated as one.
    pub fn with_batch_concurrency(mut self, concurrency: usize) -> Self {
        self.batch_concurrency = concurrency.max(1);
        self
    }

    pub fn batch_concurrency(&self) -> usize {
        self.batch_concurrency
    }

    /// Fetch fundamentals, served from cache unless `force_refresh` is set.
    pub async fn snapshot(
        &self,
        symbol: &str,
        force_refresh: bool,
    ) -> Result<Arc<FundamentalsSnapshot>, AnalysisError> {
        let symbol = normalize_symbol(symbol)?;
        if !force_refresh {
            if let Some(cached) = self.cache.get(&symbol).await {
                return Ok(cached);
            }
        }

        debug!(symbol = %symbol, force_refresh, "Fetching fundamentals from provider");
        let snapshot = Arc::new(self.provider.fetch_fundamentals(&symbol).await?);
        self.cache.put(&symbol, Arc::clone(&snapshot)).await;
        Ok(snapshot)
    }

    pub async fn valuation(
        &self,
        ticker: &str,
        request: &ValuationRequest,
    ) -> Result<ValuationResult, AnalysisError> {
        let snapshot = self.snapshot(ticker, false).await?;
        self.valuation_engine.value(&snapshot, request)
    }

    pub async fn aesy_score(
        &self,
        ticker: &str,
        qualitative: Option<QualitativeAssessment>,
    ) -> Result<AesyScoreResult, AnalysisError> {
        let snapshot = self.snapshot(ticker, false).await?;
        Ok(self.fundamental_analyzer.aesy_score(&snapshot, qualitative))
    }

    /// Metric cards, with ROIC judged against the company's derived WACC.
    pub async fn metric_report(&self, ticker: &str) -> Result<MetricReport, AnalysisError> {
        let snapshot = self.snapshot(ticker, false).await?;
        let mut warnings = Vec::new();
        let wacc = wacc_for_snapshot(&snapshot, &self.valuation_engine.config().wacc, &mut warnings);
        Ok(self
            .fundamental_analyzer
            .metric_report(&snapshot, Some(wacc.wacc * 100.0)))
    }

    pub async fn buffett_analysis(
        &self,
        ticker: &str,
        force_refresh: bool,
    ) -> Result<BuffettAnalysis, AnalysisError> {
        let snapshot = self.snapshot(ticker, force_refresh).await?;
        if !snapshot.has_statements() {
            return Err(AnalysisError::InsufficientData(format!(
                "no annual statements for {}",
                snapshot.symbol
            )));
        }
        Ok(self.fundamental_analyzer.buffett(&snapshot))
    }

    /// Freeze the current analysis of `ticker` for later review. The DCF part
    /// is left null when the company cannot be valued.
    pub async fn capture_analysis(
        &self,
        ticker: &str,
        title: &str,
        mode: ValuationMode,
    ) -> Result<SavedAnalysis, AnalysisError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(AnalysisError::InvalidInput("title is required".to_string()));
        }
        let snapshot = self.snapshot(ticker, false).await?;

        let mut warnings = Vec::new();
        let wacc = wacc_for_snapshot(&snapshot, &self.valuation_engine.config().wacc, &mut warnings);
        let report = self
            .fundamental_analyzer
            .metric_report(&snapshot, Some(wacc.wacc * 100.0));
        let buffett = self.fundamental_analyzer.buffett(&snapshot);
        let aesy = self.fundamental_analyzer.aesy_score(&snapshot, None);

        let dcf_data = match self.valuation_engine.value(&snapshot, &ValuationRequest::new(mode)) {
            Ok(result) => freeze(&result)?,
            Err(e) => {
                warn!(symbol = %snapshot.symbol, error = %e, "Capturing analysis without valuation");
                serde_json::Value::Null
            }
        };

        let parts = AnalysisSnapshot {
            stock_info: freeze(&StockInfo::from_snapshot(&snapshot))?,
            buffett_criteria: freeze(&buffett)?,
            financial_metrics: freeze(&report)?,
            overall_rating: freeze(&aesy)?,
            dcf_data,
        };
        info!(symbol = %snapshot.symbol, title, "Captured analysis");
        Ok(SavedAnalysis::capture(
            snapshot.symbol.clone(),
            title,
            snapshot.profile.name.clone(),
            parts,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::fixtures;
    use async_trait::async_trait;
    use fundamental_analysis::MarketId;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticProvider {
        snapshots: HashMap<String, FundamentalsSnapshot>,
        calls: AtomicUsize,
    }

    impl StaticProvider {
        fn new() -> Self {
            let snapshots = [
                fixtures::quality_compounder(),
                fixtures::loss_maker(),
                fixtures::profile_only(),
            ]
            .into_iter()
            .map(|s| (s.symbol.clone(), s))
            .collect();
            Self { snapshots, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl FundamentalsProvider for StaticProvider {
        async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalsSnapshot, AnalysisError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.snapshots
                .get(symbol)
                .cloned()
                .ok_or_else(|| AnalysisError::ApiError(format!("unknown symbol {}", symbol)))
        }
    }

    fn orchestrator() -> (AnalysisOrchestrator, Arc<StaticProvider>) {
        let provider = Arc::new(StaticProvider::new());
        let orch = AnalysisOrchestrator::new(
            provider.clone(),
            Arc::new(InMemoryFundamentalsCache::default()),
            ValuationEngine::default(),
        );
        (orch, provider)
    }

    #[tokio::test]
    async fn test_snapshot_is_cached() {
        let (orch, provider) = orchestrator();
        orch.snapshot("qual", false).await.unwrap();
        orch.snapshot("QUAL", false).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        orch.snapshot("QUAL", true).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_symbol_rejected() {
        let (orch, provider) = orchestrator();
        let err = orch.snapshot("  ", false).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valuation_through_orchestrator() {
        let (orch, _) = orchestrator();
        let result = orch
            .valuation("QUAL", &ValuationRequest::new(ValuationMode::EpsWoNri))
            .await
            .unwrap();
        assert_eq!(result.ticker, "QUAL");
        assert!(result.fair_value_per_share > 0.0);
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let (orch, _) = orchestrator();
        let orch = orch.with_batch_concurrency(2);
        let symbols = vec!["qual".to_string(), "NOPE".to_string(), "LOSS".to_string(), "EMPTY".to_string()];
        let batch = orch.batch_analyze(&symbols, MarketId::Us, false).await.unwrap();

        let ok: Vec<_> = batch.results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(ok, vec!["QUAL", "LOSS"]);
        let failed: Vec<_> = batch.failures.iter().map(|f| f.symbol.as_str()).collect();
        assert_eq!(failed, vec!["NOPE", "EMPTY"]);
        assert_eq!(batch.failures[0].error, "API_ERROR");
        assert_eq!(batch.failures[1].error, "INSUFFICIENT_DATA");
    }

    #[tokio::test]
    async fn test_batch_rejects_empty_list() {
        let (orch, _) = orchestrator();
        let err = orch.batch_analyze(&[], MarketId::De, false).await.unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");
    }

    #[tokio::test]
    async fn test_capture_freezes_parts() {
        let (orch, _) = orchestrator();
        let saved = orch
            .capture_analysis("QUAL", "Compounder review", ValuationMode::FcfPerShare)
            .await
            .unwrap();
        assert_eq!(saved.ticker, "QUAL");
        assert_eq!(saved.title, "Compounder review");
        assert_eq!(saved.snapshot.stock_info["symbol"], "QUAL");
        assert!(saved.snapshot.dcf_data["fairValuePerShare"].is_number());
        assert!(saved.snapshot.buffett_criteria["criteria"].is_array());
    }

    #[tokio::test]
    async fn test_capture_without_valuation() {
        let (orch, _) = orchestrator();
        let saved = orch
            .capture_analysis("EMPTY", "No statements", ValuationMode::EpsWoNri)
            .await
            .unwrap();
        assert!(saved.snapshot.dcf_data.is_null());
        assert!(orch.capture_analysis("QUAL", " ", ValuationMode::EpsWoNri).await.is_err());
    }
}
