//! Deterministic fundamental scoring over a [`FundamentalsSnapshot`].
//!
//! Everything here is pure and synchronous: metric derivation, per-metric
//! scorers, the Aesy composite, the 0-21 valuation aggregate and the
//! Buffett checklist.

pub mod aesy;
pub mod bands;
pub mod buffett;
pub mod cards;
pub mod history;
pub mod metrics;
pub mod presets;
pub mod scorers;
pub mod stats;
pub mod valuation_scores;

use analysis_core::FundamentalsSnapshot;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use aesy::{compute_aesy_score, AesyScoreResult, QualitativeAssessment, QualitativeOutcome, StockData};
pub use buffett::{analyze_buffett, BuffettAnalysis, MarketId};
pub use cards::{build_metric_cards, MetricCard, MetricId};
pub use history::DisplayValue;
pub use metrics::FinancialMetrics;
pub use presets::IndustryPreset;
pub use scorers::ScoringContext;
pub use valuation_scores::{compute_valuation_scores, ValuationInput, ValuationScoresResult};

/// Metric cards for one company, as served to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricReport {
    pub symbol: String,
    pub company_name: Option<String>,
    pub preset: IndustryPreset,
    pub cards: Vec<MetricCard>,
    pub metrics: FinancialMetrics,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FundamentalAnalysisEngine;

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn metrics(&self, snapshot: &FundamentalsSnapshot) -> FinancialMetrics {
        FinancialMetrics::from_snapshot(snapshot)
    }

    fn context(&self, snapshot: &FundamentalsSnapshot, wacc_pct: Option<f64>) -> ScoringContext {
        ScoringContext {
            preset: IndustryPreset::from_sector(
                snapshot.profile.sector.as_deref(),
                snapshot.profile.industry.as_deref(),
            ),
            wacc_pct,
            industry_pe: None,
        }
    }

    /// Score every metric card. `wacc_pct` feeds the ROIC spread test.
    pub fn metric_report(&self, snapshot: &FundamentalsSnapshot, wacc_pct: Option<f64>) -> MetricReport {
        let metrics = self.metrics(snapshot);
        let ctx = self.context(snapshot, wacc_pct);
        let cards = build_metric_cards(&metrics, &ctx);
        debug!(
            symbol = %snapshot.symbol,
            preset = ?ctx.preset,
            cards = cards.len(),
            "Scored metric cards"
        );
        MetricReport {
            symbol: snapshot.symbol.clone(),
            company_name: snapshot.profile.name.clone(),
            preset: ctx.preset,
            cards,
            metrics,
        }
    }

    pub fn aesy_score(
        &self,
        snapshot: &FundamentalsSnapshot,
        qualitative: Option<QualitativeAssessment>,
    ) -> AesyScoreResult {
        let data = StockData {
            symbol: snapshot.symbol.clone(),
            company_name: snapshot.profile.name.clone(),
            metrics: self.metrics(snapshot),
            qualitative,
        };
        let result = compute_aesy_score(&data);
        debug!(symbol = %snapshot.symbol, score = ?result.aesy_score, "Computed Aesy score");
        result
    }

    pub fn valuation_scores(&self, snapshot: &FundamentalsSnapshot) -> ValuationScoresResult {
        let metrics = self.metrics(snapshot);
        compute_valuation_scores(&ValuationInput::from_metrics(&metrics, None))
    }

    pub fn buffett(&self, snapshot: &FundamentalsSnapshot) -> BuffettAnalysis {
        let metrics = self.metrics(snapshot);
        analyze_buffett(
            &snapshot.symbol,
            snapshot.profile.name.clone(),
            snapshot.currency(),
            &metrics,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::fixtures;

    #[test]
    fn test_engine_uses_sector_preset() {
        let engine = FundamentalAnalysisEngine::new();
        let report = engine.metric_report(&fixtures::quality_compounder(), Some(9.0));
        assert_eq!(report.preset, IndustryPreset::Software);
        assert_eq!(report.cards.len(), 20);
        assert_eq!(report.company_name.as_deref(), Some("Quality Compounder Inc."));
    }

    #[test]
    fn test_engine_is_deterministic() {
        let engine = FundamentalAnalysisEngine::new();
        let snap = fixtures::quality_compounder();
        assert_eq!(engine.aesy_score(&snap, None), engine.aesy_score(&snap, None));
        assert_eq!(engine.valuation_scores(&snap), engine.valuation_scores(&snap));
    }

    #[test]
    fn test_engine_handles_empty_snapshot() {
        let engine = FundamentalAnalysisEngine::new();
        let snap = fixtures::profile_only();
        let buffett = engine.buffett(&snap);
        assert_eq!(buffett.buffett_score, 0);
        let scores = engine.valuation_scores(&snap);
        assert_eq!(scores.max_total_score, 21.0);
    }
}
