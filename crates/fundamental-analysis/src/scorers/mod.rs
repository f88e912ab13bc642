//! Per-metric scorers.
//!
//! Every scorer is a pure function over an optional value returning a bounded
//! [`ScoreResult`]. A missing value scores zero against the metric's ceiling.

pub mod dividend;
pub mod growth;
pub mod profitability;
pub mod strength;
pub mod valuation;

use serde::{Deserialize, Serialize};

use crate::presets::IndustryPreset;

pub use dividend::{score_dividend, DividendInputs};
pub use growth::{score_ebitda_growth, score_eps_growth, score_fcf_growth, score_revenue_growth};
pub use profitability::{
    score_net_margin, score_operating_margin, score_roa, score_roe, score_roic,
    score_years_profitable,
};
pub use strength::{
    score_current_ratio, score_debt_to_assets, score_interest_coverage, score_net_debt,
    score_net_debt_to_ebitda,
};
pub use valuation::{
    score_pb, score_pcf, score_pe, score_peter_lynch, score_price_to_median_ps,
};

/// Inputs that shift thresholds away from the default tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringContext {
    pub preset: IndustryPreset,
    /// Cost of capital in percent, for the ROIC spread test.
    pub wacc_pct: Option<f64>,
    pub industry_pe: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::ScoreResult;

    fn assert_bounded(s: ScoreResult) {
        assert!(s.score >= 0.0 && s.score <= s.max_score, "{s:?}");
    }

    #[test]
    fn test_every_scorer_bounded_and_zero_on_none() {
        let ctx = ScoringContext::default();
        let none: Vec<ScoreResult> = vec![
            score_roe(None, ctx.preset),
            score_roic(None, None),
            score_net_margin(None, ctx.preset),
            score_operating_margin(None),
            score_roa(None, ctx.preset),
            score_current_ratio(None),
            score_debt_to_assets(None),
            score_interest_coverage(None),
            score_net_debt_to_ebitda(None),
            score_net_debt(None, None),
            score_revenue_growth(None),
            score_ebitda_growth(None),
            score_eps_growth(None),
            score_fcf_growth(None),
            score_pe(None, None),
            score_pb(None),
            score_pcf(None, false),
            score_peter_lynch(None, None),
            score_price_to_median_ps(None),
            score_dividend(&DividendInputs::default()),
        ];
        for s in none {
            assert_eq!(s.score, 0.0);
            assert!(s.max_score > 0.0);
        }

        for v in [-1e9, -50.0, -1.0, 0.0, 0.5, 1.0, 7.5, 15.0, 33.0, 1e9, f64::NAN] {
            let v = Some(v);
            for s in [
                score_roe(v, ctx.preset),
                score_roic(v, Some(9.0)),
                score_net_margin(v, IndustryPreset::Software),
                score_operating_margin(v),
                score_roa(v, IndustryPreset::Financials),
                score_current_ratio(v),
                score_debt_to_assets(v),
                score_interest_coverage(v),
                score_net_debt_to_ebitda(v),
                score_net_debt(v, Some(10.0)),
                score_revenue_growth(v),
                score_ebitda_growth(v),
                score_eps_growth(v),
                score_fcf_growth(v),
                score_pe(v, Some(20.0)),
                score_pb(v),
                score_pcf(v, false),
                score_peter_lynch(Some(50.0), v),
                score_price_to_median_ps(v),
            ] {
                assert_bounded(s);
            }
        }
    }
}
