//! Valuation score aggregate (0-21) over six valuation scorers.

use analysis_core::ScoreResult;
use serde::{Deserialize, Serialize};

use crate::metrics::{peter_lynch_fair_value, FinancialMetrics};
use crate::scorers::{self, DividendInputs};

/// Raw valuation inputs. Percent fields are in percent units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValuationInput {
    pub price: Option<f64>,
    pub eps: Option<f64>,
    pub eps_growth: Option<f64>,
    pub dividend_yield: Option<f64>,
    /// Overrides the fair value derived from EPS, growth and yield.
    pub peter_lynch_fair_value: Option<f64>,
    pub pe: Option<f64>,
    pub industry_pe: Option<f64>,
    pub pb: Option<f64>,
    pub price_to_fcf: Option<f64>,
    pub fcf_negative_years_of_last_three: u32,
    pub dividend: DividendInputs,
    pub price_to_sales: Option<f64>,
    pub median_price_to_sales: Option<f64>,
}

impl ValuationInput {
    pub fn from_metrics(m: &FinancialMetrics, industry_pe: Option<f64>) -> Self {
        Self {
            price: m.price,
            eps: m.eps,
            eps_growth: m.eps_growth.map(|g| g.value),
            dividend_yield: m.dividend_yield,
            peter_lynch_fair_value: m.lynch_fair_value,
            pe: m.pe,
            industry_pe,
            pb: m.pb,
            price_to_fcf: m.price_to_fcf,
            fcf_negative_years_of_last_three: m.fcf_negative_years_of_last_three(),
            dividend: m.dividend_inputs(),
            price_to_sales: m.ps,
            median_price_to_sales: m.median_ps_5y,
        }
    }

    fn lynch_fair_value(&self) -> Option<f64> {
        self.peter_lynch_fair_value.or_else(|| {
            peter_lynch_fair_value(self.eps?, self.eps_growth?, self.dividend_yield.unwrap_or(0.0))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationScores {
    pub peter_lynch: ScoreResult,
    pub pe: ScoreResult,
    pub dividend: ScoreResult,
    pub pb: ScoreResult,
    pub pcf: ScoreResult,
    pub price_to_median_ps: ScoreResult,
}

impl ValuationScores {
    fn all(&self) -> [ScoreResult; 6] {
        [
            self.peter_lynch,
            self.pe,
            self.dividend,
            self.pb,
            self.pcf,
            self.price_to_median_ps,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationScoresResult {
    pub scores: ValuationScores,
    pub total_score: f64,
    pub max_total_score: f64,
}

pub fn compute_valuation_scores(input: &ValuationInput) -> ValuationScoresResult {
    let scores = ValuationScores {
        peter_lynch: scorers::score_peter_lynch(input.price, input.lynch_fair_value()),
        pe: scorers::score_pe(input.pe, input.industry_pe),
        dividend: scorers::score_dividend(&input.dividend),
        pb: scorers::score_pb(input.pb),
        pcf: scorers::score_pcf(input.price_to_fcf, input.fcf_negative_years_of_last_three >= 2),
        price_to_median_ps: scorers::score_price_to_median_ps(scorers::valuation::median_ps_discount(
            input.price_to_sales,
            input.median_price_to_sales,
        )),
    };
    let all = scores.all();
    ValuationScoresResult {
        scores,
        total_score: all.iter().map(|s| s.score).sum(),
        max_total_score: all.iter().map(|s| s.max_score).sum(),
    }
}
