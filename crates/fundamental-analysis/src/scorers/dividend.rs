use analysis_core::ScoreResult;
use serde::{Deserialize, Serialize};

use crate::bands::{Band, BandTable};

const STREAK_BANDS: &[Band] = &[Band::at_least(10.0, 1.0), Band::at_least(5.0, 0.5)];
const STREAK: BandTable = BandTable::new(1.0, STREAK_BANDS);

const DIVIDEND_GROWTH_BANDS: &[Band] = &[Band::at_least(5.0, 1.0), Band::at_least(2.0, 0.5)];
const DIVIDEND_GROWTH: BandTable = BandTable::new(1.0, DIVIDEND_GROWTH_BANDS);

const DIVIDEND_MAX: f64 = 4.0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DividendInputs {
    pub dividend_per_share: Option<f64>,
    /// Dividends over net income, percent.
    pub payout_ratio_earnings: Option<f64>,
    /// Dividends over free cash flow, percent.
    pub payout_ratio_fcf: Option<f64>,
    pub streak_years: u32,
    pub cagr_5y: Option<f64>,
}

impl DividendInputs {
    pub fn pays_dividend(&self) -> bool {
        self.dividend_per_share.map_or(false, |d| d > 0.0)
    }
}

/// Sustainable payout sits between 40% and 65%.
fn payout_points(payout_pct: Option<f64>) -> f64 {
    match payout_pct {
        Some(p) if (40.0..=65.0).contains(&p) => 1.0,
        Some(p) if (25.0..40.0).contains(&p) || (p > 65.0 && p <= 80.0) => 0.5,
        _ => 0.0,
    }
}

pub fn score_dividend(inputs: &DividendInputs) -> ScoreResult {
    if !inputs.pays_dividend() {
        return ScoreResult::zero(DIVIDEND_MAX);
    }
    let points = payout_points(inputs.payout_ratio_earnings)
        + payout_points(inputs.payout_ratio_fcf)
        + STREAK.points(inputs.streak_years as f64)
        + DIVIDEND_GROWTH.score_opt(inputs.cagr_5y).score;
    ScoreResult::new(points, DIVIDEND_MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payer() -> DividendInputs {
        DividendInputs {
            dividend_per_share: Some(1.2),
            payout_ratio_earnings: Some(50.0),
            payout_ratio_fcf: Some(60.0),
            streak_years: 12,
            cagr_5y: Some(7.0),
        }
    }

    #[test]
    fn test_full_dividend_score() {
        let s = score_dividend(&payer());
        assert_eq!((s.score, s.max_score), (4.0, 4.0));
    }

    #[test]
    fn test_partial_components() {
        let inputs = DividendInputs {
            payout_ratio_earnings: Some(30.0),
            payout_ratio_fcf: Some(90.0),
            streak_years: 6,
            cagr_5y: Some(2.5),
            ..payer()
        };
        assert_eq!(score_dividend(&inputs).score, 1.5);
    }

    #[test]
    fn test_payout_boundaries() {
        assert_eq!(payout_points(Some(40.0)), 1.0);
        assert_eq!(payout_points(Some(65.0)), 1.0);
        assert_eq!(payout_points(Some(25.0)), 0.5);
        assert_eq!(payout_points(Some(80.0)), 0.5);
        assert_eq!(payout_points(Some(80.1)), 0.0);
        assert_eq!(payout_points(Some(10.0)), 0.0);
        assert_eq!(payout_points(None), 0.0);
    }

    #[test]
    fn test_no_dividend() {
        let inputs = DividendInputs { dividend_per_share: Some(0.0), ..payer() };
        assert_eq!(score_dividend(&inputs).score, 0.0);
        assert_eq!(score_dividend(&DividendInputs::default()).max_score, 4.0);
    }
}
