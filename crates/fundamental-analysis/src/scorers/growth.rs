use analysis_core::ScoreResult;

use crate::bands::{Band, BandTable};

const REVENUE_GROWTH_BANDS: &[Band] = &[
    Band::at_least(12.0, 4.0),
    Band::at_least(8.0, 3.0),
    Band::at_least(5.0, 2.0),
    Band::at_least(2.0, 1.0),
];
const REVENUE_GROWTH: BandTable = BandTable::new(4.0, REVENUE_GROWTH_BANDS);

const EBITDA_GROWTH_BANDS: &[Band] = &[
    Band::at_least(12.0, 4.0),
    Band::at_least(8.0, 3.0),
    Band::at_least(6.0, 2.0),
    Band::at_least(3.0, 1.0),
];
const EBITDA_GROWTH: BandTable = BandTable::new(4.0, EBITDA_GROWTH_BANDS);

const EPS_GROWTH_BANDS: &[Band] = &[
    Band::at_least(15.0, 6.0),
    Band::at_least(12.0, 5.0),
    Band::at_least(9.0, 4.0),
    Band::at_least(6.0, 2.0),
    Band::at_least(3.0, 1.0),
];
const EPS_GROWTH: BandTable = BandTable::new(6.0, EPS_GROWTH_BANDS);

const FCF_GROWTH_BANDS: &[Band] = &[
    Band::at_least(12.0, 6.0),
    Band::at_least(10.0, 5.0),
    Band::at_least(7.0, 4.0),
    Band::at_least(4.0, 2.0),
    Band::at_least(2.0, 1.0),
];
const FCF_GROWTH: BandTable = BandTable::new(6.0, FCF_GROWTH_BANDS);

pub fn score_revenue_growth(cagr_pct: Option<f64>) -> ScoreResult {
    REVENUE_GROWTH.score_opt(cagr_pct)
}

pub fn score_ebitda_growth(cagr_pct: Option<f64>) -> ScoreResult {
    EBITDA_GROWTH.score_opt(cagr_pct)
}

/// Growth of EPS without non-recurring items.
pub fn score_eps_growth(cagr_pct: Option<f64>) -> ScoreResult {
    EPS_GROWTH.score_opt(cagr_pct)
}

pub fn score_fcf_growth(cagr_pct: Option<f64>) -> ScoreResult {
    FCF_GROWTH.score_opt(cagr_pct)
}
