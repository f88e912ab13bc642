use analysis_core::ScoreResult;

use crate::bands::{Band, BandTable};

const CURRENT_RATIO_BANDS: &[Band] = &[
    Band::at_least(2.0, 4.0),
    Band::at_least(1.5, 3.0),
    Band::at_least(1.2, 1.0),
];
const CURRENT_RATIO: BandTable = BandTable::new(4.0, CURRENT_RATIO_BANDS);

const DEBT_TO_ASSETS_BANDS: &[Band] = &[
    Band::below(40.0, 4.0),
    Band::below(50.0, 3.0),
    Band::below(60.0, 1.0),
];
const DEBT_TO_ASSETS: BandTable = BandTable::new(4.0, DEBT_TO_ASSETS_BANDS);

const INTEREST_COVERAGE_BANDS: &[Band] = &[
    Band::at_least(12.0, 6.0),
    Band::at_least(8.0, 5.0),
    Band::at_least(5.0, 3.0),
    Band::at_least(3.0, 1.0),
];
const INTEREST_COVERAGE: BandTable = BandTable::new(6.0, INTEREST_COVERAGE_BANDS);

const NET_DEBT_TO_EBITDA_BANDS: &[Band] = &[
    Band::at_most(1.0, 6.0),
    Band::at_most(1.5, 5.0),
    Band::at_most(2.0, 4.0),
    Band::at_most(3.0, 2.0),
];
const NET_DEBT_TO_EBITDA: BandTable = BandTable::new(6.0, NET_DEBT_TO_EBITDA_BANDS);

pub fn score_current_ratio(ratio: Option<f64>) -> ScoreResult {
    CURRENT_RATIO.score_opt(ratio)
}

pub fn score_debt_to_assets(pct: Option<f64>) -> ScoreResult {
    DEBT_TO_ASSETS.score_opt(pct.filter(|v| *v >= 0.0))
}

pub fn score_interest_coverage(coverage: Option<f64>) -> ScoreResult {
    INTEREST_COVERAGE.score_opt(coverage)
}

/// Score an already computed leverage multiple. Net cash shows up as a
/// negative multiple and takes the top band.
pub fn score_net_debt_to_ebitda(ratio: Option<f64>) -> ScoreResult {
    NET_DEBT_TO_EBITDA.score_opt(ratio)
}

/// Score leverage from raw net debt and EBITDA.
///
/// Net cash scores the maximum regardless of EBITDA; positive net debt
/// against non-positive EBITDA scores zero.
pub fn score_net_debt(net_debt: Option<f64>, ebitda: Option<f64>) -> ScoreResult {
    match (net_debt, ebitda) {
        (Some(nd), _) if nd.is_finite() && nd <= 0.0 => NET_DEBT_TO_EBITDA.score(nd),
        (Some(nd), Some(e)) if e > 0.0 => NET_DEBT_TO_EBITDA.score(nd / e),
        _ => ScoreResult::zero(NET_DEBT_TO_EBITDA.max_score),
    }
}
