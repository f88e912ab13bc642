//! Valuation multiples and discount scorers.

use analysis_core::ScoreResult;

use crate::bands::{Band, BandTable};

const PE_ABSOLUTE_BANDS: &[Band] = &[
    Band::at_most(15.0, 1.5),
    Band::at_most(20.0, 1.0),
    Band::at_most(25.0, 0.5),
];
const PE_ABSOLUTE: BandTable = BandTable::new(1.5, PE_ABSOLUTE_BANDS);

const PE_RELATIVE_BANDS: &[Band] = &[
    Band::at_most(0.80, 1.5),
    Band::at_most(1.10, 1.0),
    Band::at_most(1.30, 0.5),
];
const PE_RELATIVE: BandTable = BandTable::new(1.5, PE_RELATIVE_BANDS);

const PE_MAX: f64 = 3.0;

const PB_BANDS: &[Band] = &[
    Band::at_most(1.5, 3.0),
    Band::at_most(2.5, 2.0),
    Band::at_most(3.5, 1.0),
];
const PB: BandTable = BandTable::new(3.0, PB_BANDS);

const PCF_BANDS: &[Band] = &[
    Band::at_most(10.0, 4.0),
    Band::at_most(15.0, 3.0),
    Band::at_most(20.0, 2.0),
    Band::at_most(25.0, 1.0),
];
const PCF: BandTable = BandTable::new(4.0, PCF_BANDS);

const LYNCH_BANDS: &[Band] = &[
    Band::at_most(0.75, 3.0),
    Band::at_most(0.95, 2.0),
    Band::at_most(1.10, 1.0),
];
const LYNCH: BandTable = BandTable::new(3.0, LYNCH_BANDS);

const MEDIAN_PS_BANDS: &[Band] = &[
    Band::at_least(35.0, 4.0),
    Band::at_least(23.0, 3.0),
    Band::at_least(12.0, 2.0),
    Band::at_least(0.0, 1.0),
];
const MEDIAN_PS: BandTable = BandTable::new(4.0, MEDIAN_PS_BANDS);

fn positive(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite() && *v > 0.0)
}

/// Absolute P/E plus P/E relative to the industry, 1.5 points each.
/// The relative half scores zero without an industry P/E.
pub fn score_pe(pe: Option<f64>, industry_pe: Option<f64>) -> ScoreResult {
    let Some(pe) = positive(pe) else {
        return ScoreResult::zero(PE_MAX);
    };
    let absolute = PE_ABSOLUTE.points(pe);
    let relative = positive(industry_pe)
        .map(|ind| PE_RELATIVE.points(pe / ind))
        .unwrap_or(0.0);
    ScoreResult::new(absolute + relative, PE_MAX)
}

pub fn score_pb(pb: Option<f64>) -> ScoreResult {
    PB.score_opt(positive(pb))
}

/// Price to free cash flow per share. Zeroed when FCF was negative in at
/// least two of the last three years.
pub fn score_pcf(price_to_fcf: Option<f64>, fcf_mostly_negative: bool) -> ScoreResult {
    if fcf_mostly_negative {
        return ScoreResult::zero(PCF.max_score);
    }
    PCF.score_opt(positive(price_to_fcf))
}

pub fn price_to_lynch(price: Option<f64>, fair_value: Option<f64>) -> Option<f64> {
    match (positive(price), positive(fair_value)) {
        (Some(p), Some(f)) => Some(p / f),
        _ => None,
    }
}

pub fn score_peter_lynch(price: Option<f64>, fair_value: Option<f64>) -> ScoreResult {
    LYNCH.score_opt(price_to_lynch(price, fair_value))
}

/// Discount of the current P/S to its multi-year median, in percent.
pub fn median_ps_discount(ps: Option<f64>, median_ps: Option<f64>) -> Option<f64> {
    match (positive(ps), positive(median_ps)) {
        (Some(current), Some(median)) => Some((median - current) / median * 100.0),
        _ => None,
    }
}

pub fn score_price_to_median_ps(discount_pct: Option<f64>) -> ScoreResult {
    MEDIAN_PS.score_opt(discount_pct)
}
