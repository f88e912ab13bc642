use analysis_core::ScoreResult;

use crate::bands::{Band, BandTable};
use crate::presets::IndustryPreset;

const ROE_DEFAULT_BANDS: &[Band] = &[Band::at_least(15.0, 2.0), Band::at_least(10.0, 1.0)];
const ROE_INDUSTRIALS_BANDS: &[Band] = &[Band::at_least(12.0, 2.0), Band::at_least(8.0, 1.0)];
const ROE_SOFTWARE_BANDS: &[Band] = &[Band::at_least(20.0, 2.0), Band::at_least(15.0, 1.0)];
const ROE_FINANCIALS_BANDS: &[Band] = &[Band::at_least(12.0, 2.0), Band::at_least(10.0, 1.0)];

const ROE_DEFAULT: BandTable = BandTable::new(2.0, ROE_DEFAULT_BANDS);
const ROE_INDUSTRIALS: BandTable = BandTable::new(2.0, ROE_INDUSTRIALS_BANDS);
const ROE_SOFTWARE: BandTable = BandTable::new(2.0, ROE_SOFTWARE_BANDS);
const ROE_FINANCIALS: BandTable = BandTable::new(2.0, ROE_FINANCIALS_BANDS);

const NET_MARGIN_DEFAULT_BANDS: &[Band] = &[
    Band::at_least(15.0, 3.0),
    Band::at_least(10.0, 2.0),
    Band::at_least(5.0, 1.0),
];
const NET_MARGIN_INDUSTRIALS_BANDS: &[Band] = &[
    Band::at_least(10.0, 3.0),
    Band::at_least(7.0, 2.0),
    Band::at_least(4.0, 1.0),
];
const NET_MARGIN_HIGH_BANDS: &[Band] = &[
    Band::at_least(20.0, 3.0),
    Band::at_least(15.0, 2.0),
    Band::at_least(10.0, 1.0),
];

const NET_MARGIN_DEFAULT: BandTable = BandTable::new(3.0, NET_MARGIN_DEFAULT_BANDS);
const NET_MARGIN_INDUSTRIALS: BandTable = BandTable::new(3.0, NET_MARGIN_INDUSTRIALS_BANDS);
const NET_MARGIN_HIGH: BandTable = BandTable::new(3.0, NET_MARGIN_HIGH_BANDS);

const OPERATING_MARGIN_BANDS: &[Band] = &[
    Band::at_least(20.0, 4.0),
    Band::at_least(15.0, 3.0),
    Band::at_least(10.0, 2.0),
    Band::at_least(5.0, 1.0),
];
const OPERATING_MARGIN: BandTable = BandTable::new(4.0, OPERATING_MARGIN_BANDS);

const ROA_DEFAULT_BANDS: &[Band] = &[Band::at_least(8.0, 1.0)];
const ROA_INDUSTRIALS_BANDS: &[Band] = &[Band::at_least(6.0, 1.0)];
const ROA_SOFTWARE_BANDS: &[Band] = &[Band::at_least(10.0, 1.0)];
const ROA_FINANCIALS_BANDS: &[Band] = &[Band::at_least(1.0, 1.0)];

const ROA_DEFAULT: BandTable = BandTable::new(1.0, ROA_DEFAULT_BANDS);
const ROA_INDUSTRIALS: BandTable = BandTable::new(1.0, ROA_INDUSTRIALS_BANDS);
const ROA_SOFTWARE: BandTable = BandTable::new(1.0, ROA_SOFTWARE_BANDS);
const ROA_FINANCIALS: BandTable = BandTable::new(1.0, ROA_FINANCIALS_BANDS);

const YEARS_PROFITABLE_BANDS: &[Band] = &[
    Band::at_least(10.0, 4.0),
    Band::at_least(9.0, 3.0),
    Band::at_least(8.0, 2.0),
    Band::at_least(7.0, 1.0),
];
const YEARS_PROFITABLE: BandTable = BandTable::new(4.0, YEARS_PROFITABLE_BANDS);

const ROIC_MAX: f64 = 2.0;

/// Fewer years than this and the profitable-years count carries no signal.
pub const MIN_YEARS_ON_RECORD: usize = 5;

pub fn score_roe(roe_pct: Option<f64>, preset: IndustryPreset) -> ScoreResult {
    let table = match preset {
        IndustryPreset::Default => ROE_DEFAULT,
        IndustryPreset::Industrials => ROE_INDUSTRIALS,
        IndustryPreset::Software => ROE_SOFTWARE,
        IndustryPreset::Financials => ROE_FINANCIALS,
    };
    table.score_opt(roe_pct)
}

/// ROIC must clear both the absolute threshold and the cost of capital.
/// With no WACC available only the absolute threshold applies.
pub fn score_roic(roic_pct: Option<f64>, wacc_pct: Option<f64>) -> ScoreResult {
    let Some(roic) = roic_pct.filter(|v| v.is_finite()) else {
        return ScoreResult::zero(ROIC_MAX);
    };
    let beats_wacc = wacc_pct.map_or(true, |w| roic > w);
    let points = if roic >= 15.0 && beats_wacc {
        2.0
    } else if roic >= 8.0 && beats_wacc {
        1.0
    } else {
        0.0
    };
    ScoreResult::new(points, ROIC_MAX)
}

pub fn score_net_margin(margin_pct: Option<f64>, preset: IndustryPreset) -> ScoreResult {
    let table = match preset {
        IndustryPreset::Default => NET_MARGIN_DEFAULT,
        IndustryPreset::Industrials => NET_MARGIN_INDUSTRIALS,
        IndustryPreset::Software | IndustryPreset::Financials => NET_MARGIN_HIGH,
    };
    table.score_opt(margin_pct)
}

pub fn score_operating_margin(margin_pct: Option<f64>) -> ScoreResult {
    OPERATING_MARGIN.score_opt(margin_pct)
}

pub fn score_roa(roa_pct: Option<f64>, preset: IndustryPreset) -> ScoreResult {
    let table = match preset {
        IndustryPreset::Default => ROA_DEFAULT,
        IndustryPreset::Industrials => ROA_INDUSTRIALS,
        IndustryPreset::Software => ROA_SOFTWARE,
        IndustryPreset::Financials => ROA_FINANCIALS,
    };
    table.score_opt(roa_pct)
}

/// Profitable years normalized to a 10-year base.
///
/// Returns `None` when fewer than five years are on record.
pub fn normalized_profitable_years(profitable: usize, on_record: usize) -> Option<f64> {
    if on_record < MIN_YEARS_ON_RECORD {
        return None;
    }
    let on_record = on_record.min(10);
    let profitable = profitable.min(on_record);
    Some(((profitable * 10) / on_record) as f64)
}

pub fn score_years_profitable(profitable: usize, on_record: usize) -> ScoreResult {
    YEARS_PROFITABLE.score_opt(normalized_profitable_years(profitable, on_record))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roe_bands_and_presets() {
        assert_eq!(score_roe(Some(16.0), IndustryPreset::Default).score, 2.0);
        assert_eq!(score_roe(Some(12.0), IndustryPreset::Default).score, 1.0);
        assert_eq!(score_roe(Some(9.9), IndustryPreset::Default).score, 0.0);
        assert_eq!(score_roe(Some(12.0), IndustryPreset::Industrials).score, 2.0);
        assert_eq!(score_roe(Some(18.0), IndustryPreset::Software).score, 1.0);
        assert_eq!(score_roe(Some(10.0), IndustryPreset::Financials).score, 1.0);
    }

    #[test]
    fn test_roe_monotonic() {
        for preset in [
            IndustryPreset::Default,
            IndustryPreset::Industrials,
            IndustryPreset::Software,
            IndustryPreset::Financials,
        ] {
            let mut last = 0.0;
            for i in -20..60 {
                let s = score_roe(Some(i as f64), preset).score;
                assert!(s >= last);
                last = s;
            }
        }
    }

    #[test]
    fn test_roic_against_wacc() {
        assert_eq!(score_roic(Some(16.0), Some(9.0)).score, 2.0);
        assert_eq!(score_roic(Some(9.0), Some(9.0)).score, 0.0);
        assert_eq!(score_roic(Some(9.5), Some(9.0)).score, 1.0);
        assert_eq!(score_roic(Some(16.0), Some(17.0)).score, 0.0);
        assert_eq!(score_roic(Some(16.0), None).score, 2.0);
        assert_eq!(score_roic(None, Some(9.0)).max_score, 2.0);
    }

    #[test]
    fn test_margins() {
        assert_eq!(score_net_margin(Some(15.0), IndustryPreset::Default).score, 3.0);
        assert_eq!(score_net_margin(Some(7.0), IndustryPreset::Industrials).score, 2.0);
        assert_eq!(score_net_margin(Some(12.0), IndustryPreset::Software).score, 1.0);
        assert_eq!(score_operating_margin(Some(20.0)).score, 4.0);
        assert_eq!(score_operating_margin(Some(4.9)).score, 0.0);
        assert_eq!(score_roa(Some(1.2), IndustryPreset::Financials).score, 1.0);
        assert_eq!(score_roa(Some(7.0), IndustryPreset::Default).score, 0.0);
    }

    #[test]
    fn test_years_profitable_normalization() {
        assert_eq!(score_years_profitable(10, 10).score, 4.0);
        assert_eq!(score_years_profitable(9, 10).score, 3.0);
        assert_eq!(score_years_profitable(7, 10).score, 1.0);
        assert_eq!(score_years_profitable(6, 10).score, 0.0);
        // 6 of 7 -> 8.57 -> 8
        assert_eq!(normalized_profitable_years(6, 7), Some(8.0));
        assert_eq!(score_years_profitable(6, 7).score, 2.0);
        assert_eq!(score_years_profitable(5, 5).score, 4.0);
        assert_eq!(normalized_profitable_years(4, 4), None);
        assert_eq!(score_years_profitable(4, 4).score, 0.0);
    }
}
