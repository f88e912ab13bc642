//! Growth rate and predictability of the projected basis.

use analysis_core::{Predictability, ValuationMode};
use fundamental_analysis::stats::{series_cagr, window_cagr, YearValue};

const PREFERRED_SPAN: i32 = 5;
const MIN_POINTS: usize = 3;
pub const MIN_GROWTH_PCT: f64 = 0.0;
pub const MAX_GROWTH_PCT: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GrowthEstimate {
    /// Percent, already clamped.
    pub rate_pct: f64,
    pub used_default: bool,
    /// Fiscal years the CAGR spans; zero when the default applies.
    pub span_years: i32,
}

pub fn default_growth_pct(mode: ValuationMode) -> f64 {
    match mode {
        ValuationMode::EpsWoNri => 5.0,
        ValuationMode::FcfPerShare => 4.0,
        ValuationMode::AdjustedDividend => 5.0,
    }
}

/// Five-year CAGR of the basis, else the CAGR from the oldest of at least
/// three observations within five fiscal years, else the mode's
/// conservative default.
pub fn derive_growth(mode: ValuationMode, basis_recent_first: &[YearValue]) -> GrowthEstimate {
    let found = series_cagr(basis_recent_first, PREFERRED_SPAN)
        .map(|rate| (rate, PREFERRED_SPAN))
        .or_else(|| window_cagr(basis_recent_first, PREFERRED_SPAN, MIN_POINTS));

    match found {
        Some((rate, span_years)) => GrowthEstimate {
            rate_pct: rate.clamp(MIN_GROWTH_PCT, MAX_GROWTH_PCT),
            used_default: false,
            span_years,
        },
        None => GrowthEstimate {
            rate_pct: default_growth_pct(mode).clamp(MIN_GROWTH_PCT, MAX_GROWTH_PCT),
            used_default: true,
            span_years: 0,
        },
    }
}

/// Share of year-over-year steps that did not decline.
pub fn predictability(basis_recent_first: &[YearValue]) -> Predictability {
    if basis_recent_first.len() < MIN_POINTS {
        return Predictability::Low;
    }
    let steps = basis_recent_first.len() - 1;
    let steady = basis_recent_first.windows(2).filter(|w| w[0].value >= w[1].value).count();
    let share = steady as f64 / steps as f64;
    if share >= 0.8 {
        Predictability::High
    } else if share >= 0.6 {
        Predictability::Medium
    } else {
        Predictability::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn years(recent_first: &[f64]) -> Vec<YearValue> {
        recent_first
            .iter()
            .enumerate()
            .map(|(i, v)| YearValue::new(2024 - i as i32, *v))
            .collect()
    }

    #[test]
    fn test_five_year_cagr_preferred() {
        let values: Vec<f64> = (0..8).map(|i| 10.0 / 1.1_f64.powi(i)).collect();
        let g = derive_growth(ValuationMode::EpsWoNri, &years(&values));
        assert_relative_eq!(g.rate_pct, 10.0, epsilon = 1e-9);
        assert_eq!(g.span_years, 5);
        assert!(!g.used_default);
    }

    #[test]
    fn test_gap_year_keeps_five_year_span() {
        // 2021 unreported; 2019 is still five fiscal years before 2024
        let series: Vec<YearValue> = [2024, 2023, 2022, 2020, 2019]
            .into_iter()
            .map(|y| YearValue::new(y, 2.0 * 1.1_f64.powi(y - 2019)))
            .collect();
        let g = derive_growth(ValuationMode::EpsWoNri, &series);
        assert_relative_eq!(g.rate_pct, 10.0, epsilon = 1e-9);
        assert_eq!(g.span_years, 5);

        // without 2019 the oldest in-window point is 2020, four years back
        let g = derive_growth(ValuationMode::EpsWoNri, &series[..4]);
        assert_relative_eq!(g.rate_pct, 10.0, epsilon = 1e-9);
        assert_eq!(g.span_years, 4);
    }

    #[test]
    fn test_short_history_uses_longest_span() {
        let g = derive_growth(ValuationMode::EpsWoNri, &years(&[1.98, 1.58, 1.26, 1.00]));
        assert_eq!(g.span_years, 3);
        assert!((g.rate_pct - 15.0).abs() < 1e-12);
    }

    #[test]
    fn test_defaults_and_clamp() {
        let g = derive_growth(ValuationMode::FcfPerShare, &years(&[2.0, 1.0]));
        assert!(g.used_default);
        assert_eq!(g.rate_pct, 4.0);

        let g = derive_growth(ValuationMode::AdjustedDividend, &years(&[1.0, -1.0, -2.0]));
        assert!(g.used_default);
        assert_eq!(g.rate_pct, 5.0);

        let shrinking: Vec<f64> = (0..6).map(|i| 1.0 + i as f64).collect();
        let g = derive_growth(ValuationMode::EpsWoNri, &years(&shrinking));
        assert_eq!(g.rate_pct, 0.0);
        assert!(!g.used_default);
    }

    #[test]
    fn test_predictability() {
        let p = |v: &[f64]| predictability(&years(v));
        assert_eq!(p(&[5.0, 4.0, 3.0, 2.0, 1.0]), Predictability::High);
        assert_eq!(p(&[5.0, 4.0, 4.5, 3.0, 3.5, 2.0]), Predictability::Medium);
        assert_eq!(p(&[1.0, 2.0, 3.0, 4.0]), Predictability::Low);
        assert_eq!(p(&[2.0, 1.0]), Predictability::Low);
    }
}
