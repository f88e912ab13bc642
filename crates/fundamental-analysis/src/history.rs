//! Display-value selection and trend heuristics over most-recent-first series.

use analysis_core::{Polarity, Trend, ValueBasis};
use serde::{Deserialize, Serialize};

use crate::stats::{mean, median, series_cagr, span_years, YearValue};

/// Relative change between the oldest and newest third treated as flat.
const TREND_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayValue {
    pub value: f64,
    pub basis: ValueBasis,
}

/// Prefer the 10-year median, then 5-year, then 3-year, then the current value.
pub fn select_display_value(current: Option<f64>, history: &[f64]) -> Option<DisplayValue> {
    let windows = [
        (10, ValueBasis::TenYearMedian),
        (5, ValueBasis::FiveYearMedian),
        (3, ValueBasis::ThreeYearMedian),
    ];
    for (len, basis) in windows {
        if history.len() >= len {
            if let Some(value) = median(&history[..len]) {
                return Some(DisplayValue { value, basis });
            }
        }
    }
    current
        .or_else(|| history.first().copied())
        .filter(|v| v.is_finite())
        .map(|value| DisplayValue { value, basis: ValueBasis::Current })
}

/// CAGR over 10, 5 or 3 fiscal years when that base year is reported with a
/// positive value, else over the full reported span.
pub fn select_growth(history: &[YearValue]) -> Option<DisplayValue> {
    let span = span_years(history);
    let mut spans: Vec<i32> = [10, 5, 3].into_iter().filter(|years| *years <= span).collect();
    if span >= 1 {
        spans.push(span);
    }
    spans.into_iter().find_map(|years| {
        series_cagr(history, years).map(|value| DisplayValue {
            value,
            basis: ValueBasis::Cagr { years: years as u32 },
        })
    })
}

/// Compare the oldest third of the series with the newest third.
///
/// Informational only; no scorer folds the trend into its points.
pub fn trend(history: &[f64], polarity: Polarity) -> Option<Trend> {
    let values: Vec<f64> = history.iter().copied().filter(|v| v.is_finite()).collect();
    if values.len() < 3 {
        return None;
    }
    let third = (values.len() / 3).max(1);
    let newest = mean(&values[..third])?;
    let oldest = mean(&values[values.len() - third..])?;

    let scale = oldest.abs().max(1e-9);
    let change = (newest - oldest) / scale;
    if change.abs() <= TREND_TOLERANCE {
        return Some(Trend::Stable);
    }
    let rising = change > 0.0;
    Some(match (rising, polarity) {
        (true, Polarity::HigherIsBetter) | (false, Polarity::LowerIsBetter) => Trend::Improving,
        _ => Trend::Worsening,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_display_value_priority() {
        let ten: Vec<f64> = (0..10).map(|i| 10.0 + i as f64).collect();
        let dv = select_display_value(Some(99.0), &ten).unwrap();
        assert_eq!(dv.basis, ValueBasis::TenYearMedian);
        assert_eq!(dv.value, 14.5);

        let dv = select_display_value(Some(99.0), &ten[..6]).unwrap();
        assert_eq!(dv.basis, ValueBasis::FiveYearMedian);
        assert_eq!(dv.value, 12.0);

        let dv = select_display_value(Some(99.0), &ten[..4]).unwrap();
        assert_eq!(dv.basis, ValueBasis::ThreeYearMedian);
        assert_eq!(dv.value, 11.0);

        let dv = select_display_value(Some(99.0), &ten[..2]).unwrap();
        assert_eq!(dv.basis, ValueBasis::Current);
        assert_eq!(dv.value, 99.0);

        let dv = select_display_value(None, &ten[..2]).unwrap();
        assert_eq!(dv.value, 10.0);
        assert_eq!(select_display_value(None, &[]), None);
    }

    fn years(latest: i32, recent_first: &[f64]) -> Vec<YearValue> {
        recent_first
            .iter()
            .enumerate()
            .map(|(i, v)| YearValue::new(latest - i as i32, *v))
            .collect()
    }

    #[test]
    fn test_growth_prefers_longest_standard_window() {
        let values: Vec<f64> = (0..11).map(|i| 100.0 / 1.1_f64.powi(i)).collect();
        let series = years(2024, &values);
        let g = select_growth(&series).unwrap();
        assert_eq!(g.basis, ValueBasis::Cagr { years: 10 });
        assert!((g.value - 10.0).abs() < 1e-9);

        let g = select_growth(&series[..4]).unwrap();
        assert_eq!(g.basis, ValueBasis::Cagr { years: 3 });
        assert_eq!(select_growth(&series[..1]), None);
    }

    #[test]
    fn test_growth_skips_non_positive_base() {
        // 5 years back is a loss year; falls through to the 3-year window
        let series = years(2024, &[12.0, 11.0, 10.0, 9.0, 5.0, -1.0]);
        let g = select_growth(&series).unwrap();
        assert_eq!(g.basis, ValueBasis::Cagr { years: 3 });
    }

    #[test]
    fn test_growth_window_measured_in_fiscal_years() {
        // 2021 unreported: five fiscal years separate 2019 and 2024
        let series: Vec<YearValue> = [2024, 2023, 2022, 2020, 2019]
            .into_iter()
            .map(|y| YearValue::new(y, 100.0 * 1.1_f64.powi(y - 2019)))
            .collect();
        let g = select_growth(&series).unwrap();
        assert_eq!(g.basis, ValueBasis::Cagr { years: 5 });
        assert_relative_eq!(g.value, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_trend_polarity() {
        let rising = [20.0, 18.0, 15.0, 12.0, 10.0, 9.0];
        assert_eq!(trend(&rising, Polarity::HigherIsBetter), Some(Trend::Improving));
        assert_eq!(trend(&rising, Polarity::LowerIsBetter), Some(Trend::Worsening));
        let flat = [10.0, 10.1, 9.9, 10.0, 10.2, 10.0];
        assert_eq!(trend(&flat, Polarity::HigherIsBetter), Some(Trend::Stable));
        assert_eq!(trend(&[1.0, 2.0], Polarity::HigherIsBetter), None);
    }
}
