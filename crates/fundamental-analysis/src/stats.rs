//! Time-series statistics shared by every scorer and by the valuation engine.
//!
//! Non-finite inputs are dropped before any computation.

use serde::{Deserialize, Serialize};

/// One annual observation, keyed by the fiscal year it was reported for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearValue {
    pub fiscal_year: i32,
    pub value: f64,
}

impl YearValue {
    pub fn new(fiscal_year: i32, value: f64) -> Self {
        Self { fiscal_year, value }
    }
}

pub fn values(series: &[YearValue]) -> Vec<f64> {
    series.iter().map(|p| p.value).collect()
}

fn finite_sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

pub fn mean(values: &[f64]) -> Option<f64> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        None
    } else {
        Some(finite.iter().sum::<f64>() / finite.len() as f64)
    }
}

pub fn median(values: &[f64]) -> Option<f64> {
    let sorted = finite_sorted(values);
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some((sorted[n / 2 - 1] + sorted[n / 2]) / 2.0)
    }
}

/// Mean after dropping `floor(n * trim_pct)` values from each end.
pub fn trimmed_mean(values: &[f64], trim_pct: f64) -> Option<f64> {
    let sorted = finite_sorted(values);
    let n = sorted.len();
    let k = ((n as f64) * trim_pct.clamp(0.0, 0.5)).floor() as usize;
    if n == 0 || 2 * k >= n {
        return None;
    }
    mean(&sorted[k..n - k])
}

/// Compound annual growth rate in percent.
///
/// Undefined for non-positive endpoints or spans.
pub fn cagr(start: f64, end: f64, years: f64) -> Option<f64> {
    if !(start > 0.0 && end > 0.0 && years > 0.0) || !start.is_finite() || !end.is_finite() {
        return None;
    }
    Some(((end / start).powf(1.0 / years) - 1.0) * 100.0)
}

/// Year-over-year growth in percent, undefined when `previous <= 0`.
pub fn yoy_growth(current: f64, previous: f64) -> Option<f64> {
    if previous <= 0.0 || !current.is_finite() || !previous.is_finite() {
        return None;
    }
    Some((current - previous) / previous * 100.0)
}

/// CAGR between the latest observation and the one reported exactly `years`
/// fiscal years earlier in a most-recent-first series.
pub fn series_cagr(recent_first: &[YearValue], years: i32) -> Option<f64> {
    let latest = recent_first.first()?;
    if years <= 0 {
        return None;
    }
    let base = recent_first
        .iter()
        .find(|p| p.fiscal_year == latest.fiscal_year - years)?;
    cagr(base.value, latest.value, years as f64)
}

/// Fiscal years between the newest and oldest observation.
pub fn span_years(recent_first: &[YearValue]) -> i32 {
    match (recent_first.first(), recent_first.last()) {
        (Some(latest), Some(oldest)) => latest.fiscal_year - oldest.fiscal_year,
        _ => 0,
    }
}

/// CAGR from the oldest observation within `max_years` fiscal years of the
/// latest one, with the span measured in fiscal years. Returns the rate and
/// the span.
pub fn window_cagr(recent_first: &[YearValue], max_years: i32, min_points: usize) -> Option<(f64, i32)> {
    let latest = recent_first.first()?;
    let window: Vec<&YearValue> = recent_first
        .iter()
        .take_while(|p| latest.fiscal_year - p.fiscal_year <= max_years)
        .collect();
    if window.len() < min_points.max(2) {
        return None;
    }
    let base = window.last()?;
    let years = latest.fiscal_year - base.fiscal_year;
    cagr(base.value, latest.value, years as f64).map(|rate| (rate, years))
}

/// Values reported within the latest `years` fiscal years.
pub fn recent_years(recent_first: &[YearValue], years: i32) -> Vec<f64> {
    let Some(latest) = recent_first.first() else {
        return Vec::new();
    };
    recent_first
        .iter()
        .take_while(|p| latest.fiscal_year - p.fiscal_year < years)
        .map(|p| p.value)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[1.0, 2.0, 3.0]), Some(2.0));
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), Some(2.5));
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[f64::NAN, 5.0]), Some(5.0));
    }

    #[test]
    fn test_trimmed_mean() {
        assert_eq!(trimmed_mean(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.2), Some(3.0));
        assert_eq!(trimmed_mean(&[5.0, 1.0, 100.0, 2.0, 3.0], 0.2), Some(10.0 / 3.0));
        // floor(3 * 0.2) = 0: nothing trimmed
        assert_eq!(trimmed_mean(&[1.0, 2.0, 6.0], 0.2), Some(3.0));
        assert_eq!(trimmed_mean(&[], 0.2), None);
    }

    #[test]
    fn test_cagr_no_growth_is_zero() {
        for x in [0.5, 1.0, 250.0] {
            for n in [1.0, 3.0, 10.0] {
                assert_relative_eq!(cagr(x, x, n).unwrap(), 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn test_cagr_round_trip() {
        let (start, end, years) = (3.2, 7.9, 6.0);
        let rate = cagr(start, end, years).unwrap() / 100.0;
        assert_relative_eq!(start * (1.0 + rate).powf(years), end, epsilon = 1e-9);
    }

    #[test]
    fn test_cagr_guards() {
        assert_eq!(cagr(0.0, 5.0, 3.0), None);
        assert_eq!(cagr(-1.0, 5.0, 3.0), None);
        assert_eq!(cagr(1.0, -5.0, 3.0), None);
        assert_eq!(cagr(1.0, 5.0, 0.0), None);
    }

    fn years(latest: i32, recent_first: &[f64]) -> Vec<YearValue> {
        recent_first
            .iter()
            .enumerate()
            .map(|(i, v)| YearValue::new(latest - i as i32, *v))
            .collect()
    }

    #[test]
    fn test_eps_series_cagr() {
        // most-recent-first: 1.98 now, 1.00 three years ago
        let eps = years(2024, &[1.98, 1.58, 1.26, 1.00]);
        let growth = series_cagr(&eps, 3).unwrap();
        assert!((growth - 25.57).abs() < 0.1);
        assert_eq!(series_cagr(&eps, 4), None);
    }

    #[test]
    fn test_series_cagr_keys_on_fiscal_year_across_gap() {
        // 2021 missing: the 2019 base is five fiscal years back, not four rows
        let eps: Vec<YearValue> = [2024, 2023, 2022, 2020, 2019]
            .into_iter()
            .map(|y| YearValue::new(y, 1.1_f64.powi(y - 2019)))
            .collect();
        assert_relative_eq!(series_cagr(&eps, 5).unwrap(), 10.0, epsilon = 1e-9);
        assert_eq!(series_cagr(&eps, 3), None);
        assert_eq!(span_years(&eps), 5);

        let (rate, span) = window_cagr(&eps, 5, 3).unwrap();
        assert_relative_eq!(rate, 10.0, epsilon = 1e-9);
        assert_eq!(span, 5);
        assert_eq!(recent_years(&eps, 3), vec![1.1_f64.powi(5), 1.1_f64.powi(4), 1.1_f64.powi(3)]);
        assert_eq!(recent_years(&eps, 5).len(), 4);
    }

    #[test]
    fn test_yoy_growth() {
        assert_eq!(yoy_growth(110.0, 100.0), Some(10.0));
        assert_eq!(yoy_growth(110.0, 0.0), None);
        assert_eq!(yoy_growth(110.0, -5.0), None);
    }
}
