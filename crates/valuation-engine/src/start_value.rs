//! Per-share start value for each valuation mode, plus the series the
//! growth rate is derived from.

use analysis_core::{FundamentalsSnapshot, ValuationMode};
use fundamental_analysis::stats::{mean, median, recent_years, trimmed_mean, YearValue};

const LOOKBACK_YEARS: usize = 5;
const BUYBACK_YEARS: i32 = 3;
const MIN_POSITIVE_FOR_TRIM: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct StartValue {
    pub value: f64,
    /// Most-recent-first per-share history of the same basis.
    pub basis_series: Vec<YearValue>,
}

fn positives(values: &[f64]) -> Vec<f64> {
    values.iter().copied().filter(|v| v.is_finite() && *v > 0.0).collect()
}

fn eps_series(snap: &FundamentalsSnapshot) -> Vec<YearValue> {
    snap.income
        .iter()
        .filter_map(|i| Some(YearValue::new(i.fiscal_year, i.eps_diluted?)))
        .filter(|p| p.value.is_finite())
        .collect()
}

fn fcf_per_share_series(snap: &FundamentalsSnapshot) -> Vec<YearValue> {
    snap.cash_flow
        .iter()
        .filter_map(|c| {
            let shares = snap.shares_for_year(c.fiscal_year)?;
            Some(YearValue::new(c.fiscal_year, c.fcf()? / shares))
        })
        .filter(|p| p.value.is_finite())
        .collect()
}

fn dividend_per_share_series(snap: &FundamentalsSnapshot) -> Vec<YearValue> {
    snap.cash_flow
        .iter()
        .filter_map(|c| {
            let shares = snap.shares_for_year(c.fiscal_year)?;
            Some(YearValue::new(c.fiscal_year, c.dividends_paid?.abs() / shares))
        })
        .filter(|p| p.value.is_finite())
        .collect()
}

/// Net buybacks per share over the latest three fiscal years: repurchases
/// less issuance.
fn net_buyback_per_share(snap: &FundamentalsSnapshot) -> Option<f64> {
    let latest = snap.cash_flow.first()?.fiscal_year;
    let per_year: Vec<f64> = snap
        .cash_flow
        .iter()
        .take_while(|c| latest - c.fiscal_year < BUYBACK_YEARS)
        .filter_map(|c| {
            let shares = snap.shares_for_year(c.fiscal_year)?;
            let repurchased = c.stock_repurchased.unwrap_or(0.0).abs();
            let issued = c.stock_issued.unwrap_or(0.0).abs();
            Some((repurchased - issued) / shares)
        })
        .collect();
    mean(&per_year)
}

/// Trimmed mean of the positive EPS values of the last five years, or their
/// median when fewer than three are positive. Callers pass the values
/// reported within the lookback window.
pub fn eps_start_value(eps_recent_first: &[f64], trim_pct: f64) -> f64 {
    let window = &eps_recent_first[..eps_recent_first.len().min(LOOKBACK_YEARS)];
    let pos = positives(window);
    if pos.len() >= MIN_POSITIVE_FOR_TRIM {
        trimmed_mean(&pos, trim_pct).unwrap_or(0.0)
    } else {
        median(&pos).unwrap_or(0.0)
    }
}

pub fn fcf_start_value(fcf_per_share_recent_first: &[f64], trim_pct: f64) -> f64 {
    let window = &fcf_per_share_recent_first[..fcf_per_share_recent_first.len().min(LOOKBACK_YEARS)];
    let pos = positives(window);
    if pos.len() >= MIN_POSITIVE_FOR_TRIM {
        return trimmed_mean(&pos, trim_pct).unwrap_or(0.0);
    }
    match median(window) {
        Some(m) if m > 0.0 => m,
        _ => window.first().copied().unwrap_or(0.0).max(0.0),
    }
}

pub fn select_start_value(mode: ValuationMode, snap: &FundamentalsSnapshot, trim_pct: f64) -> StartValue {
    match mode {
        ValuationMode::EpsWoNri => {
            let series = eps_series(snap);
            let window = recent_years(&series, LOOKBACK_YEARS as i32);
            StartValue { value: eps_start_value(&window, trim_pct), basis_series: series }
        }
        ValuationMode::FcfPerShare => {
            let series = fcf_per_share_series(snap);
            let window = recent_years(&series, LOOKBACK_YEARS as i32);
            StartValue { value: fcf_start_value(&window, trim_pct), basis_series: series }
        }
        ValuationMode::AdjustedDividend => {
            let series = dividend_per_share_series(snap);
            let ttm_dividend = snap
                .ttm
                .dividend_per_share
                .or(snap.profile.last_dividend)
                .or_else(|| series.first().map(|p| p.value))
                .unwrap_or(0.0);
            let buybacks = net_buyback_per_share(snap).unwrap_or(0.0);
            StartValue { value: (ttm_dividend + buybacks).max(0.0), basis_series: series }
        }
    }
}
