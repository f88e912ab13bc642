//! Weighted average cost of capital from market data and trailing statements.

use analysis_core::{FundamentalsSnapshot, WaccBreakdown};
use fundamental_analysis::metrics::effective_tax_rate;
use fundamental_analysis::stats::mean;
use serde::{Deserialize, Serialize};
use tracing::warn;

const DEFAULT_BETA: f64 = 1.0;
const BETA_MIN: f64 = 0.5;
const BETA_MAX: f64 = 2.5;
const DEFAULT_TAX_RATE: f64 = 0.21;
const TRAILING_QUARTERS: usize = 4;
const TAX_AVERAGE_YEARS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaccConfig {
    /// Used when the snapshot carries no treasury yield.
    pub risk_free_rate: f64,
    pub market_risk_premium: f64,
    pub min_wacc: f64,
    pub max_wacc: f64,
    pub include_leases: bool,
}

impl Default for WaccConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.04,
            market_risk_premium: 0.06,
            min_wacc: 0.08,
            max_wacc: 0.12,
            include_leases: true,
        }
    }
}

/// Inputs for [`calculate_wacc`]. Rates are fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaccInput {
    pub market_cap: Option<f64>,
    pub average_debt: Option<f64>,
    pub interest_expense: Option<f64>,
    pub tax_rate: f64,
    pub beta: f64,
    pub risk_free_rate: f64,
}

fn positive(v: Option<f64>) -> f64 {
    v.filter(|x| x.is_finite() && *x > 0.0).unwrap_or(0.0)
}

/// Re = rf + beta * MRP; Rd = interest / debt; WACC weighted by market cap
/// and debt, then clamped to the configured band. Without any capital
/// structure the cost of equity stands in for WACC.
pub fn calculate_wacc(input: &WaccInput, config: &WaccConfig) -> WaccBreakdown {
    let beta = input.beta.clamp(BETA_MIN, BETA_MAX);
    let tax_rate = input.tax_rate.clamp(0.0, 0.5);
    let cost_of_equity = input.risk_free_rate + beta * config.market_risk_premium;

    let equity = positive(input.market_cap);
    let debt = positive(input.average_debt);
    let interest = positive(input.interest_expense);
    let cost_of_debt = if interest > 0.0 && debt > 0.0 { interest / debt } else { 0.0 };
    let after_tax_cost_of_debt = cost_of_debt * (1.0 - tax_rate);

    let total = equity + debt;
    let (equity_weight, debt_weight, unclamped_wacc) = if total > 0.0 {
        let we = equity / total;
        let wd = debt / total;
        (we, wd, we * cost_of_equity + wd * after_tax_cost_of_debt)
    } else {
        (1.0, 0.0, cost_of_equity)
    };

    WaccBreakdown {
        cost_of_equity,
        cost_of_debt,
        after_tax_cost_of_debt,
        equity_weight,
        debt_weight,
        beta,
        tax_rate,
        risk_free_rate: input.risk_free_rate,
        market_risk_premium: config.market_risk_premium,
        unclamped_wacc,
        wacc: unclamped_wacc.clamp(config.min_wacc, config.max_wacc),
    }
}

/// Trailing tax rate: summed quarters first, else the mean of up to four
/// clamped annual rates.
pub fn trailing_tax_rate(snap: &FundamentalsSnapshot) -> Option<f64> {
    let quarters = &snap.quarterly_income[..snap.quarterly_income.len().min(TRAILING_QUARTERS)];
    let tax: Option<f64> = quarters.iter().map(|q| q.income_tax_expense).sum();
    let pretax: Option<f64> = quarters.iter().map(|q| q.income_before_tax).sum();
    if let (Some(tax), Some(pretax)) = (tax, pretax) {
        if pretax > 0.0 && quarters.len() == TRAILING_QUARTERS {
            return Some((tax / pretax).clamp(0.0, 0.5));
        }
    }
    let annual: Vec<f64> = snap
        .income
        .iter()
        .take(TAX_AVERAGE_YEARS)
        .filter_map(effective_tax_rate)
        .collect();
    mean(&annual)
}

/// Mean debt over the trailing quarters, else the latest annual balance.
pub fn average_debt(snap: &FundamentalsSnapshot, include_leases: bool) -> Option<f64> {
    let quarterly: Vec<f64> = snap
        .quarterly_balance
        .iter()
        .take(TRAILING_QUARTERS)
        .filter_map(|b| b.total_debt(include_leases))
        .collect();
    mean(&quarterly).or_else(|| snap.balance.first().and_then(|b| b.total_debt(include_leases)))
}

/// Interest over the trailing four quarters, else the latest annual figure.
pub fn trailing_interest(snap: &FundamentalsSnapshot) -> Option<f64> {
    if snap.quarterly_income.len() >= TRAILING_QUARTERS {
        let sum: Option<f64> = snap
            .quarterly_income
            .iter()
            .take(TRAILING_QUARTERS)
            .map(|q| q.interest_expense.map(f64::abs))
            .sum();
        if sum.is_some() {
            return sum;
        }
    }
    snap.income.first().and_then(|i| i.interest_expense).map(f64::abs)
}

pub fn wacc_input_from_snapshot(
    snap: &FundamentalsSnapshot,
    config: &WaccConfig,
    warnings: &mut Vec<String>,
) -> WaccInput {
    let beta = match snap.profile.beta.filter(|b| b.is_finite()) {
        Some(b) => b,
        None => {
            warnings.push(format!("Beta unavailable, assuming {DEFAULT_BETA:.1}"));
            DEFAULT_BETA
        }
    };
    let tax_rate = trailing_tax_rate(snap).unwrap_or_else(|| {
        warnings.push(format!("Tax rate unavailable, assuming {:.0}%", DEFAULT_TAX_RATE * 100.0));
        DEFAULT_TAX_RATE
    });
    let risk_free_rate = snap
        .risk_free_rate
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(config.risk_free_rate);

    WaccInput {
        market_cap: snap.market_cap(),
        average_debt: average_debt(snap, config.include_leases),
        interest_expense: trailing_interest(snap),
        tax_rate,
        beta,
        risk_free_rate,
    }
}

/// Derive WACC for a snapshot, recording any fallbacks in `warnings`.
pub fn wacc_for_snapshot(
    snap: &FundamentalsSnapshot,
    config: &WaccConfig,
    warnings: &mut Vec<String>,
) -> WaccBreakdown {
    let input = wacc_input_from_snapshot(snap, config, warnings);
    let breakdown = calculate_wacc(&input, config);
    if (breakdown.wacc - breakdown.unclamped_wacc).abs() > f64::EPSILON {
        warn!(
            symbol = %snap.symbol,
            unclamped = breakdown.unclamped_wacc,
            wacc = breakdown.wacc,
            "WACC clamped"
        );
        warnings.push(format!(
            "WACC {:.2}% clamped to {:.2}%",
            breakdown.unclamped_wacc * 100.0,
            breakdown.wacc * 100.0
        ));
    }
    breakdown
}
