//! Derivation of ratios and multi-year series from a fundamentals snapshot.
//!
//! Percent-valued metrics (ROE, margins, growth, yields, payout ratios) are in
//! percent units; multiples (P/E, current ratio, coverage) are plain ratios.
//! Every series is most-recent-first, one entry per fiscal year with data.
//! Series that feed growth rates keep their fiscal year so that spans across
//! unreported years are measured in years, not rows.

use analysis_core::{BalanceSheet, CashFlowStatement, FundamentalsSnapshot, IncomeStatement};
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::history::{select_growth, DisplayValue};
use crate::scorers::DividendInputs;
use crate::stats::{mean, median, series_cagr, YearValue};

const DEFAULT_TAX_RATE: f64 = 0.21;

/// Coverage reported for a year with positive operating income and no
/// interest expense.
pub const DEBT_FREE_INTEREST_COVERAGE: f64 = 100.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricHistory {
    pub roe: Vec<f64>,
    pub roic: Vec<f64>,
    pub net_margin: Vec<f64>,
    pub operating_margin: Vec<f64>,
    pub roa: Vec<f64>,
    pub debt_to_assets: Vec<f64>,
    pub interest_coverage: Vec<f64>,
    pub current_ratio: Vec<f64>,
    pub net_debt_to_ebitda: Vec<f64>,
    pub eps: Vec<YearValue>,
    pub revenue: Vec<YearValue>,
    pub ebitda: Vec<YearValue>,
    pub net_income: Vec<f64>,
    pub operating_cash_flow: Vec<f64>,
    pub fcf: Vec<YearValue>,
    pub fcf_per_share: Vec<f64>,
    pub dividends_per_share: Vec<YearValue>,
    pub price_to_sales: Vec<f64>,
}

/// Trailing price returns in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceReturns {
    pub one_month: Option<f64>,
    pub three_months: Option<f64>,
    pub six_months: Option<f64>,
    pub twelve_months: Option<f64>,
}

impl PriceReturns {
    pub fn is_empty(&self) -> bool {
        self.one_month.is_none()
            && self.three_months.is_none()
            && self.six_months.is_none()
            && self.twelve_months.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    pub price: Option<f64>,
    pub roe: Option<f64>,
    pub roic: Option<f64>,
    pub net_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub roa: Option<f64>,
    pub debt_to_assets: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub interest_coverage: Option<f64>,
    pub current_ratio: Option<f64>,
    pub net_debt: Option<f64>,
    pub ebitda: Option<f64>,
    pub net_debt_to_ebitda: Option<f64>,
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub ps: Option<f64>,
    pub price_to_fcf: Option<f64>,
    pub eps: Option<f64>,
    pub book_value_per_share: Option<f64>,
    pub fcf_per_share: Option<f64>,
    pub dividend_per_share: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub payout_ratio_earnings: Option<f64>,
    pub payout_ratio_fcf: Option<f64>,
    pub dividend_streak: u32,
    pub dividend_cagr_5y: Option<f64>,
    pub eps_growth: Option<DisplayValue>,
    pub revenue_growth: Option<DisplayValue>,
    pub ebitda_growth: Option<DisplayValue>,
    pub fcf_growth: Option<DisplayValue>,
    pub median_ps_5y: Option<f64>,
    pub fcf_margin_5y: Option<f64>,
    pub ocf_quality_5y: Option<f64>,
    pub lynch_fair_value: Option<f64>,
    pub price_returns: PriceReturns,
    pub history: MetricHistory,
}

/// Effective tax rate from tax expense and pre-tax income, clamped to [0, 0.5].
pub fn effective_tax_rate(income: &IncomeStatement) -> Option<f64> {
    match (income.income_tax_expense, income.income_before_tax) {
        (Some(tax), Some(pretax)) if pretax > 0.0 => Some((tax / pretax).clamp(0.0, 0.5)),
        _ => None,
    }
}

fn ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    match (num, den) {
        (Some(n), Some(d)) if d > 0.0 && n.is_finite() => Some(n / d),
        _ => None,
    }
}

fn pct(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    ratio(num, den).map(|r| r * 100.0)
}

struct YearRow<'a> {
    income: &'a IncomeStatement,
    balance: Option<&'a BalanceSheet>,
    cash_flow: Option<&'a CashFlowStatement>,
    shares: Option<f64>,
}

fn year_rows(snap: &FundamentalsSnapshot) -> Vec<YearRow<'_>> {
    snap.income
        .iter()
        .map(|income| YearRow {
            income,
            balance: snap.balance.iter().find(|b| b.fiscal_year == income.fiscal_year),
            cash_flow: snap.cash_flow.iter().find(|c| c.fiscal_year == income.fiscal_year),
            shares: snap.shares_for_year(income.fiscal_year),
        })
        .collect()
}

fn roic(row: &YearRow<'_>) -> Option<f64> {
    let balance = row.balance?;
    let tax = effective_tax_rate(row.income).unwrap_or(DEFAULT_TAX_RATE);
    let nopat = row.income.operating_income? * (1.0 - tax);
    let invested = balance.total_debt(false).unwrap_or(0.0) + balance.total_equity?
        - balance.cash_and_equivalents.unwrap_or(0.0);
    pct(Some(nopat), Some(invested))
}

fn interest_coverage(income: &IncomeStatement) -> Option<f64> {
    let operating = income.operating_income.filter(|v| v.is_finite())?;
    match income.interest_expense {
        Some(interest) if interest > 0.0 => Some(operating / interest),
        _ if operating > 0.0 => Some(DEBT_FREE_INTEREST_COVERAGE),
        _ => None,
    }
}

fn net_debt_to_ebitda(balance: &BalanceSheet, ebitda: Option<f64>) -> Option<f64> {
    let net_debt = balance.net_debt()?;
    match ebitda {
        Some(e) if e > 0.0 => Some(net_debt / e),
        _ if net_debt <= 0.0 => Some(0.0),
        _ => None,
    }
}

fn collect<F>(rows: &[YearRow<'_>], f: F) -> Vec<f64>
where
    F: Fn(&YearRow<'_>) -> Option<f64>,
{
    rows.iter().filter_map(f).filter(|v| v.is_finite()).collect()
}

fn collect_years<F>(rows: &[YearRow<'_>], f: F) -> Vec<YearValue>
where
    F: Fn(&YearRow<'_>) -> Option<f64>,
{
    rows.iter()
        .filter_map(|r| f(r).map(|v| YearValue::new(r.income.fiscal_year, v)))
        .filter(|p| p.value.is_finite())
        .collect()
}

/// Consecutive year-over-year dividend increases, counted from the latest
/// year. An unreported fiscal year ends the streak.
pub fn dividend_streak(dps_recent_first: &[YearValue]) -> u32 {
    dps_recent_first
        .windows(2)
        .take_while(|w| {
            w[0].fiscal_year == w[1].fiscal_year + 1 && w[0].value > w[1].value && w[1].value > 0.0
        })
        .count() as u32
}

/// Peter Lynch fair value: EPS times a fair P/E equal to growth plus yield,
/// with the fair P/E held within [5, 30].
pub fn peter_lynch_fair_value(eps: f64, growth_pct: f64, dividend_yield_pct: f64) -> Option<f64> {
    if eps <= 0.0 || !eps.is_finite() {
        return None;
    }
    let fair_pe = (growth_pct.max(0.0) + dividend_yield_pct.max(0.0)).clamp(5.0, 30.0);
    Some(eps * fair_pe)
}

fn price_return(snap: &FundamentalsSnapshot, months: u32) -> Option<f64> {
    let latest = snap.price_history.first()?;
    let target: NaiveDate = latest.date.checked_sub_months(Months::new(months))?;
    let oldest = snap.price_history.last()?;
    if oldest.date > target {
        return None;
    }
    let past = snap.price_on_or_before(target)?;
    if past > 0.0 {
        Some((latest.close / past - 1.0) * 100.0)
    } else {
        None
    }
}

impl FinancialMetrics {
    pub fn from_snapshot(snap: &FundamentalsSnapshot) -> Self {
        let rows = year_rows(snap);
        let price = snap.price();

        let history = MetricHistory {
            roe: collect(&rows, |r| pct(r.income.net_income, r.balance?.total_equity)),
            roic: collect(&rows, roic),
            net_margin: collect(&rows, |r| pct(r.income.net_income, r.income.revenue)),
            operating_margin: collect(&rows, |r| pct(r.income.operating_income, r.income.revenue)),
            roa: collect(&rows, |r| pct(r.income.net_income, r.balance?.total_assets)),
            debt_to_assets: collect(&rows, |r| {
                let b = r.balance?;
                pct(b.total_liabilities, b.total_assets)
            }),
            interest_coverage: collect(&rows, |r| interest_coverage(r.income)),
            current_ratio: collect(&rows, |r| {
                let b = r.balance?;
                ratio(b.current_assets, b.current_liabilities)
            }),
            net_debt_to_ebitda: collect(&rows, |r| net_debt_to_ebitda(r.balance?, r.income.ebitda)),
            eps: collect_years(&rows, |r| r.income.eps_diluted),
            revenue: collect_years(&rows, |r| r.income.revenue),
            ebitda: collect_years(&rows, |r| r.income.ebitda),
            net_income: collect(&rows, |r| r.income.net_income),
            operating_cash_flow: collect(&rows, |r| r.cash_flow?.operating_cash_flow),
            fcf: collect_years(&rows, |r| r.cash_flow?.fcf()),
            fcf_per_share: collect(&rows, |r| ratio(r.cash_flow?.fcf(), r.shares)),
            dividends_per_share: collect_years(&rows, |r| {
                let paid = r.cash_flow?.dividends_paid?.abs();
                ratio(Some(paid), r.shares)
            }),
            price_to_sales: collect(&rows, |r| {
                let date = r.income.date?;
                let close = snap.price_on_or_before(date)?;
                ratio(Some(close * r.shares?), r.income.revenue)
            }),
        };

        let latest = rows.first();
        let latest_balance = snap.balance.first();
        let latest_cash_flow = snap.cash_flow.first();
        let shares = snap.shares_outstanding();

        let eps = latest.and_then(|r| r.income.eps_diluted);
        let book_value_per_share = ratio(latest_balance.and_then(|b| b.total_equity), shares);
        let fcf_per_share = ratio(latest_cash_flow.and_then(|c| c.fcf()), shares);
        let net_debt = latest_balance.and_then(|b| b.net_debt());
        let ebitda = latest.and_then(|r| r.income.ebitda);

        let pe = snap.ttm.pe.filter(|v| v.is_finite()).or_else(|| match (price, eps) {
            (Some(p), Some(e)) if e > 0.0 => Some(p / e),
            _ => None,
        });
        let pb = snap.ttm.pb.filter(|v| v.is_finite()).or_else(|| ratio(price, book_value_per_share));
        let ps = snap.ttm.ps.filter(|v| v.is_finite()).or_else(|| {
            ratio(snap.market_cap(), latest.and_then(|r| r.income.revenue))
        });
        let price_to_fcf = match (price, fcf_per_share) {
            (Some(p), Some(f)) if f > 0.0 => Some(p / f),
            _ => None,
        };

        let dividend_per_share = snap
            .ttm
            .dividend_per_share
            .or(snap.profile.last_dividend)
            .or_else(|| history.dividends_per_share.first().map(|p| p.value))
            .filter(|d| *d >= 0.0);
        let dividend_yield = snap
            .ttm
            .dividend_yield
            .map(|y| y * 100.0)
            .or_else(|| pct(dividend_per_share, price));

        let dividends_paid = latest_cash_flow.and_then(|c| c.dividends_paid).map(f64::abs);
        let payout_ratio_earnings = snap
            .ttm
            .payout_ratio
            .map(|p| p * 100.0)
            .or_else(|| pct(dividends_paid, latest.and_then(|r| r.income.net_income)));
        let payout_ratio_fcf = pct(dividends_paid, latest_cash_flow.and_then(|c| c.fcf()));

        let eps_growth = select_growth(&history.eps);
        let lynch_fair_value = match (eps, &eps_growth) {
            (Some(e), Some(g)) => peter_lynch_fair_value(e, g.value, dividend_yield.unwrap_or(0.0)),
            _ => None,
        };

        let five = |v: &[f64]| v.iter().take(5).copied().collect::<Vec<f64>>();
        let fcf_margin_5y = {
            let margins: Vec<f64> = rows
                .iter()
                .take(5)
                .filter_map(|r| pct(r.cash_flow?.fcf(), r.income.revenue))
                .collect();
            mean(&margins)
        };
        let ocf_quality_5y = {
            let ocf: f64 = five(&history.operating_cash_flow).iter().sum();
            let ni: f64 = five(&history.net_income).iter().sum();
            if history.operating_cash_flow.is_empty() || ni <= 0.0 {
                None
            } else {
                Some(ocf / ni)
            }
        };

        FinancialMetrics {
            price,
            roe: history.roe.first().copied(),
            roic: history.roic.first().copied(),
            net_margin: history.net_margin.first().copied(),
            operating_margin: history.operating_margin.first().copied(),
            roa: history.roa.first().copied(),
            debt_to_assets: history.debt_to_assets.first().copied(),
            debt_to_equity: latest_balance
                .and_then(|b| ratio(b.total_debt(false), b.total_equity))
                .or(snap.ttm.debt_to_equity),
            interest_coverage: history.interest_coverage.first().copied().or(snap.ttm.interest_coverage),
            current_ratio: history.current_ratio.first().copied().or(snap.ttm.current_ratio),
            net_debt,
            ebitda,
            net_debt_to_ebitda: history.net_debt_to_ebitda.first().copied(),
            pe,
            pb,
            ps,
            price_to_fcf,
            eps,
            book_value_per_share,
            fcf_per_share,
            dividend_per_share,
            dividend_yield,
            payout_ratio_earnings,
            payout_ratio_fcf,
            dividend_streak: dividend_streak(&history.dividends_per_share),
            dividend_cagr_5y: series_cagr(&history.dividends_per_share, 5),
            eps_growth,
            revenue_growth: select_growth(&history.revenue),
            ebitda_growth: select_growth(&history.ebitda),
            fcf_growth: select_growth(&history.fcf),
            median_ps_5y: median(&five(&history.price_to_sales)),
            fcf_margin_5y,
            ocf_quality_5y,
            lynch_fair_value,
            price_returns: PriceReturns {
                one_month: price_return(snap, 1),
                three_months: price_return(snap, 3),
                six_months: price_return(snap, 6),
                twelve_months: price_return(snap, 12),
            },
            history,
        }
    }

    /// Number of the last (up to) 10 fiscal years with positive net income,
    /// together with how many years were on record.
    pub fn profitable_years(&self) -> (usize, usize) {
        let window: Vec<f64> = self.history.net_income.iter().take(10).copied().collect();
        (window.iter().filter(|ni| **ni > 0.0).count(), window.len())
    }

    pub fn dividend_inputs(&self) -> DividendInputs {
        DividendInputs {
            dividend_per_share: self.dividend_per_share,
            payout_ratio_earnings: self.payout_ratio_earnings,
            payout_ratio_fcf: self.payout_ratio_fcf,
            streak_years: self.dividend_streak,
            cagr_5y: self.dividend_cagr_5y,
        }
    }

    /// Free cash flow was negative in at least two of the last three years.
    pub fn fcf_mostly_negative(&self) -> bool {
        self.fcf_negative_years_of_last_three() >= 2
    }

    pub fn fcf_negative_years_of_last_three(&self) -> u32 {
        self.history.fcf.iter().take(3).filter(|f| f.value < 0.0).count() as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{fixtures, ValueBasis};
    use approx::assert_relative_eq;

    #[test]
    fn test_compounder_ratios() {
        let m = FinancialMetrics::from_snapshot(&fixtures::quality_compounder());
        assert_relative_eq!(m.roe.unwrap(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(m.net_margin.unwrap(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(m.operating_margin.unwrap(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(m.debt_to_assets.unwrap(), 60.0, epsilon = 1e-9);
        assert_relative_eq!(m.current_ratio.unwrap(), 2.0, epsilon = 1e-9);
        assert_eq!(m.history.roe.len(), 10);
        assert_relative_eq!(m.pe.unwrap(), 60.0 / m.eps.unwrap(), epsilon = 1e-9);
    }

    #[test]
    fn test_compounder_growth() {
        let m = FinancialMetrics::from_snapshot(&fixtures::quality_compounder());
        let g = m.revenue_growth.unwrap();
        assert_relative_eq!(g.value, 8.0, epsilon = 1e-9);
        assert_relative_eq!(m.eps_growth.unwrap().value, 8.0, epsilon = 1e-9);
        assert_eq!(m.dividend_streak, 9);
        assert_relative_eq!(m.dividend_cagr_5y.unwrap(), 8.0, epsilon = 1e-9);
        assert_relative_eq!(m.fcf_margin_5y.unwrap(), 20.0, epsilon = 1e-9);
        assert_relative_eq!(m.ocf_quality_5y.unwrap(), 1.25, epsilon = 1e-9);
    }

    #[test]
    fn test_net_cash_compounder() {
        let m = FinancialMetrics::from_snapshot(&fixtures::quality_compounder());
        // cash (0.3 x revenue) exceeds the fixed 200 of debt
        assert!(m.net_debt.unwrap() < 0.0);
        assert!(m.net_debt_to_ebitda.unwrap() < 0.0);
    }

    #[test]
    fn test_price_returns() {
        let m = FinancialMetrics::from_snapshot(&fixtures::quality_compounder());
        let r = m.price_returns;
        assert!(r.twelve_months.unwrap() > r.one_month.unwrap());
        assert!(r.one_month.unwrap() > 0.0);
    }

    #[test]
    fn test_loss_maker() {
        let m = FinancialMetrics::from_snapshot(&fixtures::loss_maker());
        assert_eq!(m.pe, None);
        assert_eq!(m.eps_growth, None);
        assert_eq!(m.lynch_fair_value, None);
        assert_eq!(m.profitable_years(), (0, 3));
        assert!(m.fcf_mostly_negative());
        assert_eq!(m.net_debt_to_ebitda, None);
    }

    fn years(latest: i32, recent_first: &[f64]) -> Vec<YearValue> {
        recent_first
            .iter()
            .enumerate()
            .map(|(i, v)| YearValue::new(latest - i as i32, *v))
            .collect()
    }

    #[test]
    fn test_dividend_streak_stops_at_cut() {
        assert_eq!(dividend_streak(&years(2024, &[1.3, 1.2, 1.1, 1.15, 1.0])), 2);
        assert_eq!(dividend_streak(&years(2024, &[1.0])), 0);
        assert_eq!(dividend_streak(&[]), 0);
    }

    #[test]
    fn test_dividend_streak_stops_at_unreported_year() {
        let dps = vec![
            YearValue::new(2024, 1.3),
            YearValue::new(2023, 1.2),
            YearValue::new(2021, 1.1),
            YearValue::new(2020, 1.0),
        ];
        assert_eq!(dividend_streak(&dps), 1);
    }

    #[test]
    fn test_growth_spans_unreported_year() {
        // 2021 filing missing: 2024 vs 2019 is a five-year span at 10% a year
        let mut snap = fixtures::quality_compounder();
        snap.income.retain(|i| i.fiscal_year >= 2019 && i.fiscal_year != 2021);
        for income in &mut snap.income {
            let k = income.fiscal_year - 2019;
            income.revenue = Some(1000.0 * 1.1_f64.powi(k));
            income.eps_diluted = Some(2.0 * 1.1_f64.powi(k));
        }
        let m = FinancialMetrics::from_snapshot(&snap);
        let revenue = m.revenue_growth.unwrap();
        assert_eq!(revenue.basis, ValueBasis::Cagr { years: 5 });
        assert_relative_eq!(revenue.value, 10.0, epsilon = 1e-9);
        let eps = m.eps_growth.unwrap();
        assert_eq!(eps.basis, ValueBasis::Cagr { years: 5 });
        assert_relative_eq!(eps.value, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_debt_free_year_has_top_coverage() {
        let mut snap = fixtures::quality_compounder();
        for income in &mut snap.income {
            income.interest_expense = None;
        }
        snap.income[1].interest_expense = Some(0.0);
        snap.ttm.interest_coverage = Some(1.5);
        let m = FinancialMetrics::from_snapshot(&snap);
        assert_eq!(m.interest_coverage, Some(DEBT_FREE_INTEREST_COVERAGE));
        assert_eq!(m.history.interest_coverage[1], DEBT_FREE_INTEREST_COVERAGE);
        assert_eq!(m.history.interest_coverage.len(), 10);

        // operating losses with no interest on record stay unrated
        let loss = FinancialMetrics::from_snapshot(&fixtures::loss_maker());
        assert!(loss.history.interest_coverage.is_empty());
        assert_eq!(loss.interest_coverage, None);
    }

    #[test]
    fn test_peter_lynch_fair_value() {
        assert_eq!(peter_lynch_fair_value(2.0, 12.0, 2.0), Some(28.0));
        assert_eq!(peter_lynch_fair_value(2.0, 50.0, 0.0), Some(60.0));
        assert_eq!(peter_lynch_fair_value(2.0, -3.0, 0.0), Some(10.0));
        assert_eq!(peter_lynch_fair_value(-1.0, 10.0, 0.0), None);
    }
}
