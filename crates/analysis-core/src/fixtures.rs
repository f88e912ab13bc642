//! Deterministic sample snapshots shared by tests across the workspace.

use chrono::{Duration, NaiveDate};

use crate::{
    BalanceSheet, CashFlowStatement, CompanyProfile, FundamentalsSnapshot, IncomeStatement,
    PricePoint, TtmRatios,
};

fn year_end(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 12, 31)
}

/// Ten years of a steadily compounding, conservatively financed business.
///
/// Revenue starts at 1,000 in 2015 and grows 8% a year; net margin 20%,
/// 100 shares, equity 80% of revenue, price 60 (P/E 15 on 2024 EPS).
pub fn quality_compounder() -> FundamentalsSnapshot {
    let mut snap = FundamentalsSnapshot::new("QUAL");
    for i in 0..10 {
        let year = 2024 - i;
        let revenue = 1_000.0 * 1.08_f64.powi(9 - i);
        let pretax = 0.25 * revenue - 10.0;
        snap.income.push(IncomeStatement {
            fiscal_year: year,
            date: year_end(year),
            revenue: Some(revenue),
            gross_profit: Some(0.55 * revenue),
            operating_income: Some(0.25 * revenue),
            ebitda: Some(0.30 * revenue),
            net_income: Some(0.20 * revenue),
            eps_diluted: Some(0.20 * revenue / 100.0),
            interest_expense: Some(10.0),
            income_tax_expense: Some(0.21 * pretax),
            income_before_tax: Some(pretax),
            weighted_shares_diluted: Some(100.0),
        });
        snap.balance.push(BalanceSheet {
            fiscal_year: year,
            date: year_end(year),
            total_assets: Some(2.0 * revenue),
            total_liabilities: Some(1.2 * revenue),
            total_equity: Some(0.8 * revenue),
            current_assets: Some(0.6 * revenue),
            current_liabilities: Some(0.3 * revenue),
            short_term_debt: Some(20.0),
            long_term_debt: Some(180.0),
            lease_obligations: Some(0.0),
            cash_and_equivalents: Some(0.3 * revenue),
        });
        snap.cash_flow.push(CashFlowStatement {
            fiscal_year: year,
            date: year_end(year),
            operating_cash_flow: Some(0.25 * revenue),
            capital_expenditure: Some(-0.05 * revenue),
            free_cash_flow: Some(0.20 * revenue),
            dividends_paid: Some(-0.08 * revenue),
            stock_repurchased: Some(-0.02 * revenue),
            stock_issued: Some(0.0),
        });
    }

    for q in 0..4 {
        snap.quarterly_balance.push(BalanceSheet {
            fiscal_year: 2024,
            short_term_debt: Some(20.0),
            long_term_debt: Some(180.0),
            lease_obligations: Some(10.0),
            ..Default::default()
        });
        snap.quarterly_income.push(IncomeStatement {
            fiscal_year: 2024,
            date: NaiveDate::from_ymd_opt(2024, 12 - 3 * q as u32, 28),
            interest_expense: Some(2.5),
            income_before_tax: Some(120.0),
            income_tax_expense: Some(25.2),
            ..Default::default()
        });
    }

    let latest_revenue = 1_000.0 * 1.08_f64.powi(9);
    snap.profile = CompanyProfile {
        name: Some("Quality Compounder Inc.".to_string()),
        price: Some(60.0),
        market_cap: Some(6_000.0),
        beta: Some(1.1),
        shares_outstanding: Some(100.0),
        currency: Some("USD".to_string()),
        sector: Some("Technology".to_string()),
        industry: Some("Software - Application".to_string()),
        last_dividend: Some(0.08 * latest_revenue / 100.0),
    };
    snap.ttm = TtmRatios {
        pe: Some(60.0 / (0.20 * latest_revenue / 100.0)),
        pb: Some(6_000.0 / (0.8 * latest_revenue)),
        ps: Some(6_000.0 / latest_revenue),
        price_to_fcf: Some(6_000.0 / (0.20 * latest_revenue)),
        dividend_yield: Some(0.08 * latest_revenue / 100.0 / 60.0),
        payout_ratio: Some(0.4),
        dividend_per_share: Some(0.08 * latest_revenue / 100.0),
        current_ratio: Some(2.0),
        interest_coverage: Some(0.25 * latest_revenue / 10.0),
        debt_to_equity: Some(200.0 / (0.8 * latest_revenue)),
    };

    if let Some(last) = NaiveDate::from_ymd_opt(2024, 12, 31) {
        snap.price_history = (0..262)
            .map(|w| PricePoint {
                date: last - Duration::days(7 * w),
                close: 60.0 / 1.002_f64.powi(w as i32),
            })
            .collect();
    }
    snap.reported_currency = Some("USD".to_string());
    snap.risk_free_rate = Some(0.042);
    snap
}

/// A ticker with a profile but no statements at all.
pub fn profile_only() -> FundamentalsSnapshot {
    let mut snap = FundamentalsSnapshot::new("EMPTY");
    snap.profile.price = Some(12.0);
    snap.profile.market_cap = Some(1_200.0);
    snap.profile.currency = Some("USD".to_string());
    snap
}

/// Three years of losses and negative free cash flow.
pub fn loss_maker() -> FundamentalsSnapshot {
    let mut snap = FundamentalsSnapshot::new("LOSS");
    for i in 0..3 {
        let year = 2024 - i;
        snap.income.push(IncomeStatement {
            fiscal_year: year,
            date: year_end(year),
            revenue: Some(500.0),
            operating_income: Some(-40.0),
            ebitda: Some(-10.0),
            net_income: Some(-50.0),
            eps_diluted: Some(-0.5),
            weighted_shares_diluted: Some(100.0),
            ..Default::default()
        });
        snap.balance.push(BalanceSheet {
            fiscal_year: year,
            date: year_end(year),
            total_assets: Some(800.0),
            total_liabilities: Some(600.0),
            total_equity: Some(200.0),
            current_assets: Some(150.0),
            current_liabilities: Some(200.0),
            short_term_debt: Some(100.0),
            long_term_debt: Some(300.0),
            cash_and_equivalents: Some(20.0),
            ..Default::default()
        });
        snap.cash_flow.push(CashFlowStatement {
            fiscal_year: year,
            date: year_end(year),
            operating_cash_flow: Some(-20.0),
            capital_expenditure: Some(-30.0),
            ..Default::default()
        });
    }
    snap.profile.price = Some(8.0);
    snap.profile.shares_outstanding = Some(100.0);
    snap.profile.currency = Some("USD".to_string());
    snap.profile.beta = Some(1.8);
    snap
}
