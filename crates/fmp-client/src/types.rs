//! Raw response shapes of the FMP stable API.
//!
//! Every numeric field is optional: FMP omits or nulls fields freely depending
//! on the filer, and missing values are handled once when the snapshot is built.

use analysis_core::{BalanceSheet, CashFlowStatement, IncomeStatement, PricePoint};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};

/// Reporting period for financial statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    Annual,
    Quarter,
}

impl Period {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Annual => "annual",
            Self::Quarter => "quarter",
        }
    }
}

/// FMP sends fiscal years as strings ("2024") on the stable API and as
/// numbers on some legacy endpoints.
fn de_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        Some(serde_json::Value::Number(n)) => n.as_i64().map(|n| n as i32),
        _ => None,
    })
}

fn parse_date(date: &Option<String>) -> Option<NaiveDate> {
    date.as_deref()
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
}

fn fiscal_year(explicit: Option<i32>, date: Option<NaiveDate>) -> i32 {
    explicit.or_else(|| date.map(|d| d.year())).unwrap_or(0)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpProfile {
    pub symbol: String,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default, alias = "mktCap")]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(default, alias = "lastDiv")]
    pub last_dividend: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpIncomeStatement {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "calendarYear", deserialize_with = "de_year")]
    pub fiscal_year: Option<i32>,
    #[serde(default)]
    pub reported_currency: Option<String>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub gross_profit: Option<f64>,
    #[serde(default)]
    pub operating_income: Option<f64>,
    #[serde(default)]
    pub ebitda: Option<f64>,
    #[serde(default)]
    pub net_income: Option<f64>,
    #[serde(default, alias = "epsdiluted")]
    pub eps_diluted: Option<f64>,
    #[serde(default)]
    pub interest_expense: Option<f64>,
    #[serde(default)]
    pub income_tax_expense: Option<f64>,
    #[serde(default)]
    pub income_before_tax: Option<f64>,
    #[serde(default)]
    pub weighted_average_shs_out_dil: Option<f64>,
}

impl From<FmpIncomeStatement> for IncomeStatement {
    fn from(raw: FmpIncomeStatement) -> Self {
        let date = parse_date(&raw.date);
        IncomeStatement {
            fiscal_year: fiscal_year(raw.fiscal_year, date),
            date,
            revenue: raw.revenue,
            gross_profit: raw.gross_profit,
            operating_income: raw.operating_income,
            ebitda: raw.ebitda,
            net_income: raw.net_income,
            eps_diluted: raw.eps_diluted,
            interest_expense: raw.interest_expense.map(f64::abs),
            income_tax_expense: raw.income_tax_expense,
            income_before_tax: raw.income_before_tax,
            weighted_shares_diluted: raw.weighted_average_shs_out_dil,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpBalanceSheet {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "calendarYear", deserialize_with = "de_year")]
    pub fiscal_year: Option<i32>,
    #[serde(default)]
    pub total_assets: Option<f64>,
    #[serde(default)]
    pub total_liabilities: Option<f64>,
    #[serde(default)]
    pub total_stockholders_equity: Option<f64>,
    #[serde(default)]
    pub total_current_assets: Option<f64>,
    #[serde(default)]
    pub total_current_liabilities: Option<f64>,
    #[serde(default)]
    pub short_term_debt: Option<f64>,
    #[serde(default)]
    pub long_term_debt: Option<f64>,
    #[serde(default)]
    pub capital_lease_obligations: Option<f64>,
    #[serde(default)]
    pub cash_and_cash_equivalents: Option<f64>,
}

impl From<FmpBalanceSheet> for BalanceSheet {
    fn from(raw: FmpBalanceSheet) -> Self {
        let date = parse_date(&raw.date);
        BalanceSheet {
            fiscal_year: fiscal_year(raw.fiscal_year, date),
            date,
            total_assets: raw.total_assets,
            total_liabilities: raw.total_liabilities,
            total_equity: raw.total_stockholders_equity,
            current_assets: raw.total_current_assets,
            current_liabilities: raw.total_current_liabilities,
            short_term_debt: raw.short_term_debt,
            long_term_debt: raw.long_term_debt,
            lease_obligations: raw.capital_lease_obligations,
            cash_and_equivalents: raw.cash_and_cash_equivalents,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpCashFlowStatement {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "calendarYear", deserialize_with = "de_year")]
    pub fiscal_year: Option<i32>,
    #[serde(default)]
    pub operating_cash_flow: Option<f64>,
    #[serde(default)]
    pub capital_expenditure: Option<f64>,
    #[serde(default)]
    pub free_cash_flow: Option<f64>,
    #[serde(default, alias = "dividendsPaid", alias = "commonDividendsPaid")]
    pub net_dividends_paid: Option<f64>,
    #[serde(default)]
    pub common_stock_repurchased: Option<f64>,
    #[serde(default, alias = "commonStockIssued")]
    pub common_stock_issuance: Option<f64>,
}

impl From<FmpCashFlowStatement> for CashFlowStatement {
    fn from(raw: FmpCashFlowStatement) -> Self {
        let date = parse_date(&raw.date);
        CashFlowStatement {
            fiscal_year: fiscal_year(raw.fiscal_year, date),
            date,
            operating_cash_flow: raw.operating_cash_flow,
            capital_expenditure: raw.capital_expenditure,
            free_cash_flow: raw.free_cash_flow,
            dividends_paid: raw.net_dividends_paid,
            stock_repurchased: raw.common_stock_repurchased,
            stock_issued: raw.common_stock_issuance,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FmpRatiosTtm {
    #[serde(default, rename = "priceToEarningsRatioTTM")]
    pub pe: Option<f64>,
    #[serde(default, rename = "priceToBookRatioTTM")]
    pub pb: Option<f64>,
    #[serde(default, rename = "priceToSalesRatioTTM")]
    pub ps: Option<f64>,
    #[serde(default, rename = "priceToFreeCashFlowRatioTTM")]
    pub price_to_fcf: Option<f64>,
    #[serde(default, rename = "dividendYieldTTM")]
    pub dividend_yield: Option<f64>,
    #[serde(default, rename = "dividendPayoutRatioTTM")]
    pub payout_ratio: Option<f64>,
    #[serde(default, rename = "dividendPerShareTTM")]
    pub dividend_per_share: Option<f64>,
    #[serde(default, rename = "currentRatioTTM")]
    pub current_ratio: Option<f64>,
    #[serde(default, rename = "interestCoverageRatioTTM")]
    pub interest_coverage: Option<f64>,
    #[serde(default, rename = "debtToEquityRatioTTM")]
    pub debt_to_equity: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FmpPricePoint {
    pub date: String,
    #[serde(alias = "close")]
    pub price: f64,
}

impl FmpPricePoint {
    pub fn into_point(self) -> Option<PricePoint> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d")
            .ok()
            .map(|date| PricePoint { date, close: self.price })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FmpTreasuryRate {
    pub date: String,
    #[serde(default)]
    pub year10: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FmpQuote {
    pub symbol: String,
    #[serde(default)]
    pub price: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_income_statement_from_stable_payload() {
        let raw: FmpIncomeStatement = serde_json::from_str(
            r#"{
                "date": "2024-09-28",
                "symbol": "AAPL",
                "reportedCurrency": "USD",
                "fiscalYear": "2024",
                "revenue": 391035000000,
                "operatingIncome": 123216000000,
                "netIncome": 93736000000,
                "epsDiluted": 6.08,
                "interestExpense": null,
                "weightedAverageShsOutDil": 15408095000
            }"#,
        )
        .unwrap();
        let income: IncomeStatement = raw.into();
        assert_eq!(income.fiscal_year, 2024);
        assert_eq!(income.eps_diluted, Some(6.08));
        assert_eq!(income.interest_expense, None);
        assert_eq!(income.date, NaiveDate::from_ymd_opt(2024, 9, 28));
    }

    #[test]
    fn test_legacy_field_aliases() {
        let raw: FmpCashFlowStatement = serde_json::from_str(
            r#"{
                "date": "2019-12-31",
                "calendarYear": 2019,
                "operatingCashFlow": 100.0,
                "capitalExpenditure": -20.0,
                "dividendsPaid": -10.0,
                "commonStockIssued": 5.0
            }"#,
        )
        .unwrap();
        let cf: CashFlowStatement = raw.into();
        assert_eq!(cf.fiscal_year, 2019);
        assert_eq!(cf.dividends_paid, Some(-10.0));
        assert_eq!(cf.stock_issued, Some(5.0));
        assert_eq!(cf.fcf(), Some(80.0));
    }

    #[test]
    fn test_fiscal_year_falls_back_to_date() {
        let raw: FmpBalanceSheet =
            serde_json::from_str(r#"{ "date": "2023-06-30", "totalAssets": 10.0 }"#).unwrap();
        let bs: BalanceSheet = raw.into();
        assert_eq!(bs.fiscal_year, 2023);
    }
}
