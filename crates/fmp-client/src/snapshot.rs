//! Normalization of FMP payloads into a [`FundamentalsSnapshot`].

use analysis_core::{
    AnalysisError, BalanceSheet, CashFlowStatement, CompanyProfile, FundamentalsProvider,
    FundamentalsSnapshot, IncomeStatement, TtmRatios,
};
use async_trait::async_trait;
use chrono::{Duration, Utc};

use crate::{
    FmpBalanceSheet, FmpCashFlowStatement, FmpClient, FmpError, FmpIncomeStatement, FmpPricePoint,
    FmpProfile, FmpRatiosTtm, Period,
};

const ANNUAL_LOOKBACK: u32 = 10;
const QUARTERLY_LOOKBACK: u32 = 4;
const PRICE_HISTORY_DAYS: i64 = 5 * 366;

/// Everything fetched for one ticker, before normalization.
#[derive(Debug, Clone)]
pub struct RawFundamentals {
    pub profile: FmpProfile,
    pub income: Vec<FmpIncomeStatement>,
    pub balance: Vec<FmpBalanceSheet>,
    pub cash_flow: Vec<FmpCashFlowStatement>,
    pub quarterly_income: Vec<FmpIncomeStatement>,
    pub quarterly_balance: Vec<FmpBalanceSheet>,
    pub ratios: FmpRatiosTtm,
    pub prices: Vec<FmpPricePoint>,
    pub ten_year_treasury: Option<f64>,
}

/// Build the normalized snapshot. Series end up most-recent-first regardless
/// of the order FMP returned them in.
pub fn assemble(symbol: &str, raw: RawFundamentals) -> FundamentalsSnapshot {
    let mut snap = FundamentalsSnapshot::new(symbol.to_uppercase());

    snap.reported_currency = raw
        .income
        .iter()
        .find_map(|i| i.reported_currency.clone());

    snap.income = raw.income.into_iter().map(IncomeStatement::from).collect();
    snap.income.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year));
    snap.balance = raw.balance.into_iter().map(BalanceSheet::from).collect();
    snap.balance.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year));
    snap.cash_flow = raw.cash_flow.into_iter().map(CashFlowStatement::from).collect();
    snap.cash_flow.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year));

    snap.quarterly_income = raw.quarterly_income.into_iter().map(IncomeStatement::from).collect();
    snap.quarterly_income.sort_by(|a, b| b.date.cmp(&a.date));
    snap.quarterly_balance = raw.quarterly_balance.into_iter().map(BalanceSheet::from).collect();
    snap.quarterly_balance.sort_by(|a, b| b.date.cmp(&a.date));

    snap.profile = CompanyProfile {
        name: raw.profile.company_name,
        price: raw.profile.price,
        market_cap: raw.profile.market_cap,
        beta: raw.profile.beta,
        shares_outstanding: None,
        currency: raw.profile.currency,
        sector: raw.profile.sector,
        industry: raw.profile.industry,
        last_dividend: raw.profile.last_dividend,
    };

    snap.ttm = TtmRatios {
        pe: raw.ratios.pe,
        pb: raw.ratios.pb,
        ps: raw.ratios.ps,
        price_to_fcf: raw.ratios.price_to_fcf,
        dividend_yield: raw.ratios.dividend_yield,
        payout_ratio: raw.ratios.payout_ratio,
        dividend_per_share: raw.ratios.dividend_per_share,
        current_ratio: raw.ratios.current_ratio,
        interest_coverage: raw.ratios.interest_coverage,
        debt_to_equity: raw.ratios.debt_to_equity,
    };

    snap.price_history = raw
        .prices
        .into_iter()
        .filter_map(FmpPricePoint::into_point)
        .collect();
    snap.price_history.sort_by(|a, b| b.date.cmp(&a.date));

    snap.risk_free_rate = raw.ten_year_treasury;
    snap
}

impl FmpClient {
    /// Fetch all fundamentals for `symbol` concurrently. The first failing
    /// statement request aborts the whole fetch; the treasury yield is optional.
    pub async fn fetch_raw(&self, symbol: &str) -> Result<RawFundamentals, FmpError> {
        let from = (Utc::now() - Duration::days(PRICE_HISTORY_DAYS)).date_naive();

        let (core, treasury) = tokio::join!(
            async {
                tokio::try_join!(
                    self.get_profile(symbol),
                    self.get_income_statements(symbol, Period::Annual, ANNUAL_LOOKBACK),
                    self.get_balance_sheets(symbol, Period::Annual, ANNUAL_LOOKBACK),
                    self.get_cash_flow_statements(symbol, Period::Annual, ANNUAL_LOOKBACK),
                    self.get_income_statements(symbol, Period::Quarter, QUARTERLY_LOOKBACK),
                    self.get_balance_sheets(symbol, Period::Quarter, QUARTERLY_LOOKBACK),
                    self.get_ratios_ttm(symbol),
                    self.get_price_history(symbol, from),
                )
            },
            self.get_ten_year_treasury(),
        );

        let (profile, income, balance, cash_flow, quarterly_income, quarterly_balance, ratios, prices) = core?;

        let ten_year_treasury = match treasury {
            Ok(rate) => rate,
            Err(e) => {
                tracing::warn!("Treasury rate unavailable, using configured risk-free rate: {}", e);
                None
            }
        };

        Ok(RawFundamentals {
            profile,
            income,
            balance,
            cash_flow,
            quarterly_income,
            quarterly_balance,
            ratios,
            prices,
            ten_year_treasury,
        })
    }
}

#[async_trait]
impl FundamentalsProvider for FmpClient {
    async fn fetch_fundamentals(&self, symbol: &str) -> Result<FundamentalsSnapshot, AnalysisError> {
        let raw = self.fetch_raw(symbol).await?;
        let mut snap = assemble(symbol, raw);

        if snap.needs_currency_conversion() {
            let from = snap.reported_currency.clone().unwrap_or_default();
            let to = snap.currency().to_string();
            let rate = self.fx_rate(&from, &to).await?;
            tracing::info!("{}: converting statements {} -> {} at {:.4}", symbol, from, to, rate);
            snap.convert_statements(rate);
        }

        tracing::debug!(
            "{}: fetched {} annual income, {} balance, {} cash-flow statements",
            symbol,
            snap.income.len(),
            snap.balance.len(),
            snap.cash_flow.len()
        );
        Ok(snap)
    }
}
