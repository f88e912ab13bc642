use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Annual or quarterly income statement, normalized from the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeStatement {
    pub fiscal_year: i32,
    pub date: Option<NaiveDate>,
    pub revenue: Option<f64>,
    pub gross_profit: Option<f64>,
    pub operating_income: Option<f64>,
    pub ebitda: Option<f64>,
    pub net_income: Option<f64>,
    pub eps_diluted: Option<f64>,
    pub interest_expense: Option<f64>,
    pub income_tax_expense: Option<f64>,
    pub income_before_tax: Option<f64>,
    pub weighted_shares_diluted: Option<f64>,
}

/// Balance sheet at period end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSheet {
    pub fiscal_year: i32,
    pub date: Option<NaiveDate>,
    pub total_assets: Option<f64>,
    pub total_liabilities: Option<f64>,
    pub total_equity: Option<f64>,
    pub current_assets: Option<f64>,
    pub current_liabilities: Option<f64>,
    pub short_term_debt: Option<f64>,
    pub long_term_debt: Option<f64>,
    pub lease_obligations: Option<f64>,
    pub cash_and_equivalents: Option<f64>,
}

impl BalanceSheet {
    /// Short- plus long-term debt, optionally including lease liabilities.
    pub fn total_debt(&self, include_leases: bool) -> Option<f64> {
        if self.short_term_debt.is_none() && self.long_term_debt.is_none() {
            return None;
        }
        let mut debt = self.short_term_debt.unwrap_or(0.0) + self.long_term_debt.unwrap_or(0.0);
        if include_leases {
            debt += self.lease_obligations.unwrap_or(0.0);
        }
        Some(debt)
    }

    pub fn net_debt(&self) -> Option<f64> {
        let debt = self.total_debt(false)?;
        Some(debt - self.cash_and_equivalents.unwrap_or(0.0))
    }
}

/// Cash-flow statement. Outflows keep the provider's sign convention
/// (capex, dividends and buybacks are usually negative).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowStatement {
    pub fiscal_year: i32,
    pub date: Option<NaiveDate>,
    pub operating_cash_flow: Option<f64>,
    pub capital_expenditure: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub dividends_paid: Option<f64>,
    pub stock_repurchased: Option<f64>,
    pub stock_issued: Option<f64>,
}

impl CashFlowStatement {
    /// OCF minus the absolute capex. Falls back to the reported FCF.
    pub fn fcf(&self) -> Option<f64> {
        match (self.operating_cash_flow, self.capital_expenditure) {
            (Some(ocf), Some(capex)) => Some(ocf - capex.abs()),
            (Some(ocf), None) => self.free_cash_flow.or(Some(ocf)),
            _ => self.free_cash_flow,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub beta: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub currency: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    /// Annual dividend per share.
    pub last_dividend: Option<f64>,
}

/// Trailing-twelve-month ratios as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtmRatios {
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub ps: Option<f64>,
    pub price_to_fcf: Option<f64>,
    /// Fraction, e.g. 0.025 for 2.5%.
    pub dividend_yield: Option<f64>,
    /// Fraction of earnings paid out.
    pub payout_ratio: Option<f64>,
    pub dividend_per_share: Option<f64>,
    pub current_ratio: Option<f64>,
    pub interest_coverage: Option<f64>,
    pub debt_to_equity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Everything the scoring and valuation code needs for one ticker.
///
/// All series are ordered most-recent-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalsSnapshot {
    pub symbol: String,
    pub profile: CompanyProfile,
    pub income: Vec<IncomeStatement>,
    pub balance: Vec<BalanceSheet>,
    pub cash_flow: Vec<CashFlowStatement>,
    pub quarterly_income: Vec<IncomeStatement>,
    pub quarterly_balance: Vec<BalanceSheet>,
    pub ttm: TtmRatios,
    pub price_history: Vec<PricePoint>,
    pub reported_currency: Option<String>,
    /// 10-year treasury yield as a fraction, when the provider returned one.
    pub risk_free_rate: Option<f64>,
    pub fetched_at: DateTime<Utc>,
}

impl FundamentalsSnapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            profile: CompanyProfile::default(),
            income: Vec::new(),
            balance: Vec::new(),
            cash_flow: Vec::new(),
            quarterly_income: Vec::new(),
            quarterly_balance: Vec::new(),
            ttm: TtmRatios::default(),
            price_history: Vec::new(),
            reported_currency: None,
            risk_free_rate: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn has_statements(&self) -> bool {
        !self.income.is_empty() || !self.balance.is_empty() || !self.cash_flow.is_empty()
    }

    pub fn price(&self) -> Option<f64> {
        self.profile
            .price
            .filter(|p| *p > 0.0)
            .or_else(|| self.price_history.first().map(|p| p.close).filter(|p| *p > 0.0))
    }

    /// Best available diluted share count.
    pub fn shares_outstanding(&self) -> Option<f64> {
        self.profile
            .shares_outstanding
            .filter(|s| *s > 0.0)
            .or_else(|| {
                self.income
                    .first()
                    .and_then(|i| i.weighted_shares_diluted)
                    .filter(|s| *s > 0.0)
            })
            .or_else(|| match (self.profile.market_cap, self.price()) {
                (Some(cap), Some(price)) if cap > 0.0 => Some(cap / price),
                _ => None,
            })
    }

    /// Shares for a given fiscal year, falling back to the current count.
    pub fn shares_for_year(&self, fiscal_year: i32) -> Option<f64> {
        self.income
            .iter()
            .find(|i| i.fiscal_year == fiscal_year)
            .and_then(|i| i.weighted_shares_diluted)
            .filter(|s| *s > 0.0)
            .or_else(|| self.shares_outstanding())
    }

    pub fn market_cap(&self) -> Option<f64> {
        self.profile.market_cap.filter(|c| *c > 0.0).or_else(|| {
            match (self.price(), self.shares_outstanding()) {
                (Some(p), Some(s)) => Some(p * s),
                _ => None,
            }
        })
    }

    /// Trading currency, defaulting to USD.
    pub fn currency(&self) -> &str {
        self.profile.currency.as_deref().unwrap_or("USD")
    }

    /// True when statements are reported in a different currency than the
    /// share price trades in.
    pub fn needs_currency_conversion(&self) -> bool {
        match (&self.reported_currency, &self.profile.currency) {
            (Some(reported), Some(trading)) => !reported.eq_ignore_ascii_case(trading),
            _ => false,
        }
    }

    /// Convert every monetary statement field by `rate` (reported -> trading),
    /// along with the trailing dividend per share. Share counts, prices and
    /// ratios are left untouched.
    pub fn convert_statements(&mut self, rate: f64) {
        let fx = |v: &mut Option<f64>| {
            if let Some(x) = v.as_mut() {
                *x *= rate;
            }
        };
        for i in self.income.iter_mut().chain(self.quarterly_income.iter_mut()) {
            fx(&mut i.revenue);
            fx(&mut i.gross_profit);
            fx(&mut i.operating_income);
            fx(&mut i.ebitda);
            fx(&mut i.net_income);
            fx(&mut i.eps_diluted);
            fx(&mut i.interest_expense);
            fx(&mut i.income_tax_expense);
            fx(&mut i.income_before_tax);
        }
        for b in self.balance.iter_mut().chain(self.quarterly_balance.iter_mut()) {
            fx(&mut b.total_assets);
            fx(&mut b.total_liabilities);
            fx(&mut b.total_equity);
            fx(&mut b.current_assets);
            fx(&mut b.current_liabilities);
            fx(&mut b.short_term_debt);
            fx(&mut b.long_term_debt);
            fx(&mut b.lease_obligations);
            fx(&mut b.cash_and_equivalents);
        }
        for c in self.cash_flow.iter_mut() {
            fx(&mut c.operating_cash_flow);
            fx(&mut c.capital_expenditure);
            fx(&mut c.free_cash_flow);
            fx(&mut c.dividends_paid);
            fx(&mut c.stock_repurchased);
            fx(&mut c.stock_issued);
        }
        fx(&mut self.ttm.dividend_per_share);
        self.reported_currency = self.profile.currency.clone();
    }

    /// Closing price on or before `date`, from the price history.
    pub fn price_on_or_before(&self, date: NaiveDate) -> Option<f64> {
        self.price_history
            .iter()
            .find(|p| p.date <= date)
            .map(|p| p.close)
    }
}
