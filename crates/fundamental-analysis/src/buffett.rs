//! Buffett-style checklist and Graham number for batch screening.

use std::fmt;
use std::str::FromStr;

use analysis_core::{AnalysisError, Rating, ScoreResult};
use serde::{Deserialize, Serialize};

use crate::metrics::FinancialMetrics;
use crate::stats::{mean, window_cagr, YearValue};

const GRAHAM_MULTIPLIER: f64 = 22.5;
const MIN_PROFIT_YEARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MarketId {
    Us,
    De,
    Uk,
    Fr,
    Ch,
    Ca,
    Nl,
}

impl MarketId {
    pub fn suffix(&self) -> &'static str {
        match self {
            MarketId::Us => "",
            MarketId::De => ".DE",
            MarketId::Uk => ".L",
            MarketId::Fr => ".PA",
            MarketId::Ch => ".SW",
            MarketId::Ca => ".TO",
            MarketId::Nl => ".AS",
        }
    }

    /// Provider symbol for a bare ticker on this market. Symbols that already
    /// carry an exchange suffix are returned unchanged.
    pub fn resolve_symbol(&self, symbol: &str) -> String {
        let symbol = symbol.trim().to_uppercase();
        if symbol.contains('.') {
            symbol
        } else {
            format!("{}{}", symbol, self.suffix())
        }
    }
}

impl FromStr for MarketId {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "US" => Ok(MarketId::Us),
            "DE" => Ok(MarketId::De),
            "UK" | "GB" => Ok(MarketId::Uk),
            "FR" => Ok(MarketId::Fr),
            "CH" => Ok(MarketId::Ch),
            "CA" => Ok(MarketId::Ca),
            "NL" => Ok(MarketId::Nl),
            other => Err(AnalysisError::InvalidInput(format!("unknown market id: {other}"))),
        }
    }
}

impl fmt::Display for MarketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = match self {
            MarketId::Us => "US",
            MarketId::De => "DE",
            MarketId::Uk => "UK",
            MarketId::Fr => "FR",
            MarketId::Ch => "CH",
            MarketId::Ca => "CA",
            MarketId::Nl => "NL",
        };
        f.write_str(id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuffettCriterionId {
    ReturnOnEquity,
    NetMargin,
    DebtToEquity,
    CurrentRatio,
    RevenueGrowth,
    EpsGrowth,
    ConsistentProfits,
    InterestCoverage,
    PriceEarnings,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffettCriterion {
    pub id: BuffettCriterionId,
    pub value: Option<f64>,
    pub threshold: f64,
    pub passed: bool,
}

impl BuffettCriterion {
    fn at_least(id: BuffettCriterionId, value: Option<f64>, threshold: f64) -> Self {
        let passed = value.map_or(false, |v| v >= threshold);
        Self { id, value, threshold, passed }
    }

    fn below(id: BuffettCriterionId, value: Option<f64>, threshold: f64) -> Self {
        let passed = value.map_or(false, |v| v < threshold);
        Self { id, value, threshold, passed }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffettAnalysis {
    pub symbol: String,
    pub company_name: Option<String>,
    pub price: Option<f64>,
    pub currency: String,
    pub criteria: Vec<BuffettCriterion>,
    pub buffett_score: u32,
    pub max_score: u32,
    pub rating: Rating,
    pub rating_label: String,
    pub graham_number: Option<f64>,
    pub margin_of_safety: Option<f64>,
}

/// `sqrt(22.5 * EPS * BVPS)`, defined only for positive inputs.
pub fn graham_number(eps: Option<f64>, book_value_per_share: Option<f64>) -> Option<f64> {
    match (eps, book_value_per_share) {
        (Some(e), Some(b)) if e > 0.0 && b > 0.0 => Some((GRAHAM_MULTIPLIER * e * b).sqrt()),
        _ => None,
    }
}

pub fn graham_margin_of_safety(graham: Option<f64>, price: Option<f64>) -> Option<f64> {
    match (graham, price) {
        (Some(g), Some(p)) if g > 0.0 => Some((g - p) / g * 100.0),
        _ => None,
    }
}

/// CAGR over five fiscal years, or the longest shorter span on record.
fn five_year_cagr(series: &[YearValue]) -> Option<f64> {
    window_cagr(series, 5, 2).map(|(rate, _)| rate)
}

pub fn buffett_criteria(m: &FinancialMetrics) -> Vec<BuffettCriterion> {
    let h = &m.history;
    let five = |s: &[f64]| mean(&s[..s.len().min(5)]);
    let (profitable, on_record) = m.profitable_years();
    let consistent = if on_record >= MIN_PROFIT_YEARS {
        Some((profitable == on_record) as u8 as f64)
    } else {
        None
    };
    let pe = m.pe.filter(|p| *p > 0.0);

    vec![
        BuffettCriterion::at_least(BuffettCriterionId::ReturnOnEquity, five(&h.roe), 15.0),
        BuffettCriterion::at_least(BuffettCriterionId::NetMargin, five(&h.net_margin), 10.0),
        BuffettCriterion::below(BuffettCriterionId::DebtToEquity, m.debt_to_equity, 0.5),
        BuffettCriterion::at_least(BuffettCriterionId::CurrentRatio, m.current_ratio, 1.5),
        BuffettCriterion::at_least(BuffettCriterionId::RevenueGrowth, five_year_cagr(&h.revenue), 5.0),
        BuffettCriterion::at_least(BuffettCriterionId::EpsGrowth, five_year_cagr(&h.eps), 5.0),
        BuffettCriterion::at_least(BuffettCriterionId::ConsistentProfits, consistent, 1.0),
        BuffettCriterion::at_least(BuffettCriterionId::InterestCoverage, m.interest_coverage, 5.0),
        BuffettCriterion {
            id: BuffettCriterionId::PriceEarnings,
            value: m.pe,
            threshold: 20.0,
            passed: pe.map_or(false, |p| p <= 20.0),
        },
    ]
}

pub fn analyze_buffett(
    symbol: &str,
    company_name: Option<String>,
    currency: &str,
    m: &FinancialMetrics,
) -> BuffettAnalysis {
    let criteria = buffett_criteria(m);
    let passed = criteria.iter().filter(|c| c.passed).count() as u32;
    let max = criteria.len() as u32;
    let rating = Rating::from_score(&ScoreResult::new(passed as f64, max as f64), true);
    let graham = graham_number(m.eps, m.book_value_per_share);

    BuffettAnalysis {
        symbol: symbol.to_string(),
        company_name,
        price: m.price,
        currency: currency.to_string(),
        criteria,
        buffett_score: passed,
        max_score: max,
        rating,
        rating_label: rating.to_label().to_string(),
        graham_number: graham,
        margin_of_safety: graham_margin_of_safety(graham, m.price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::fixtures;
    use approx::assert_relative_eq;

    #[test]
    fn test_market_suffixes() {
        assert_eq!(MarketId::De.resolve_symbol("sap"), "SAP.DE");
        assert_eq!(MarketId::Us.resolve_symbol("AAPL"), "AAPL");
        assert_eq!(MarketId::Uk.resolve_symbol("ULVR.L"), "ULVR.L");
        assert_eq!("nl".parse::<MarketId>().unwrap(), MarketId::Nl);
        assert!("XX".parse::<MarketId>().is_err());
    }

    #[test]
    fn test_graham_number() {
        // sqrt(22.5 * 2 * 20) = 30
        let g = graham_number(Some(2.0), Some(20.0)).unwrap();
        assert_relative_eq!(g, 30.0, epsilon = 1e-12);
        assert_relative_eq!(graham_margin_of_safety(Some(g), Some(24.0)).unwrap(), 20.0, epsilon = 1e-9);
        assert_eq!(graham_number(Some(-1.0), Some(20.0)), None);
    }

    #[test]
    fn test_compounder_checklist() {
        let m = FinancialMetrics::from_snapshot(&fixtures::quality_compounder());
        let analysis = analyze_buffett("QUAL", None, "USD", &m);
        assert!(analysis.criteria.iter().all(|c| c.passed));
        assert_eq!((analysis.buffett_score, analysis.max_score), (9, 9));
        assert_eq!(analysis.rating_label, "Exzellent");
        // graham ~37.9 against a price of 60
        assert!(analysis.margin_of_safety.unwrap() < 0.0);
    }

    #[test]
    fn test_debt_free_company_passes_coverage() {
        let mut snap = fixtures::quality_compounder();
        for income in &mut snap.income {
            income.interest_expense = Some(0.0);
        }
        let m = FinancialMetrics::from_snapshot(&snap);
        let coverage = buffett_criteria(&m)
            .into_iter()
            .find(|c| c.id == BuffettCriterionId::InterestCoverage)
            .unwrap();
        assert!(coverage.passed);
    }

    #[test]
    fn test_loss_maker_fails_most() {
        let m = FinancialMetrics::from_snapshot(&fixtures::loss_maker());
        let analysis = analyze_buffett("LOSS", None, "USD", &m);
        assert_eq!(analysis.buffett_score, 0);
        assert_eq!(analysis.graham_number, None);
        assert_eq!(analysis.rating, Rating::Weak);
    }
}
