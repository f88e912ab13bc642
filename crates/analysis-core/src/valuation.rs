use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::AnalysisError;

/// Per-share basis that the finite-horizon model projects forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValuationMode {
    #[serde(rename = "EPS_WO_NRI")]
    EpsWoNri,
    #[serde(rename = "FCF_PER_SHARE", alias = "FCF")]
    FcfPerShare,
    #[serde(rename = "ADJUSTED_DIVIDEND")]
    AdjustedDividend,
}

impl ValuationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValuationMode::EpsWoNri => "EPS_WO_NRI",
            ValuationMode::FcfPerShare => "FCF_PER_SHARE",
            ValuationMode::AdjustedDividend => "ADJUSTED_DIVIDEND",
        }
    }
}

impl std::fmt::Display for ValuationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValuationMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "EPS_WO_NRI" => Ok(ValuationMode::EpsWoNri),
            "FCF_PER_SHARE" | "FCF" => Ok(ValuationMode::FcfPerShare),
            "ADJUSTED_DIVIDEND" => Ok(ValuationMode::AdjustedDividend),
            "" => Err(AnalysisError::InvalidMode("mode is required".to_string())),
            other => Err(AnalysisError::InvalidMode(format!(
                "unsupported mode '{}', expected EPS_WO_NRI, FCF_PER_SHARE, FCF or ADJUSTED_DIVIDEND",
                other
            ))),
        }
    }
}

/// How stable the projected basis has been historically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Predictability {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationAssumptions {
    pub discount_rate_pct: f64,
    pub growth_years: u32,
    pub growth_rate_pct: f64,
    pub terminal_years: u32,
    pub terminal_rate_pct: f64,
    pub tangible_book_per_share: Option<f64>,
    pub include_tangible_book: bool,
    pub predictability: Predictability,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationComponents {
    pub start_value_per_share: f64,
    pub pv_phase1: f64,
    pub pv_phase2: f64,
    pub tangible_book_added: f64,
}

/// Cost-of-capital derivation, reported alongside the valuation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaccBreakdown {
    pub cost_of_equity: f64,
    pub cost_of_debt: f64,
    pub after_tax_cost_of_debt: f64,
    pub equity_weight: f64,
    pub debt_weight: f64,
    pub beta: f64,
    pub tax_rate: f64,
    pub risk_free_rate: f64,
    pub market_risk_premium: f64,
    pub unclamped_wacc: f64,
    pub wacc: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationResult {
    pub ticker: String,
    pub price: f64,
    pub currency: String,
    pub mode: ValuationMode,
    pub fair_value_per_share: f64,
    pub margin_of_safety_pct: f64,
    pub assumptions: ValuationAssumptions,
    pub components: ValuationComponents,
    pub wacc: WaccBreakdown,
    pub as_of: DateTime<Utc>,
    pub warnings: Vec<String>,
}
