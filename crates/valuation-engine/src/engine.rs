use analysis_core::{
    AnalysisError, FundamentalsSnapshot, ValuationAssumptions, ValuationComponents, ValuationMode,
    ValuationResult,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::growth::{derive_growth, predictability};
use crate::projection::{project, ProjectionInput};
use crate::start_value::select_start_value;
use crate::wacc::{wacc_for_snapshot, WaccConfig};

const START_VALUE_FLOOR: f64 = 0.01;
const MAX_TERMINAL_RATE: f64 = 0.06;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationConfig {
    pub wacc: WaccConfig,
    pub terminal_rate: f64,
    pub growth_years: u32,
    pub terminal_years: u32,
    pub trim_pct: f64,
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            wacc: WaccConfig::default(),
            terminal_rate: 0.04,
            growth_years: 10,
            terminal_years: 10,
            trim_pct: 0.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuationRequest {
    pub mode: ValuationMode,
    /// Overrides the snapshot's price.
    pub current_price: Option<f64>,
    #[serde(default)]
    pub include_tangible_book: bool,
}

impl ValuationRequest {
    pub fn new(mode: ValuationMode) -> Self {
        Self { mode, current_price: None, include_tangible_book: false }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValuationEngine {
    config: ValuationConfig,
}

impl ValuationEngine {
    pub fn new(config: ValuationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    fn resolve_price(
        &self,
        snap: &FundamentalsSnapshot,
        request: &ValuationRequest,
    ) -> Result<f64, AnalysisError> {
        match request.current_price {
            Some(p) if p.is_finite() && p > 0.0 => Ok(p),
            Some(p) => Err(AnalysisError::InvalidInput(format!(
                "currentPrice must be a positive number, got {p}"
            ))),
            None => snap.price().ok_or_else(|| {
                AnalysisError::InsufficientData(format!("no price available for {}", snap.symbol))
            }),
        }
    }

    /// Tangible book per share from the latest balance sheet.
    fn tangible_book_per_share(snap: &FundamentalsSnapshot, shares: f64) -> Option<f64> {
        let b = snap.balance.first()?;
        let tbv = (b.total_assets? - b.total_liabilities?) / shares;
        tbv.is_finite().then_some(tbv)
    }

    pub fn value(
        &self,
        snap: &FundamentalsSnapshot,
        request: &ValuationRequest,
    ) -> Result<ValuationResult, AnalysisError> {
        if snap.income.is_empty() && snap.cash_flow.is_empty() {
            return Err(AnalysisError::InsufficientData(format!(
                "no annual statements for {}",
                snap.symbol
            )));
        }
        let shares = snap.shares_outstanding().ok_or_else(|| {
            AnalysisError::InsufficientData(format!("no usable share count for {}", snap.symbol))
        })?;
        let price = self.resolve_price(snap, request)?;

        let mut warnings = Vec::new();
        let wacc = wacc_for_snapshot(snap, &self.config.wacc, &mut warnings);

        let start = select_start_value(request.mode, snap, self.config.trim_pct);
        let mut start_value = start.value;
        if start_value <= 0.0 {
            warn!(symbol = %snap.symbol, mode = %request.mode, "Non-positive start value, flooring");
            warnings.push(format!(
                "Start value {:.2} is not positive; floored at {:.2}",
                start_value, START_VALUE_FLOOR
            ));
            start_value = START_VALUE_FLOOR;
        }

        let growth = derive_growth(request.mode, &start.basis_series);
        if growth.used_default {
            warnings.push(format!(
                "Insufficient history for growth; using default {:.1}%",
                growth.rate_pct
            ));
        }

        let terminal_rate = if self.config.terminal_rate > MAX_TERMINAL_RATE {
            warnings.push(format!(
                "Terminal rate {:.2}% capped at {:.2}%",
                self.config.terminal_rate * 100.0,
                MAX_TERMINAL_RATE * 100.0
            ));
            MAX_TERMINAL_RATE
        } else {
            self.config.terminal_rate
        };

        let projection = project(&ProjectionInput {
            start_value,
            growth_rate: growth.rate_pct / 100.0,
            discount_rate: wacc.wacc,
            terminal_rate,
            growth_years: self.config.growth_years,
            terminal_years: self.config.terminal_years,
        });

        let tangible_book = Self::tangible_book_per_share(snap, shares);
        let tangible_book_added = if request.include_tangible_book {
            tangible_book.unwrap_or(0.0).max(0.0)
        } else {
            0.0
        };

        let fair_value_per_share = projection.total() + tangible_book_added;
        let margin_of_safety_pct = (fair_value_per_share - price) / fair_value_per_share * 100.0;

        info!(
            symbol = %snap.symbol,
            mode = %request.mode,
            fair_value = fair_value_per_share,
            margin_of_safety = margin_of_safety_pct,
            "Valuation complete"
        );

        Ok(ValuationResult {
            ticker: snap.symbol.clone(),
            price,
            currency: snap.currency().to_string(),
            mode: request.mode,
            fair_value_per_share,
            margin_of_safety_pct,
            assumptions: ValuationAssumptions {
                discount_rate_pct: wacc.wacc * 100.0,
                growth_years: self.config.growth_years,
                growth_rate_pct: growth.rate_pct,
                terminal_years: self.config.terminal_years,
                terminal_rate_pct: terminal_rate * 100.0,
                tangible_book_per_share: tangible_book,
                include_tangible_book: request.include_tangible_book,
                predictability: predictability(&start.basis_series),
            },
            components: ValuationComponents {
                start_value_per_share: start_value,
                pv_phase1: projection.pv_phase1,
                pv_phase2: projection.pv_phase2,
                tangible_book_added,
            },
            wacc,
            as_of: Utc::now(),
            warnings,
        })
    }
}
