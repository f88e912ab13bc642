use serde::{Deserialize, Serialize};

/// Industry presets that shift profitability thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IndustryPreset {
    #[default]
    Default,
    Industrials,
    Software,
    Financials,
}

impl IndustryPreset {
    /// Map a provider sector/industry string onto a preset.
    pub fn from_sector(sector: Option<&str>, industry: Option<&str>) -> Self {
        let industry = industry.unwrap_or("").to_lowercase();
        if industry.contains("software") {
            return IndustryPreset::Software;
        }
        match sector.unwrap_or("").to_lowercase().as_str() {
            "industrials" => IndustryPreset::Industrials,
            "financial services" | "financials" | "financial" => IndustryPreset::Financials,
            _ if industry.contains("bank") || industry.contains("insurance") => IndustryPreset::Financials,
            _ => IndustryPreset::Default,
        }
    }
}
