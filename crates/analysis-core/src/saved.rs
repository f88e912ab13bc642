use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// Frozen JSON parts of an analysis at save time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSnapshot {
    pub stock_info: serde_json::Value,
    pub buffett_criteria: serde_json::Value,
    pub financial_metrics: serde_json::Value,
    pub overall_rating: serde_json::Value,
    pub dcf_data: serde_json::Value,
}

/// Point-in-time capture of an analysis. Later recomputation never touches it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAnalysis {
    pub ticker: String,
    pub title: String,
    pub company_name: Option<String>,
    pub snapshot: AnalysisSnapshot,
    pub saved_at: DateTime<Utc>,
}

impl SavedAnalysis {
    pub fn capture(
        ticker: impl Into<String>,
        title: impl Into<String>,
        company_name: Option<String>,
        snapshot: AnalysisSnapshot,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            title: title.into(),
            company_name,
            snapshot,
            saved_at: Utc::now(),
        }
    }
}

/// Serialize any analysis part into a frozen JSON value.
pub fn freeze<T: Serialize>(part: &T) -> Result<serde_json::Value, AnalysisError> {
    serde_json::to_value(part).map_err(|e| AnalysisError::Unknown(format!("failed to freeze analysis: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_capture_is_independent_of_source() {
        let mut rating = json!({ "aesyScore": 71 });
        let snapshot = AnalysisSnapshot {
            overall_rating: freeze(&rating).unwrap(),
            ..Default::default()
        };
        let saved = SavedAnalysis::capture("AAPL", "Apple Q3", Some("Apple Inc.".to_string()), snapshot);

        rating["aesyScore"] = json!(40);
        assert_eq!(saved.snapshot.overall_rating["aesyScore"], 71);
        assert_eq!(saved.ticker, "AAPL");
    }
}
