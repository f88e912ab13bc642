use analysis_core::AnalysisError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FmpError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Failed to parse FMP response for {endpoint}: {source}")]
    Json {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("FMP API error: {0}")]
    Api(String),

    #[error("Rate limited by FMP")]
    RateLimitExceeded,

    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),
}

impl From<FmpError> for AnalysisError {
    fn from(err: FmpError) -> Self {
        match err {
            FmpError::SymbolNotFound(symbol) => {
                AnalysisError::InsufficientData(format!("no fundamentals found for {}", symbol))
            }
            other => AnalysisError::ApiError(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_to_analysis_error() {
        let err: AnalysisError = FmpError::SymbolNotFound("ZZZZ".to_string()).into();
        assert_eq!(err.code(), "INSUFFICIENT_DATA");

        let err: AnalysisError = FmpError::RateLimitExceeded.into();
        assert_eq!(err.code(), "API_ERROR");
    }
}
