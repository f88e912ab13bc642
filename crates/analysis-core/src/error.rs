use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid valuation mode: {0}")]
    InvalidMode(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl AnalysisError {
    /// Stable machine-readable code used in error responses.
    pub fn code(&self) -> &'static str {
        match self {
            AnalysisError::InvalidMode(_) => "INVALID_MODE",
            AnalysisError::InsufficientData(_) => "INSUFFICIENT_DATA",
            AnalysisError::InvalidInput(_) => "INVALID_INPUT",
            AnalysisError::ApiError(_) => "API_ERROR",
            AnalysisError::Unknown(_) => "UNKNOWN",
        }
    }

    /// Whether the failure is caused by the request or the data behind it
    /// (as opposed to an upstream or internal failure).
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AnalysisError::InvalidMode(_)
                | AnalysisError::InsufficientData(_)
                | AnalysisError::InvalidInput(_)
        )
    }

    /// Human-readable detail without the variant prefix.
    pub fn details(&self) -> &str {
        match self {
            AnalysisError::InvalidMode(d)
            | AnalysisError::InsufficientData(d)
            | AnalysisError::InvalidInput(d)
            | AnalysisError::ApiError(d)
            | AnalysisError::Unknown(d) => d,
        }
    }
}
