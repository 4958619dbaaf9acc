use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Network failure or non-2xx status from a data provider.
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The provider answered, but not with the structure we expected.
    #[error("Upstream malformed: {0}")]
    UpstreamMalformed(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

impl AnalysisError {
    /// The inner message without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            AnalysisError::InsufficientData(m)
            | AnalysisError::InvalidData(m)
            | AnalysisError::UpstreamUnavailable(m)
            | AnalysisError::UpstreamMalformed(m)
            | AnalysisError::CalculationError(m) => m,
        }
    }

    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            AnalysisError::UpstreamUnavailable(_) | AnalysisError::UpstreamMalformed(_)
        )
    }
}
