use analysis_core::AnalysisError;
use serde::Serialize;

/// One auxiliary report: ready (possibly substituted sample data) or a soft
/// failure that still renders as a 200 body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Section<T> {
    Ready(T),
    Unavailable(UnavailableSection),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnavailableSection {
    pub ticker: String,
    pub unavailable: bool,
    pub error: String,
}

impl<T> Section<T> {
    pub fn unavailable(ticker: &str, error: &AnalysisError) -> Self {
        Section::Unavailable(UnavailableSection {
            ticker: ticker.to_string(),
            unavailable: true,
            error: error.message().to_string(),
        })
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(report) => Some(report),
            Section::Unavailable(_) => None,
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Section::Unavailable(_))
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
