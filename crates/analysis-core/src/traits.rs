use async_trait::async_trait;
use crate::{AnalysisError, FinancialSnapshot, FundamentalsInput, HolderBreakdown, NewsHeadline, PriceHistory};

/// Source of per-ticker market data.
///
/// Implementations map transport failures and non-2xx statuses to
/// [`AnalysisError::UpstreamUnavailable`] and unexpected payload shapes to
/// [`AnalysisError::UpstreamMalformed`]; callers choose the recovery.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars covering the configured lookback, plus symbol metadata
    async fn price_history(&self, ticker: &str) -> Result<PriceHistory, AnalysisError>;

    async fn financial_snapshot(&self, ticker: &str) -> Result<FinancialSnapshot, AnalysisError>;

    /// Ratios consumed by the fundamentals scorer
    async fn fundamental_ratios(&self, ticker: &str) -> Result<FundamentalsInput, AnalysisError>;

    async fn news(&self, ticker: &str, limit: usize) -> Result<Vec<NewsHeadline>, AnalysisError>;

    async fn holder_breakdown(&self, ticker: &str) -> Result<HolderBreakdown, AnalysisError>;
}
