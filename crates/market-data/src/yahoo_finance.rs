use analysis_core::{
    AnalysisError, FinancialSnapshot, FundamentalsInput, HolderBreakdown, MarketDataProvider,
    NewsHeadline, PriceHistory,
};
use async_trait::async_trait;
use chrono::{Months, Utc};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::parse;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const QUOTE_SUMMARY_URL: &str = "https://query2.finance.yahoo.com/v10/finance/quoteSummary";
const SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const FINANCIALS_MODULES: &str =
    "financialData,defaultKeyStatistics,summaryDetail,earningsHistory,incomeStatementHistory";
const FUNDAMENTALS_MODULES: &str = "financialData,defaultKeyStatistics,summaryDetail";
const OWNERSHIP_MODULES: &str = "institutionOwnership,fundOwnership,majorHoldersBreakdown";

/// Search requests a couple of extra items so filtering still fills `limit`.
const NEWS_FETCH_COUNT: usize = 10;

#[derive(Debug, Clone)]
pub struct YahooConfig {
    pub chart_url: String,
    pub quote_summary_url: String,
    pub search_url: String,
    pub timeout: Duration,
    pub history_months: u32,
}

impl Default for YahooConfig {
    fn default() -> Self {
        Self {
            chart_url: CHART_URL.to_string(),
            quote_summary_url: QUOTE_SUMMARY_URL.to_string(),
            search_url: SEARCH_URL.to_string(),
            timeout: Duration::from_secs(15),
            history_months: 6,
        }
    }
}

impl YahooConfig {
    /// Points every endpoint at one host, e.g. a local stub server.
    pub fn with_base_url(base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            chart_url: format!("{}/v8/finance/chart", base),
            quote_summary_url: format!("{}/v10/finance/quoteSummary", base),
            search_url: format!("{}/v1/finance/search", base),
            ..Self::default()
        }
    }
}

#[derive(Clone)]
pub struct YahooFinanceClient {
    client: Client,
    config: YahooConfig,
}

impl YahooFinanceClient {
    pub fn new(config: YahooConfig) -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    pub fn config(&self) -> &YahooConfig {
        &self.config
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, AnalysisError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Yahoo request to {} failed: {}", url, e);
                AnalysisError::UpstreamUnavailable(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Yahoo returned {} for {}", status, url);
            return Err(AnalysisError::UpstreamUnavailable(format!(
                "Yahoo Finance returned status {}",
                status
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| AnalysisError::UpstreamMalformed(format!("Invalid JSON from Yahoo: {}", e)))
    }

    async fn quote_summary(&self, ticker: &str, modules: &str) -> Result<Value, AnalysisError> {
        let url = format!("{}/{}", self.config.quote_summary_url, ticker);
        self.get_json(&url, &[("modules", modules.to_string())]).await
    }
}

#[async_trait]
impl MarketDataProvider for YahooFinanceClient {
    async fn price_history(&self, ticker: &str) -> Result<PriceHistory, AnalysisError> {
        let end = Utc::now();
        let start = end
            .checked_sub_months(Months::new(self.config.history_months))
            .unwrap_or(end);

        tracing::info!("Fetching {} months of daily bars for {}", self.config.history_months, ticker);

        let url = format!("{}/{}", self.config.chart_url, ticker);
        let query = [
            ("period1", start.timestamp().to_string()),
            ("period2", end.timestamp().to_string()),
            ("interval", "1d".to_string()),
        ];
        let json = self.get_json(&url, &query).await?;
        let history = parse::parse_chart(ticker, &json)?;

        tracing::debug!("Parsed {} bars for {}", history.series.len(), ticker);
        Ok(history)
    }

    async fn financial_snapshot(&self, ticker: &str) -> Result<FinancialSnapshot, AnalysisError> {
        tracing::info!("Fetching financials for {}", ticker);
        let json = self.quote_summary(ticker, FINANCIALS_MODULES).await?;
        parse::parse_financials(&json)
    }

    async fn fundamental_ratios(&self, ticker: &str) -> Result<FundamentalsInput, AnalysisError> {
        tracing::info!("Fetching fundamentals for {}", ticker);
        let json = self.quote_summary(ticker, FUNDAMENTALS_MODULES).await?;
        parse::parse_fundamentals(&json)
    }

    async fn news(&self, ticker: &str, limit: usize) -> Result<Vec<NewsHeadline>, AnalysisError> {
        tracing::info!("Fetching news for {}", ticker);
        let query = [
            ("q", ticker.to_string()),
            ("quotesCount", "0".to_string()),
            ("newsCount", NEWS_FETCH_COUNT.max(limit).to_string()),
        ];
        let json = self.get_json(&self.config.search_url, &query).await?;
        parse::parse_news(&json, limit)
    }

    async fn holder_breakdown(&self, ticker: &str) -> Result<HolderBreakdown, AnalysisError> {
        tracing::info!("Fetching ownership for {}", ticker);
        let json = self.quote_summary(ticker, OWNERSHIP_MODULES).await?;
        parse::parse_holders(&json)
    }
}
