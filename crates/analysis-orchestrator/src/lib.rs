use analysis_core::{AnalysisError, MarketDataProvider};
use fundamental_analysis::FundamentalsScorer;
use futures_util::future::join_all;
use ml_client::ChatModel;
use serde::Serialize;
use std::sync::Arc;
use technical_analysis::{chart_points, ChartWindow, IndicatorEngine, MomentumAnalyzer};

pub mod financials;
pub mod fundamentals;
pub mod news;
pub mod ownership;
pub mod prediction;
pub mod section;

#[cfg(test)]
mod orchestrator_tests;

pub use financials::FinancialsReport;
pub use fundamentals::FundamentalsReport;
pub use news::{HeadlineSentiment, NewsItem, NewsReport};
pub use ownership::OwnershipReport;
pub use prediction::{PredictionOutcome, PredictionResponse, PredictionSource};
pub use section::{Section, UnavailableSection};

/// Everything the aggregate endpoint returns; auxiliary sections are `None`
/// when they failed outright.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateAnalysis {
    pub prediction: PredictionResponse,
    pub financials: Option<Section<FinancialsReport>>,
    pub fundamentals: Option<Section<FundamentalsReport>>,
    pub news: Option<Section<NewsReport>>,
    pub ownership: Option<Section<OwnershipReport>>,
}

pub struct AnalysisOrchestrator {
    market_data: Arc<dyn MarketDataProvider>,
    model: Arc<dyn ChatModel>,
    indicator_engine: IndicatorEngine,
    momentum_analyzer: MomentumAnalyzer,
    fundamentals_scorer: FundamentalsScorer,
    news_limit: usize,
}

impl AnalysisOrchestrator {
    pub fn new(market_data: Arc<dyn MarketDataProvider>, model: Arc<dyn ChatModel>) -> Self {
        Self {
            market_data,
            model,
            indicator_engine: IndicatorEngine::new(),
            momentum_analyzer: MomentumAnalyzer::new(),
            fundamentals_scorer: FundamentalsScorer::new(),
            news_limit: news::NEWS_LIMIT,
        }
    }

    /// Replace the default rule table
    pub fn with_scorer(mut self, scorer: FundamentalsScorer) -> Self {
        self.fundamentals_scorer = scorer;
        self
    }

    pub fn with_news_limit(mut self, limit: usize) -> Self {
        self.news_limit = limit;
        self
    }

    /// Model reply text, or `None` (logged) when the call failed
    async fn ask_model(&self, system: Option<&str>, prompt: &str, purpose: &str) -> Option<String> {
        match self.model.complete(system, prompt).await {
            Ok(reply) => Some(reply),
            Err(e) => {
                tracing::warn!("Model call for {} failed ({}): {}", purpose, self.model.backend_name(), e);
                None
            }
        }
    }

    async fn commentary(&self, prompt: &str, purpose: &str, default: &str) -> String {
        self.ask_model(None, prompt, purpose)
            .await
            .map(|reply| reply.trim().to_string())
            .filter(|reply| !reply.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    /// Indicators, momentum and chart window from price history, merged with the
    /// model's forecast. Fails only when price history cannot be loaded.
    pub async fn predict(&self, ticker: &str, window: ChartWindow) -> Result<PredictionResponse, AnalysisError> {
        tracing::info!("Starting prediction for {}", ticker);

        let history = self.market_data.price_history(ticker).await?;
        let series = &history.series;
        let current_price = series.current_price();

        let indicators = self.indicator_engine.compute(&series.closes())?;
        let momentum = self.momentum_analyzer.analyze(series);
        if !self.indicator_engine.has_full_history(&series.closes()) {
            tracing::debug!("Only {} bars for {}; long-period indicators use partial windows", series.len(), ticker);
        }

        let prompt = prediction::build_prompt(ticker, current_price, &indicators, &momentum);
        let outcome = match self.ask_model(Some(prediction::SYSTEM_PROMPT), &prompt, "prediction").await {
            Some(reply) => PredictionOutcome::from_reply(&reply, current_price),
            None => PredictionOutcome::fallback(current_price),
        };
        if outcome.source() == PredictionSource::Fallback {
            tracing::warn!("Using fallback prediction for {}", ticker);
        }

        tracing::info!("Prediction complete for {}", ticker);

        Ok(PredictionResponse {
            ticker: ticker.to_string(),
            current_price,
            meta: history.meta.clone(),
            prediction_source: outcome.source(),
            prediction: outcome.into_payload(),
            indicators,
            momentum,
            chart_data: chart_points(series, window),
        })
    }

    /// Unreachable source → sample report; unexpected shape → unavailable.
    pub async fn financials(&self, ticker: &str) -> Result<Section<FinancialsReport>, AnalysisError> {
        match self.market_data.financial_snapshot(ticker).await {
            Ok(snapshot) => {
                tracing::info!("Financials retrieved for {}", ticker);
                Ok(Section::Ready(FinancialsReport::from_snapshot(ticker, &snapshot, false)))
            }
            Err(AnalysisError::UpstreamUnavailable(e)) => {
                tracing::warn!("Financials source unavailable for {} ({}); serving sample data", ticker, e);
                Ok(Section::Ready(FinancialsReport::from_snapshot(
                    ticker,
                    &financials::sample_snapshot(),
                    true,
                )))
            }
            Err(e @ AnalysisError::UpstreamMalformed(_)) => Ok(Section::unavailable(ticker, &e)),
            Err(e) => Err(e),
        }
    }

    pub async fn fundamentals(&self, ticker: &str) -> Result<Section<FundamentalsReport>, AnalysisError> {
        let scorer = &self.fundamentals_scorer;

        match self.market_data.fundamental_ratios(ticker).await {
            Ok(input) => {
                let score = scorer.score(&input).score;
                let strengths: Vec<&str> = scorer.matched_rules(&input).map(|r| r.label).collect();
                let prompt = fundamentals::commentary_prompt(ticker, score, &input, &strengths);
                let commentary = self
                    .commentary(&prompt, "fundamentals commentary", fundamentals::DEFAULT_COMMENTARY)
                    .await;
                Ok(Section::Ready(FundamentalsReport::new(ticker, &input, scorer, commentary, false)))
            }
            Err(AnalysisError::UpstreamUnavailable(e)) => {
                tracing::warn!("Fundamentals source unavailable for {} ({}); serving sample data", ticker, e);
                let input = fundamentals::sample_input();
                let commentary = fundamentals::sample_commentary(ticker, scorer.score(&input).score);
                Ok(Section::Ready(FundamentalsReport::new(ticker, &input, scorer, commentary, true)))
            }
            Err(e @ AnalysisError::UpstreamMalformed(_)) => Ok(Section::unavailable(ticker, &e)),
            Err(e) => Err(e),
        }
    }

    /// Headlines are classified concurrently; a failed classification is neutral.
    pub async fn news(&self, ticker: &str) -> Result<Section<NewsReport>, AnalysisError> {
        let headlines = match self.market_data.news(ticker, self.news_limit).await {
            Ok(headlines) => headlines,
            Err(e) if e.is_upstream() => {
                tracing::warn!("News unavailable for {}: {}", ticker, e);
                return Ok(Section::unavailable(ticker, &e));
            }
            Err(e) => return Err(e),
        };

        tracing::debug!("Classifying {} headlines for {}", headlines.len(), ticker);

        let sentiments = join_all(headlines.iter().map(|headline| async move {
            let prompt = news::classification_prompt(&headline.title);
            self.ask_model(None, &prompt, "headline sentiment")
                .await
                .map(|reply| HeadlineSentiment::from_reply(&reply))
                .unwrap_or(HeadlineSentiment::Neutral)
        }))
        .await;

        let items = headlines
            .into_iter()
            .zip(sentiments)
            .map(|(headline, sentiment)| NewsItem::new(headline, sentiment))
            .collect();

        Ok(Section::Ready(NewsReport {
            ticker: ticker.to_string(),
            news: items,
        }))
    }

    pub async fn ownership(&self, ticker: &str) -> Result<Section<OwnershipReport>, AnalysisError> {
        match self.market_data.holder_breakdown(ticker).await {
            Ok(breakdown) => {
                let shareholding = ownership::Shareholding::from_breakdown(&breakdown);
                let prompt = ownership::commentary_prompt(ticker, &shareholding);
                let commentary = self
                    .commentary(&prompt, "ownership commentary", ownership::DEFAULT_COMMENTARY)
                    .await;
                Ok(Section::Ready(OwnershipReport::new(
                    ticker,
                    shareholding,
                    ownership::float_percent(&breakdown),
                    commentary,
                    false,
                )))
            }
            Err(AnalysisError::UpstreamUnavailable(e)) => {
                tracing::warn!("Ownership source unavailable for {} ({}); serving sample data", ticker, e);
                Ok(Section::Ready(ownership::sample_report(ticker)))
            }
            Err(e @ AnalysisError::UpstreamMalformed(_)) => Ok(Section::unavailable(ticker, &e)),
            Err(e) => Err(e),
        }
    }

    /// Core prediction plus the four auxiliary sections, all in flight at once.
    pub async fn analyze_all(&self, ticker: &str, window: ChartWindow) -> Result<AggregateAnalysis, AnalysisError> {
        tracing::info!("Starting aggregate analysis for {}", ticker);

        let (prediction, financials, fundamentals, news, ownership) = tokio::join!(
            self.predict(ticker, window),
            self.financials(ticker),
            self.fundamentals(ticker),
            self.news(ticker),
            self.ownership(ticker),
        );

        fn settle<T>(ticker: &str, name: &str, result: Result<Section<T>, AnalysisError>) -> Option<Section<T>> {
            result
                .map_err(|e| tracing::warn!("{} section failed for {}: {}", name, ticker, e))
                .ok()
        }

        Ok(AggregateAnalysis {
            prediction: prediction?,
            financials: settle(ticker, "Financials", financials),
            fundamentals: settle(ticker, "Fundamentals", fundamentals),
            news: settle(ticker, "News", news),
            ownership: settle(ticker, "Ownership", ownership),
        })
    }
}
