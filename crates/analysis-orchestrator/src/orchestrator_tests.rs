#[cfg(test)]
mod tests {
    use crate::*;
    use analysis_core::{
        Bar, FinancialSnapshot, FundamentalsInput, HolderBreakdown, NewsHeadline, PriceHistory,
        PriceSeries, Sentiment, SymbolMeta,
    };
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone, Utc};
    use ml_client::{MLError, MLResult};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubMarketData {
        history: Result<PriceHistory, AnalysisError>,
        financials: Result<FinancialSnapshot, AnalysisError>,
        fundamentals: Result<FundamentalsInput, AnalysisError>,
        news: Result<Vec<NewsHeadline>, AnalysisError>,
        holders: Result<HolderBreakdown, AnalysisError>,
    }

    impl StubMarketData {
        fn healthy() -> Self {
            Self {
                history: Ok(history(120)),
                financials: Ok(FinancialSnapshot {
                    market_cap: Some(2.5e12),
                    recommendation_key: Some("hold".to_string()),
                    ..FinancialSnapshot::default()
                }),
                fundamentals: Ok(FundamentalsInput {
                    eps: Some(2.0),
                    pe_ratio: Some(15.0),
                    ..FundamentalsInput::default()
                }),
                news: Ok(headlines(&["Shares rally on record quarter", "Regulator opens probe", "CEO to speak"])),
                holders: Ok(HolderBreakdown {
                    insiders: Some(0.1),
                    institutions: Some(0.6),
                    institutions_float: Some(0.65),
                }),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for StubMarketData {
        async fn price_history(&self, _ticker: &str) -> Result<PriceHistory, AnalysisError> {
            self.history.clone()
        }

        async fn financial_snapshot(&self, _ticker: &str) -> Result<FinancialSnapshot, AnalysisError> {
            self.financials.clone()
        }

        async fn fundamental_ratios(&self, _ticker: &str) -> Result<FundamentalsInput, AnalysisError> {
            self.fundamentals.clone()
        }

        async fn news(&self, _ticker: &str, limit: usize) -> Result<Vec<NewsHeadline>, AnalysisError> {
            self.news.clone().map(|n| n.into_iter().take(limit).collect())
        }

        async fn holder_breakdown(&self, _ticker: &str) -> Result<HolderBreakdown, AnalysisError> {
            self.holders.clone()
        }
    }

    type Script = Box<dyn Fn(Option<&str>, &str) -> MLResult<String> + Send + Sync>;

    struct ScriptedModel {
        script: Script,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(script: impl Fn(Option<&str>, &str) -> MLResult<String> + Send + Sync + 'static) -> Self {
            Self { script: Box::new(script), calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self::new(|_, _| Err(MLError::ServiceUnavailable("Status: 503".to_string())))
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, system: Option<&str>, user: &str) -> MLResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.script)(system, user)
        }

        fn backend_name(&self) -> &'static str {
            "scripted"
        }
    }

    const PREDICTION_REPLY: &str = r#"```json
{"prediction": 131.5, "confidence": 0.8, "sentiment": "bullish", "technicalAnalysis": "Uptrend intact.",
 "sentimentScore": 0.6, "recommendation": "Buy", "keySignals": ["Price above SMA(50)"]}
```"#;

    // Answers each kind of prompt the orchestrator sends
    fn analyst_model() -> ScriptedModel {
        ScriptedModel::new(|system, user| {
            if system.is_some() {
                Ok(PREDICTION_REPLY.to_string())
            } else if user.contains("rally") {
                Ok("Positive".to_string())
            } else if user.contains("probe") {
                Ok("negative".to_string())
            } else if user.starts_with("Analyze sentiment") {
                Err(MLError::Timeout)
            } else {
                Ok("  Balanced outlook.  ".to_string())
            }
        })
    }

    fn history(len: usize) -> PriceHistory {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = (0..len)
            .map(|i| {
                let close = 100.0 + i as f64 * 0.25;
                Bar {
                    timestamp: start + Duration::days(i as i64),
                    open: Some(close - 0.1),
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1_000_000.0 + i as f64,
                }
            })
            .collect();
        PriceHistory {
            meta: SymbolMeta {
                company_name: "Acme Corp".to_string(),
                currency: "USD".to_string(),
                exchange: "NMS".to_string(),
            },
            series: PriceSeries::new(bars).unwrap(),
        }
    }

    fn headlines(titles: &[&str]) -> Vec<NewsHeadline> {
        let published = Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap();
        titles
            .iter()
            .map(|t| NewsHeadline {
                title: t.to_string(),
                publisher: Some("Wire".to_string()),
                link: None,
                published_at: published,
            })
            .collect()
    }

    fn orchestrator(data: StubMarketData, model: ScriptedModel) -> AnalysisOrchestrator {
        AnalysisOrchestrator::new(Arc::new(data), Arc::new(model))
    }

    fn unavailable() -> AnalysisError {
        AnalysisError::UpstreamUnavailable("Yahoo Finance returned status 503".to_string())
    }

    fn malformed() -> AnalysisError {
        AnalysisError::UpstreamMalformed("Financial data format unavailable".to_string())
    }

    #[tokio::test]
    async fn test_predict_merges_model_reply() {
        let o = orchestrator(StubMarketData::healthy(), analyst_model());
        let response = o.predict("ACME", ChartWindow::Days30).await.unwrap();

        assert_eq!(response.ticker, "ACME");
        assert_eq!(response.current_price, 100.0 + 119.0 * 0.25);
        assert_eq!(response.meta.company_name, "Acme Corp");
        assert_eq!(response.prediction_source, PredictionSource::Model);
        assert_eq!(response.prediction.predicted_price, 131.5);
        assert_eq!(response.prediction.sentiment, Sentiment::Bullish);
        assert_eq!(response.chart_data.len(), 30);
        assert_eq!(response.chart_data.last().unwrap().price, response.current_price);
        assert!(response.momentum.day30_pct.is_some());
    }

    #[tokio::test]
    async fn test_predict_falls_back_when_model_fails() {
        let o = orchestrator(StubMarketData::healthy(), ScriptedModel::failing());
        let response = o.predict("ACME", ChartWindow::default()).await.unwrap();

        assert_eq!(response.prediction_source, PredictionSource::Fallback);
        assert_eq!(response.prediction.predicted_price, response.current_price * 1.01);
        assert_eq!(response.prediction.recommendation, "Hold — insufficient data");
        assert_eq!(response.chart_data.len(), 60);
    }

    #[tokio::test]
    async fn test_predict_falls_back_on_unparseable_reply() {
        let model = ScriptedModel::new(|_, _| Ok("The stock looks fine to me.".to_string()));
        let o = orchestrator(StubMarketData::healthy(), model);
        let response = o.predict("ACME", ChartWindow::Days20).await.unwrap();

        assert_eq!(response.prediction_source, PredictionSource::Fallback);
        assert_eq!(response.prediction.narrative, "Analysis unavailable");
    }

    #[tokio::test]
    async fn test_predict_requires_price_history() {
        let mut data = StubMarketData::healthy();
        data.history = Err(unavailable());
        let o = orchestrator(data, analyst_model());

        let result = o.predict("ACME", ChartWindow::default()).await;
        assert!(matches!(result, Err(AnalysisError::UpstreamUnavailable(_))));
    }

    #[tokio::test]
    async fn test_predict_with_single_bar() {
        let mut data = StubMarketData::healthy();
        data.history = Ok(history(1));
        let o = orchestrator(data, ScriptedModel::failing());

        let response = o.predict("ACME", ChartWindow::default()).await.unwrap();
        assert_eq!(response.indicators.rsi14, 50.0);
        assert_eq!(response.momentum.day1_pct, None);
        assert_eq!(response.chart_data.len(), 1);
    }

    #[tokio::test]
    async fn test_financials_recovery_policy() {
        let o = orchestrator(StubMarketData::healthy(), analyst_model());
        let live = o.financials("ACME").await.unwrap();
        let report = live.ready().unwrap();
        assert!(!report.is_mock_data);
        assert_eq!(report.market_cap, "$2.50T");

        let mut data = StubMarketData::healthy();
        data.financials = Err(unavailable());
        let mock = orchestrator(data, analyst_model()).financials("ACME").await.unwrap();
        assert!(mock.ready().unwrap().is_mock_data);
        assert_eq!(mock.ready().unwrap().market_cap, "$45.20B");

        let mut data = StubMarketData::healthy();
        data.financials = Err(malformed());
        let soft = orchestrator(data, analyst_model()).financials("ACME").await.unwrap();
        assert_eq!(
            soft,
            Section::Unavailable(UnavailableSection {
                ticker: "ACME".to_string(),
                unavailable: true,
                error: "Financial data format unavailable".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_fundamentals_live_uses_model_commentary() {
        let o = orchestrator(StubMarketData::healthy(), analyst_model());
        let section = o.fundamentals("ACME").await.unwrap();
        let report = section.ready().unwrap();

        // 50 + 10 (eps) + 15 (pe) + 15 (debt reads as 0)
        assert_eq!(report.ai_score, 90);
        assert_eq!(report.score_color, "green");
        assert_eq!(report.ai_commentary, "Balanced outlook.");
        assert!(!report.is_mock_data);
    }

    #[tokio::test]
    async fn test_fundamentals_commentary_default() {
        let o = orchestrator(StubMarketData::healthy(), ScriptedModel::failing());
        let section = o.fundamentals("ACME").await.unwrap();
        assert_eq!(section.ready().unwrap().ai_commentary, "Fundamental analysis complete.");
    }

    #[tokio::test]
    async fn test_fundamentals_sample_is_scored() {
        let mut data = StubMarketData::healthy();
        data.fundamentals = Err(unavailable());
        let model = ScriptedModel::failing();
        let o = orchestrator(data, model);

        let section = o.fundamentals("ACME").await.unwrap();
        let report = section.ready().unwrap();
        assert!(report.is_mock_data);
        assert_eq!(report.ai_score, 100);
        assert!(report.ai_commentary.contains("AI score of 100/100"));
    }

    #[tokio::test]
    async fn test_news_classifies_each_headline() {
        let o = orchestrator(StubMarketData::healthy(), analyst_model());
        let section = o.news("ACME").await.unwrap();
        let report = section.ready().unwrap();

        let sentiments: Vec<_> = report.news.iter().map(|n| n.sentiment).collect();
        assert_eq!(
            sentiments,
            vec![HeadlineSentiment::Positive, HeadlineSentiment::Negative, HeadlineSentiment::Neutral]
        );
        assert_eq!(report.news[0].sentiment_score, 0.7);
        assert_eq!(report.news[1].sentiment_score, -0.7);
        assert_eq!(report.news[0].date, "2024-03-05");
        assert_eq!(report.news[0].headline, "Shares rally on record quarter");
    }

    #[tokio::test]
    async fn test_news_respects_limit() {
        let mut data = StubMarketData::healthy();
        let titles: Vec<String> = (0..12).map(|i| format!("Story {}", i)).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        data.news = Ok(headlines(&refs));
        let model = ScriptedModel::new(|_, _| Ok("neutral".to_string()));
        let model = Arc::new(model);
        let o = AnalysisOrchestrator::new(Arc::new(data), model.clone());

        let section = o.news("ACME").await.unwrap();
        assert_eq!(section.ready().unwrap().news.len(), news::NEWS_LIMIT);
        assert_eq!(model.calls.load(Ordering::SeqCst), news::NEWS_LIMIT);
    }

    #[tokio::test]
    async fn test_news_upstream_failure_is_soft() {
        for err in [unavailable(), malformed()] {
            let mut data = StubMarketData::healthy();
            data.news = Err(err);
            let section = orchestrator(data, analyst_model()).news("ACME").await.unwrap();
            assert!(section.is_unavailable());
        }
    }

    #[tokio::test]
    async fn test_ownership_live_and_sample() {
        let o = orchestrator(StubMarketData::healthy(), ScriptedModel::failing());
        let section = o.ownership("ACME").await.unwrap();
        let report = section.ready().unwrap();
        assert_eq!(report.shareholding.retail, 30.0);
        assert_eq!(report.float_held_by_institutions, 65.0);
        assert_eq!(report.ai_commentary, "Ownership analysis complete.");

        let mut data = StubMarketData::healthy();
        data.holders = Err(unavailable());
        let sample = orchestrator(data, analyst_model()).ownership("ACME").await.unwrap();
        assert!(sample.ready().unwrap().is_mock_data);
        assert_eq!(sample.ready().unwrap().shareholding.institutions, 65.3);
    }

    #[tokio::test]
    async fn test_aggregate_news_failure_keeps_financials() {
        let mut data = StubMarketData::healthy();
        data.news = Err(unavailable());
        let o = orchestrator(data, analyst_model());

        let aggregate = o.analyze_all("ACME", ChartWindow::default()).await.unwrap();
        let financials = aggregate.financials.unwrap();
        assert!(!financials.ready().unwrap().is_mock_data);
        assert!(aggregate.news.unwrap().is_unavailable());
        assert_eq!(aggregate.prediction.prediction_source, PredictionSource::Model);
        assert!(aggregate.fundamentals.is_some());
        assert!(aggregate.ownership.is_some());
    }

    #[tokio::test]
    async fn test_aggregate_hard_section_failure_is_none() {
        let mut data = StubMarketData::healthy();
        data.holders = Err(AnalysisError::InvalidData("negative holdings".to_string()));
        let o = orchestrator(data, analyst_model());

        let aggregate = o.analyze_all("ACME", ChartWindow::default()).await.unwrap();
        assert!(aggregate.ownership.is_none());
        assert!(aggregate.financials.is_some());

        let json = serde_json::to_value(&aggregate).unwrap();
        assert!(json["ownership"].is_null());
        assert_eq!(json["prediction"]["predictionSource"], "model");
    }

    #[tokio::test]
    async fn test_aggregate_requires_prediction() {
        let mut data = StubMarketData::healthy();
        data.history = Err(malformed());
        let o = orchestrator(data, analyst_model());

        assert!(o.analyze_all("ACME", ChartWindow::default()).await.is_err());
    }
}
