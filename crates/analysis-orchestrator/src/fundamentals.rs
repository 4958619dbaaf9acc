use analysis_core::{FundamentalsInput, FundamentalsScore, RadarMetric};
use fundamental_analysis::{FundamentalsScorer, Ratio};
use serde::Serialize;

pub const DEFAULT_COMMENTARY: &str = "Fundamental analysis complete.";

/// Display strings; fractional ratios are shown ×100
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalsMetrics {
    pub eps: String,
    pub pe_ratio: String,
    pub roe: String,
    pub debt_to_equity: String,
    pub profit_margin: String,
    pub dividend_yield: String,
    pub revenue_growth: String,
    pub earnings_growth: String,
}

impl FundamentalsMetrics {
    pub fn from_input(input: &FundamentalsInput) -> Self {
        let plain = |ratio: Ratio| format!("{:.2}", ratio.read(input));
        let scaled = |ratio: Ratio| format!("{:.2}", ratio.read(input) * 100.0);

        Self {
            eps: plain(Ratio::Eps),
            pe_ratio: plain(Ratio::PeRatio),
            roe: scaled(Ratio::Roe),
            debt_to_equity: plain(Ratio::DebtToEquity),
            profit_margin: scaled(Ratio::ProfitMargin),
            dividend_yield: scaled(Ratio::DividendYield),
            revenue_growth: scaled(Ratio::RevenueGrowth),
            earnings_growth: scaled(Ratio::EarningsGrowth),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalsReport {
    pub ticker: String,
    pub ai_score: u8,
    pub score_color: &'static str,
    pub metrics: FundamentalsMetrics,
    pub radar_data: Vec<RadarMetric>,
    /// Labels of the scoring rules that matched
    pub strengths: Vec<&'static str>,
    pub ai_commentary: String,
    pub is_mock_data: bool,
}

impl FundamentalsReport {
    pub fn new(
        ticker: &str,
        input: &FundamentalsInput,
        scorer: &FundamentalsScorer,
        ai_commentary: String,
        is_mock_data: bool,
    ) -> Self {
        let FundamentalsScore { score, tier, radar_metrics } = scorer.score(input);
        Self {
            ticker: ticker.to_string(),
            ai_score: score,
            score_color: tier.as_str(),
            metrics: FundamentalsMetrics::from_input(input),
            radar_data: radar_metrics,
            strengths: scorer.matched_rules(input).map(|r| r.label).collect(),
            ai_commentary,
            is_mock_data,
        }
    }
}

pub fn commentary_prompt(ticker: &str, score: u8, input: &FundamentalsInput, strengths: &[&str]) -> String {
    let mut prompt = format!(
        "Generate a brief 1-2 sentence insight for {} based on: AI Score: {}/100, ROE: {:.1}%, \
Profit Margin: {:.1}%, P/E: {:.1}, Debt/Equity: {:.2}.",
        ticker,
        score,
        Ratio::Roe.read(input) * 100.0,
        Ratio::ProfitMargin.read(input) * 100.0,
        Ratio::PeRatio.read(input),
        Ratio::DebtToEquity.read(input),
    );
    if !strengths.is_empty() {
        prompt.push_str(&format!(" Strengths: {}.", strengths.join(", ")));
    }
    prompt
}

pub fn sample_input() -> FundamentalsInput {
    FundamentalsInput {
        eps: Some(5.8),
        pe_ratio: Some(24.5),
        roe: Some(0.185),
        debt_to_equity: Some(0.65),
        profit_margin: Some(0.173),
        dividend_yield: Some(0.0125),
        revenue_growth: Some(0.125),
        earnings_growth: Some(0.152),
    }
}

pub fn sample_commentary(ticker: &str, score: u8) -> String {
    format!(
        "{} demonstrates strong fundamentals with an AI score of {}/100. The company shows robust ROE \
and healthy profit margins, indicating efficient capital allocation and strong operational performance.",
        ticker, score
    )
}
