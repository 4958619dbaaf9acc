use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AnalysisError;

/// OHLCV bar data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub open: Option<f64>,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Chronological, non-empty bar history with unique timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    bars: Vec<Bar>,
}

impl PriceSeries {
    /// Sorts bars by timestamp and collapses duplicate timestamps, keeping the
    /// later bar. Rejects an empty history.
    pub fn new(mut bars: Vec<Bar>) -> Result<Self, AnalysisError> {
        if bars.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "Price series needs at least one bar".to_string(),
            ));
        }

        // Stable sort keeps arrival order among equal timestamps, so the
        // last duplicate is the one the provider sent most recently.
        bars.sort_by_key(|b| b.timestamp);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.timestamp == bar.timestamp => *prev = bar,
                _ => deduped.push(bar),
            }
        }

        Ok(Self { bars: deduped })
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn last(&self) -> &Bar {
        // Non-empty by construction.
        &self.bars[self.bars.len() - 1]
    }

    pub fn current_price(&self) -> f64 {
        self.last().close
    }
}

/// Descriptive metadata returned alongside a price history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolMeta {
    pub company_name: String,
    pub currency: String,
    pub exchange: String,
}

impl SymbolMeta {
    pub fn for_ticker(ticker: &str) -> Self {
        Self {
            company_name: ticker.to_string(),
            currency: "USD".to_string(),
            exchange: "Unknown".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PriceHistory {
    pub meta: SymbolMeta,
    pub series: PriceSeries,
}

/// MACD line, signal and histogram at the latest bar.
///
/// Only constructible through [`MacdSnapshot::new`], which derives the
/// histogram, so `histogram == line - signal` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdSnapshot {
    line: f64,
    signal: f64,
    histogram: f64,
}

impl MacdSnapshot {
    pub fn new(line: f64, signal: f64) -> Self {
        Self {
            line,
            signal,
            histogram: line - signal,
        }
    }

    pub fn line(&self) -> f64 {
        self.line
    }

    pub fn signal(&self) -> f64 {
        self.signal
    }

    pub fn histogram(&self) -> f64 {
        self.histogram
    }
}

/// Latest values of the technical indicators fed to the prediction model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorBundle {
    pub sma20: f64,
    pub sma50: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub rsi14: f64,
    pub macd: MacdSnapshot,
}

/// Price momentum over fixed lookbacks plus volume versus its 20-bar mean
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MomentumSummary {
    pub day1_pct: Option<f64>,
    pub day7_pct: Option<f64>,
    pub day30_pct: Option<f64>,
    pub volume_current: f64,
    pub volume_average20: f64,
    pub volume_change_pct: Option<f64>,
}

/// Raw financial ratios. Absent fields score as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalsInput {
    pub eps: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub roe: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub profit_margin: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreTier {
    Green,
    Yellow,
    Red,
}

impl ScoreTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s >= 70 => ScoreTier::Green,
            s if s >= 50 => ScoreTier::Yellow,
            _ => ScoreTier::Red,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreTier::Green => "green",
            ScoreTier::Yellow => "yellow",
            ScoreTier::Red => "red",
        }
    }
}

/// One radar chart axis, value in [0, 100]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarMetric {
    pub metric: &'static str,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FundamentalsScore {
    pub score: u8,
    pub tier: ScoreTier,
    pub radar_metrics: Vec<RadarMetric>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl Sentiment {
    /// Case-insensitive label lookup
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "bullish" => Some(Sentiment::Bullish),
            "bearish" => Some(Sentiment::Bearish),
            "neutral" => Some(Sentiment::Neutral),
            _ => None,
        }
    }
}

/// Model-produced (or fallback) forecast merged into the prediction response
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionPayload {
    pub predicted_price: f64,
    pub confidence: f64,
    pub sentiment: Sentiment,
    pub sentiment_score: f64,
    pub narrative: String,
    pub recommendation: String,
    pub key_signals: Vec<String>,
}

/// Per-bar tuple for the price chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub date: String,
    pub price: f64,
    pub volume: f64,
    pub high: f64,
    pub low: f64,
}

impl From<&Bar> for ChartPoint {
    fn from(bar: &Bar) -> Self {
        Self {
            date: bar.timestamp.format("%Y-%m-%d").to_string(),
            price: bar.close,
            volume: bar.volume,
            high: bar.high,
            low: bar.low,
        }
    }
}

/// Company financial statement figures as reported by the data provider
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FinancialSnapshot {
    pub market_cap: Option<f64>,
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub profit_margin: Option<f64>,
    pub pe_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub operating_cash_flow: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub revenue_growth: Option<f64>,
    pub earnings_growth: Option<f64>,
    pub target_price: Option<f64>,
    pub recommendation_key: Option<String>,
    pub book_value: Option<f64>,
    pub price_to_book: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub beta: Option<f64>,
    pub earnings_history: Vec<EarningsQuarter>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EarningsQuarter {
    pub quarter: Option<String>,
    pub eps_actual: Option<f64>,
    pub eps_estimate: Option<f64>,
    /// Fraction, e.g. 0.0507 for a 5.07% beat
    pub surprise: Option<f64>,
}

/// News headline for a ticker
#[derive(Debug, Clone, PartialEq)]
pub struct NewsHeadline {
    pub title: String,
    pub publisher: Option<String>,
    pub link: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Ownership fractions (0.0 to 1.0) from the major holders breakdown
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HolderBreakdown {
    pub insiders: Option<f64>,
    pub institutions: Option<f64>,
    pub institutions_float: Option<f64>,
}
