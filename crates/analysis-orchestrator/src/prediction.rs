use analysis_core::{
    ChartPoint, IndicatorBundle, MomentumSummary, PredictionPayload, Sentiment, SymbolMeta,
};
use serde::{Deserialize, Serialize};

pub const SYSTEM_PROMPT: &str = "You are an expert financial analyst. Analyze technical indicators \
and market sentiment to provide actionable insights. Always respond with valid JSON only.";

pub const FALLBACK_NARRATIVE: &str = "Analysis unavailable";
pub const FALLBACK_RECOMMENDATION: &str = "Hold — insufficient data";

/// Multiplier applied to the current price when the model gives us nothing usable
pub const FALLBACK_PRICE_FACTOR: f64 = 1.01;
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{:.2}%", v))
}

pub fn build_prompt(
    ticker: &str,
    current_price: f64,
    indicators: &IndicatorBundle,
    momentum: &MomentumSummary,
) -> String {
    format!(
        "Comprehensive analysis for {ticker}:

PRICE DATA:
- Current: ${price:.2}
- 1D Change: {d1}
- 7D Change: {d7}
- 30D Change: {d30}

TECHNICAL INDICATORS:
- SMA(20): ${sma20:.2}
- SMA(50): ${sma50:.2}
- EMA(12): ${ema12:.2}
- EMA(26): ${ema26:.2}
- RSI(14): {rsi:.2}
- MACD: {line:.2}
- MACD Signal: {signal:.2}
- MACD Histogram: {hist:.2}

VOLUME:
- Current: {vol:.0}
- 20D Average: {avg:.0}
- Current vs Avg: {vchg}

Provide JSON response:
{{
  \"prediction\": <tomorrow's predicted price as number>,
  \"confidence\": <0-1 as number>,
  \"sentiment\": <\"bullish\"/\"bearish\"/\"neutral\">,
  \"technicalAnalysis\": \"<2-3 sentence analysis of indicators>\",
  \"sentimentScore\": <-1 to 1 as number, based on overall market sentiment>,
  \"recommendation\": \"<buy/hold/sell with brief reasoning>\",
  \"keySignals\": [\"<signal1>\", \"<signal2>\", \"<signal3>\"]
}}",
        ticker = ticker,
        price = current_price,
        d1 = pct(momentum.day1_pct),
        d7 = pct(momentum.day7_pct),
        d30 = pct(momentum.day30_pct),
        sma20 = indicators.sma20,
        sma50 = indicators.sma50,
        ema12 = indicators.ema12,
        ema26 = indicators.ema26,
        rsi = indicators.rsi14,
        line = indicators.macd.line(),
        signal = indicators.macd.signal(),
        hist = indicators.macd.histogram(),
        vol = momentum.volume_current,
        avg = momentum.volume_average20,
        vchg = pct(momentum.volume_change_pct),
    )
}

/// Finds the first balanced `{...}` in free text.
///
/// Braces inside JSON string literals do not count toward nesting. If a `{`
/// never closes, scanning resumes at the next `{`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut start = text.find('{')?;

    loop {
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;

        for (offset, &b) in bytes[start..].iter().enumerate() {
            if in_string {
                match b {
                    _ if escaped => escaped = false,
                    b'\\' => escaped = true,
                    b'"' => in_string = false,
                    _ => {}
                }
                continue;
            }
            match b {
                b'"' => in_string = true,
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&text[start..=start + offset]);
                    }
                }
                _ => {}
            }
        }

        start += 1 + text[start + 1..].find('{')?;
    }
}

/// Reply schema requested in the prompt
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelReply {
    prediction: f64,
    confidence: f64,
    sentiment: String,
    #[serde(default)]
    sentiment_score: Option<f64>,
    #[serde(default)]
    technical_analysis: Option<String>,
    #[serde(default)]
    recommendation: Option<String>,
    #[serde(default)]
    key_signals: Vec<String>,
}

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

impl ModelReply {
    fn into_payload(self) -> Option<PredictionPayload> {
        if !self.prediction.is_finite() || !self.confidence.is_finite() {
            return None;
        }
        let sentiment = Sentiment::from_label(&self.sentiment)?;

        Some(PredictionPayload {
            predicted_price: self.prediction,
            confidence: self.confidence.clamp(0.0, 1.0),
            sentiment,
            sentiment_score: self
                .sentiment_score
                .filter(|s| s.is_finite())
                .unwrap_or(0.0)
                .clamp(-1.0, 1.0),
            narrative: non_blank(self.technical_analysis)
                .unwrap_or_else(|| FALLBACK_NARRATIVE.to_string()),
            recommendation: non_blank(self.recommendation)
                .unwrap_or_else(|| FALLBACK_RECOMMENDATION.to_string()),
            key_signals: self.key_signals,
        })
    }
}

/// Where the prediction payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Parsed(PredictionPayload),
    Fallback(PredictionPayload),
}

impl PredictionOutcome {
    pub fn fallback(current_price: f64) -> Self {
        PredictionOutcome::Fallback(PredictionPayload {
            predicted_price: current_price * FALLBACK_PRICE_FACTOR,
            confidence: FALLBACK_CONFIDENCE,
            sentiment: Sentiment::Neutral,
            sentiment_score: 0.0,
            narrative: FALLBACK_NARRATIVE.to_string(),
            recommendation: FALLBACK_RECOMMENDATION.to_string(),
            key_signals: Vec::new(),
        })
    }

    /// Never fails: anything unusable becomes the fallback payload.
    pub fn from_reply(reply: &str, current_price: f64) -> Self {
        extract_json_object(reply)
            .and_then(|json| serde_json::from_str::<ModelReply>(json).ok())
            .and_then(ModelReply::into_payload)
            .map(PredictionOutcome::Parsed)
            .unwrap_or_else(|| Self::fallback(current_price))
    }

    pub fn source(&self) -> PredictionSource {
        match self {
            PredictionOutcome::Parsed(_) => PredictionSource::Model,
            PredictionOutcome::Fallback(_) => PredictionSource::Fallback,
        }
    }

    pub fn payload(&self) -> &PredictionPayload {
        match self {
            PredictionOutcome::Parsed(p) | PredictionOutcome::Fallback(p) => p,
        }
    }

    pub fn into_payload(self) -> PredictionPayload {
        match self {
            PredictionOutcome::Parsed(p) | PredictionOutcome::Fallback(p) => p,
        }
    }
}

/// Numeric bundle merged with the model's forecast
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub ticker: String,
    pub current_price: f64,
    pub meta: SymbolMeta,
    pub prediction: PredictionPayload,
    pub prediction_source: PredictionSource,
    pub indicators: IndicatorBundle,
    pub momentum: MomentumSummary,
    pub chart_data: Vec<ChartPoint>,
}
