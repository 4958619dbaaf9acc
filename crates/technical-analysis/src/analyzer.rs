use analysis_core::{AnalysisError, IndicatorBundle};

use crate::indicators::*;

pub const SMA_SHORT_PERIOD: usize = 20;
pub const SMA_LONG_PERIOD: usize = 50;
pub const EMA_FAST_PERIOD: usize = 12;
pub const EMA_SLOW_PERIOD: usize = 26;
pub const RSI_PERIOD: usize = 14;
pub const MACD_SIGNAL_PERIOD: usize = 9;

/// Bars needed before the MACD signal line covers a full signal period.
pub const MACD_FULL_SIGNAL_BARS: usize = EMA_SLOW_PERIOD + MACD_SIGNAL_PERIOD;

/// Computes the indicator bundle from closing prices
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine;

impl IndicatorEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn compute(&self, closes: &[f64]) -> Result<IndicatorBundle, AnalysisError> {
        if closes.is_empty() {
            return Err(AnalysisError::InsufficientData(
                "Need at least one close to compute indicators".to_string(),
            ));
        }

        let missing = |name: &str| AnalysisError::CalculationError(format!("{} undefined", name));

        Ok(IndicatorBundle {
            sma20: sma(closes, SMA_SHORT_PERIOD).ok_or_else(|| missing("SMA(20)"))?,
            sma50: sma(closes, SMA_LONG_PERIOD).ok_or_else(|| missing("SMA(50)"))?,
            ema12: ema(closes, EMA_FAST_PERIOD).ok_or_else(|| missing("EMA(12)"))?,
            ema26: ema(closes, EMA_SLOW_PERIOD).ok_or_else(|| missing("EMA(26)"))?,
            rsi14: rsi(closes, RSI_PERIOD).ok_or_else(|| missing("RSI(14)"))?,
            macd: macd(closes, EMA_FAST_PERIOD, EMA_SLOW_PERIOD, MACD_SIGNAL_PERIOD)
                .ok_or_else(|| missing("MACD"))?,
        })
    }

    /// Whether the series is long enough for every indicator to use its full period.
    pub fn has_full_history(&self, closes: &[f64]) -> bool {
        closes.len() >= SMA_LONG_PERIOD.max(MACD_FULL_SIGNAL_BARS)
    }
}
