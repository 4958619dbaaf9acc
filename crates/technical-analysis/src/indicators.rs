use analysis_core::MacdSnapshot;

/// RSI reported for a window with neither gains nor losses.
pub const NEUTRAL_RSI: f64 = 50.0;

/// Simple Moving Average of the trailing `period` values.
///
/// Shorter input averages whatever is available; callers needing a strict
/// period must check the length themselves.
pub fn sma(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.is_empty() {
        return None;
    }

    let window = &data[data.len().saturating_sub(period)..];
    Some(window.iter().sum::<f64>() / window.len() as f64)
}

/// Running Exponential Moving Average, seeded with the first value.
///
/// Element `i` is the EMA of `data[..=i]`.
pub fn ema_series(data: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || data.is_empty() {
        return vec![];
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(data.len());
    result.push(data[0]);

    for i in 1..data.len() {
        let prev = result[i - 1];
        result.push((data[i] - prev) * multiplier + prev);
    }

    result
}

/// Exponential Moving Average at the last value
pub fn ema(data: &[f64], period: usize) -> Option<f64> {
    ema_series(data, period).last().copied()
}

/// Relative Strength Index over the last `period` deltas, simple averages.
///
/// A flat window returns [`NEUTRAL_RSI`]; an all-gain window saturates at 100.
pub fn rsi(data: &[f64], period: usize) -> Option<f64> {
    if period == 0 || data.is_empty() {
        return None;
    }

    let window = (data.len() - 1).min(period);
    if window == 0 {
        return Some(NEUTRAL_RSI);
    }

    let mut gains = 0.0;
    let mut losses = 0.0;
    for i in data.len() - window..data.len() {
        let change = data[i] - data[i - 1];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / window as f64;
    let avg_loss = losses / window as f64;

    let rsi = if avg_loss == 0.0 {
        if avg_gain == 0.0 { NEUTRAL_RSI } else { 100.0 }
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - (100.0 / (1.0 + rs))
    };

    Some(rsi)
}

/// MACD (Moving Average Convergence Divergence) at the last value.
///
/// The line series starts at index `slow_period`; each element equals the
/// fast/slow EMA difference over the prefix ending there, read off the running
/// EMAs in a single pass. With no line series yet the signal is the MACD value.
pub fn macd(
    data: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
) -> Option<MacdSnapshot> {
    if data.is_empty() || fast_period == 0 || slow_period == 0 || signal_period == 0 {
        return None;
    }

    let fast = ema_series(data, fast_period);
    let slow = ema_series(data, slow_period);
    let last = data.len() - 1;
    let line = fast[last] - slow[last];

    let line_series = macd_line_series(&fast, &slow, slow_period);
    let signal = ema(&line_series, signal_period).unwrap_or(line);

    Some(MacdSnapshot::new(line, signal))
}

pub(crate) fn macd_line_series(fast: &[f64], slow: &[f64], start: usize) -> Vec<f64> {
    (start..fast.len().min(slow.len()))
        .map(|i| fast[i] - slow[i])
        .collect()
}
