use analysis_core::{MomentumSummary, PriceSeries};

use crate::indicators::sma;

pub const VOLUME_AVERAGE_PERIOD: usize = 20;

/// Percent change from `lookback` bars ago to the last bar.
///
/// `None` when the series is not longer than the lookback or the base is zero.
pub fn price_change_pct(closes: &[f64], lookback: usize) -> Option<f64> {
    if closes.len() <= lookback {
        return None;
    }

    let last = closes[closes.len() - 1];
    let base = closes[closes.len() - 1 - lookback];
    if base == 0.0 {
        return None;
    }

    Some((last - base) / base * 100.0)
}

/// Percent deviation of the latest volume from `average`
pub fn volume_change_pct(current: f64, average: f64) -> Option<f64> {
    if average == 0.0 {
        return None;
    }
    Some((current / average - 1.0) * 100.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MomentumAnalyzer;

impl MomentumAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, series: &PriceSeries) -> MomentumSummary {
        let closes = series.closes();
        let volumes = series.volumes();

        let volume_current = series.last().volume;
        let volume_average20 = sma(&volumes, VOLUME_AVERAGE_PERIOD).unwrap_or(0.0);

        MomentumSummary {
            day1_pct: price_change_pct(&closes, 1),
            day7_pct: price_change_pct(&closes, 7),
            day30_pct: price_change_pct(&closes, 30),
            volume_current,
            volume_average20,
            volume_change_pct: volume_change_pct(volume_current, volume_average20),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::Bar;
    use chrono::{Duration, TimeZone, Utc};

    fn series_from(closes: &[f64], volumes: &[f64]) -> PriceSeries {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = closes
            .iter()
            .zip(volumes)
            .enumerate()
            .map(|(i, (&close, &volume))| Bar {
                timestamp: start + Duration::days(i as i64),
                open: Some(close),
                high: close,
                low: close,
                close,
                volume,
            })
            .collect();
        PriceSeries::new(bars).unwrap()
    }

    #[test]
    fn test_price_change_basic() {
        let closes = [100.0, 110.0];
        assert_eq!(price_change_pct(&closes, 1), Some(10.0));
    }

    #[test]
    fn test_price_change_requires_longer_series() {
        let closes = [100.0, 101.0, 102.0];
        assert_eq!(price_change_pct(&closes, 3), None);
        assert!(price_change_pct(&closes, 2).is_some());
    }

    #[test]
    fn test_price_change_zero_base() {
        let closes = [0.0, 5.0];
        assert_eq!(price_change_pct(&closes, 1), None);
    }

    #[test]
    fn test_lookbacks_measured_from_last_bar() {
        // 31 closes: 100, 101, ..., 130
        let closes: Vec<f64> = (0..31).map(|i| 100.0 + i as f64).collect();
        let volumes = vec![1_000.0; closes.len()];
        let summary = MomentumAnalyzer::new().analyze(&series_from(&closes, &volumes));

        let day1 = summary.day1_pct.unwrap();
        let day7 = summary.day7_pct.unwrap();
        let day30 = summary.day30_pct.unwrap();
        assert!((day1 - (130.0 - 129.0) / 129.0 * 100.0).abs() < 1e-12);
        assert!((day7 - (130.0 - 123.0) / 123.0 * 100.0).abs() < 1e-12);
        assert!((day30 - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_short_series_omits_long_lookbacks() {
        let closes = [10.0, 11.0, 12.0];
        let volumes = [1.0, 1.0, 1.0];
        let summary = MomentumAnalyzer::new().analyze(&series_from(&closes, &volumes));

        assert!(summary.day1_pct.is_some());
        assert!(summary.day7_pct.is_none());
        assert!(summary.day30_pct.is_none());
    }

    #[test]
    fn test_volume_spike() {
        // 19 bars of 1000 then one of 3000: average 1100
        let mut volumes = vec![1_000.0; 19];
        volumes.push(3_000.0);
        let closes = vec![50.0; volumes.len()];
        let summary = MomentumAnalyzer::new().analyze(&series_from(&closes, &volumes));

        assert_eq!(summary.volume_current, 3_000.0);
        assert!((summary.volume_average20 - 1_100.0).abs() < 1e-9);
        let change = summary.volume_change_pct.unwrap();
        assert!((change - (3_000.0 / 1_100.0 - 1.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_volume_average() {
        let summary = MomentumAnalyzer::new().analyze(&series_from(&[1.0, 2.0], &[0.0, 0.0]));
        assert_eq!(summary.volume_average20, 0.0);
        assert_eq!(summary.volume_change_pct, None);
    }
}
