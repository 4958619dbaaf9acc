use analysis_core::{Bar, ChartPoint, PriceSeries};

/// Chart window sizes offered to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartWindow {
    Days20,
    Days30,
    #[default]
    Days60,
}

impl ChartWindow {
    pub const ALL: [ChartWindow; 3] = [ChartWindow::Days20, ChartWindow::Days30, ChartWindow::Days60];

    pub fn size(&self) -> usize {
        match self {
            ChartWindow::Days20 => 20,
            ChartWindow::Days30 => 30,
            ChartWindow::Days60 => 60,
        }
    }

    pub fn from_days(days: usize) -> Option<Self> {
        Self::ALL.into_iter().find(|w| w.size() == days)
    }
}

/// Last `k` bars, or every bar when fewer exist
pub fn trailing_window(bars: &[Bar], k: usize) -> &[Bar] {
    &bars[bars.len().saturating_sub(k)..]
}

pub fn chart_points(series: &PriceSeries, window: ChartWindow) -> Vec<ChartPoint> {
    trailing_window(series.bars(), window.size())
        .iter()
        .map(ChartPoint::from)
        .collect()
}
