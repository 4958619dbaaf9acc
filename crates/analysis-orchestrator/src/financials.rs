use analysis_core::{EarningsQuarter, FinancialSnapshot};
use serde::Serialize;

const NOT_AVAILABLE: &str = "N/A";

/// `$1.23T` / `$4.56B` / `$7.89M` / `$12.34`; zero and absent render as N/A.
pub fn format_currency(value: Option<f64>) -> String {
    let Some(v) = value.filter(|v| *v != 0.0 && v.is_finite()) else {
        return NOT_AVAILABLE.to_string();
    };

    let sign = if v < 0.0 { "-" } else { "" };
    let magnitude = v.abs();
    if magnitude >= 1e12 {
        format!("{}${:.2}T", sign, magnitude / 1e12)
    } else if magnitude >= 1e9 {
        format!("{}${:.2}B", sign, magnitude / 1e9)
    } else if magnitude >= 1e6 {
        format!("{}${:.2}M", sign, magnitude / 1e6)
    } else {
        format!("{}${:.2}", sign, magnitude)
    }
}

/// Fraction rendered as a percentage string, e.g. `0.173` → `17.30%`
pub fn format_percent(fraction: Option<f64>) -> String {
    match fraction.filter(|v| *v != 0.0 && v.is_finite()) {
        Some(v) => format!("{:.2}%", v * 100.0),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn format_fixed(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{:.2}", v),
        None => NOT_AVAILABLE.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EarningsRow {
    pub quarter: String,
    pub eps_actual: String,
    pub eps_actual_raw: Option<f64>,
    pub eps_estimate: String,
    pub eps_estimate_raw: Option<f64>,
    pub surprise: String,
}

impl From<&EarningsQuarter> for EarningsRow {
    fn from(q: &EarningsQuarter) -> Self {
        Self {
            quarter: q.quarter.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            eps_actual: format_fixed(q.eps_actual),
            eps_actual_raw: q.eps_actual,
            eps_estimate: format_fixed(q.eps_estimate),
            eps_estimate_raw: q.eps_estimate,
            surprise: format_percent(q.surprise),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialsReport {
    pub ticker: String,
    pub market_cap: String,
    pub market_cap_raw: Option<f64>,
    pub revenue: String,
    pub revenue_raw: Option<f64>,
    pub net_income: String,
    pub net_income_raw: Option<f64>,
    pub profit_margin: String,
    pub pe_ratio: String,
    pub eps: String,
    pub eps_raw: Option<f64>,
    pub debt_to_equity: String,
    pub current_ratio: String,
    pub operating_cash_flow: String,
    pub operating_cash_flow_raw: Option<f64>,
    pub free_cash_flow: String,
    pub free_cash_flow_raw: Option<f64>,
    pub revenue_growth: String,
    pub earnings_growth: String,
    pub target_price: String,
    pub target_price_raw: Option<f64>,
    pub recommendation_key: String,
    pub book_value: String,
    pub book_value_raw: Option<f64>,
    pub price_to_book: String,
    pub dividend_yield: String,
    pub beta: String,
    pub earnings_history: Vec<EarningsRow>,
    pub is_mock_data: bool,
}

impl FinancialsReport {
    pub fn from_snapshot(ticker: &str, s: &FinancialSnapshot, is_mock_data: bool) -> Self {
        Self {
            ticker: ticker.to_string(),
            market_cap: format_currency(s.market_cap),
            market_cap_raw: s.market_cap,
            revenue: format_currency(s.revenue),
            revenue_raw: s.revenue,
            net_income: format_currency(s.net_income),
            net_income_raw: s.net_income,
            profit_margin: format_percent(s.profit_margin),
            pe_ratio: format_fixed(s.pe_ratio),
            eps: format_fixed(s.eps),
            eps_raw: s.eps,
            debt_to_equity: format_fixed(s.debt_to_equity),
            current_ratio: format_fixed(s.current_ratio),
            operating_cash_flow: format_currency(s.operating_cash_flow),
            operating_cash_flow_raw: s.operating_cash_flow,
            free_cash_flow: format_currency(s.free_cash_flow),
            free_cash_flow_raw: s.free_cash_flow,
            revenue_growth: format_percent(s.revenue_growth),
            earnings_growth: format_percent(s.earnings_growth),
            target_price: format_fixed(s.target_price),
            target_price_raw: s.target_price,
            recommendation_key: s
                .recommendation_key
                .clone()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            book_value: format_fixed(s.book_value),
            book_value_raw: s.book_value,
            price_to_book: format_fixed(s.price_to_book),
            dividend_yield: format_percent(s.dividend_yield),
            beta: format_fixed(s.beta),
            earnings_history: s.earnings_history.iter().map(EarningsRow::from).collect(),
            is_mock_data,
        }
    }
}

fn quarter(label: &str, actual: f64, estimate: f64, surprise: f64) -> EarningsQuarter {
    EarningsQuarter {
        quarter: Some(label.to_string()),
        eps_actual: Some(actual),
        eps_estimate: Some(estimate),
        surprise: Some(surprise),
    }
}

/// Placeholder figures served when the data source cannot be reached
pub fn sample_snapshot() -> FinancialSnapshot {
    FinancialSnapshot {
        market_cap: Some(45.2e9),
        revenue: Some(18.5e9),
        net_income: Some(3.2e9),
        profit_margin: Some(0.173),
        pe_ratio: Some(24.5),
        eps: Some(5.8),
        debt_to_equity: Some(0.65),
        current_ratio: Some(1.85),
        operating_cash_flow: Some(4.5e9),
        free_cash_flow: Some(3.8e9),
        revenue_growth: Some(0.125),
        earnings_growth: Some(0.152),
        target_price: Some(185.0),
        recommendation_key: Some("buy".to_string()),
        book_value: Some(42.5),
        price_to_book: Some(3.8),
        dividend_yield: Some(0.0125),
        beta: Some(1.15),
        earnings_history: vec![
            quarter("Q1 2025", 1.45, 1.38, 0.0507),
            quarter("Q4 2024", 1.52, 1.48, 0.0270),
            quarter("Q3 2024", 1.38, 1.35, 0.0222),
            quarter("Q2 2024", 1.42, 1.40, 0.0143),
        ],
    }
}
