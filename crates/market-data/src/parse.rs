//! Yahoo Finance JSON → typed values.
//!
//! Every parser here is pure so the HTTP client stays a thin shell around
//! request/response handling.

use analysis_core::{
    AnalysisError, Bar, EarningsQuarter, FinancialSnapshot, FundamentalsInput, HolderBreakdown,
    NewsHeadline, PriceHistory, PriceSeries, SymbolMeta,
};
use chrono::{DateTime, Utc};
use serde_json::Value;

const FINANCIAL_DATA: &str = "financialData";
const KEY_STATISTICS: &str = "defaultKeyStatistics";
const SUMMARY_DETAIL: &str = "summaryDetail";

pub const EARNINGS_QUARTERS: usize = 4;

/// Reads a quoteSummary number, which Yahoo wraps as `{"raw": .., "fmt": ..}`.
fn raw(value: Option<&Value>) -> Option<f64> {
    let value = value?;
    value
        .get("raw")
        .and_then(|v| v.as_f64())
        .or_else(|| value.as_f64())
        .filter(|v| v.is_finite())
}

fn field(module: Option<&Value>, key: &str) -> Option<f64> {
    raw(module.and_then(|m| m.get(key)))
}

fn malformed(message: impl Into<String>) -> AnalysisError {
    AnalysisError::UpstreamMalformed(message.into())
}

fn summary_result(json: &Value) -> Result<&Value, AnalysisError> {
    json.get("quoteSummary")
        .and_then(|v| v.get("result"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .filter(|v| v.is_object())
        .ok_or_else(|| malformed("Financial data format unavailable"))
}

/// Parses a v8 chart response. Bars missing any of close/high/low/volume are skipped.
pub fn parse_chart(ticker: &str, json: &Value) -> Result<PriceHistory, AnalysisError> {
    let result = json
        .get("chart")
        .and_then(|v| v.get("result"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| malformed(format!("No chart data found for {}", ticker)))?;

    let timestamps = result
        .get("timestamp")
        .and_then(|v| v.as_array())
        .ok_or_else(|| malformed("Chart response has no timestamps"))?;

    let quote = result
        .get("indicators")
        .and_then(|v| v.get("quote"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .ok_or_else(|| malformed("Chart response has no quote indicators"))?;

    let column = |name: &str| -> Vec<Option<f64>> {
        quote
            .get(name)
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().map(|v| v.as_f64()).collect())
            .unwrap_or_default()
    };
    let opens = column("open");
    let highs = column("high");
    let lows = column("low");
    let closes = column("close");
    let volumes = column("volume");

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let bars: Vec<Bar> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let timestamp = DateTime::<Utc>::from_timestamp(ts.as_i64()?, 0)?;
            Some(Bar {
                timestamp,
                open: at(&opens, i),
                high: at(&highs, i)?,
                low: at(&lows, i)?,
                close: at(&closes, i)?,
                volume: at(&volumes, i)?,
            })
        })
        .collect();

    let series = PriceSeries::new(bars)
        .map_err(|_| malformed(format!("No usable price bars for {}", ticker)))?;

    let meta = result.get("meta");
    let text = |key: &str| {
        meta.and_then(|m| m.get(key))
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    let fallback = SymbolMeta::for_ticker(ticker);

    Ok(PriceHistory {
        meta: SymbolMeta {
            company_name: text("longName")
                .or_else(|| text("shortName"))
                .unwrap_or(fallback.company_name),
            currency: text("currency").unwrap_or(fallback.currency),
            exchange: text("exchangeName").unwrap_or(fallback.exchange),
        },
        series,
    })
}

pub fn parse_financials(json: &Value) -> Result<FinancialSnapshot, AnalysisError> {
    let result = summary_result(json)?;
    let financial = result.get(FINANCIAL_DATA);
    let stats = result.get(KEY_STATISTICS);
    let summary = result.get(SUMMARY_DETAIL);

    let net_income = result
        .get("incomeStatementHistory")
        .and_then(|v| v.get("incomeStatementHistory"))
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|stmt| raw(stmt.get("netIncome")));

    let earnings_history = result
        .get("earningsHistory")
        .and_then(|v| v.get("history"))
        .and_then(|v| v.as_array())
        .map(|history| {
            history
                .iter()
                .take(EARNINGS_QUARTERS)
                .map(|entry| EarningsQuarter {
                    quarter: entry
                        .get("quarter")
                        .and_then(|q| q.get("fmt"))
                        .and_then(|q| q.as_str())
                        .map(str::to_string),
                    eps_actual: raw(entry.get("epsActual")),
                    eps_estimate: raw(entry.get("epsEstimate")),
                    surprise: raw(entry.get("surprisePercent")),
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(FinancialSnapshot {
        market_cap: field(summary, "marketCap"),
        revenue: field(financial, "totalRevenue"),
        net_income,
        profit_margin: field(financial, "profitMargins"),
        pe_ratio: field(summary, "trailingPE"),
        eps: field(stats, "trailingEps"),
        debt_to_equity: field(financial, "debtToEquity"),
        current_ratio: field(financial, "currentRatio"),
        operating_cash_flow: field(financial, "operatingCashflow"),
        free_cash_flow: field(financial, "freeCashflow"),
        revenue_growth: field(financial, "revenueGrowth"),
        earnings_growth: field(financial, "earningsGrowth"),
        target_price: field(financial, "targetMeanPrice"),
        recommendation_key: financial
            .and_then(|f| f.get("recommendationKey"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        book_value: field(stats, "bookValue"),
        price_to_book: field(stats, "priceToBook"),
        dividend_yield: field(summary, "dividendYield"),
        beta: field(stats, "beta"),
        earnings_history,
    })
}

pub fn parse_fundamentals(json: &Value) -> Result<FundamentalsInput, AnalysisError> {
    let result = summary_result(json)?;
    let financial = result.get(FINANCIAL_DATA);
    let stats = result.get(KEY_STATISTICS);
    let summary = result.get(SUMMARY_DETAIL);

    Ok(FundamentalsInput {
        eps: field(stats, "trailingEps"),
        pe_ratio: field(summary, "trailingPE"),
        roe: field(financial, "returnOnEquity"),
        debt_to_equity: field(financial, "debtToEquity"),
        profit_margin: field(financial, "profitMargins"),
        dividend_yield: field(summary, "dividendYield"),
        revenue_growth: field(financial, "revenueGrowth"),
        earnings_growth: field(financial, "earningsGrowth"),
    })
}

/// Parses a v1 search response into at most `limit` headlines.
///
/// Items without a title or publish time are dropped.
pub fn parse_news(json: &Value, limit: usize) -> Result<Vec<NewsHeadline>, AnalysisError> {
    let items = json
        .get("news")
        .and_then(|v| v.as_array())
        .ok_or_else(|| malformed("Search response has no news list"))?;

    let text = |item: &Value, key: &str| item.get(key).and_then(|v| v.as_str()).map(str::to_string);

    Ok(items
        .iter()
        .filter_map(|item| {
            let title = text(item, "title")?;
            let published = item.get("providerPublishTime").and_then(|v| v.as_i64())?;
            Some(NewsHeadline {
                title,
                publisher: text(item, "publisher"),
                link: text(item, "link"),
                published_at: DateTime::<Utc>::from_timestamp(published, 0)?,
            })
        })
        .take(limit)
        .collect())
}

pub fn parse_holders(json: &Value) -> Result<HolderBreakdown, AnalysisError> {
    let breakdown = summary_result(json)?
        .get("majorHoldersBreakdown")
        .ok_or_else(|| malformed("Ownership data unavailable"))?;

    Ok(HolderBreakdown {
        insiders: raw(breakdown.get("insidersPercentHeld")),
        institutions: raw(breakdown.get("institutionsPercentHeld")),
        institutions_float: raw(breakdown.get("institutionsFloatPercentHeld")),
    })
}
