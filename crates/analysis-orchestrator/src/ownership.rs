use analysis_core::HolderBreakdown;
use serde::Serialize;

use crate::section::round2;

pub const DEFAULT_COMMENTARY: &str = "Ownership analysis complete.";

const INSIDERS_COLOR: &str = "#3b82f6";
const INSTITUTIONS_COLOR: &str = "#10b981";
const RETAIL_COLOR: &str = "#f59e0b";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shareholding {
    pub insiders: f64,
    pub institutions: f64,
    pub retail: f64,
}

impl Shareholding {
    /// Fractions to percentages; retail is whatever insiders and institutions leave.
    pub fn from_breakdown(breakdown: &HolderBreakdown) -> Self {
        let percent = |fraction: Option<f64>| fraction.filter(|f| f.is_finite()).unwrap_or(0.0) * 100.0;
        let insiders = percent(breakdown.insiders);
        let institutions = percent(breakdown.institutions);
        let retail = (100.0 - insiders - institutions).max(0.0);

        Self {
            insiders: round2(insiders),
            institutions: round2(institutions),
            retail: round2(retail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieSlice {
    pub name: &'static str,
    pub value: f64,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnershipReport {
    pub ticker: String,
    pub shareholding: Shareholding,
    pub pie_data: Vec<PieSlice>,
    pub float_held_by_institutions: f64,
    pub ai_commentary: String,
    pub is_mock_data: bool,
}

impl OwnershipReport {
    pub fn new(
        ticker: &str,
        shareholding: Shareholding,
        float_held_by_institutions: f64,
        ai_commentary: String,
        is_mock_data: bool,
    ) -> Self {
        let pie_data = vec![
            PieSlice { name: "Insiders/Promoters", value: shareholding.insiders, color: INSIDERS_COLOR },
            PieSlice { name: "Institutional Investors", value: shareholding.institutions, color: INSTITUTIONS_COLOR },
            PieSlice { name: "Retail Investors", value: shareholding.retail, color: RETAIL_COLOR },
        ];

        Self {
            ticker: ticker.to_string(),
            shareholding,
            pie_data,
            float_held_by_institutions: round2(float_held_by_institutions),
            ai_commentary,
            is_mock_data,
        }
    }
}

pub fn float_percent(breakdown: &HolderBreakdown) -> f64 {
    breakdown.institutions_float.filter(|f| f.is_finite()).unwrap_or(0.0) * 100.0
}

pub fn commentary_prompt(ticker: &str, shareholding: &Shareholding) -> String {
    format!(
        "Generate 1 sentence insight for {}: Insiders: {:.1}%, Institutions: {:.1}%, Retail: {:.1}%. \
Focus on what this mix means for volatility or confidence.",
        ticker, shareholding.insiders, shareholding.institutions, shareholding.retail
    )
}

pub fn sample_report(ticker: &str) -> OwnershipReport {
    let shareholding = Shareholding { insiders: 15.5, institutions: 65.3, retail: 19.2 };
    let commentary = format!(
        "{} shows strong institutional confidence with 65.3% institutional ownership, indicating \
professional investor trust. Healthy retail participation at 19.2% provides market liquidity.",
        ticker
    );
    OwnershipReport::new(ticker, shareholding, 68.5, commentary, true)
}
