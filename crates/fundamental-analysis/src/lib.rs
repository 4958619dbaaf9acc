use analysis_core::{FundamentalsInput, FundamentalsScore, RadarMetric, ScoreTier};

/// Score every input starts from before rule adjustments.
pub const BASE_SCORE: i32 = 50;

/// A ratio the scorer can read from [`FundamentalsInput`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ratio {
    Eps,
    PeRatio,
    Roe,
    DebtToEquity,
    ProfitMargin,
    DividendYield,
    RevenueGrowth,
    EarningsGrowth,
}

impl Ratio {
    /// Absent or non-finite values read as 0.
    pub fn read(&self, input: &FundamentalsInput) -> f64 {
        let value = match self {
            Ratio::Eps => input.eps,
            Ratio::PeRatio => input.pe_ratio,
            Ratio::Roe => input.roe,
            Ratio::DebtToEquity => input.debt_to_equity,
            Ratio::ProfitMargin => input.profit_margin,
            Ratio::DividendYield => input.dividend_yield,
            Ratio::RevenueGrowth => input.revenue_growth,
            Ratio::EarningsGrowth => input.earnings_growth,
        };
        value.filter(|v| v.is_finite()).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    Above(f64),
    Below(f64),
    /// Exclusive on both ends
    Between(f64, f64),
    /// Inclusive on both ends
    Within(f64, f64),
}

impl Condition {
    pub fn holds(&self, value: f64) -> bool {
        match *self {
            Condition::Above(t) => value > t,
            Condition::Below(t) => value < t,
            Condition::Between(lo, hi) => value > lo && value < hi,
            Condition::Within(lo, hi) => value >= lo && value <= hi,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringRule {
    pub label: &'static str,
    pub ratio: Ratio,
    pub condition: Condition,
    pub points: i32,
}

impl ScoringRule {
    pub const fn new(label: &'static str, ratio: Ratio, condition: Condition, points: i32) -> Self {
        Self { label, ratio, condition, points }
    }

    pub fn matches(&self, input: &FundamentalsInput) -> bool {
        self.condition.holds(self.ratio.read(input))
    }
}

/// Rules are independent; every matching rule contributes its points.
pub const DEFAULT_RULES: &[ScoringRule] = &[
    ScoringRule::new("Positive EPS", Ratio::Eps, Condition::Above(0.0), 10),
    ScoringRule::new("EPS Above 5", Ratio::Eps, Condition::Above(5.0), 5),
    ScoringRule::new("Reasonable P/E", Ratio::PeRatio, Condition::Between(0.0, 30.0), 10),
    ScoringRule::new("P/E In Value Band", Ratio::PeRatio, Condition::Within(10.0, 20.0), 5),
    ScoringRule::new("Strong ROE", Ratio::Roe, Condition::Above(0.15), 10),
    ScoringRule::new("Excellent ROE", Ratio::Roe, Condition::Above(0.20), 5),
    ScoringRule::new("Moderate Debt", Ratio::DebtToEquity, Condition::Below(1.0), 10),
    ScoringRule::new("Low Debt", Ratio::DebtToEquity, Condition::Below(0.5), 5),
    ScoringRule::new("Healthy Profit Margin", Ratio::ProfitMargin, Condition::Above(0.10), 10),
    ScoringRule::new("High Profit Margin", Ratio::ProfitMargin, Condition::Above(0.20), 5),
    ScoringRule::new("Revenue Growing", Ratio::RevenueGrowth, Condition::Above(0.0), 5),
    ScoringRule::new("Double-Digit Revenue Growth", Ratio::RevenueGrowth, Condition::Above(0.10), 5),
    ScoringRule::new("Earnings Growing", Ratio::EarningsGrowth, Condition::Above(0.0), 5),
    ScoringRule::new("Strong Earnings Growth", Ratio::EarningsGrowth, Condition::Above(0.15), 5),
];

/// Additive fundamentals heuristic over a rule table
#[derive(Debug, Clone)]
pub struct FundamentalsScorer {
    base: i32,
    rules: Vec<ScoringRule>,
}

impl FundamentalsScorer {
    pub fn new() -> Self {
        Self::with_rules(BASE_SCORE, DEFAULT_RULES.to_vec())
    }

    pub fn with_rules(base: i32, rules: Vec<ScoringRule>) -> Self {
        Self { base, rules }
    }

    pub fn rules(&self) -> &[ScoringRule] {
        &self.rules
    }

    pub fn matched_rules<'a>(&'a self, input: &'a FundamentalsInput) -> impl Iterator<Item = &'a ScoringRule> + 'a {
        self.rules.iter().filter(move |r| r.matches(input))
    }

    /// Base plus matched points, before clamping
    pub fn raw_total(&self, input: &FundamentalsInput) -> i32 {
        self.base + self.matched_rules(input).map(|r| r.points).sum::<i32>()
    }

    pub fn score(&self, input: &FundamentalsInput) -> FundamentalsScore {
        let score = self.raw_total(input).clamp(0, 100) as u8;
        FundamentalsScore {
            score,
            tier: ScoreTier::from_score(score),
            radar_metrics: radar_metrics(input),
        }
    }
}

impl Default for FundamentalsScorer {
    fn default() -> Self {
        Self::new()
    }
}

/// Chart-only rescaling of the ratios; unrelated to the additive score.
pub fn radar_metrics(input: &FundamentalsInput) -> Vec<RadarMetric> {
    let eps = Ratio::Eps.read(input);
    let pe = Ratio::PeRatio.read(input);
    let roe = Ratio::Roe.read(input);
    let d2e = Ratio::DebtToEquity.read(input);
    let margin = Ratio::ProfitMargin.read(input);
    let dividend = Ratio::DividendYield.read(input);

    let pe_health = if pe > 0.0 { (100.0 - pe * 2.0).max(0.0) } else { 0.0 };

    [
        ("EPS Growth", (eps / 10.0 * 100.0).min(100.0)),
        ("P/E Health", pe_health),
        ("ROE", roe * 500.0),
        ("Low Debt", (100.0 - d2e * 50.0).max(0.0)),
        ("Profit Margin", margin * 500.0),
        ("Div Yield", dividend * 1000.0),
    ]
    .into_iter()
    .map(|(metric, value)| RadarMetric {
        metric,
        value: value.clamp(0.0, 100.0),
    })
    .collect()
}
