//! Aesy Score: six 0-100 pillars folded into one composite score.

use serde::{Deserialize, Serialize};

use crate::bands::{Band, BandTable};
use crate::metrics::FinancialMetrics;
use crate::scorers::valuation::price_to_lynch;
use crate::stats::mean;

const DEBT_TO_EQUITY_BANDS: &[Band] = &[
    Band::at_most(0.3, 100.0),
    Band::at_most(0.5, 85.0),
    Band::at_most(1.0, 70.0),
    Band::at_most(1.5, 50.0),
    Band::at_most(2.0, 30.0),
    Band::above(f64::NEG_INFINITY, 10.0),
];
const CURRENT_RATIO_BANDS: &[Band] = &[
    Band::at_least(2.0, 100.0),
    Band::at_least(1.5, 80.0),
    Band::at_least(1.2, 60.0),
    Band::at_least(1.0, 40.0),
    Band::above(f64::NEG_INFINITY, 20.0),
];
const INTEREST_COVERAGE_BANDS: &[Band] = &[
    Band::at_least(12.0, 100.0),
    Band::at_least(8.0, 85.0),
    Band::at_least(5.0, 70.0),
    Band::at_least(3.0, 50.0),
    Band::at_least(1.5, 25.0),
];
const ROE_BANDS: &[Band] = &[
    Band::at_least(20.0, 100.0),
    Band::at_least(15.0, 85.0),
    Band::at_least(10.0, 65.0),
    Band::at_least(5.0, 40.0),
    Band::above(0.0, 20.0),
];
const NET_MARGIN_BANDS: &[Band] = &[
    Band::at_least(20.0, 100.0),
    Band::at_least(15.0, 85.0),
    Band::at_least(10.0, 70.0),
    Band::at_least(5.0, 50.0),
    Band::above(0.0, 25.0),
];
const OCF_QUALITY_BANDS: &[Band] = &[
    Band::at_least(1.2, 100.0),
    Band::at_least(1.0, 85.0),
    Band::at_least(0.8, 60.0),
    Band::at_least(0.5, 35.0),
    Band::above(f64::NEG_INFINITY, 10.0),
];
const EPS_GROWTH_BANDS: &[Band] = &[
    Band::at_least(15.0, 100.0),
    Band::at_least(10.0, 80.0),
    Band::at_least(5.0, 60.0),
    Band::at_least(0.0, 40.0),
    Band::above(f64::NEG_INFINITY, 15.0),
];
const REVENUE_GROWTH_BANDS: &[Band] = &[
    Band::at_least(12.0, 100.0),
    Band::at_least(8.0, 80.0),
    Band::at_least(5.0, 60.0),
    Band::at_least(0.0, 40.0),
    Band::above(f64::NEG_INFINITY, 15.0),
];
const FCF_MARGIN_BANDS: &[Band] = &[
    Band::at_least(20.0, 100.0),
    Band::at_least(12.0, 80.0),
    Band::at_least(8.0, 60.0),
    Band::at_least(3.0, 40.0),
    Band::above(0.0, 20.0),
];
const PE_BANDS: &[Band] = &[
    Band::at_most(0.0, 0.0),
    Band::at_most(12.0, 100.0),
    Band::at_most(15.0, 85.0),
    Band::at_most(20.0, 70.0),
    Band::at_most(25.0, 50.0),
    Band::at_most(35.0, 30.0),
    Band::above(35.0, 10.0),
];
const PB_BANDS: &[Band] = &[
    Band::at_most(1.0, 100.0),
    Band::at_most(2.0, 80.0),
    Band::at_most(3.0, 60.0),
    Band::at_most(5.0, 40.0),
    Band::above(f64::NEG_INFINITY, 20.0),
];
const LYNCH_BANDS: &[Band] = &[
    Band::at_most(0.75, 100.0),
    Band::at_most(0.95, 80.0),
    Band::at_most(1.10, 60.0),
    Band::at_most(1.5, 35.0),
    Band::above(f64::NEG_INFINITY, 10.0),
];
const MOMENTUM_1M_BANDS: &[Band] = &momentum_bands([5.0, 2.0, 0.0, -3.0, -8.0]);
const MOMENTUM_3M_BANDS: &[Band] = &momentum_bands([10.0, 4.0, 0.0, -5.0, -12.0]);
const MOMENTUM_6M_BANDS: &[Band] = &momentum_bands([15.0, 6.0, 0.0, -8.0, -18.0]);
const MOMENTUM_12M_BANDS: &[Band] = &momentum_bands([25.0, 10.0, 0.0, -10.0, -25.0]);

const DEBT_TO_EQUITY: BandTable = BandTable::new(100.0, DEBT_TO_EQUITY_BANDS);
const CURRENT_RATIO: BandTable = BandTable::new(100.0, CURRENT_RATIO_BANDS);
const INTEREST_COVERAGE: BandTable = BandTable::new(100.0, INTEREST_COVERAGE_BANDS);
const ROE: BandTable = BandTable::new(100.0, ROE_BANDS);
const NET_MARGIN: BandTable = BandTable::new(100.0, NET_MARGIN_BANDS);
const OCF_QUALITY: BandTable = BandTable::new(100.0, OCF_QUALITY_BANDS);
const EPS_GROWTH: BandTable = BandTable::new(100.0, EPS_GROWTH_BANDS);
const REVENUE_GROWTH: BandTable = BandTable::new(100.0, REVENUE_GROWTH_BANDS);
const FCF_MARGIN: BandTable = BandTable::new(100.0, FCF_MARGIN_BANDS);
const PE: BandTable = BandTable::new(100.0, PE_BANDS);
const PB: BandTable = BandTable::new(100.0, PB_BANDS);
const LYNCH: BandTable = BandTable::new(100.0, LYNCH_BANDS);
const MOMENTUM_1M: BandTable = BandTable::new(100.0, MOMENTUM_1M_BANDS);
const MOMENTUM_3M: BandTable = BandTable::new(100.0, MOMENTUM_3M_BANDS);
const MOMENTUM_6M: BandTable = BandTable::new(100.0, MOMENTUM_6M_BANDS);
const MOMENTUM_12M: BandTable = BandTable::new(100.0, MOMENTUM_12M_BANDS);

const fn momentum_bands(t: [f64; 5]) -> [Band; 5] {
    [
        Band::at_least(t[0], 100.0),
        Band::at_least(t[1], 75.0),
        Band::at_least(t[2], 55.0),
        Band::at_least(t[3], 35.0),
        Band::at_least(t[4], 15.0),
    ]
}

/// Inputs with no value are skipped; more than this many missing marks gaps.
const MAX_MISSING_CRITICAL: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QualitativeOutcome {
    Pass,
    Partial,
    Fail,
}

impl QualitativeOutcome {
    fn fraction(self) -> f64 {
        match self {
            QualitativeOutcome::Pass => 1.0,
            QualitativeOutcome::Partial => 0.5,
            QualitativeOutcome::Fail => 0.0,
        }
    }
}

/// Analyst (or model) judgement on the soft criteria. Unassessed criteria
/// are left out of the normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualitativeAssessment {
    pub moat: Option<QualitativeOutcome>,
    pub management: Option<QualitativeOutcome>,
    pub business_understanding: Option<QualitativeOutcome>,
    pub predictability: Option<QualitativeOutcome>,
    pub long_term_prospects: Option<QualitativeOutcome>,
    pub capital_efficiency: Option<QualitativeOutcome>,
    pub shareholder_friendliness: Option<QualitativeOutcome>,
    pub risks: Option<QualitativeOutcome>,
}

impl QualitativeAssessment {
    fn weighted(&self) -> [(f64, Option<QualitativeOutcome>); 8] {
        [
            (15.0, self.moat),
            (15.0, self.management),
            (10.0, self.business_understanding),
            (15.0, self.predictability),
            (15.0, self.long_term_prospects),
            (10.0, self.capital_efficiency),
            (10.0, self.shareholder_friendliness),
            (10.0, self.risks),
        ]
    }

    /// Weighted share of the assessed criteria, 0-100.
    pub fn score(&self) -> Option<f64> {
        let (earned, possible) = self
            .weighted()
            .iter()
            .filter_map(|(w, o)| o.map(|o| (w * o.fraction(), *w)))
            .fold((0.0, 0.0), |(e, p), (we, w)| (e + we, p + w));
        if possible > 0.0 {
            Some(earned / possible * 100.0)
        } else {
            None
        }
    }
}

/// Everything the composite needs for one company.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockData {
    pub symbol: String,
    pub company_name: Option<String>,
    pub metrics: FinancialMetrics,
    pub qualitative: Option<QualitativeAssessment>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AesyPillars {
    pub financial_strength: Option<u32>,
    pub profitability: Option<u32>,
    pub growth: Option<u32>,
    pub value: Option<u32>,
    pub momentum: Option<u32>,
    pub qualitative: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeterLynchSummary {
    pub fair_value: Option<f64>,
    pub price_to_lynch: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AesyNotes {
    pub ai_included: bool,
    pub has_data_gaps: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AesyScoreResult {
    pub symbol: String,
    pub pillars: AesyPillars,
    pub aesy_score: Option<u32>,
    pub peter_lynch: PeterLynchSummary,
    pub notes: AesyNotes,
}

fn remap(table: &BandTable, value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite()).map(|v| table.points(v))
}

fn pillar(parts: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = parts.iter().flatten().copied().collect();
    mean(&present)
}

fn mean_of_first(series: &[f64], n: usize) -> Option<f64> {
    mean(&series[..series.len().min(n)])
}

fn round_score(v: f64) -> u32 {
    v.round().clamp(0.0, 100.0) as u32
}

pub fn financial_strength_pillar(m: &FinancialMetrics) -> Option<f64> {
    pillar(&[
        remap(&DEBT_TO_EQUITY, m.debt_to_equity),
        remap(&CURRENT_RATIO, m.current_ratio),
        remap(&INTEREST_COVERAGE, m.interest_coverage),
    ])
}

pub fn profitability_pillar(m: &FinancialMetrics) -> Option<f64> {
    pillar(&[
        remap(&ROE, mean_of_first(&m.history.roe, 10)),
        remap(&NET_MARGIN, mean_of_first(&m.history.net_margin, 10)),
        remap(&OCF_QUALITY, m.ocf_quality_5y),
    ])
}

pub fn growth_pillar(m: &FinancialMetrics) -> Option<f64> {
    pillar(&[
        remap(&EPS_GROWTH, m.eps_growth.map(|g| g.value)),
        remap(&REVENUE_GROWTH, m.revenue_growth.map(|g| g.value)),
        remap(&FCF_MARGIN, m.fcf_margin_5y),
    ])
}

pub fn value_pillar(m: &FinancialMetrics) -> Option<f64> {
    pillar(&[
        remap(&PE, m.pe),
        remap(&PB, m.pb.filter(|v| *v > 0.0)),
        remap(&LYNCH, price_to_lynch(m.price, m.lynch_fair_value)),
    ])
}

pub fn momentum_pillar(m: &FinancialMetrics) -> Option<f64> {
    let r = &m.price_returns;
    pillar(&[
        remap(&MOMENTUM_1M, r.one_month),
        remap(&MOMENTUM_3M, r.three_months),
        remap(&MOMENTUM_6M, r.six_months),
        remap(&MOMENTUM_12M, r.twelve_months),
    ])
}

fn has_data_gaps(m: &FinancialMetrics) -> bool {
    let missing = [
        m.pe.is_none(),
        m.roe.is_none(),
        m.debt_to_equity.is_none(),
        m.eps_growth.is_none(),
        m.revenue_growth.is_none(),
        m.price_returns.is_empty(),
    ]
    .into_iter()
    .filter(|missing| *missing)
    .count();
    missing > MAX_MISSING_CRITICAL
}

pub fn compute_aesy_score(data: &StockData) -> AesyScoreResult {
    let m = &data.metrics;
    let raw = [
        financial_strength_pillar(m),
        profitability_pillar(m),
        growth_pillar(m),
        value_pillar(m),
        momentum_pillar(m),
        data.qualitative.as_ref().and_then(QualitativeAssessment::score),
    ];
    let present: Vec<f64> = raw.iter().flatten().copied().collect();
    let aesy_score = mean(&present).map(round_score);

    let [strength, profitability, growth, value, momentum, qualitative] = raw.map(|p| p.map(round_score));

    AesyScoreResult {
        symbol: data.symbol.clone(),
        pillars: AesyPillars {
            financial_strength: strength,
            profitability,
            growth,
            value,
            momentum,
            qualitative,
        },
        aesy_score,
        peter_lynch: PeterLynchSummary {
            fair_value: m.lynch_fair_value,
            price_to_lynch: price_to_lynch(m.price, m.lynch_fair_value),
        },
        notes: AesyNotes {
            ai_included: qualitative.is_some(),
            has_data_gaps: has_data_gaps(m),
        },
    }
}
