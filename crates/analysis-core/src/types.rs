use serde::{Deserialize, Serialize};

/// Bounded point score produced by every per-metric scorer.
///
/// Invariant: `0 <= score <= max_score`. A `max_score` of zero means the
/// metric carries no data and has no meaningful percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub score: f64,
    pub max_score: f64,
}

impl ScoreResult {
    /// Build a score, clamping it into `[0, max_score]`.
    pub fn new(score: f64, max_score: f64) -> Self {
        let max_score = if max_score.is_finite() { max_score.max(0.0) } else { 0.0 };
        let score = if score.is_finite() { score.clamp(0.0, max_score) } else { 0.0 };
        Self { score, max_score }
    }

    /// Zero points out of `max_score`, used when the input is missing.
    pub fn zero(max_score: f64) -> Self {
        Self::new(0.0, max_score)
    }

    /// Share of the ceiling reached, in percent. `None` when the ceiling is zero.
    pub fn percent(&self) -> Option<f64> {
        if self.max_score > 0.0 {
            Some(self.score / self.max_score * 100.0)
        } else {
            None
        }
    }
}

/// Direction in which a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    HigherIsBetter,
    LowerIsBetter,
}

/// Informational trend hint derived from a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

/// Which observation a displayed metric value was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueBasis {
    TenYearMedian,
    FiveYearMedian,
    ThreeYearMedian,
    Current,
    /// Growth metrics: CAGR over the given number of years.
    Cagr { years: u32 },
}

/// Qualitative grade shown next to a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Rating {
    Excellent,
    Good,
    Fair,
    Weak,
    NoData,
}

impl Rating {
    pub fn from_score(score: &ScoreResult, has_value: bool) -> Self {
        if !has_value {
            return Rating::NoData;
        }
        match score.percent() {
            None => Rating::NoData,
            Some(p) if p >= 100.0 => Rating::Excellent,
            Some(p) if p >= 50.0 => Rating::Good,
            Some(p) if p > 0.0 => Rating::Fair,
            Some(_) => Rating::Weak,
        }
    }

    /// Label as rendered on the dashboard cards.
    pub fn to_label(&self) -> &'static str {
        match self {
            Rating::Excellent => "Exzellent",
            Rating::Good => "Gut",
            Rating::Fair => "Akzeptabel",
            Rating::Weak => "Schwach",
            Rating::NoData => "Keine Daten",
        }
    }
}
