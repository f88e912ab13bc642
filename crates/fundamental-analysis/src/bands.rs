//! Ordered threshold tables mapping a metric value onto points.
//!
//! Bands are evaluated top to bottom and the first matching band wins;
//! values matching no band (and non-finite values) score zero.

use analysis_core::ScoreResult;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    AtLeast(f64),
    Above(f64),
    AtMost(f64),
    Below(f64),
}

impl Threshold {
    pub fn matches(&self, value: f64) -> bool {
        match *self {
            Threshold::AtLeast(t) => value >= t,
            Threshold::Above(t) => value > t,
            Threshold::AtMost(t) => value <= t,
            Threshold::Below(t) => value < t,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub threshold: Threshold,
    pub points: f64,
}

impl Band {
    pub const fn at_least(value: f64, points: f64) -> Self {
        Self { threshold: Threshold::AtLeast(value), points }
    }

    pub const fn above(value: f64, points: f64) -> Self {
        Self { threshold: Threshold::Above(value), points }
    }

    pub const fn at_most(value: f64, points: f64) -> Self {
        Self { threshold: Threshold::AtMost(value), points }
    }

    pub const fn below(value: f64, points: f64) -> Self {
        Self { threshold: Threshold::Below(value), points }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandTable {
    pub max_score: f64,
    pub bands: &'static [Band],
}

impl BandTable {
    pub const fn new(max_score: f64, bands: &'static [Band]) -> Self {
        Self { max_score, bands }
    }

    pub fn points(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        self.bands
            .iter()
            .find(|b| b.threshold.matches(value))
            .map(|b| b.points)
            .unwrap_or(0.0)
    }

    pub fn score(&self, value: f64) -> ScoreResult {
        ScoreResult::new(self.points(value), self.max_score)
    }

    /// Score an optional value; `None` scores zero against the same ceiling.
    pub fn score_opt(&self, value: Option<f64>) -> ScoreResult {
        match value {
            Some(v) => self.score(v),
            None => ScoreResult::zero(self.max_score),
        }
    }
}
