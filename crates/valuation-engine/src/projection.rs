//! Two-phase finite-horizon present value of a per-share stream.

/// Rates are fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionInput {
    pub start_value: f64,
    pub growth_rate: f64,
    pub discount_rate: f64,
    pub terminal_rate: f64,
    pub growth_years: u32,
    pub terminal_years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub pv_phase1: f64,
    pub pv_phase2: f64,
}

impl Projection {
    pub fn total(&self) -> f64 {
        self.pv_phase1 + self.pv_phase2
    }
}

/// Phase 1 grows at `growth_rate` for `growth_years`; phase 2 continues from
/// the phase-1 end value at `terminal_rate` for `terminal_years`. Every cash
/// flow is discounted at `discount_rate` from today.
pub fn project(input: &ProjectionInput) -> Projection {
    let s = input.start_value;
    let g = 1.0 + input.growth_rate;
    let r = 1.0 + input.discount_rate;
    let tr = 1.0 + input.terminal_rate;
    let big_g = input.growth_years as i32;

    let pv_phase1 = (1..=big_g)
        .map(|t| s * g.powi(t) / r.powi(t))
        .sum::<f64>();

    let phase1_end = s * g.powi(big_g);
    let pv_phase2 = (1..=input.terminal_years as i32)
        .map(|k| phase1_end * tr.powi(k) / r.powi(big_g + k))
        .sum::<f64>();

    Projection { pv_phase1, pv_phase2 }
}
