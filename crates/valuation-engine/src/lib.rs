//! Finite-horizon valuation: WACC derivation, start value selection, growth
//! estimation and a two-phase present value with margin of safety.

pub mod engine;
pub mod growth;
pub mod projection;
pub mod start_value;
pub mod wacc;

pub use engine::{ValuationConfig, ValuationEngine, ValuationRequest};
pub use projection::{project, Projection, ProjectionInput};
pub use wacc::{calculate_wacc, WaccConfig, WaccInput};
