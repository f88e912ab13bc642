pub mod error;
pub mod fundamentals;
pub mod saved;
pub mod traits;
pub mod types;
pub mod valuation;

#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;

pub use error::*;
pub use fundamentals::*;
pub use saved::*;
pub use traits::*;
pub use types::*;
pub use valuation::*;
