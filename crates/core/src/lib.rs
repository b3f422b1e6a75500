pub mod constants;
pub mod errors;
pub mod market_data;
pub mod validation;
pub mod valuation;

pub use errors::{Error, Result};
pub use valuation::*;
