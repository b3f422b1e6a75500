pub mod comps;
pub mod last_round;

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::errors::Result;
use crate::market_data::{MarketIndexSource, PeerComparableSource};

use super::valuation_engine::EngineConfig;
use super::valuation_model::{Citation, MonetaryAmount};

pub use comps::{ComparableCompaniesInputs, Statistic};
pub use last_round::LastRoundInputs;

/// Methodology identifiers
pub const LAST_ROUND_MARKET_ADJUSTED: &str = "last_round_market_adjusted";
pub const COMPARABLE_COMPANIES: &str = "comparable_companies";

/// Everything a methodology may consult during evaluation: the as-of date,
/// the data source providers, and the fixed policy thresholds.
pub struct MethodologyContext<'a> {
    pub as_of_date: NaiveDate,
    pub index_source: &'a dyn MarketIndexSource,
    pub comps_source: &'a dyn PeerComparableSource,
    pub config: &'a EngineConfig,
}

/// What every methodology must produce: the estimate plus the complete
/// audit trail. An implementation that leaves a field empty when data was
/// consulted is non-conformant.
#[derive(Debug, Clone)]
pub struct MethodologyOutcome {
    pub estimated_fair_value: MonetaryAmount,
    pub assumptions: Vec<String>,
    pub inputs_used: Map<String, Value>,
    pub citations: Vec<Citation>,
    pub derivation_steps: Vec<String>,
    pub confidence_indicators: Map<String, Value>,
}

/// One variant per valuation approach, each carrying its type-checked
/// inputs. The exhaustive match in `evaluate` is the engine's router:
/// adding a methodology forces this file to be updated.
#[derive(Debug, Clone)]
pub enum Methodology {
    LastRoundMarketAdjusted(LastRoundInputs),
    ComparableCompanies(ComparableCompaniesInputs),
}

impl Methodology {
    /// Identifier echoed verbatim into the valuation result.
    pub fn identifier(&self) -> &'static str {
        match self {
            Methodology::LastRoundMarketAdjusted(_) => LAST_ROUND_MARKET_ADJUSTED,
            Methodology::ComparableCompanies(_) => COMPARABLE_COMPANIES,
        }
    }

    /// Recognized identifiers, for error messages.
    pub fn available() -> String {
        [COMPARABLE_COMPANIES, LAST_ROUND_MARKET_ADJUSTED].join(", ")
    }

    /// Evaluation is a pure function of the context and the provider
    /// snapshot: no hidden state, no randomness, no I/O beyond the
    /// provider lookups.
    pub fn evaluate(&self, context: &MethodologyContext) -> Result<MethodologyOutcome> {
        match self {
            Methodology::LastRoundMarketAdjusted(inputs) => last_round::evaluate(inputs, context),
            Methodology::ComparableCompanies(inputs) => comps::evaluate(inputs, context),
        }
    }
}
