pub mod methodologies;
pub mod valuation_engine;
pub mod valuation_model;

// Re-export the public interface
pub use methodologies::{
    ComparableCompaniesInputs, LastRoundInputs, Methodology, MethodologyContext,
    MethodologyOutcome, Statistic,
};
pub use valuation_engine::{EngineConfig, ValuationEngine};
pub use valuation_model::{
    AuditMetadata, Citation, MonetaryAmount, ValuationEnvelope, ValuationRequest, ValuationResult,
};
