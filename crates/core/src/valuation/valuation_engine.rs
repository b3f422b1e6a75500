use std::sync::Arc;

use log::debug;
use serde_json::Value;

use crate::constants::{
    ENGINE_VERSION, PEER_QUALITY_HIGH_MIN, PEER_QUALITY_MEDIUM_MIN, STALENESS_HIGH_AFTER_DAYS,
};
use crate::errors::Result;
use crate::market_data::{
    MarketIndexSource, MockComparableCompanyProvider, MockMarketIndexProvider,
    PeerComparableSource,
};
use crate::validation;

use super::methodologies::MethodologyContext;
use super::valuation_model::{AuditMetadata, ValuationEnvelope, ValuationRequest, ValuationResult};

/// Engine version and policy thresholds, injected at construction so tests
/// can override a cutoff without touching shared state.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub engine_version: String,
    pub staleness_high_after_days: i64,
    pub peer_quality_high_min: usize,
    pub peer_quality_medium_min: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            engine_version: ENGINE_VERSION.to_string(),
            staleness_high_after_days: STALENESS_HIGH_AFTER_DAYS,
            peer_quality_high_min: PEER_QUALITY_HIGH_MIN,
            peer_quality_medium_min: PEER_QUALITY_MEDIUM_MIN,
        }
    }
}

/// Routes a request to its methodology and assembles the auditable
/// envelope. The engine performs no numeric computation of its own, holds
/// no mutable state, and never swallows a methodology failure.
pub struct ValuationEngine {
    index_source: Arc<dyn MarketIndexSource>,
    comps_source: Arc<dyn PeerComparableSource>,
    config: EngineConfig,
}

impl ValuationEngine {
    /// Engine over the built-in mock datasets.
    pub fn new() -> Self {
        Self::with_sources(
            Arc::new(MockMarketIndexProvider::new()),
            Arc::new(MockComparableCompanyProvider::new()),
        )
    }

    pub fn with_sources(
        index_source: Arc<dyn MarketIndexSource>,
        comps_source: Arc<dyn PeerComparableSource>,
    ) -> Self {
        Self {
            index_source,
            comps_source,
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Evaluates a validated request and wraps the deterministic outcome
    /// with fresh audit metadata.
    pub fn value(&self, request: &ValuationRequest) -> Result<ValuationEnvelope> {
        let context = MethodologyContext {
            as_of_date: request.as_of_date,
            index_source: self.index_source.as_ref(),
            comps_source: self.comps_source.as_ref(),
            config: &self.config,
        };
        let outcome = request.methodology.evaluate(&context)?;
        debug!(
            "valuation complete company={} methodology={}",
            request.company_name,
            request.methodology.identifier()
        );

        let valuation_result = ValuationResult {
            company_name: request.company_name.clone(),
            methodology: request.methodology.identifier().to_string(),
            as_of_date: request.as_of_date,
            estimated_fair_value: outcome.estimated_fair_value,
            assumptions: outcome.assumptions,
            inputs_used: outcome.inputs_used,
            citations: outcome.citations,
            derivation_steps: outcome.derivation_steps,
            confidence_indicators: outcome.confidence_indicators,
        };
        Ok(ValuationEnvelope {
            valuation_result,
            audit_metadata: AuditMetadata::generate(&self.config.engine_version),
        })
    }

    /// Raw-payload entry point used by the CLI and HTTP transport. Runs the
    /// validation layer (unknown methodologies and malformed inputs fail
    /// here), then evaluates the typed request.
    pub fn value_payload(&self, payload: &Value) -> Result<ValuationEnvelope> {
        let request = validation::parse_request(payload)?;
        self.value(&request)
    }
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new()
    }
}
