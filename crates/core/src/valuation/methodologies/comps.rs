use log::debug;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Map, Value};

use crate::constants::PUBLIC_COMPS_DATASET_VERSION;
use crate::errors::{Error, Result, ValidationError};
use crate::market_data::PeerLookup;
use crate::valuation::valuation_model::{format_money, format_scaled, Citation, MonetaryAmount};

use super::{MethodologyContext, MethodologyOutcome};

/// Central-tendency statistic applied to the peer multiples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Statistic {
    #[default]
    Median,
    Mean,
}

impl Statistic {
    pub fn as_str(self) -> &'static str {
        match self {
            Statistic::Median => "median",
            Statistic::Mean => "mean",
        }
    }

    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            "median" => Some(Statistic::Median),
            "mean" => Some(Statistic::Mean),
            _ => None,
        }
    }
}

/// Type-checked inputs for the comparable-companies methodology. At least
/// one of `sector` / `peer_tickers` is present; explicit tickers win when
/// both are.
#[derive(Debug, Clone)]
pub struct ComparableCompaniesInputs {
    pub revenue_ltm: Decimal,
    pub sector: Option<String>,
    pub peer_tickers: Option<Vec<String>>,
    pub statistic: Statistic,
    pub private_company_discount_pct: Decimal,
}

/// Scales LTM revenue by the selected EV/Revenue multiple of a public peer
/// set, then applies the private-company discount.
pub(super) fn evaluate(
    inputs: &ComparableCompaniesInputs,
    context: &MethodologyContext,
) -> Result<MethodologyOutcome> {
    let explicit_tickers = inputs
        .peer_tickers
        .as_ref()
        .filter(|tickers| !tickers.is_empty());

    let (lookup, peer_group) = if let Some(tickers) = explicit_tickers {
        let lookup = context.comps_source.get_by_tickers(tickers)?;
        let resolved: Vec<&str> = lookup.peers.iter().map(|c| c.ticker.as_str()).collect();
        let peer_group = format!("explicit peer list ({})", resolved.join(", "));
        (lookup, peer_group)
    } else if let Some(sector) = inputs.sector.as_deref() {
        let lookup = context.comps_source.get_by_sector(sector)?;
        (lookup, format!("sector peer set '{sector}'"))
    } else {
        return Err(ValidationError::MissingField("sector or peer_tickers".to_string()).into());
    };
    debug!(
        "resolved {} peers for {} ({} unresolved)",
        lookup.peers.len(),
        peer_group,
        lookup.unresolved_tickers.len()
    );

    let multiples: Vec<Decimal> = lookup.peers.iter().map(|c| c.ev_to_revenue).collect();
    let selected_multiple = central_tendency(&multiples, inputs.statistic)?;

    let gross_value = inputs.revenue_ltm * selected_multiple;
    let discount_multiplier =
        (Decimal::ONE_HUNDRED - inputs.private_company_discount_pct) / Decimal::ONE_HUNDRED;
    // The only rounding in the whole computation happens here.
    let adjusted_value = (gross_value * discount_multiplier).round_dp(2);

    let assumptions = vec![
        format!("Comparable universe based on {peer_group}."),
        format!(
            "Applied {} EV/Revenue multiple of {}x.",
            inputs.statistic.as_str(),
            format_scaled(selected_multiple, 2)
        ),
        format!(
            "Applied private-company discount of {}%.",
            format_scaled(inputs.private_company_discount_pct, 2)
        ),
    ];

    // Intermediate values are printed at full precision so the trail alone
    // reproduces the final amount; only the last step's output is rounded.
    let derivation_steps = vec![
        format!(
            "Select peer multiple ({}): {}x.",
            inputs.statistic.as_str(),
            selected_multiple.normalize()
        ),
        format!(
            "Apply multiple to LTM revenue: {} * {} = {} USD.",
            format_money(inputs.revenue_ltm),
            selected_multiple.normalize(),
            format_money(gross_value)
        ),
        format!(
            "Compute discount multiplier: (100 - {}) / 100 = {}.",
            inputs.private_company_discount_pct.normalize(),
            discount_multiplier.normalize()
        ),
        format!(
            "Apply private-company discount: {} * {} = {} USD.",
            format_money(gross_value),
            discount_multiplier.normalize(),
            format_money(adjusted_value)
        ),
    ];

    let citations = vec![Citation {
        label: "Mock public comps dataset".to_string(),
        detail: "In-memory EV/Revenue multiples by ticker and sector.".to_string(),
        dataset_version: PUBLIC_COMPS_DATASET_VERSION.to_string(),
        resolved_data_points: lookup
            .peers
            .iter()
            .map(|c| format!("{}@{}={}", c.ticker, c.sector, c.ev_to_revenue))
            .collect(),
    }];

    let mut inputs_used = Map::new();
    inputs_used.insert(
        "revenue_ltm".to_string(),
        json!(inputs.revenue_ltm.to_f64().unwrap_or_default()),
    );
    inputs_used.insert(
        "statistic".to_string(),
        json!(inputs.statistic.as_str()),
    );
    inputs_used.insert(
        "private_company_discount_pct".to_string(),
        json!(inputs
            .private_company_discount_pct
            .to_f64()
            .unwrap_or_default()),
    );
    if let Some(tickers) = explicit_tickers {
        inputs_used.insert("peer_tickers".to_string(), json!(tickers));
    } else if let Some(sector) = inputs.sector.as_deref() {
        inputs_used.insert("sector".to_string(), json!(sector));
    }
    inputs_used.insert(
        "peer_companies".to_string(),
        Value::Array(
            lookup
                .peers
                .iter()
                .map(|c| {
                    json!({
                        "ticker": c.ticker,
                        "company_name": c.company_name,
                        "ev_to_revenue": c.ev_to_revenue.to_f64().unwrap_or_default(),
                    })
                })
                .collect(),
        ),
    );

    let confidence_indicators =
        confidence_indicators(&lookup, explicit_tickers.is_some(), context);

    Ok(MethodologyOutcome {
        estimated_fair_value: MonetaryAmount::usd(adjusted_value),
        assumptions,
        inputs_used,
        citations,
        derivation_steps,
        confidence_indicators,
    })
}

fn central_tendency(multiples: &[Decimal], statistic: Statistic) -> Result<Decimal> {
    if multiples.is_empty() {
        return Err(Error::InsufficientData(
            "no peer multiples to aggregate".to_string(),
        ));
    }
    match statistic {
        Statistic::Median => {
            let mut sorted = multiples.to_vec();
            sorted.sort();
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 0 {
                // Even count: arithmetic mean of the two middle values.
                Ok((sorted[mid - 1] + sorted[mid]) / Decimal::TWO)
            } else {
                Ok(sorted[mid])
            }
        }
        Statistic::Mean => {
            let sum: Decimal = multiples.iter().copied().sum();
            Ok(sum / Decimal::from(multiples.len()))
        }
    }
}

fn confidence_indicators(
    lookup: &PeerLookup,
    explicit_tickers: bool,
    context: &MethodologyContext,
) -> Map<String, Value> {
    let peer_count = lookup.peers.len();
    let multiples: Vec<Decimal> = lookup.peers.iter().map(|c| c.ev_to_revenue).collect();
    let spread = multiples.iter().copied().max().unwrap_or_default()
        - multiples.iter().copied().min().unwrap_or_default();

    let peer_set_quality = if peer_count >= context.config.peer_quality_high_min {
        "HIGH – 5+ comparable companies"
    } else if peer_count >= context.config.peer_quality_medium_min {
        "MEDIUM – 2-4 comparable companies"
    } else {
        "LOW – single comparable company"
    };

    let mut indicators = Map::new();
    indicators.insert("peer_count".to_string(), json!(peer_count));
    indicators.insert(
        "multiple_spread".to_string(),
        json!(spread.round_dp(1).to_f64().unwrap_or_default()),
    );
    indicators.insert("peer_set_quality".to_string(), json!(peer_set_quality));
    indicators.insert(
        "data_source_type".to_string(),
        json!(context.comps_source.source_type().as_str()),
    );
    if explicit_tickers {
        indicators.insert(
            "unresolved_peer_tickers".to_string(),
            json!(lookup.unresolved_tickers.len()),
        );
    }
    indicators
}
