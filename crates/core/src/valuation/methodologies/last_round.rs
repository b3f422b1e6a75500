use chrono::NaiveDate;
use log::debug;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Map};

use crate::constants::MARKET_INDEX_DATASET_VERSION;
use crate::errors::Result;
use crate::valuation::valuation_model::{format_money, Citation, MonetaryAmount};

use super::{MethodologyContext, MethodologyOutcome};

/// Type-checked inputs for the last-round market-adjusted methodology.
#[derive(Debug, Clone)]
pub struct LastRoundInputs {
    pub last_post_money_valuation: Decimal,
    pub last_round_date: NaiveDate,
    pub public_index: String,
}

/// Scales the last post-money valuation by the relative move of a public
/// index between the round date and the as-of date.
pub(super) fn evaluate(
    inputs: &LastRoundInputs,
    context: &MethodologyContext,
) -> Result<MethodologyOutcome> {
    let last_round_level = context
        .index_source
        .get_level(&inputs.public_index, inputs.last_round_date)?;
    let as_of_level = context
        .index_source
        .get_level(&inputs.public_index, context.as_of_date)?;
    debug!(
        "resolved {} levels: {} ({}) -> {} ({})",
        inputs.public_index,
        last_round_level.level,
        last_round_level.as_of_date,
        as_of_level.level,
        as_of_level.as_of_date,
    );

    let relative_change = as_of_level.level / last_round_level.level - Decimal::ONE;
    let multiplier = Decimal::ONE + relative_change;
    // The only rounding in the whole computation happens here.
    let adjusted_value = (inputs.last_post_money_valuation * multiplier).round_dp(2);

    let assumptions = vec![
        format!(
            "Method assumes valuation moves proportionally with {}.",
            inputs.public_index
        ),
        format!(
            "Used index level on {} for the last round and {} for the as-of date.",
            last_round_level.as_of_date, as_of_level.as_of_date
        ),
    ];

    // Intermediate values are printed at full precision so the trail alone
    // reproduces the final amount; only the last step's output is rounded.
    let derivation_steps = vec![
        format!(
            "Start with last post-money valuation: {} USD.",
            format_money(inputs.last_post_money_valuation)
        ),
        format!(
            "Compute relative index change: ({} / {}) - 1 = {}.",
            as_of_level.level,
            last_round_level.level,
            relative_change.normalize()
        ),
        format!(
            "Compute adjustment multiplier: 1 + {} = {}.",
            relative_change.normalize(),
            multiplier.normalize()
        ),
        format!(
            "Apply multiplier to last valuation: {} * {} = {} USD.",
            format_money(inputs.last_post_money_valuation),
            multiplier.normalize(),
            format_money(adjusted_value)
        ),
    ];

    let citations = vec![Citation {
        label: "Mock market index dataset".to_string(),
        detail: "In-memory quarterly index levels for NASDAQ Composite and Russell 2000."
            .to_string(),
        dataset_version: MARKET_INDEX_DATASET_VERSION.to_string(),
        resolved_data_points: vec![
            format!(
                "{}@{}={}",
                inputs.public_index, last_round_level.as_of_date, last_round_level.level
            ),
            format!(
                "{}@{}={}",
                inputs.public_index, as_of_level.as_of_date, as_of_level.level
            ),
        ],
    }];

    let mut inputs_used = Map::new();
    inputs_used.insert(
        "last_post_money_valuation".to_string(),
        json!(inputs.last_post_money_valuation.to_f64().unwrap_or_default()),
    );
    inputs_used.insert(
        "last_round_date".to_string(),
        json!(inputs.last_round_date.to_string()),
    );
    inputs_used.insert("public_index".to_string(), json!(inputs.public_index));
    inputs_used.insert(
        "index_level_last_round".to_string(),
        json!(last_round_level.level.to_f64().unwrap_or_default()),
    );
    inputs_used.insert(
        "index_level_as_of_date".to_string(),
        json!(as_of_level.level.to_f64().unwrap_or_default()),
    );

    let days_since_last_round = (context.as_of_date - inputs.last_round_date).num_days();
    // Calendar-day gap between the requested date and the level actually
    // used; 0 when the lookup hit the exact date.
    let freshness_gap_days = (context.as_of_date - as_of_level.as_of_date).num_days();
    let absolute_change_pct = (relative_change * Decimal::ONE_HUNDRED).abs().round_dp(4);
    let staleness_risk = if days_since_last_round > context.config.staleness_high_after_days {
        "HIGH – last round >12 months ago"
    } else {
        "LOW"
    };

    let mut confidence_indicators = Map::new();
    confidence_indicators.insert(
        "days_since_last_round".to_string(),
        json!(days_since_last_round),
    );
    confidence_indicators.insert(
        "index_data_freshness_gap_days".to_string(),
        json!(freshness_gap_days),
    );
    confidence_indicators.insert(
        "absolute_index_change_pct".to_string(),
        json!(absolute_change_pct.to_f64().unwrap_or_default()),
    );
    confidence_indicators.insert("staleness_risk".to_string(), json!(staleness_risk));
    confidence_indicators.insert(
        "data_source_type".to_string(),
        json!(context.index_source.source_type().as_str()),
    );

    Ok(MethodologyOutcome {
        estimated_fair_value: MonetaryAmount::usd(adjusted_value),
        assumptions,
        inputs_used,
        citations,
        derivation_steps,
        confidence_indicators,
    })
}
