use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::constants::REPORTING_CURRENCY;

use super::methodologies::Methodology;

/// A non-negative amount in the reporting currency. The amount is rounded
/// to 2 decimal places exactly once, at the final derivation step, never
/// during intermediate computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonetaryAmount {
    pub amount: Decimal,
    pub currency: String,
}

impl MonetaryAmount {
    pub fn usd(amount: Decimal) -> Self {
        Self {
            amount,
            currency: REPORTING_CURRENCY.to_string(),
        }
    }
}

/// One provider dataset consulted during evaluation, with the exact data
/// points that were read. Every numeric value a methodology reads from a
/// provider appears in exactly one resolved data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    pub label: String,
    pub detail: String,
    pub dataset_version: String,
    /// `KEY@LOCATOR=VALUE` strings, one per value read from the provider.
    pub resolved_data_points: Vec<String>,
}

/// A fully validated valuation request. Raw payloads are parsed into this
/// shape by the validation layer before the engine ever sees them.
#[derive(Debug, Clone)]
pub struct ValuationRequest {
    pub company_name: String,
    pub as_of_date: NaiveDate,
    pub methodology: Methodology,
}

/// Deterministic portion of the response: byte-identical across repeated
/// invocations of the same request against the same provider snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub company_name: String,
    pub methodology: String,
    pub as_of_date: NaiveDate,
    pub estimated_fair_value: MonetaryAmount,
    pub assumptions: Vec<String>,
    pub inputs_used: Map<String, Value>,
    pub citations: Vec<Citation>,
    pub derivation_steps: Vec<String>,
    pub confidence_indicators: Map<String, Value>,
}

/// Non-deterministic response metadata, isolated from the result so that
/// comparisons of the deterministic portion stay stable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditMetadata {
    pub request_id: String,
    pub generated_at_utc: DateTime<Utc>,
    pub engine_version: String,
}

impl AuditMetadata {
    pub fn generate(engine_version: &str) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            generated_at_utc: Utc::now(),
            engine_version: engine_version.to_string(),
        }
    }
}

/// Final response shape: exactly two top-level keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationEnvelope {
    pub valuation_result: ValuationResult,
    pub audit_metadata: AuditMetadata,
}

/// Formats a money amount with thousands separators and at least two
/// decimal places, keeping any extra precision the value carries so the
/// derivation trail stays exactly replayable.
pub(crate) fn format_money(amount: Decimal) -> String {
    let mut value = amount.normalize();
    if value.scale() < 2 {
        value.rescale(2);
    }
    let text = value.to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (text.as_str(), ""),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", int_part),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    format!("{sign}{grouped}.{frac_part}")
}

/// Formats a value rounded and zero-padded to exactly `dp` decimal places.
/// Display only; computation always keeps full precision.
pub(crate) fn format_scaled(value: Decimal, dp: u32) -> String {
    let mut rounded = value.round_dp(dp);
    rounded.rescale(dp);
    rounded.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn format_money_groups_thousands_and_pads_to_two_decimals() {
        assert_eq!(format_money(dec!(0)), "0.00");
        assert_eq!(format_money(dec!(100)), "100.00");
        assert_eq!(format_money(dec!(1234567.8)), "1,234,567.80");
        assert_eq!(format_money(dec!(100000000.00)), "100,000,000.00");
        assert_eq!(format_money(dec!(120831065.39)), "120,831,065.39");
    }

    #[test]
    fn format_money_keeps_extra_precision() {
        assert_eq!(
            format_money(dec!(118571428.5714285714)),
            "118,571,428.5714285714"
        );
    }

    #[test]
    fn format_scaled_pads_trailing_zeros() {
        assert_eq!(format_scaled(dec!(11.8), 2), "11.80");
        assert_eq!(format_scaled(dec!(20), 2), "20.00");
        assert_eq!(format_scaled(dec!(0.12346), 4), "0.1235");
    }
}
