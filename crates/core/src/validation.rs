//! Parsing and validation of raw valuation requests.
//!
//! Sits between untyped transport payloads and the engine: the engine only
//! ever sees requests that are well-typed and methodology-complete, so
//! every malformed-input failure is raised here as `ValidationError` (or
//! `UnknownMethodology` for an unrecognized identifier).

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use crate::constants::{DEFAULT_PUBLIC_INDEX, RECOGNIZED_INDICES};
use crate::errors::{Error, Result, ValidationError};
use crate::valuation::methodologies::{
    ComparableCompaniesInputs, LastRoundInputs, Methodology, Statistic, COMPARABLE_COMPANIES,
    LAST_ROUND_MARKET_ADJUSTED,
};
use crate::valuation::valuation_model::ValuationRequest;

/// Parses a raw JSON payload into a typed request. `as_of_date` defaults
/// to the current UTC date when absent.
pub fn parse_request(payload: &Value) -> Result<ValuationRequest> {
    let root = payload.as_object().ok_or_else(|| {
        ValidationError::InvalidInput("Request body must be a JSON object.".to_string())
    })?;

    let company_name = require_str(root, "company_name")?.to_string();
    let methodology_id = require_str(root, "methodology")?;
    let inputs = match root.get("inputs") {
        Some(Value::Object(inputs)) => inputs,
        Some(other) => {
            return Err(wrong_type("inputs", "object", other).into());
        }
        None => return Err(ValidationError::MissingField("inputs".to_string()).into()),
    };
    let as_of_date = match root.get("as_of_date") {
        Some(value) => parse_date(value)?,
        None => Utc::now().date_naive(),
    };

    let methodology = match methodology_id {
        LAST_ROUND_MARKET_ADJUSTED => {
            Methodology::LastRoundMarketAdjusted(parse_last_round_inputs(inputs, as_of_date)?)
        }
        COMPARABLE_COMPANIES => {
            Methodology::ComparableCompanies(parse_comps_inputs(inputs)?)
        }
        other => {
            return Err(Error::UnknownMethodology {
                requested: other.to_string(),
                available: Methodology::available(),
            })
        }
    };

    Ok(ValuationRequest {
        company_name,
        as_of_date,
        methodology,
    })
}

fn parse_last_round_inputs(
    inputs: &Map<String, Value>,
    as_of_date: NaiveDate,
) -> Result<LastRoundInputs> {
    let last_post_money_valuation = require_decimal(inputs, "last_post_money_valuation")?;
    if last_post_money_valuation <= Decimal::ZERO {
        return Err(ValidationError::InvalidInput(
            "Field 'last_post_money_valuation' must be positive.".to_string(),
        )
        .into());
    }

    let last_round_date = parse_date(require_value(inputs, "last_round_date")?)?;
    if last_round_date > as_of_date {
        return Err(ValidationError::InvalidInput(
            "Field 'last_round_date' cannot be after the as-of date.".to_string(),
        )
        .into());
    }

    let public_index = match inputs.get("public_index") {
        Some(Value::String(index)) => index.clone(),
        Some(other) => return Err(wrong_type("public_index", "string", other).into()),
        None => DEFAULT_PUBLIC_INDEX.to_string(),
    };
    if !RECOGNIZED_INDICES.contains(&public_index.as_str()) {
        return Err(ValidationError::InvalidInput(format!(
            "Field 'public_index' must be one of: {}.",
            RECOGNIZED_INDICES.join(", ")
        ))
        .into());
    }

    Ok(LastRoundInputs {
        last_post_money_valuation,
        last_round_date,
        public_index,
    })
}

fn parse_comps_inputs(inputs: &Map<String, Value>) -> Result<ComparableCompaniesInputs> {
    let revenue_ltm = require_decimal(inputs, "revenue_ltm")?;

    let statistic = match inputs.get("statistic") {
        Some(Value::String(identifier)) => {
            Statistic::from_identifier(identifier).ok_or_else(|| {
                ValidationError::InvalidInput(
                    "Field 'statistic' must be either 'median' or 'mean'.".to_string(),
                )
            })?
        }
        Some(other) => return Err(wrong_type("statistic", "string", other).into()),
        None => Statistic::default(),
    };

    let private_company_discount_pct = match inputs.get("private_company_discount_pct") {
        Some(value) => parse_decimal(value, "private_company_discount_pct")?,
        None => Decimal::ZERO,
    };
    if private_company_discount_pct > Decimal::ONE_HUNDRED {
        return Err(ValidationError::InvalidInput(
            "Field 'private_company_discount_pct' cannot exceed 100.".to_string(),
        )
        .into());
    }

    let peer_tickers = match inputs.get("peer_tickers") {
        Some(Value::Array(items)) => {
            let tickers = items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ValidationError::InvalidInput(
                            "Field 'peer_tickers' must be a list of ticker symbols.".to_string(),
                        )
                    })
                })
                .collect::<std::result::Result<Vec<String>, ValidationError>>()?;
            Some(tickers)
        }
        Some(other) => return Err(wrong_type("peer_tickers", "array", other).into()),
        None => None,
    };

    let sector = match inputs.get("sector") {
        Some(Value::String(sector)) => Some(sector.clone()),
        Some(other) => return Err(wrong_type("sector", "string", other).into()),
        None => None,
    };

    let has_tickers = peer_tickers.as_ref().is_some_and(|t| !t.is_empty());
    if !has_tickers && sector.is_none() {
        return Err(ValidationError::InvalidInput(
            "Provide either 'sector' or a non-empty 'peer_tickers' list.".to_string(),
        )
        .into());
    }

    Ok(ComparableCompaniesInputs {
        revenue_ltm,
        sector,
        peer_tickers,
        statistic,
        private_company_discount_pct,
    })
}

fn require_value<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a Value> {
    match map.get(key) {
        Some(Value::Null) | None => Err(ValidationError::MissingField(key.to_string()).into()),
        Some(value) => Ok(value),
    }
}

fn require_str<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a str> {
    let value = require_value(map, key)?;
    value
        .as_str()
        .ok_or_else(|| wrong_type(key, "string", value).into())
}

fn require_decimal(map: &Map<String, Value>, key: &str) -> Result<Decimal> {
    parse_decimal(require_value(map, key)?, key)
}

/// Accepts a JSON number or a numeric string; rejects booleans (a data
/// quality bug when they stand in for numbers) and negative values.
fn parse_decimal(value: &Value, field: &str) -> Result<Decimal> {
    let parsed = match value {
        Value::Bool(_) => return Err(wrong_type(field, "number", value).into()),
        Value::Number(number) => decimal_from_text(&number.to_string(), field)?,
        Value::String(text) => decimal_from_text(text, field)?,
        other => return Err(wrong_type(field, "number", other).into()),
    };
    if parsed < Decimal::ZERO {
        return Err(ValidationError::Negative(field.to_string()).into());
    }
    Ok(parsed)
}

fn decimal_from_text(text: &str, field: &str) -> Result<Decimal> {
    text.parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| ValidationError::NotNumeric(field.to_string()).into())
}

fn parse_date(value: &Value) -> Result<NaiveDate> {
    let text = value.as_str().ok_or_else(|| {
        ValidationError::InvalidDate(value.to_string())
    })?;
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(text.to_string()).into())
}

fn wrong_type(field: &str, expected: &'static str, received: &Value) -> ValidationError {
    ValidationError::WrongType {
        field: field.to_string(),
        expected,
        received: type_name(received),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn last_round_payload() -> Value {
        json!({
            "company_name": "Basis AI",
            "methodology": "last_round_market_adjusted",
            "as_of_date": "2026-02-18",
            "inputs": {
                "last_post_money_valuation": 100000000.0,
                "last_round_date": "2024-06-30",
                "public_index": "NASDAQ_COMPOSITE"
            }
        })
    }

    #[test]
    fn parses_a_complete_last_round_request() {
        let request = parse_request(&last_round_payload()).unwrap();
        assert_eq!(request.company_name, "Basis AI");
        assert_eq!(request.as_of_date.to_string(), "2026-02-18");
        match request.methodology {
            Methodology::LastRoundMarketAdjusted(inputs) => {
                assert_eq!(inputs.last_post_money_valuation, dec!(100000000));
                assert_eq!(inputs.public_index, "NASDAQ_COMPOSITE");
            }
            other => panic!("unexpected methodology: {other:?}"),
        }
    }

    #[test]
    fn public_index_defaults_to_nasdaq_composite() {
        let mut payload = last_round_payload();
        payload["inputs"].as_object_mut().unwrap().remove("public_index");
        let request = parse_request(&payload).unwrap();
        match request.methodology {
            Methodology::LastRoundMarketAdjusted(inputs) => {
                assert_eq!(inputs.public_index, "NASDAQ_COMPOSITE");
            }
            other => panic!("unexpected methodology: {other:?}"),
        }
    }

    #[test]
    fn rejects_unrecognized_public_index() {
        let mut payload = last_round_payload();
        payload["inputs"]["public_index"] = json!("FTSE_100");
        let err = parse_request(&payload).unwrap_err();
        assert!(err.to_string().contains("public_index"));
    }

    #[test]
    fn rejects_missing_required_field() {
        let mut payload = last_round_payload();
        payload["inputs"]
            .as_object_mut()
            .unwrap()
            .remove("last_post_money_valuation");
        let err = parse_request(&payload).unwrap_err();
        assert!(err
            .to_string()
            .contains("Missing required field: 'last_post_money_valuation'"));
    }

    #[test]
    fn rejects_bool_where_number_expected() {
        let mut payload = last_round_payload();
        payload["inputs"]["last_post_money_valuation"] = json!(true);
        let err = parse_request(&payload).unwrap_err();
        assert!(err.to_string().contains("received bool"));
    }

    #[test]
    fn rejects_malformed_date() {
        let mut payload = last_round_payload();
        payload["inputs"]["last_round_date"] = json!("30/06/2024");
        let err = parse_request(&payload).unwrap_err();
        assert!(err.to_string().contains("Expected format: YYYY-MM-DD"));
    }

    #[test]
    fn rejects_round_date_after_as_of_date() {
        let mut payload = last_round_payload();
        payload["inputs"]["last_round_date"] = json!("2026-03-01");
        let err = parse_request(&payload).unwrap_err();
        assert!(err.to_string().contains("cannot be after the as-of date"));
    }

    #[test]
    fn unknown_methodology_names_the_available_ones() {
        let mut payload = last_round_payload();
        payload["methodology"] = json!("dcf");
        let err = parse_request(&payload).unwrap_err();
        match err {
            Error::UnknownMethodology { requested, available } => {
                assert_eq!(requested, "dcf");
                assert!(available.contains("comparable_companies"));
                assert!(available.contains("last_round_market_adjusted"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    fn comps_payload() -> Value {
        json!({
            "company_name": "Basis AI",
            "methodology": "comparable_companies",
            "as_of_date": "2026-02-18",
            "inputs": {
                "revenue_ltm": 10000000.0,
                "sector": "enterprise_software",
                "statistic": "median",
                "private_company_discount_pct": 20
            }
        })
    }

    #[test]
    fn comps_defaults_statistic_and_discount() {
        let mut payload = comps_payload();
        let inputs = payload["inputs"].as_object_mut().unwrap();
        inputs.remove("statistic");
        inputs.remove("private_company_discount_pct");
        let request = parse_request(&payload).unwrap();
        match request.methodology {
            Methodology::ComparableCompanies(inputs) => {
                assert_eq!(inputs.statistic, Statistic::Median);
                assert_eq!(inputs.private_company_discount_pct, Decimal::ZERO);
            }
            other => panic!("unexpected methodology: {other:?}"),
        }
    }

    #[test]
    fn rejects_discount_above_100() {
        let mut payload = comps_payload();
        payload["inputs"]["private_company_discount_pct"] = json!(150);
        let err = parse_request(&payload).unwrap_err();
        assert!(err.to_string().contains("cannot exceed 100"));
    }

    #[test]
    fn rejects_negative_revenue() {
        let mut payload = comps_payload();
        payload["inputs"]["revenue_ltm"] = json!(-1.0);
        let err = parse_request(&payload).unwrap_err();
        assert!(err.to_string().contains("must be non-negative"));
    }

    #[test]
    fn rejects_unknown_statistic() {
        let mut payload = comps_payload();
        payload["inputs"]["statistic"] = json!("mode");
        let err = parse_request(&payload).unwrap_err();
        assert!(err.to_string().contains("'median' or 'mean'"));
    }

    #[test]
    fn rejects_non_array_peer_tickers() {
        let mut payload = comps_payload();
        payload["inputs"]["peer_tickers"] = json!("SNOW,DDOG");
        let err = parse_request(&payload).unwrap_err();
        assert!(err.to_string().contains("peer_tickers"));
    }

    #[test]
    fn requires_sector_or_peer_tickers() {
        let mut payload = comps_payload();
        payload["inputs"].as_object_mut().unwrap().remove("sector");
        let err = parse_request(&payload).unwrap_err();
        assert!(err
            .to_string()
            .contains("either 'sector' or a non-empty 'peer_tickers'"));
    }

    #[test]
    fn accepts_numeric_strings() {
        let mut payload = comps_payload();
        payload["inputs"]["revenue_ltm"] = json!("10000000.0");
        let request = parse_request(&payload).unwrap();
        match request.methodology {
            Methodology::ComparableCompanies(inputs) => {
                assert_eq!(inputs.revenue_ltm, dec!(10000000));
            }
            other => panic!("unexpected methodology: {other:?}"),
        }
    }
}
