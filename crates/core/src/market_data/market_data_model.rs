use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Declares what kind of backend produced a data point. Feeds the
/// `data_source_type` confidence indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    Mock,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Mock => "mock",
        }
    }
}

/// An index level resolved for a request. `as_of_date` is the date the
/// level was actually recorded on, which may be earlier than the date
/// requested (nearest-prior fallback).
#[derive(Debug, Clone, PartialEq)]
pub struct IndexLevelPoint {
    pub index: String,
    pub as_of_date: NaiveDate,
    pub level: Decimal,
}

/// A public comparable company with its EV/Revenue multiple.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparableCompany {
    pub ticker: String,
    pub company_name: String,
    pub sector: String,
    pub ev_to_revenue: Decimal,
}

/// Outcome of a peer lookup: the resolved peers plus any requested tickers
/// the dataset does not carry. Unresolved tickers are not an error; they
/// are surfaced through confidence indicators as a reduced peer count.
#[derive(Debug, Clone, Default)]
pub struct PeerLookup {
    pub peers: Vec<ComparableCompany>,
    pub unresolved_tickers: Vec<String>,
}
