use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::market_data::market_data_errors::MarketDataError;
use crate::market_data::market_data_model::{
    ComparableCompany, DataSource, IndexLevelPoint, PeerLookup,
};
use crate::market_data::market_data_traits::{MarketIndexSource, PeerComparableSource};

fn day(text: &str) -> NaiveDate {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").expect("static dataset date")
}

/// In-memory index history with nearest-prior-date fallback.
pub struct MockMarketIndexProvider {
    // Levels sorted ascending by date, one series per index.
    levels: HashMap<&'static str, Vec<(NaiveDate, Decimal)>>,
}

impl MockMarketIndexProvider {
    pub fn new() -> Self {
        let mut levels = HashMap::new();
        levels.insert(
            "NASDAQ_COMPOSITE",
            vec![
                (day("2023-12-31"), dec!(15011.35)),
                (day("2024-03-31"), dec!(16379.46)),
                (day("2024-06-30"), dec!(17637.12)),
                (day("2024-09-30"), dec!(16828.43)),
                (day("2024-12-31"), dec!(18842.12)),
                (day("2025-03-31"), dec!(18032.90)),
                (day("2025-06-30"), dec!(19422.55)),
                (day("2025-09-30"), dec!(20122.04)),
                (day("2025-12-31"), dec!(20905.88)),
                (day("2026-02-18"), dec!(21311.12)),
            ],
        );
        levels.insert(
            "RUSSELL_2000",
            vec![
                (day("2023-12-31"), dec!(2011.44)),
                (day("2024-03-31"), dec!(2107.88)),
                (day("2024-06-30"), dec!(2056.31)),
                (day("2024-09-30"), dec!(2190.04)),
                (day("2024-12-31"), dec!(2251.11)),
                (day("2025-03-31"), dec!(2176.92)),
                (day("2025-06-30"), dec!(2294.53)),
                (day("2025-09-30"), dec!(2340.19)),
                (day("2025-12-31"), dec!(2389.44)),
                (day("2026-02-18"), dec!(2412.90)),
            ],
        );
        Self { levels }
    }
}

impl Default for MockMarketIndexProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketIndexSource for MockMarketIndexProvider {
    fn get_level(
        &self,
        index: &str,
        as_of_date: NaiveDate,
    ) -> Result<IndexLevelPoint, MarketDataError> {
        let history = self
            .levels
            .get(index)
            .ok_or_else(|| MarketDataError::NotFound(format!("Unknown index '{index}'.")))?;

        let (resolved_date, level) = history
            .iter()
            .rev()
            .find(|(date, _)| *date <= as_of_date)
            .ok_or_else(|| {
                MarketDataError::NotFound(format!(
                    "No index level for {index} on or before {as_of_date}."
                ))
            })?;

        Ok(IndexLevelPoint {
            index: index.to_string(),
            as_of_date: *resolved_date,
            level: *level,
        })
    }

    fn source_type(&self) -> DataSource {
        DataSource::Mock
    }
}

/// In-memory public comps with sector filtering and explicit-ticker lookup.
pub struct MockComparableCompanyProvider {
    comps: Vec<ComparableCompany>,
}

impl MockComparableCompanyProvider {
    pub fn new() -> Self {
        let comp = |ticker: &str, company_name: &str, sector: &str, ev_to_revenue: Decimal| {
            ComparableCompany {
                ticker: ticker.to_string(),
                company_name: company_name.to_string(),
                sector: sector.to_string(),
                ev_to_revenue,
            }
        };
        Self {
            comps: vec![
                comp("SNOW", "Snowflake", "enterprise_software", dec!(13.1)),
                comp("DDOG", "Datadog", "enterprise_software", dec!(12.4)),
                comp("MDB", "MongoDB", "enterprise_software", dec!(9.2)),
                comp("ZS", "Zscaler", "enterprise_software", dec!(11.8)),
                comp("S", "SentinelOne", "cybersecurity", dec!(8.6)),
                comp("CRWD", "CrowdStrike", "cybersecurity", dec!(14.2)),
                comp("OKTA", "Okta", "cybersecurity", dec!(7.7)),
                comp("NET", "Cloudflare", "infrastructure_software", dec!(16.1)),
                comp("FSLY", "Fastly", "infrastructure_software", dec!(3.8)),
                comp("ESTC", "Elastic", "infrastructure_software", dec!(5.3)),
            ],
        }
    }
}

impl Default for MockComparableCompanyProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PeerComparableSource for MockComparableCompanyProvider {
    fn get_by_sector(&self, sector: &str) -> Result<PeerLookup, MarketDataError> {
        let peers: Vec<ComparableCompany> = self
            .comps
            .iter()
            .filter(|comp| comp.sector == sector)
            .cloned()
            .collect();
        if peers.is_empty() {
            return Err(MarketDataError::NotFound(format!(
                "No comps configured for sector '{sector}'."
            )));
        }
        Ok(PeerLookup {
            peers,
            unresolved_tickers: Vec::new(),
        })
    }

    fn get_by_tickers(&self, tickers: &[String]) -> Result<PeerLookup, MarketDataError> {
        let requested: Vec<String> = tickers.iter().map(|t| t.to_uppercase()).collect();
        let peers: Vec<ComparableCompany> = self
            .comps
            .iter()
            .filter(|comp| requested.iter().any(|t| *t == comp.ticker))
            .cloned()
            .collect();

        let mut unresolved_tickers: Vec<String> = requested
            .into_iter()
            .filter(|t| !peers.iter().any(|comp| comp.ticker == *t))
            .collect();
        unresolved_tickers.sort();
        unresolved_tickers.dedup();

        if peers.is_empty() {
            return Err(MarketDataError::NotFound(format!(
                "No comps resolved for tickers: {}.",
                unresolved_tickers.join(", ")
            )));
        }
        Ok(PeerLookup {
            peers,
            unresolved_tickers,
        })
    }

    fn source_type(&self) -> DataSource {
        DataSource::Mock
    }
}
