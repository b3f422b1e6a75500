use chrono::NaiveDate;

use super::market_data_errors::MarketDataError;
use super::market_data_model::{DataSource, IndexLevelPoint, PeerLookup};

/// Contract for any market-index data provider.
///
/// Lookups are synchronous: the core is request-scoped computation with no
/// suspension points, and a live adapter would own its own I/O behind this
/// seam.
pub trait MarketIndexSource: Send + Sync {
    /// Level for `index` at `as_of_date`. If no level is recorded for the
    /// exact date, the most recent level at or before it is returned,
    /// never interpolated and never a later one.
    fn get_level(
        &self,
        index: &str,
        as_of_date: NaiveDate,
    ) -> Result<IndexLevelPoint, MarketDataError>;

    fn source_type(&self) -> DataSource;
}

/// Contract for any comparable-company data provider.
pub trait PeerComparableSource: Send + Sync {
    /// The curated peer set for a sector. Fails when the sector is unknown.
    fn get_by_sector(&self, sector: &str) -> Result<PeerLookup, MarketDataError>;

    /// Peers for an explicit ticker list. Tickers missing from the dataset
    /// are dropped and reported in `unresolved_tickers`; the lookup fails
    /// only when zero peers resolve.
    fn get_by_tickers(&self, tickers: &[String]) -> Result<PeerLookup, MarketDataError>;

    fn source_type(&self) -> DataSource;
}
