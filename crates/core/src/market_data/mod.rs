pub mod market_data_errors;
pub mod market_data_model;
pub mod market_data_traits;
pub mod providers;

// Re-export the public interface
pub use market_data_errors::MarketDataError;
pub use market_data_model::{ComparableCompany, DataSource, IndexLevelPoint, PeerLookup};
pub use market_data_traits::{MarketIndexSource, PeerComparableSource};
pub use providers::mock_provider::{MockComparableCompanyProvider, MockMarketIndexProvider};
