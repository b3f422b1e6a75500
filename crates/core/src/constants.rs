/// Engine version stamped into every envelope's audit metadata.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reporting currency. Valuations are single-currency.
pub const REPORTING_CURRENCY: &str = "USD";

/// Dataset versions cited by the mock providers.
pub const MARKET_INDEX_DATASET_VERSION: &str = "mock-market-index-v2";
pub const PUBLIC_COMPS_DATASET_VERSION: &str = "mock-public-comps-v2";

/// Index identifiers the mock market-index dataset carries.
pub const RECOGNIZED_INDICES: [&str; 2] = ["NASDAQ_COMPOSITE", "RUSSELL_2000"];

/// Index applied when a last-round request does not name one.
pub const DEFAULT_PUBLIC_INDEX: &str = "NASDAQ_COMPOSITE";

/// Policy thresholds (fixed defaults, overridable through `EngineConfig`)
pub const STALENESS_HIGH_AFTER_DAYS: i64 = 365;
pub const PEER_QUALITY_HIGH_MIN: usize = 5;
pub const PEER_QUALITY_MEDIUM_MIN: usize = 2;

/// Maximum number of run summaries a listing returns.
pub const DEFAULT_RUN_LIST_LIMIT: usize = 50;
