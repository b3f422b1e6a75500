use thiserror::Error;

use crate::market_data::MarketDataError;

// Type alias for Result using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the valuation engine.
///
/// Every failure propagates to the caller; the engine never converts an
/// error into a degraded result.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Unknown methodology '{requested}'. Available: {available}.")]
    UnknownMethodology { requested: String, available: String },

    #[error("Required data not found: {0}")]
    DataNotFound(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required field: '{0}'.")]
    MissingField(String),

    #[error("Field '{field}' must be of type {expected}, received {received}.")]
    WrongType {
        field: String,
        expected: &'static str,
        received: &'static str,
    },

    #[error("Field '{0}' must be numeric.")]
    NotNumeric(String),

    #[error("Field '{0}' must be non-negative.")]
    Negative(String),

    #[error("Invalid date '{0}'. Expected format: YYYY-MM-DD.")]
    InvalidDate(String),

    #[error("{0}")]
    InvalidInput(String),
}

impl From<MarketDataError> for Error {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::NotFound(detail) => Error::DataNotFound(detail),
        }
    }
}
