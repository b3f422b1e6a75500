use thiserror::Error;

#[derive(Error, Debug)]
pub enum MarketDataError {
    #[error("{0}")]
    NotFound(String),
}
