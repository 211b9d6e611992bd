//! Core error types for the market data provider.
//!
//! Guard violations and malformed vendor payloads are the two failures a
//! strategy is expected to see; everything else from the market-data crate
//! is carried as [`Error::MarketData`].

use thiserror::Error;

use bullet_trade_market_data::{MarketDataError, SchemaError};

use crate::guard::FutureDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the provider.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Future data requested: {0}")]
    FutureData(#[from] FutureDataError),

    #[error("Malformed vendor payload: {0}")]
    Schema(#[from] SchemaError),

    #[error("Market data operation failed: {0}")]
    MarketData(MarketDataError),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),
}

impl From<MarketDataError> for Error {
    fn from(err: MarketDataError) -> Self {
        match err {
            MarketDataError::Schema(schema) => Error::Schema(schema),
            other => Error::MarketData(other),
        }
    }
}

impl Error {
    pub fn is_future_data(&self) -> bool {
        matches!(self, Error::FutureData(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_are_lifted() {
        let err: Error = MarketDataError::Schema(SchemaError::MissingColumn {
            column: "time".to_string(),
        })
        .into();
        assert!(matches!(err, Error::Schema(_)));
    }

    #[test]
    fn test_other_errors_stay_wrapped() {
        let err: Error = MarketDataError::UnknownSecurity("X".to_string()).into();
        assert!(matches!(
            err,
            Error::MarketData(MarketDataError::UnknownSecurity(_))
        ));
        assert_eq!(
            err.to_string(),
            "Market data operation failed: Unknown security: X"
        );
    }
}
