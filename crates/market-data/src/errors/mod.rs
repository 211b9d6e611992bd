//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all market data operations
//! - [`SchemaError`]: Vendor payloads that do not match the expected layout
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// A vendor frame did not have the shape the normalizer expects.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// A required column is absent from a non-empty frame.
    #[error("Missing required column: {column}")]
    MissingColumn {
        /// Vendor-side column name
        column: String,
    },

    /// A column's length disagrees with the rest of the frame.
    #[error("Column {column} has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    /// An epoch-millisecond timestamp could not be represented.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(i64),
}

/// Errors that can occur during market data operations.
///
/// Errors are `Clone` so a single in-flight download can hand the same
/// failure to every caller waiting on it.
#[derive(Error, Debug, Clone)]
pub enum MarketDataError {
    /// The vendor returned a frame that could not be normalized.
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Downloading a missing range failed after all attempts.
    #[error("Download failed for {security}: {message}")]
    Download {
        /// Canonical security code
        security: String,
        /// Last error reported by the terminal
        message: String,
    },

    /// A terminal call failed.
    #[error("Terminal error: {terminal} - {message}")]
    Terminal {
        /// The terminal that returned the error
        terminal: String,
        /// The error message from the terminal
        message: String,
    },

    /// The code could not be parsed in any known convention.
    #[error("Unknown security: {0}")]
    UnknownSecurity(String),

    /// No suffix mapping exists for this exchange on this terminal.
    #[error("Resolution failed for {security} on terminal {terminal}")]
    ResolutionFailed { security: String, terminal: String },

    /// The terminal does not implement the requested operation.
    #[error("Not supported: {operation} by {terminal}")]
    NotSupported { operation: String, terminal: String },

    /// Reading or writing the local cache failed.
    #[error("Cache error: {0}")]
    Cache(String),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use bullet_trade_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::Terminal {
    ///     terminal: "QMT".to_string(),
    ///     message: "connection reset".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::UnknownSecurity("BOGUS".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Transient failures
            Self::Terminal { .. } | Self::Cache(_) => RetryClass::WithBackoff,

            // Permanent failures
            Self::Schema(_)
            | Self::Download { .. }
            | Self::UnknownSecurity(_)
            | Self::ResolutionFailed { .. }
            | Self::NotSupported { .. } => RetryClass::Never,
        }
    }

    /// Whether this error came from a failed download.
    pub fn is_download(&self) -> bool {
        matches!(self, Self::Download { .. })
    }
}

impl From<std::io::Error> for MarketDataError {
    fn from(err: std::io::Error) -> Self {
        Self::Cache(err.to_string())
    }
}

impl From<serde_json::Error> for MarketDataError {
    fn from(err: serde_json::Error) -> Self {
        Self::Cache(err.to_string())
    }
}
