//! Raw source adapter trait definitions.
//!
//! This module defines the `DataTerminal` trait that every vendor data
//! terminal must implement. It is the only seam through which the provider
//! performs vendor I/O.

use std::fmt;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::errors::MarketDataError;
use crate::models::{Exchange, Period, RawFrame, VendorCode};

use super::conventions::TerminalConventions;

/// Adjustment a terminal applies itself when reading local data.
///
/// The provider always reads [`VendorAdjust::None`] and adjusts on its own;
/// the other variants are passed through to the terminal untouched.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum VendorAdjust {
    #[default]
    None,
    Front,
    Back,
}

impl VendorAdjust {
    pub fn as_str(&self) -> &'static str {
        match self {
            VendorAdjust::None => "none",
            VendorAdjust::Front => "front",
            VendorAdjust::Back => "back",
        }
    }
}

impl fmt::Display for VendorAdjust {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trait for vendor data terminals.
///
/// Implement this trait to plug in a new data vendor. Codes passed in are
/// already in the terminal's own convention (see
/// [`CodeResolver`](crate::resolver::CodeResolver)), and frames come back
/// untouched; the normalizer owns every conversion.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use bullet_trade_market_data::terminal::{DataTerminal, TerminalConventions};
///
/// struct MyTerminal;
///
/// #[async_trait]
/// impl DataTerminal for MyTerminal {
///     fn id(&self) -> &'static str {
///         "QMT"
///     }
///
///     fn conventions(&self) -> TerminalConventions {
///         TerminalConventions::default()
///     }
///
///     // ... implement the data methods
/// }
/// ```
#[async_trait]
pub trait DataTerminal: Send + Sync {
    /// Unique identifier for this terminal.
    ///
    /// Should be a constant string like "QMT". Used for logging and for
    /// picking the terminal's code suffixes.
    fn id(&self) -> &'static str;

    /// Payload conventions (dividend share base, timestamp offset).
    fn conventions(&self) -> TerminalConventions;

    /// Download `[start, end]` into the terminal's local store.
    async fn download_history(
        &self,
        code: &VendorCode,
        period: Period,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), MarketDataError>;

    /// Read bars from the terminal's local store.
    ///
    /// `None` bounds mean "whatever is stored". Missing data is an empty
    /// frame, not an error.
    async fn read_local(
        &self,
        code: &VendorCode,
        period: Period,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        adjust: VendorAdjust,
    ) -> Result<RawFrame, MarketDataError>;

    /// Raw corporate-action records, or `None` when the vendor has none.
    async fn dividend_records(
        &self,
        code: &VendorCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<RawFrame>, MarketDataError>;

    /// Trading calendar lookup.
    ///
    /// Returns dates ascending, ending at or before `end`. With `count`, the
    /// last `count` trading days; otherwise every day from `start`.
    /// Default implementation returns `NotSupported`.
    async fn trading_dates(
        &self,
        exchange: Exchange,
        start: Option<NaiveDate>,
        end: NaiveDate,
        count: Option<usize>,
    ) -> Result<Vec<NaiveDate>, MarketDataError> {
        let _ = (exchange, start, end, count);
        Err(MarketDataError::NotSupported {
            operation: "trading_dates".to_string(),
            terminal: self.id().to_string(),
        })
    }

    /// Constituents of an index on `date`, as vendor codes.
    ///
    /// Default implementation returns `NotSupported`.
    async fn index_members(
        &self,
        index: &VendorCode,
        date: NaiveDate,
    ) -> Result<Vec<String>, MarketDataError> {
        let _ = (index, date);
        Err(MarketDataError::NotSupported {
            operation: "index_members".to_string(),
            terminal: self.id().to_string(),
        })
    }

    /// The last `count` ticks at or before `end` (`time`, `lastPrice`).
    ///
    /// Default implementation returns `NotSupported`.
    async fn tick_history(
        &self,
        code: &VendorCode,
        end: NaiveDateTime,
        count: usize,
    ) -> Result<RawFrame, MarketDataError> {
        let _ = (code, end, count);
        Err(MarketDataError::NotSupported {
            operation: "tick_history".to_string(),
            terminal: self.id().to_string(),
        })
    }
}
