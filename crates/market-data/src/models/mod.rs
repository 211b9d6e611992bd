//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `types` - Type aliases for common identifiers (TerminalId, VendorSymbol)
//! - `security` - Canonical security identity (SecurityCode, Exchange) and vendor codes
//! - `period` - Bar granularity
//! - `frame` - Vendor-native columnar payloads (RawFrame)
//! - `bar` - Canonical OHLCV bars and requestable fields
//! - `dividend` - Corporate-action events
//! - `tick` - Trade snapshots

mod bar;
mod dividend;
mod frame;
mod period;
mod security;
mod tick;
mod types;

pub use bar::{Bar, BarField};
pub use dividend::{DividendEvent, CANONICAL_PER_BASE};
pub use frame::{RawColumn, RawFrame};
pub use period::Period;
pub(crate) use security::split_code;
pub use security::{Exchange, SecurityCode, VendorCode};
pub use tick::{Tick, TickSource};
pub use types::{TerminalId, VendorSymbol};
