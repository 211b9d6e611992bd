//! Vendor data terminals.
//!
//! A terminal is the raw source adapter: it downloads bars into its own
//! local store, reads them back, and serves corporate actions and the
//! trading calendar, all in its native conventions.

mod conventions;
mod traits;

pub use conventions::{TerminalConventions, MARKET_UTC_OFFSET_SECS};
pub use traits::{DataTerminal, VendorAdjust};
