//! Vendor conventions a terminal reports about its own payloads.

use chrono::FixedOffset;

/// UTC offset of the exchanges covered here (+08:00).
pub const MARKET_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// How a terminal expresses the data it hands back.
///
/// The normalizer uses these to bring every vendor onto one convention.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct TerminalConventions {
    /// Number of shares the vendor quotes dividend quantities against
    /// (1 for "per share", 10 for "per 10 shares").
    pub dividend_per_base: u32,

    /// Offset applied to epoch timestamps to get market-local time.
    pub utc_offset_secs: i32,
}

impl TerminalConventions {
    pub fn market_offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_secs)
    }
}

impl Default for TerminalConventions {
    fn default() -> Self {
        Self {
            dividend_per_base: 1,
            utc_offset_secs: MARKET_UTC_OFFSET_SECS,
        }
    }
}
