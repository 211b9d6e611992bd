use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::security::SecurityCode;

/// Where a tick's price came from.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TickSource {
    /// Derived from the last bar visible at subscription time
    Synthetic,
    /// Pushed by the execution engine or read from a vendor feed
    Vendor,
}

/// Latest trade snapshot for one security, in market-local time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tick {
    pub security: SecurityCode,
    pub time: NaiveDateTime,
    pub last_price: Decimal,
    pub source: TickSource,
}
