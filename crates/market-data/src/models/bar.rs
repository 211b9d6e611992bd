use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::security::SecurityCode;
use crate::errors::MarketDataError;

/// Canonical OHLCV bar.
///
/// `timestamp` is in market-local time; daily bars carry midnight.
/// `volume` and `money` are never touched by price adjustment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub security: SecurityCode,
    pub timestamp: NaiveDateTime,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    /// Traded value
    pub money: Decimal,
}

impl Bar {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }

    pub fn field(&self, field: BarField) -> Decimal {
        match field {
            BarField::Open => self.open,
            BarField::High => self.high,
            BarField::Low => self.low,
            BarField::Close => self.close,
            BarField::Volume => self.volume,
            BarField::Money => self.money,
        }
    }

    /// Copy of this bar with every price field mapped through `f`.
    pub fn map_prices(&self, f: impl Fn(Decimal) -> Decimal) -> Bar {
        Bar {
            open: f(self.open),
            high: f(self.high),
            low: f(self.low),
            close: f(self.close),
            ..self.clone()
        }
    }
}

/// A column a caller can request from a bar query.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    Volume,
    Money,
}

impl BarField {
    pub const ALL: [BarField; 6] = [
        BarField::Open,
        BarField::Close,
        BarField::High,
        BarField::Low,
        BarField::Volume,
        BarField::Money,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BarField::Open => "open",
            BarField::High => "high",
            BarField::Low => "low",
            BarField::Close => "close",
            BarField::Volume => "volume",
            BarField::Money => "money",
        }
    }

    pub fn is_price(&self) -> bool {
        matches!(
            self,
            BarField::Open | BarField::High | BarField::Low | BarField::Close
        )
    }

    /// Whether the daily value is fixed as soon as the session opens.
    pub fn known_at_open(&self) -> bool {
        matches!(self, BarField::Open)
    }
}

impl fmt::Display for BarField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BarField {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(BarField::Open),
            "high" => Ok(BarField::High),
            "low" => Ok(BarField::Low),
            "close" => Ok(BarField::Close),
            "volume" => Ok(BarField::Volume),
            "money" | "amount" => Ok(BarField::Money),
            other => Err(MarketDataError::NotSupported {
                operation: format!("field {}", other),
                terminal: "*".to_string(),
            }),
        }
    }
}
