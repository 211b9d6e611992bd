use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Bar granularity.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Period {
    #[default]
    #[serde(rename = "1d")]
    Daily,
    #[serde(rename = "1m")]
    Minute1,
    #[serde(rename = "5m")]
    Minute5,
    #[serde(rename = "15m")]
    Minute15,
    #[serde(rename = "30m")]
    Minute30,
    #[serde(rename = "60m")]
    Minute60,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "1d",
            Period::Minute1 => "1m",
            Period::Minute5 => "5m",
            Period::Minute15 => "15m",
            Period::Minute30 => "30m",
            Period::Minute60 => "60m",
        }
    }

    pub fn is_daily(&self) -> bool {
        matches!(self, Period::Daily)
    }

    /// Bars in one regular session (four trading hours).
    pub fn bars_per_session(&self) -> usize {
        match self {
            Period::Daily => 1,
            Period::Minute1 => 240,
            Period::Minute5 => 48,
            Period::Minute15 => 16,
            Period::Minute30 => 8,
            Period::Minute60 => 4,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1d" | "daily" | "day" => Ok(Period::Daily),
            "1m" | "minute" => Ok(Period::Minute1),
            "5m" => Ok(Period::Minute5),
            "15m" => Ok(Period::Minute15),
            "30m" => Ok(Period::Minute30),
            "60m" | "1h" => Ok(Period::Minute60),
            other => Err(MarketDataError::NotSupported {
                operation: format!("period {}", other),
                terminal: "*".to_string(),
            }),
        }
    }
}
