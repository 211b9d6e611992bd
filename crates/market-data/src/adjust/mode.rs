use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Price adjustment mode.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustMode {
    /// Raw vendor prices
    #[default]
    None,
    /// Past prices scaled onto the reference date's price level
    Front,
    /// Later prices scaled back onto the first bar's price level
    Back,
}

impl AdjustMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustMode::None => "none",
            AdjustMode::Front => "front",
            AdjustMode::Back => "back",
        }
    }
}

impl fmt::Display for AdjustMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustMode {
    type Err = MarketDataError;

    /// Accepts `none`, `pre`/`front` and `post`/`back`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(AdjustMode::None),
            "pre" | "front" => Ok(AdjustMode::Front),
            "post" | "back" => Ok(AdjustMode::Back),
            other => Err(MarketDataError::NotSupported {
                operation: format!("adjust mode {}", other),
                terminal: "*".to_string(),
            }),
        }
    }
}
