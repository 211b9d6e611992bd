use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Where the simulated clock sits within a trading day.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationPhase {
    BeforeOpen,
    Intraday,
    AfterClose,
}

impl SimulationPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimulationPhase::BeforeOpen => "before_open",
            SimulationPhase::Intraday => "intraday",
            SimulationPhase::AfterClose => "after_close",
        }
    }
}

impl fmt::Display for SimulationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SimulationPhase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "before_open" | "before_trading_start" => Ok(SimulationPhase::BeforeOpen),
            "intraday" | "handle_data" => Ok(SimulationPhase::Intraday),
            "after_close" | "after_trading_end" => Ok(SimulationPhase::AfterClose),
            other => Err(Error::InvalidQuery(format!("unknown phase {}", other))),
        }
    }
}
