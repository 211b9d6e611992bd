use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::types::VendorSymbol;
use crate::errors::MarketDataError;

/// Exchanges known to the provider.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Exchange {
    Shanghai,
    Shenzhen,
    Beijing,
    /// China Financial Futures Exchange
    Cffex,
    /// Shanghai Futures Exchange
    Shfe,
    /// Dalian Commodity Exchange
    Dce,
    /// Zhengzhou Commodity Exchange
    Czce,
    /// Shanghai International Energy Exchange
    Ine,
    /// Guangzhou Futures Exchange
    Gfex,
}

impl Exchange {
    pub const ALL: [Exchange; 9] = [
        Exchange::Shanghai,
        Exchange::Shenzhen,
        Exchange::Beijing,
        Exchange::Cffex,
        Exchange::Shfe,
        Exchange::Dce,
        Exchange::Czce,
        Exchange::Ine,
        Exchange::Gfex,
    ];

    /// Suffix used by the canonical code convention.
    pub fn canonical_suffix(&self) -> &'static str {
        match self {
            Exchange::Shanghai => "XSHG",
            Exchange::Shenzhen => "XSHE",
            Exchange::Beijing => "BJSE",
            Exchange::Cffex => "CCFX",
            Exchange::Shfe => "XSGE",
            Exchange::Dce => "XDCE",
            Exchange::Czce => "XZCE",
            Exchange::Ine => "XINE",
            Exchange::Gfex => "GFEX",
        }
    }

    pub fn from_canonical_suffix(suffix: &str) -> Option<Exchange> {
        Self::ALL
            .into_iter()
            .find(|exchange| exchange.canonical_suffix().eq_ignore_ascii_case(suffix))
    }

    /// Whether this is a futures exchange rather than a stock exchange.
    pub fn is_futures(&self) -> bool {
        !matches!(
            self,
            Exchange::Shanghai | Exchange::Shenzhen | Exchange::Beijing
        )
    }
}

/// Canonical security identity: a symbol on an exchange.
///
/// Always displayed as `"{symbol}.{canonical suffix}"`, e.g. `000001.XSHE`.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecurityCode {
    symbol: Arc<str>,
    exchange: Exchange,
}

impl SecurityCode {
    pub fn new(symbol: impl Into<Arc<str>>, exchange: Exchange) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn exchange(&self) -> Exchange {
        self.exchange
    }
}

impl fmt::Display for SecurityCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.symbol, self.exchange.canonical_suffix())
    }
}

/// Split `"SYMBOL.SUFFIX"` at the last dot.
pub(crate) fn split_code(raw: &str) -> Option<(&str, &str)> {
    let (symbol, suffix) = raw.trim().rsplit_once('.')?;
    if symbol.is_empty() || suffix.is_empty() {
        return None;
    }
    Some((symbol, suffix))
}

impl FromStr for SecurityCode {
    type Err = MarketDataError;

    /// Parses the canonical convention only. Vendor codes go through
    /// [`CodeResolver`](crate::resolver::CodeResolver).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (symbol, suffix) =
            split_code(s).ok_or_else(|| MarketDataError::UnknownSecurity(s.to_string()))?;
        let exchange = Exchange::from_canonical_suffix(suffix)
            .ok_or_else(|| MarketDataError::UnknownSecurity(s.to_string()))?;
        Ok(Self::new(symbol, exchange))
    }
}

impl TryFrom<String> for SecurityCode {
    type Error = MarketDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SecurityCode> for String {
    fn from(code: SecurityCode) -> Self {
        code.to_string()
    }
}

/// A code in one terminal's native convention, e.g. `000001.SZ`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct VendorCode(VendorSymbol);

impl VendorCode {
    pub fn new(code: impl Into<VendorSymbol>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VendorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
