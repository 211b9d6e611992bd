use log::debug;

use super::exchange_suffixes::ExchangeMap;
use crate::errors::MarketDataError;
use crate::models::{split_code, Exchange, SecurityCode, VendorCode};

/// Converts between the canonical code convention and terminal conventions.
///
/// Input codes may arrive in either convention; everything leaving the
/// provider is canonical.
#[derive(Clone, Debug, Default)]
pub struct CodeResolver {
    exchanges: ExchangeMap,
}

impl CodeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a code in the canonical or any registered vendor convention.
    pub fn canonical(&self, raw: &str) -> Result<SecurityCode, MarketDataError> {
        let (symbol, suffix) =
            split_code(raw).ok_or_else(|| MarketDataError::UnknownSecurity(raw.to_string()))?;

        if let Some(exchange) = Exchange::from_canonical_suffix(suffix) {
            return Ok(SecurityCode::new(symbol, exchange));
        }

        match self.exchanges.exchange_for_suffix(suffix, None) {
            Some(exchange) => {
                debug!("Mapped vendor code {} to exchange {:?}", raw, exchange);
                Ok(SecurityCode::new(symbol, exchange))
            }
            None => Err(MarketDataError::UnknownSecurity(raw.to_string())),
        }
    }

    /// Parse a code the given terminal produced.
    pub fn from_vendor(&self, raw: &str, terminal: &str) -> Result<SecurityCode, MarketDataError> {
        let (symbol, suffix) =
            split_code(raw).ok_or_else(|| MarketDataError::UnknownSecurity(raw.to_string()))?;
        self.exchanges
            .exchange_for_suffix(suffix, Some(terminal))
            .map(|exchange| SecurityCode::new(symbol, exchange))
            .ok_or_else(|| MarketDataError::UnknownSecurity(raw.to_string()))
    }

    /// Render a canonical code in a terminal's convention.
    pub fn to_vendor(
        &self,
        code: &SecurityCode,
        terminal: &str,
    ) -> Result<VendorCode, MarketDataError> {
        let suffix = self
            .exchanges
            .get_suffix(code.exchange(), terminal)
            .ok_or_else(|| MarketDataError::ResolutionFailed {
                security: code.to_string(),
                terminal: terminal.to_string(),
            })?;
        Ok(VendorCode::new(format!("{}.{}", code.symbol(), suffix)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::QMT_TERMINAL;

    #[test]
    fn test_canonical_and_vendor_forms_agree() {
        let resolver = CodeResolver::new();
        let a = resolver.canonical("000001.XSHE").unwrap();
        let b = resolver.canonical("000001.SZ").unwrap();
        assert_eq!(a, b);
        assert_eq!(b.to_string(), "000001.XSHE");
    }

    #[test]
    fn test_to_vendor() {
        let resolver = CodeResolver::new();
        let code = resolver.canonical("600000.XSHG").unwrap();
        let vendor = resolver.to_vendor(&code, QMT_TERMINAL).unwrap();
        assert_eq!(vendor.as_str(), "600000.SH");

        let future = resolver.canonical("IF2506.CCFX").unwrap();
        assert_eq!(
            resolver.to_vendor(&future, QMT_TERMINAL).unwrap().as_str(),
            "IF2506.IF"
        );
    }

    #[test]
    fn test_unknown_terminal_fails_resolution() {
        let resolver = CodeResolver::new();
        let code = resolver.canonical("000001.XSHE").unwrap();
        let err = resolver.to_vendor(&code, "NOPE").unwrap_err();
        assert!(matches!(err, MarketDataError::ResolutionFailed { .. }));
    }

    #[test]
    fn test_from_vendor_is_terminal_scoped() {
        let resolver = CodeResolver::new();
        assert_eq!(
            resolver.from_vendor("000001.SZ", QMT_TERMINAL).unwrap().to_string(),
            "000001.XSHE"
        );
        assert!(resolver.from_vendor("000001.XSHE", QMT_TERMINAL).is_err());
    }

    #[test]
    fn test_garbage_is_unknown() {
        let resolver = CodeResolver::new();
        assert!(matches!(
            resolver.canonical("000001"),
            Err(MarketDataError::UnknownSecurity(_))
        ));
        assert!(resolver.canonical("000001.ZZ").is_err());
    }
}
