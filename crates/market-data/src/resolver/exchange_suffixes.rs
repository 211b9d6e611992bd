//! Terminal-specific exchange suffixes.
//!
//! Maps each canonical exchange to the suffix a terminal appends to the
//! symbol. The canonical convention itself (`XSHE`, `XSHG`, ...) lives on
//! [`Exchange`]; this table only holds vendor conventions.

use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::models::{Exchange, TerminalId};

/// Terminal id of the QMT family of terminals.
pub const QMT_TERMINAL: &str = "QMT";

lazy_static! {
    /// Suffixes used by QMT-style terminals.
    pub static ref QMT_EXCHANGE_SUFFIXES: HashMap<Exchange, &'static str> = {
        let mut m = HashMap::new();
        m.insert(Exchange::Shanghai, "SH");
        m.insert(Exchange::Shenzhen, "SZ");
        m.insert(Exchange::Beijing, "BJ");
        m.insert(Exchange::Cffex, "IF");
        m.insert(Exchange::Shfe, "SF");
        m.insert(Exchange::Dce, "DF");
        m.insert(Exchange::Czce, "ZF");
        m.insert(Exchange::Ine, "INE");
        m.insert(Exchange::Gfex, "GF");
        m
    };
}

/// Exchange to terminal suffix mapping database.
#[derive(Clone, Debug)]
pub struct ExchangeMap {
    mappings: HashMap<Exchange, HashMap<TerminalId, String>>,
}

impl Default for ExchangeMap {
    fn default() -> Self {
        Self::new()
    }
}

impl ExchangeMap {
    /// Create a new ExchangeMap with default mappings.
    pub fn new() -> Self {
        let mut map = Self::empty();
        for (exchange, suffix) in QMT_EXCHANGE_SUFFIXES.iter() {
            map.register(*exchange, TerminalId::Borrowed(QMT_TERMINAL), suffix);
        }
        map
    }

    /// A map without any terminal conventions.
    pub fn empty() -> Self {
        Self {
            mappings: HashMap::new(),
        }
    }

    /// Add or replace the suffix a terminal uses for an exchange.
    pub fn register(&mut self, exchange: Exchange, terminal: TerminalId, suffix: &str) {
        self.mappings
            .entry(exchange)
            .or_default()
            .insert(terminal, suffix.to_ascii_uppercase());
    }

    /// Get the suffix for an exchange and terminal.
    pub fn get_suffix(&self, exchange: Exchange, terminal: &str) -> Option<&str> {
        self.mappings
            .get(&exchange)?
            .get(terminal)
            .map(String::as_str)
    }

    /// Find the exchange a terminal suffix belongs to.
    ///
    /// With `terminal = None` every registered terminal is searched, in
    /// exchange order.
    pub fn exchange_for_suffix(&self, suffix: &str, terminal: Option<&str>) -> Option<Exchange> {
        Exchange::ALL.into_iter().find(|exchange| {
            self.mappings.get(exchange).is_some_and(|terminals| {
                terminals.iter().any(|(id, s)| {
                    terminal.map_or(true, |t| t == id.as_ref()) && s.eq_ignore_ascii_case(suffix)
                })
            })
        })
    }

    /// Check if an exchange/terminal combination is supported.
    pub fn has_mapping(&self, exchange: Exchange, terminal: &str) -> bool {
        self.get_suffix(exchange, terminal).is_some()
    }
}
