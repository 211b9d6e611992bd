//! Security code resolution.
//!
//! Converts between the canonical convention (`000001.XSHE`) and the
//! conventions of individual terminals (`000001.SZ` for QMT).
//!
//! ```text
//!   "000001.SZ" ──┐
//!                 ├──> CodeResolver::canonical ──> SecurityCode(000001, Shenzhen)
//! "000001.XSHE" ──┘                                        │
//!                                                          v
//!                                  CodeResolver::to_vendor(code, "QMT") ──> "000001.SZ"
//! ```

mod code_resolver;
mod exchange_suffixes;

pub use code_resolver::CodeResolver;
pub use exchange_suffixes::{ExchangeMap, QMT_EXCHANGE_SUFFIXES, QMT_TERMINAL};
