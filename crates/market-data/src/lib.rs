//! Bullet Trade Market Data Crate
//!
//! This crate turns raw vendor terminal data into canonical, adjustable
//! market data for the provider facade in `bullet-trade-core`.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Canonical security codes with per-terminal code conventions
//! - Schema normalization of vendor bar and corporate-action frames
//! - A local cache with single-flight auto-download
//! - Front/back price adjustment against a reference date
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |  "000001.SZ"     | --> |   SecurityCode   |  (canonical identity)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   CacheManager   |  (ensure_range / read)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   DataTerminal   |  (vendor I/O, raw frames)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Normalizer    |  (Bar, DividendEvent)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |     adjust()     |  (none / front / back)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`SecurityCode`] - Canonical security identifier
//! - [`Bar`] - Canonical OHLCV bar
//! - [`DividendEvent`] - Corporate action in the canonical share base
//! - [`Tick`] - Trade snapshot
//! - [`RawFrame`] - Vendor-native columnar payload
//! - [`DataTerminal`] - Raw source adapter trait

pub mod adjust;
pub mod cache;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod resolver;
pub mod terminal;

// Re-export all public types from models
pub use models::{
    Bar, BarField, DividendEvent, Exchange, Period, RawColumn, RawFrame, SecurityCode,
    TerminalId, Tick, TickSource, VendorCode, VendorSymbol, CANONICAL_PER_BASE,
};

pub use adjust::{adjust, AdjustMode, AdjustmentFactors};
pub use cache::{
    CacheEntry, CacheKey, CacheManager, CacheManagerConfig, CacheStore, DiskCacheStore,
    MemoryCacheStore,
};
pub use errors::{MarketDataError, RetryClass, SchemaError};
pub use normalize::Normalizer;
pub use resolver::{CodeResolver, ExchangeMap, QMT_TERMINAL};
pub use terminal::{DataTerminal, TerminalConventions, VendorAdjust};
