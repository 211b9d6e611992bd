//! Bullet Trade Core - point-in-time market data for strategy sessions.
//!
//! This crate puts the look-ahead guard, session state and query shapes on
//! top of `bullet-trade-market-data`. Every facade call takes the session's
//! [`SessionContext`], so nothing here is process-wide.

pub mod config;
pub mod constants;
pub mod errors;
pub mod guard;
pub mod market_data;
pub mod session;

pub use config::{ProviderConfig, RunMode};
pub use guard::{FieldTiming, FutureDataError, QueryBoundary, SimulationPhase, TemporalGuard};
pub use market_data::{
    LongFrame, LongRow, MarketDataService, MarketDataServiceTrait, PanelShape, PriceQuery,
    PriceRange, PriceTable, SecurityFrame, Securities, WideFrame,
};
pub use session::{SessionContext, Tick, TickBook, TickSource};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
