//! Market data module - price queries, result tables and the provider facade.

mod market_data_constants;
mod market_data_model;
mod market_data_service;
mod market_data_traits;
mod price_table;

// Re-export the public interface
pub use market_data_constants::*;
pub use market_data_model::{PanelShape, PriceQuery, PriceRange, Securities};
pub use market_data_service::MarketDataService;
pub use market_data_traits::MarketDataServiceTrait;
pub use price_table::{LongFrame, LongRow, PriceTable, SecurityFrame, WideFrame};
