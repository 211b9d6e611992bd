use async_trait::async_trait;
use chrono::NaiveDate;

use bullet_trade_market_data::{DividendEvent, Exchange, SecurityCode};

use super::market_data_model::{PriceQuery, Securities};
use super::price_table::PriceTable;
use crate::errors::Result;
use crate::guard::QueryBoundary;
use crate::session::{SessionContext, Tick};

/// Point-in-time market data queries for one strategy session.
///
/// Every query is checked against the session's simulated clock before any
/// I/O takes place.
#[async_trait]
pub trait MarketDataServiceTrait: Send + Sync {
    /// Canonical code for a code in any supported convention.
    fn resolve(&self, code: &str) -> Result<SecurityCode>;

    async fn get_price(&self, ctx: &SessionContext, query: &PriceQuery) -> Result<PriceTable>;

    /// Corporate actions of one security with an ex-date in `[start, end]`.
    ///
    /// Missing or unavailable vendor data yields an empty list.
    async fn get_split_dividend(
        &self,
        ctx: &SessionContext,
        security: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DividendEvent>>;

    async fn get_trade_days(
        &self,
        ctx: &SessionContext,
        exchange: Exchange,
        start: Option<NaiveDate>,
        end: NaiveDate,
        count: Option<usize>,
    ) -> Result<Vec<NaiveDate>>;

    /// Constituents of an index as of `date`, canonical codes in vendor order.
    async fn get_index_stocks(
        &self,
        ctx: &SessionContext,
        index: &str,
        date: NaiveDate,
    ) -> Result<Vec<SecurityCode>>;

    /// The last `count` vendor ticks at or before `end`, oldest first.
    async fn get_ticks(
        &self,
        ctx: &SessionContext,
        security: &str,
        end: QueryBoundary,
        count: usize,
    ) -> Result<Vec<Tick>>;

    // --- Tick subscriptions ---

    /// Subscribe and seed each security with the last price visible now.
    async fn subscribe_ticks(
        &self,
        ctx: &mut SessionContext,
        securities: &Securities,
    ) -> Result<Vec<SecurityCode>>;

    /// Drop the given subscriptions, or all of them with `None`.
    fn unsubscribe_ticks(
        &self,
        ctx: &mut SessionContext,
        securities: Option<&Securities>,
    ) -> Result<()>;

    /// Latest tick of a subscribed security, `None` when not subscribed or
    /// when the held tick is later than the simulated instant.
    fn current_tick(&self, ctx: &SessionContext, security: &str) -> Result<Option<Tick>>;

    /// Store a tick pushed by the execution engine. Ignored unless subscribed;
    /// a tick stamped after the simulated instant is a `FutureData` error.
    fn record_tick(&self, ctx: &mut SessionContext, tick: Tick) -> Result<bool>;
}
