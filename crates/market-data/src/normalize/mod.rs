//! Schema normalization.
//!
//! Turns vendor frames into canonical [`Bar`]s, [`DividendEvent`]s and
//! [`Tick`]s:
//! vendor column names become canonical ones, epoch-millisecond timestamps
//! become market-local datetimes, dividend quantities move onto
//! [`CANONICAL_PER_BASE`], and vendor codes become canonical codes.

pub mod columns;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};
use log::{debug, warn};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;

use crate::errors::{MarketDataError, SchemaError};
use crate::models::{
    Bar, DividendEvent, Period, RawColumn, RawFrame, SecurityCode, TerminalId, Tick, TickSource,
    CANONICAL_PER_BASE,
};
use crate::resolver::CodeResolver;
use crate::terminal::TerminalConventions;

/// Normalizer bound to one terminal's conventions.
#[derive(Clone, Debug)]
pub struct Normalizer {
    terminal: TerminalId,
    conventions: TerminalConventions,
    offset: FixedOffset,
    resolver: Arc<CodeResolver>,
}

impl Normalizer {
    pub fn new(
        terminal: impl Into<TerminalId>,
        conventions: TerminalConventions,
        resolver: Arc<CodeResolver>,
    ) -> Self {
        let terminal = terminal.into();
        let offset = conventions.market_offset().unwrap_or_else(|| {
            warn!(
                "Terminal {} reported invalid UTC offset {}s, using UTC",
                terminal, conventions.utc_offset_secs
            );
            Utc.fix()
        });
        Self {
            terminal,
            conventions,
            offset,
            resolver,
        }
    }

    pub fn conventions(&self) -> &TerminalConventions {
        &self.conventions
    }

    /// Map a code this terminal produced to the canonical convention.
    pub fn canonical_code(&self, raw: &str) -> Result<SecurityCode, MarketDataError> {
        self.resolver.from_vendor(raw, &self.terminal)
    }

    /// Convert a vendor bar frame into canonical bars.
    ///
    /// Output is sorted by timestamp with duplicates dropped (first row
    /// wins). Rows with a non-finite value are skipped. An empty frame
    /// yields no bars; a non-empty frame must carry every required column.
    pub fn normalize(
        &self,
        frame: &RawFrame,
        security: &SecurityCode,
        period: Period,
    ) -> Result<Vec<Bar>, SchemaError> {
        let rows = frame.validate()?;
        if rows == 0 {
            return Ok(Vec::new());
        }

        let time = require(frame, columns::TIME)?;
        let open = require(frame, columns::OPEN)?;
        let high = require(frame, columns::HIGH)?;
        let low = require(frame, columns::LOW)?;
        let close = require(frame, columns::CLOSE)?;
        let volume = require(frame, columns::VOLUME)?;
        let money = match frame.column(columns::MONEY) {
            Some(column) => column,
            None => require(frame, columns::AMOUNT)?,
        };

        let mut bars = Vec::with_capacity(rows);
        let mut skipped = 0usize;
        for row in 0..rows {
            let timestamp = self.timestamp_at(time, row, period)?;
            let values = [open, high, low, close, volume, money]
                .map(|column| column.float_at(row).and_then(to_decimal));
            match values {
                [Some(open), Some(high), Some(low), Some(close), Some(volume), Some(money)] => {
                    bars.push(Bar {
                        security: security.clone(),
                        timestamp,
                        open,
                        high,
                        low,
                        close,
                        volume,
                        money,
                    })
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(
                "Skipped {} bar rows with non-finite values for {}",
                skipped, security
            );
        }

        bars.sort_by_key(|bar| bar.timestamp);
        let before = bars.len();
        bars.dedup_by_key(|bar| bar.timestamp);
        if bars.len() != before {
            debug!(
                "Dropped {} duplicate timestamps for {}",
                before - bars.len(),
                security
            );
        }
        Ok(bars)
    }

    /// Convert vendor corporate-action records into canonical events.
    ///
    /// Quantities are rescaled from the terminal's share base to
    /// [`CANONICAL_PER_BASE`]. Records with no cash, share or allotment
    /// component are dropped.
    pub fn normalize_dividends(
        &self,
        frame: &RawFrame,
        security: &SecurityCode,
    ) -> Result<Vec<DividendEvent>, SchemaError> {
        let rows = frame.validate()?;
        if rows == 0 {
            return Ok(Vec::new());
        }

        let time = require(frame, columns::TIME)?;
        let interest = require(frame, columns::INTEREST)?;
        let bonus = frame.column(columns::STOCK_BONUS);
        let gift = frame.column(columns::STOCK_GIFT);
        let allot = frame.column(columns::ALLOT_NUM);
        let allot_price = frame.column(columns::ALLOT_PRICE);

        let vendor_base = self.conventions.dividend_per_base.max(1);
        let scale = Decimal::from(CANONICAL_PER_BASE) / Decimal::from(vendor_base);

        let mut events = Vec::with_capacity(rows);
        for row in 0..rows {
            let ex_date = self.timestamp_at(time, row, Period::Daily)?.date();
            let cash = value_or_zero(Some(interest), row);
            let bonus = value_or_zero(bonus, row);
            let gift = value_or_zero(gift, row);
            let allot = value_or_zero(allot, row);
            if cash.is_zero() && bonus.is_zero() && gift.is_zero() && allot.is_zero() {
                debug!("Ignoring empty corporate action for {} on {}", security, ex_date);
                continue;
            }
            events.push(DividendEvent {
                security: security.clone(),
                ex_date,
                per_base: CANONICAL_PER_BASE,
                cash_per_base: cash * scale,
                bonus_shares_per_base: bonus * scale,
                gift_shares_per_base: gift * scale,
                allotment_shares_per_base: allot * scale,
                allotment_price: value_or_zero(allot_price, row),
            });
        }
        events.sort_by_key(|event| event.ex_date);
        Ok(events)
    }

    /// Convert a vendor tick frame into ticks, oldest first.
    ///
    /// Rows without a finite price are skipped; repeated timestamps keep
    /// the first row.
    pub fn normalize_ticks(
        &self,
        frame: &RawFrame,
        security: &SecurityCode,
    ) -> Result<Vec<Tick>, SchemaError> {
        let rows = frame.validate()?;
        if rows == 0 {
            return Ok(Vec::new());
        }

        let time = require(frame, columns::TIME)?;
        let price = require(frame, columns::LAST_PRICE)?;
        let mut ticks = Vec::with_capacity(rows);
        for row in 0..rows {
            let at = self.timestamp_at(time, row, Period::Minute1)?;
            match price.float_at(row).and_then(to_decimal) {
                Some(last_price) => ticks.push(Tick {
                    security: security.clone(),
                    time: at,
                    last_price,
                    source: TickSource::Vendor,
                }),
                None => debug!("Skipping tick without a price for {} at {}", security, at),
            }
        }
        ticks.sort_by_key(|tick| tick.time);
        ticks.dedup_by_key(|tick| tick.time);
        Ok(ticks)
    }

    fn timestamp_at(
        &self,
        column: &RawColumn,
        row: usize,
        period: Period,
    ) -> Result<NaiveDateTime, SchemaError> {
        let millis = column.int_at(row).ok_or_else(|| {
            SchemaError::InvalidTimestamp(column.float_at(row).unwrap_or_default() as i64)
        })?;
        local_timestamp(millis, self.offset, period)
    }
}

fn require<'a>(frame: &'a RawFrame, name: &str) -> Result<&'a RawColumn, SchemaError> {
    frame.column(name).ok_or_else(|| SchemaError::MissingColumn {
        column: name.to_string(),
    })
}

fn to_decimal(value: f64) -> Option<Decimal> {
    if value.is_finite() {
        Decimal::from_f64(value)
    } else {
        None
    }
}

fn value_or_zero(column: Option<&RawColumn>, row: usize) -> Decimal {
    column
        .and_then(|c| c.float_at(row))
        .and_then(to_decimal)
        .unwrap_or(Decimal::ZERO)
}

/// Epoch milliseconds to market-local time; daily bars land on midnight.
pub fn local_timestamp(
    millis: i64,
    offset: FixedOffset,
    period: Period,
) -> Result<NaiveDateTime, SchemaError> {
    let utc = DateTime::from_timestamp_millis(millis).ok_or(SchemaError::InvalidTimestamp(millis))?;
    let local = utc.with_timezone(&offset).naive_local();
    if period.is_daily() {
        Ok(local.date().and_time(NaiveTime::MIN))
    } else {
        Ok(local)
    }
}

/// Market-local midnight of `date` as epoch milliseconds.
pub fn date_to_millis(date: NaiveDate, offset: FixedOffset) -> i64 {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .timestamp_millis()
        - i64::from(offset.local_minus_utc()) * 1000
}
