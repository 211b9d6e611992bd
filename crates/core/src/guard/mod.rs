//! Look-ahead prevention.
//!
//! Every data query carries an end boundary. The guard compares it with
//! the simulated instant and phase and rejects anything that would expose
//! information not yet available at that instant. It is a pure function of
//! its inputs and runs before any I/O.

mod phase;

pub use phase::SimulationPhase;

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use thiserror::Error;

use bullet_trade_market_data::{BarField, Period};

/// Inclusive end of a query: a whole trading day or an exact instant.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum QueryBoundary {
    Date(NaiveDate),
    Instant(NaiveDateTime),
}

impl QueryBoundary {
    pub fn day(&self) -> NaiveDate {
        match self {
            QueryBoundary::Date(date) => *date,
            QueryBoundary::Instant(at) => at.date(),
        }
    }
}

impl fmt::Display for QueryBoundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryBoundary::Date(date) => write!(f, "{}", date),
            QueryBoundary::Instant(at) => write!(f, "{}", at),
        }
    }
}

impl From<NaiveDate> for QueryBoundary {
    fn from(date: NaiveDate) -> Self {
        QueryBoundary::Date(date)
    }
}

impl From<NaiveDateTime> for QueryBoundary {
    fn from(at: NaiveDateTime) -> Self {
        QueryBoundary::Instant(at)
    }
}

/// When the requested values become known.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldTiming {
    /// Every field is fixed at the session open (`open` only)
    OpenOnly,
    /// At least one field is only final once its bar completes
    Finalized,
}

impl FieldTiming {
    pub fn from_fields(fields: &[BarField]) -> Self {
        if !fields.is_empty() && fields.iter().all(BarField::known_at_open) {
            FieldTiming::OpenOnly
        } else {
            FieldTiming::Finalized
        }
    }
}

/// A query asked for data past what is visible at the simulated instant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}: end {end} at {now} ({phase})")]
pub struct FutureDataError {
    pub phase: SimulationPhase,
    pub now: NaiveDateTime,
    pub end: QueryBoundary,
    pub reason: &'static str,
}

/// Stateless look-ahead check.
pub struct TemporalGuard;

impl TemporalGuard {
    /// Check `end` is visible at `now` during `phase`.
    ///
    /// - `before_open`: only days before today (intraday periods may name
    ///   an instant before `now`)
    /// - `intraday`: today's daily bar only for open-only fields; intraday
    ///   bars must end before `now` (at `now` for open-only fields)
    /// - `after_close`: anything up to and including today
    pub fn validate(
        phase: SimulationPhase,
        now: NaiveDateTime,
        end: QueryBoundary,
        period: Period,
        timing: FieldTiming,
    ) -> Result<(), FutureDataError> {
        let reject = |reason| {
            Err(FutureDataError {
                phase,
                now,
                end,
                reason,
            })
        };

        let now_day = now.date();
        if end.day() > now_day {
            return reject("requested range ends after the current trading day");
        }
        if end.day() < now_day {
            return Ok(());
        }

        match phase {
            SimulationPhase::AfterClose => Ok(()),
            SimulationPhase::BeforeOpen => match end {
                QueryBoundary::Instant(at) if !period.is_daily() && at < now => Ok(()),
                _ => reject("today's session has not opened"),
            },
            SimulationPhase::Intraday if period.is_daily() => match timing {
                FieldTiming::OpenOnly => Ok(()),
                FieldTiming::Finalized => reject("today's daily bar is not final until the close"),
            },
            SimulationPhase::Intraday => match end {
                QueryBoundary::Instant(at) if at < now => Ok(()),
                QueryBoundary::Instant(at) if at == now && timing == FieldTiming::OpenOnly => {
                    Ok(())
                }
                _ => reject("bar has not completed yet"),
            },
        }
    }
}
