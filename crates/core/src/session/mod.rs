//! Per-session state: the simulated clock and tick subscriptions.
//!
//! The execution engine owns a [`SessionContext`] and passes it to every
//! provider call; nothing here is process-wide.

mod ticks;

pub use bullet_trade_market_data::{Tick, TickSource};
pub use ticks::TickBook;

use chrono::{NaiveDate, NaiveDateTime};

use crate::guard::SimulationPhase;

/// Simulated instant, phase and subscriptions of one strategy session.
#[derive(Clone, Debug)]
pub struct SessionContext {
    now: NaiveDateTime,
    phase: SimulationPhase,
    ticks: TickBook,
}

impl SessionContext {
    pub fn new(now: NaiveDateTime, phase: SimulationPhase) -> Self {
        Self {
            now,
            phase,
            ticks: TickBook::default(),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn today(&self) -> NaiveDate {
        self.now.date()
    }

    pub fn phase(&self) -> SimulationPhase {
        self.phase
    }

    /// Move the clock; subscriptions are kept.
    pub fn advance(&mut self, now: NaiveDateTime, phase: SimulationPhase) {
        self.now = now;
        self.phase = phase;
    }

    pub fn ticks(&self) -> &TickBook {
        &self.ticks
    }

    pub fn ticks_mut(&mut self) -> &mut TickBook {
        &mut self.ticks
    }
}
