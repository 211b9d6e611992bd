use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Period, RawFrame, SecurityCode};

/// Cache identity: one security at one granularity.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub security: SecurityCode,
    pub period: Period,
}

impl CacheKey {
    pub fn new(security: SecurityCode, period: Period) -> Self {
        Self { security, period }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.security, self.period)
    }
}

/// Raw vendor bars held for one key, with the date range they cover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub frame: RawFrame,
    pub covered_start: NaiveDate,
    pub covered_end: NaiveDate,
    pub last_refreshed_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn covers(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.covered_start <= start && end <= self.covered_end
    }

    /// A request reaching the day of the last refresh may find bars the
    /// vendor published since; such entries expire after `refresh_interval`.
    pub fn is_stale(
        &self,
        end: NaiveDate,
        now: DateTime<Utc>,
        refresh_interval: Duration,
        offset: FixedOffset,
    ) -> bool {
        let refreshed_on = self.last_refreshed_at.with_timezone(&offset).date_naive();
        end >= refreshed_on && now - self.last_refreshed_at >= refresh_interval
    }
}
