use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use bullet_trade_market_data::{AdjustMode, BarField, Period};

use crate::guard::QueryBoundary;

/// One security, or a list of them, in any supported code convention.
///
/// A request naming one distinct security produces a single-security
/// table; anything else produces a panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Securities {
    One(String),
    Many(Vec<String>),
}

impl Securities {
    pub fn codes(&self) -> Vec<&str> {
        match self {
            Securities::One(code) => vec![code.as_str()],
            Securities::Many(codes) => codes.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for Securities {
    fn from(code: &str) -> Self {
        Securities::One(code.to_string())
    }
}

impl From<String> for Securities {
    fn from(code: String) -> Self {
        Securities::One(code)
    }
}

impl From<Vec<&str>> for Securities {
    fn from(codes: Vec<&str>) -> Self {
        Securities::Many(codes.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for Securities {
    fn from(codes: Vec<String>) -> Self {
        Securities::Many(codes)
    }
}

impl From<&[&str]> for Securities {
    fn from(codes: &[&str]) -> Self {
        Securities::Many(codes.iter().map(|c| c.to_string()).collect())
    }
}

/// Which bars a price query covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceRange {
    /// Every bar from `start` through `end`
    Between { start: NaiveDate, end: QueryBoundary },
    /// The last `count` bars up to `end`
    Count { end: QueryBoundary, count: usize },
}

impl PriceRange {
    pub fn end(&self) -> QueryBoundary {
        match self {
            PriceRange::Between { end, .. } | PriceRange::Count { end, .. } => *end,
        }
    }
}

/// Layout of a multi-security result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelShape {
    /// One row per (time, security)
    Long,
    /// One row per time, columns per (field, security)
    #[default]
    Wide,
}

/// A `get_price` request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriceQuery {
    pub securities: Securities,
    pub range: PriceRange,
    /// Empty means every field
    pub fields: Vec<BarField>,
    pub period: Period,
    pub mode: AdjustMode,
    /// Defaults to the session's current date
    pub reference_date: Option<NaiveDate>,
    pub panel: PanelShape,
}

impl PriceQuery {
    /// Front-adjusted daily bars of every field, as a wide panel.
    pub fn new(securities: impl Into<Securities>, range: PriceRange) -> Self {
        Self {
            securities: securities.into(),
            range,
            fields: Vec::new(),
            period: Period::Daily,
            mode: AdjustMode::Front,
            reference_date: None,
            panel: PanelShape::default(),
        }
    }

    pub fn fields(mut self, fields: &[BarField]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    pub fn period(mut self, period: Period) -> Self {
        self.period = period;
        self
    }

    pub fn adjust(mut self, mode: AdjustMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn reference_date(mut self, date: NaiveDate) -> Self {
        self.reference_date = Some(date);
        self
    }

    pub fn panel(mut self, panel: PanelShape) -> Self {
        self.panel = panel;
        self
    }

    /// Requested fields in order, duplicates removed; all fields if none.
    pub fn resolved_fields(&self) -> Vec<BarField> {
        if self.fields.is_empty() {
            return BarField::ALL.to_vec();
        }
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            if !fields.contains(field) {
                fields.push(*field);
            }
        }
        fields
    }
}
