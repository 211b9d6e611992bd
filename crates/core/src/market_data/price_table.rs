//! Result tables of `get_price`.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bullet_trade_market_data::{Bar, BarField, SecurityCode};

/// Bars of one security: one row per bar, one column per field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityFrame {
    pub security: SecurityCode,
    pub fields: Vec<BarField>,
    pub index: Vec<NaiveDateTime>,
    pub rows: Vec<Vec<Decimal>>,
}

impl SecurityFrame {
    pub fn from_bars(security: SecurityCode, fields: &[BarField], bars: &[Bar]) -> Self {
        Self {
            security,
            fields: fields.to_vec(),
            index: bars.iter().map(|bar| bar.timestamp).collect(),
            rows: bars
                .iter()
                .map(|bar| fields.iter().map(|field| bar.field(*field)).collect())
                .collect(),
        }
    }

    fn position(&self, field: BarField) -> Option<usize> {
        self.fields.iter().position(|f| *f == field)
    }

    /// All values of one field, in index order.
    pub fn column(&self, field: BarField) -> Option<Vec<Decimal>> {
        let col = self.position(field)?;
        Some(self.rows.iter().map(|row| row[col]).collect())
    }

    pub fn get(&self, time: NaiveDateTime, field: BarField) -> Option<Decimal> {
        let col = self.position(field)?;
        let row = self.index.binary_search(&time).ok()?;
        Some(self.rows[row][col])
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// One `(time, security)` row of a long panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongRow {
    pub time: NaiveDateTime,
    pub security: SecurityCode,
    /// `None` where the security has no bar at `time`
    pub values: Vec<Option<Decimal>>,
}

/// Long panel: columns `time, code, fields...`.
///
/// Every security gets a row for every timestamp of the union index, so a
/// panel of `n` securities over `k` timestamps has exactly `n * k` rows,
/// ordered by time and then by the requested security order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LongFrame {
    pub fields: Vec<BarField>,
    pub rows: Vec<LongRow>,
}

impl LongFrame {
    pub fn from_frames(fields: &[BarField], frames: &[SecurityFrame]) -> Self {
        let index = union_index(frames);
        let mut rows = Vec::with_capacity(index.len() * frames.len());
        for time in &index {
            for frame in frames {
                rows.push(LongRow {
                    time: *time,
                    security: frame.security.clone(),
                    values: fields.iter().map(|field| frame.get(*time, *field)).collect(),
                });
            }
        }
        Self {
            fields: fields.to_vec(),
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Wide panel: one row per timestamp, columns keyed `(field, security)`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WideFrame {
    pub fields: Vec<BarField>,
    pub securities: Vec<SecurityCode>,
    pub index: Vec<NaiveDateTime>,
    /// `cells[row][column]`, columns in [`WideFrame::columns`] order
    pub cells: Vec<Vec<Option<Decimal>>>,
}

impl WideFrame {
    pub fn from_frames(fields: &[BarField], frames: &[SecurityFrame]) -> Self {
        let index = union_index(frames);
        let cells = index
            .iter()
            .map(|time| {
                fields
                    .iter()
                    .flat_map(|field| frames.iter().map(move |frame| frame.get(*time, *field)))
                    .collect()
            })
            .collect();
        Self {
            fields: fields.to_vec(),
            securities: frames.iter().map(|frame| frame.security.clone()).collect(),
            index,
            cells,
        }
    }

    /// Column labels, field-major.
    pub fn columns(&self) -> Vec<(BarField, SecurityCode)> {
        self.fields
            .iter()
            .flat_map(|field| {
                self.securities
                    .iter()
                    .map(move |security| (*field, security.clone()))
            })
            .collect()
    }

    fn position(&self, field: BarField, security: &SecurityCode) -> Option<usize> {
        let f = self.fields.iter().position(|x| *x == field)?;
        let s = self.securities.iter().position(|x| x == security)?;
        Some(f * self.securities.len() + s)
    }

    pub fn column(&self, field: BarField, security: &SecurityCode) -> Option<Vec<Option<Decimal>>> {
        let col = self.position(field, security)?;
        Some(self.cells.iter().map(|row| row[col]).collect())
    }

    pub fn get(
        &self,
        time: NaiveDateTime,
        field: BarField,
        security: &SecurityCode,
    ) -> Option<Decimal> {
        let col = self.position(field, security)?;
        let row = self.index.binary_search(&time).ok()?;
        self.cells[row][col]
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// Output of a price query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceTable {
    Single(SecurityFrame),
    Long(LongFrame),
    Wide(WideFrame),
}

impl PriceTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            PriceTable::Single(frame) => frame.len(),
            PriceTable::Long(frame) => frame.len(),
            PriceTable::Wide(frame) => frame.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_single(&self) -> Option<&SecurityFrame> {
        match self {
            PriceTable::Single(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<&LongFrame> {
        match self {
            PriceTable::Long(frame) => Some(frame),
            _ => None,
        }
    }

    pub fn as_wide(&self) -> Option<&WideFrame> {
        match self {
            PriceTable::Wide(frame) => Some(frame),
            _ => None,
        }
    }
}

fn union_index(frames: &[SecurityFrame]) -> Vec<NaiveDateTime> {
    frames
        .iter()
        .flat_map(|frame| frame.index.iter().copied())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bullet_trade_market_data::Exchange;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn at(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 6, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn bar(security: &SecurityCode, d: u32, close: Decimal) -> Bar {
        Bar {
            security: security.clone(),
            timestamp: at(d),
            open: close,
            high: close,
            low: close,
            close,
            volume: dec!(1000),
            money: close * dec!(1000),
        }
    }

    fn frames() -> (SecurityCode, SecurityCode, Vec<SecurityFrame>) {
        let a = SecurityCode::new("000001", Exchange::Shenzhen);
        let b = SecurityCode::new("600000", Exchange::Shanghai);
        let fields = [BarField::Close];
        let fa = SecurityFrame::from_bars(
            a.clone(),
            &fields,
            &[bar(&a, 11, dec!(12.5)), bar(&a, 12, dec!(11))],
        );
        let fb = SecurityFrame::from_bars(
            b.clone(),
            &fields,
            &[bar(&b, 12, dec!(8.1)), bar(&b, 13, dec!(8.2))],
        );
        (a, b, vec![fa, fb])
    }

    #[test]
    fn test_security_frame_lookup() {
        let (a, _, frames) = frames();
        let frame = &frames[0];
        assert_eq!(frame.security, a);
        assert_eq!(frame.get(at(12), BarField::Close), Some(dec!(11)));
        assert_eq!(frame.get(at(13), BarField::Close), None);
        assert_eq!(frame.get(at(12), BarField::Open), None);
        assert_eq!(frame.column(BarField::Close), Some(vec![dec!(12.5), dec!(11)]));
    }

    #[test]
    fn test_wide_frame_uses_union_index() {
        let (a, b, frames) = frames();
        let wide = WideFrame::from_frames(&[BarField::Close], &frames);
        assert_eq!(wide.len(), 3);
        assert_eq!(
            wide.columns(),
            vec![(BarField::Close, a.clone()), (BarField::Close, b.clone())]
        );
        assert_eq!(
            wide.column(BarField::Close, &a),
            Some(vec![Some(dec!(12.5)), Some(dec!(11)), None])
        );
        assert_eq!(wide.get(at(13), BarField::Close, &b), Some(dec!(8.2)));
        assert_eq!(wide.get(at(11), BarField::Close, &b), None);
    }

    #[test]
    fn test_long_frame_has_row_per_time_and_security() {
        let (a, b, frames) = frames();
        let long = LongFrame::from_frames(&[BarField::Close], &frames);
        assert_eq!(long.len(), 6);
        assert_eq!(long.rows[0].time, at(11));
        assert_eq!(long.rows[0].security, a);
        assert_eq!(long.rows[1].security, b);
        assert_eq!(long.rows[1].values, vec![None]);
        assert_eq!(long.rows[3].values, vec![Some(dec!(8.1))]);
    }
}
