//! Corporate-action price adjustment.
//!
//! - `none` returns bars untouched.
//! - `front` scales bars before each qualifying ex-date down onto the
//!   reference date's price level.
//! - `back` scales bars on or after each ex-date up onto the first bar's
//!   price level.
//!
//! Only events dated on or before the reference date are applied, so a
//! backtest never sees the effect of an action it could not yet know of.
//! `volume` and `money` are never changed.

mod factors;
mod mode;

pub use factors::{AdjustmentFactors, FactorStep, PRICE_DECIMALS};
pub use mode::AdjustMode;

use chrono::NaiveDate;

use crate::models::{Bar, DividendEvent};

/// Adjust raw bars of one security.
pub fn adjust(
    bars: &[Bar],
    events: &[DividendEvent],
    mode: AdjustMode,
    reference_date: NaiveDate,
) -> Vec<Bar> {
    let Some(first) = bars.first() else {
        return Vec::new();
    };
    if mode == AdjustMode::None {
        return bars.to_vec();
    }
    let factors = AdjustmentFactors::compute(&first.security, bars, events, mode, reference_date);
    if factors.is_identity() {
        return bars.to_vec();
    }
    factors.apply(bars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Exchange, SecurityCode, CANONICAL_PER_BASE};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    fn code() -> SecurityCode {
        SecurityCode::new("000001", Exchange::Shenzhen)
    }

    fn bar(m: u32, d: u32, close: Decimal) -> Bar {
        Bar {
            security: code(),
            timestamp: date(m, d).and_hms_opt(0, 0, 0).unwrap(),
            open: close,
            high: close + dec!(0.2),
            low: close - dec!(0.2),
            close,
            volume: dec!(1000),
            money: close * dec!(1000),
        }
    }

    fn sample_bars() -> Vec<Bar> {
        vec![
            bar(5, 20, dec!(12.0)),
            bar(6, 11, dec!(12.5)),
            bar(6, 12, dec!(11.0)),
            bar(6, 13, dec!(11.5)),
            bar(6, 30, dec!(12.2)),
        ]
    }

    fn cash(m: u32, d: u32, per_share: Decimal) -> DividendEvent {
        DividendEvent::cash(code(), date(m, d), per_share)
    }

    #[test]
    fn test_none_is_identity() {
        let bars = sample_bars();
        let out = adjust(&bars, &[cash(6, 12, dec!(1.2))], AdjustMode::None, date(6, 30));
        assert_eq!(out, bars);
    }

    #[test]
    fn test_front_cash_dividend() {
        let bars = sample_bars();
        let out = adjust(&bars, &[cash(6, 12, dec!(1.2))], AdjustMode::Front, date(6, 12));

        // (12.5 - 1.2) / 12.5 = 0.904
        assert_eq!(out[1].close, dec!(11.30));
        assert_eq!(out[0].close, dec!(10.85));
        assert_eq!(out[0].high, dec!(11.03));
        // On and after the ex-date nothing moves
        assert_eq!(out[2..], bars[2..]);
    }

    #[test]
    fn test_front_leaves_volume_and_money() {
        let bars = sample_bars();
        let out = adjust(&bars, &[cash(6, 12, dec!(1.2))], AdjustMode::Front, date(6, 30));
        for (raw, adjusted) in bars.iter().zip(&out) {
            assert_eq!(raw.volume, adjusted.volume);
            assert_eq!(raw.money, adjusted.money);
        }
    }

    #[test]
    fn test_events_after_reference_date_are_ignored() {
        let bars = sample_bars();
        let out = adjust(&bars, &[cash(6, 12, dec!(1.2))], AdjustMode::Front, date(6, 11));
        assert_eq!(out, bars);
    }

    #[test]
    fn test_event_on_first_bar_is_ignored() {
        let bars = sample_bars();
        let out = adjust(&bars, &[cash(5, 20, dec!(1.2))], AdjustMode::Front, date(6, 30));
        assert_eq!(out, bars);
    }

    #[test]
    fn test_other_security_events_are_not_applied() {
        let bars = sample_bars();
        let mut foreign = cash(6, 12, dec!(1.2));
        foreign.security = SecurityCode::new("600000", Exchange::Shanghai);
        let out = adjust(&bars, &[foreign], AdjustMode::Front, date(6, 30));
        assert_eq!(out, bars);
    }

    #[test]
    fn test_same_date_events_combine() {
        let bars = sample_bars();
        let split = [cash(6, 12, dec!(0.5)), cash(6, 12, dec!(0.7))];
        let single = [cash(6, 12, dec!(1.2))];
        assert_eq!(
            adjust(&bars, &split, AdjustMode::Front, date(6, 30)),
            adjust(&bars, &single, AdjustMode::Front, date(6, 30))
        );
    }

    #[test]
    fn test_multiple_events_compound_chronologically() {
        let bars = vec![
            bar(6, 2, dec!(10)),
            bar(6, 3, dec!(9)),
            bar(6, 4, dec!(9)),
            bar(6, 5, dec!(8.1)),
        ];
        // 0.9 at each ex-date, each against its own raw preclose
        let events = [cash(6, 3, dec!(1)), cash(6, 5, dec!(0.9))];
        let factors =
            AdjustmentFactors::compute(&code(), &bars, &events, AdjustMode::Front, date(6, 5));
        assert_eq!(factors.steps().len(), 2);
        assert_eq!(factors.factor_for(date(6, 2)), dec!(0.81));
        assert_eq!(factors.factor_for(date(6, 4)), dec!(0.9));
        assert_eq!(factors.factor_for(date(6, 5)), Decimal::ONE);

        let out = factors.apply(&bars);
        assert_eq!(out[0].close, dec!(8.10));
        assert_eq!(out[1].close, dec!(8.10));
        assert_eq!(out[3].close, dec!(8.1));
    }

    #[test]
    fn test_back_mirrors_front() {
        let bars = sample_bars();
        let out = adjust(&bars, &[cash(6, 12, dec!(1.2))], AdjustMode::Back, date(6, 30));
        assert_eq!(out[0..2], bars[0..2]);
        // 11.0 / 0.904 = 12.168...
        assert_eq!(out[2].close, dec!(12.17));
        assert_eq!(out[3].close, dec!(12.72));
        assert_eq!(out[4].close, dec!(13.50));
    }

    #[test]
    fn test_bonus_shares_halve_price() {
        let bars = vec![bar(6, 2, dec!(10)), bar(6, 3, dec!(5))];
        let event = DividendEvent {
            bonus_shares_per_base: Decimal::from(CANONICAL_PER_BASE),
            ..cash(6, 3, Decimal::ZERO)
        };
        let out = adjust(&bars, &[event], AdjustMode::Front, date(6, 3));
        assert_eq!(out[0].close, dec!(5.00));
    }

    #[test]
    fn test_rights_issue_factor() {
        let bars = vec![bar(6, 2, dec!(10)), bar(6, 3, dec!(9))];
        let event = DividendEvent {
            allotment_shares_per_base: dec!(3),
            allotment_price: dec!(5),
            ..cash(6, 3, Decimal::ZERO)
        };
        let factors =
            AdjustmentFactors::compute(&code(), &bars, &[event], AdjustMode::Front, date(6, 3));
        // (10 + 0.3 * 5) / 1.3 / 10
        let expected = dec!(11.5) / dec!(1.3) / dec!(10);
        let diff = (factors.factor_for(date(6, 2)) - expected).abs();
        assert!(diff < dec!(0.0000001));
    }

    #[test]
    fn test_dividend_larger_than_price_is_skipped() {
        let bars = vec![bar(6, 2, dec!(1)), bar(6, 3, dec!(1))];
        let out = adjust(&bars, &[cash(6, 3, dec!(2))], AdjustMode::Front, date(6, 3));
        assert_eq!(out, bars);
    }

    #[test]
    fn test_empty_bars() {
        assert!(adjust(&[], &[cash(6, 12, dec!(1.2))], AdjustMode::Front, date(6, 30)).is_empty());
    }
}
