use std::collections::BTreeMap;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;

use super::mode::AdjustMode;
use crate::models::{Bar, DividendEvent, SecurityCode};

/// Price ratio across one ex-date: ex-rights price over previous close.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FactorStep {
    pub ex_date: NaiveDate,
    pub factor: Decimal,
}

/// Adjustment factors for one security, mode and reference date.
///
/// Steps are chronological. Each step's ratio is taken against the raw
/// close before its own ex-date; cumulative factors are plain products of
/// step ratios.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdjustmentFactors {
    pub security: SecurityCode,
    pub mode: AdjustMode,
    pub reference_date: NaiveDate,
    steps: Vec<FactorStep>,
}

impl AdjustmentFactors {
    /// Compute factors from raw bars (sorted ascending) and events.
    ///
    /// An event qualifies when it belongs to `security`, its ex-date is not
    /// after `reference_date` and falls after the first bar. Events sharing
    /// an ex-date are combined into one step.
    pub fn compute(
        security: &SecurityCode,
        bars: &[Bar],
        events: &[DividendEvent],
        mode: AdjustMode,
        reference_date: NaiveDate,
    ) -> Self {
        let mut factors = Self {
            security: security.clone(),
            mode,
            reference_date,
            steps: Vec::new(),
        };
        let first_date = match bars.first() {
            Some(bar) if mode != AdjustMode::None => bar.date(),
            _ => return factors,
        };

        let mut by_date: BTreeMap<NaiveDate, Vec<&DividendEvent>> = BTreeMap::new();
        for event in events {
            if event.security != *security {
                debug!(
                    "Ignoring event for {} while adjusting {}",
                    event.security, security
                );
                continue;
            }
            if event.ex_date <= reference_date && event.ex_date > first_date {
                by_date.entry(event.ex_date).or_default().push(event);
            }
        }

        for (ex_date, group) in by_date {
            let before = bars.partition_point(|bar| bar.date() < ex_date);
            let Some(preclose) = before.checked_sub(1).map(|i| bars[i].close) else {
                continue;
            };
            match step_factor(preclose, &group) {
                Some(factor) => factors.steps.push(FactorStep { ex_date, factor }),
                None => warn!(
                    "Skipping corporate action for {} on {}: preclose {} gives no positive ex-rights price",
                    security, ex_date, preclose
                ),
            }
        }
        factors
    }

    pub fn steps(&self) -> &[FactorStep] {
        &self.steps
    }

    pub fn is_identity(&self) -> bool {
        self.steps.is_empty()
    }

    /// Cumulative multiplier for a bar dated `date`.
    pub fn factor_for(&self, date: NaiveDate) -> Decimal {
        match self.mode {
            AdjustMode::None => Decimal::ONE,
            AdjustMode::Front => self
                .steps
                .iter()
                .filter(|step| step.ex_date > date)
                .fold(Decimal::ONE, |acc, step| acc * step.factor),
            AdjustMode::Back => self
                .steps
                .iter()
                .filter(|step| step.ex_date <= date)
                .fold(Decimal::ONE, |acc, step| acc / step.factor),
        }
    }

    /// Apply to bars. Only bars whose factor differs from one are rounded.
    pub fn apply(&self, bars: &[Bar]) -> Vec<Bar> {
        bars.iter()
            .map(|bar| {
                let factor = self.factor_for(bar.date());
                if factor == Decimal::ONE {
                    bar.clone()
                } else {
                    bar.map_prices(|price| (price * factor).round_dp(PRICE_DECIMALS))
                }
            })
            .collect()
    }
}

/// Decimal places of adjusted prices.
pub const PRICE_DECIMALS: u32 = 2;

/// Ratio of ex-rights price to preclose for all events on one date.
///
/// `ex = (preclose - cash + allot_ratio * allot_price) / (1 + share_ratio + allot_ratio)`
fn step_factor(preclose: Decimal, events: &[&DividendEvent]) -> Option<Decimal> {
    if preclose <= Decimal::ZERO {
        return None;
    }
    let mut cash = Decimal::ZERO;
    let mut shares = Decimal::ZERO;
    let mut allot = Decimal::ZERO;
    let mut allot_value = Decimal::ZERO;
    for event in events {
        cash += event.cash_dividend_per_share();
        shares += event.share_ratio();
        allot += event.allotment_ratio();
        allot_value += event.allotment_ratio() * event.allotment_price;
    }
    let ex_price = (preclose - cash + allot_value) / (Decimal::ONE + shares + allot);
    if ex_price <= Decimal::ZERO {
        return None;
    }
    Some(ex_price / preclose)
}
