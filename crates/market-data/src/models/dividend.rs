use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::security::SecurityCode;

/// Share base every event is expressed in after normalization.
pub const CANONICAL_PER_BASE: u32 = 10;

/// A dividend, bonus-share or rights-issue event.
///
/// Quantities are per `per_base` shares: `cash_per_base = 12.0` with
/// `per_base = 10` means 1.2 per share.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DividendEvent {
    pub security: SecurityCode,
    pub ex_date: NaiveDate,
    pub per_base: u32,
    /// Pre-tax cash dividend per base
    pub cash_per_base: Decimal,
    /// Bonus shares (capitalised from profit) per base
    pub bonus_shares_per_base: Decimal,
    /// Gift shares (capitalised from reserves) per base
    pub gift_shares_per_base: Decimal,
    /// Rights-issue shares offered per base
    pub allotment_shares_per_base: Decimal,
    /// Subscription price of one allotted share
    pub allotment_price: Decimal,
}

impl DividendEvent {
    /// Cash-only event expressed in the canonical base.
    pub fn cash(security: SecurityCode, ex_date: NaiveDate, per_share: Decimal) -> Self {
        Self {
            security,
            ex_date,
            per_base: CANONICAL_PER_BASE,
            cash_per_base: per_share * Decimal::from(CANONICAL_PER_BASE),
            bonus_shares_per_base: Decimal::ZERO,
            gift_shares_per_base: Decimal::ZERO,
            allotment_shares_per_base: Decimal::ZERO,
            allotment_price: Decimal::ZERO,
        }
    }

    fn base(&self) -> Decimal {
        Decimal::from(self.per_base.max(1))
    }

    pub fn cash_dividend_per_share(&self) -> Decimal {
        self.cash_per_base / self.base()
    }

    /// New shares received per held share, bonus and gift combined.
    pub fn share_ratio(&self) -> Decimal {
        (self.bonus_shares_per_base + self.gift_shares_per_base) / self.base()
    }

    pub fn allotment_ratio(&self) -> Decimal {
        self.allotment_shares_per_base / self.base()
    }

    /// Same event re-expressed per `per_base` shares.
    pub fn rescaled(&self, per_base: u32) -> Self {
        let scale = Decimal::from(per_base.max(1)) / self.base();
        Self {
            per_base: per_base.max(1),
            cash_per_base: self.cash_per_base * scale,
            bonus_shares_per_base: self.bonus_shares_per_base * scale,
            gift_shares_per_base: self.gift_shares_per_base * scale,
            allotment_shares_per_base: self.allotment_shares_per_base * scale,
            ..self.clone()
        }
    }
}
