//! Vendor column names.

pub const TIME: &str = "time";
pub const OPEN: &str = "open";
pub const HIGH: &str = "high";
pub const LOW: &str = "low";
pub const CLOSE: &str = "close";
pub const VOLUME: &str = "volume";
/// Traded value as vendors name it; canonical bars call it `money`.
pub const AMOUNT: &str = "amount";
pub const MONEY: &str = "money";

pub const INTEREST: &str = "interest";
pub const STOCK_BONUS: &str = "stockBonus";
pub const STOCK_GIFT: &str = "stockGift";
pub const ALLOT_NUM: &str = "allotNum";
pub const ALLOT_PRICE: &str = "allotPrice";

/// Tick frames: `time` plus the last traded price.
pub const LAST_PRICE: &str = "lastPrice";
