use bullet_trade_market_data::Exchange;

/// Exchange whose calendar sizes `count` windows and answers trade-day queries
pub const CALENDAR_EXCHANGE: Exchange = Exchange::Shanghai;

/// Extra trading days loaded ahead of a `count` window
pub const COUNT_WINDOW_PADDING_DAYS: usize = 1;

/// Calendar days per trading day assumed when the terminal has no calendar
pub const CALENDAR_DAYS_PER_TRADING_DAY: i64 = 2;

/// Calendar days added to the fallback window for holidays
pub const CALENDAR_FALLBACK_SLACK_DAYS: i64 = 10;
