/// Environment variable selecting `backtest` or `live`
pub const ENV_MODE: &str = "DATA_MODE";

/// Environment variable forcing auto-download on or off
pub const ENV_AUTO_DOWNLOAD: &str = "DATA_AUTO_DOWNLOAD";

/// Environment variable pointing at the on-disk cache directory
pub const ENV_CACHE_DIR: &str = "DATA_CACHE_DIR";

/// Environment variable for the retry backoff in milliseconds
pub const ENV_RETRY_BACKOFF_MS: &str = "DATA_RETRY_BACKOFF_MS";

/// Environment variable for the cache refresh interval in seconds
pub const ENV_REFRESH_INTERVAL_SECS: &str = "DATA_REFRESH_INTERVAL_SECS";

pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 500;

pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 3600;

/// Calendar days of history used to seed a synthetic tick
pub const TICK_SEED_LOOKBACK_DAYS: i64 = 30;
