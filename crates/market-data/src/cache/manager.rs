use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, Offset, Utc};
use log::{debug, info, warn};

use super::entry::{CacheEntry, CacheKey};
use super::single_flight::SingleFlight;
use super::store::CacheStore;
use crate::errors::{MarketDataError, RetryClass};
use crate::models::{Exchange, Period, RawFrame, SecurityCode, VendorCode};
use crate::resolver::CodeResolver;
use crate::terminal::{DataTerminal, VendorAdjust};

/// Cache manager settings.
#[derive(Clone, Debug)]
pub struct CacheManagerConfig {
    /// When off, nothing is ever downloaded; reads serve whatever the
    /// terminal already has locally.
    pub auto_download: bool,
    /// Wait before the single retry of a failed terminal call.
    pub retry_backoff: Duration,
    /// Age after which an entry reaching its own refresh day is refetched.
    pub refresh_interval: Duration,
}

impl Default for CacheManagerConfig {
    fn default() -> Self {
        Self {
            auto_download: true,
            retry_backoff: Duration::from_millis(500),
            refresh_interval: Duration::from_secs(3600),
        }
    }
}

/// Keeps locally available vendor data covering what callers ask for.
///
/// Downloads are single-flighted per `(security, period)` and run as
/// spawned tasks; the cache entry is replaced only after the download and
/// the local re-read both succeed. A written entry never covers less than
/// the one it replaces.
pub struct CacheManager {
    terminal: Arc<dyn DataTerminal>,
    store: Arc<dyn CacheStore>,
    resolver: Arc<CodeResolver>,
    flights: SingleFlight<CacheKey, ()>,
    config: CacheManagerConfig,
    offset: FixedOffset,
}

impl CacheManager {
    pub fn new(
        terminal: Arc<dyn DataTerminal>,
        store: Arc<dyn CacheStore>,
        resolver: Arc<CodeResolver>,
        config: CacheManagerConfig,
    ) -> Self {
        let offset = terminal
            .conventions()
            .market_offset()
            .unwrap_or_else(|| Utc.fix());
        Self {
            terminal,
            store,
            resolver,
            flights: SingleFlight::new(),
            config,
            offset,
        }
    }

    pub fn auto_download(&self) -> bool {
        self.config.auto_download
    }

    pub fn terminal(&self) -> &Arc<dyn DataTerminal> {
        &self.terminal
    }

    fn vendor_code(&self, security: &SecurityCode) -> Result<VendorCode, MarketDataError> {
        self.resolver.to_vendor(security, self.terminal.id())
    }

    async fn cached(&self, key: &CacheKey) -> Option<CacheEntry> {
        match self.store.get(key).await {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Cache read failed for {}, treating as miss: {}", key, err);
                None
            }
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, start: NaiveDate, end: NaiveDate) -> bool {
        let interval = chrono::Duration::from_std(self.config.refresh_interval)
            .unwrap_or(chrono::Duration::MAX);
        entry.covers(start, end) && !entry.is_stale(end, Utc::now(), interval, self.offset)
    }

    /// Make sure `[start, end]` is available locally.
    ///
    /// Returns immediately when the cache already covers the range or when
    /// auto-download is off. Otherwise downloads the union of the cached
    /// and requested ranges; concurrent callers for the same key share one
    /// download.
    pub async fn ensure_range(
        &self,
        security: &SecurityCode,
        period: Period,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), MarketDataError> {
        let key = CacheKey::new(security.clone(), period);
        let code = self.vendor_code(security)?;

        // A joined download may have been for a narrower range.
        for _ in 0..2 {
            let cached = self.cached(&key).await;
            if let Some(entry) = &cached {
                if self.is_fresh(entry, start, end) {
                    debug!("Cache hit for {} [{} .. {}]", key, start, end);
                    return Ok(());
                }
            }
            if !self.config.auto_download {
                debug!("Auto-download disabled, serving {} from local data", key);
                return Ok(());
            }

            let (from, to) = match &cached {
                Some(entry) => (entry.covered_start.min(start), entry.covered_end.max(end)),
                None => (start, end),
            };
            let terminal = Arc::clone(&self.terminal);
            let store = Arc::clone(&self.store);
            let task_key = key.clone();
            let task_code = code.clone();
            let backoff = self.config.retry_backoff;
            self.flights
                .run(key.clone(), move || async move {
                    download_range(terminal, store, task_key, task_code, from, to, backoff).await
                })
                .await?;
        }
        Ok(())
    }

    /// Raw bars for a security.
    ///
    /// With [`VendorAdjust::None`] the cached frame is served; on a miss the
    /// terminal's local store is read without downloading. Other adjust
    /// types go straight to the terminal.
    pub async fn read(
        &self,
        security: &SecurityCode,
        period: Period,
        adjust: VendorAdjust,
    ) -> Result<RawFrame, MarketDataError> {
        let code = self.vendor_code(security)?;
        if adjust == VendorAdjust::None {
            let key = CacheKey::new(security.clone(), period);
            if let Some(entry) = self.cached(&key).await {
                return Ok(entry.frame);
            }
            debug!("Cache miss for {}, reading terminal local data", key);
        }
        with_retry(self.terminal.id(), self.config.retry_backoff, || {
            self.terminal.read_local(&code, period, None, None, adjust)
        })
        .await
    }

    /// Raw corporate-action records straight from the terminal.
    pub async fn dividend_records(
        &self,
        security: &SecurityCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<RawFrame>, MarketDataError> {
        let code = self.vendor_code(security)?;
        with_retry(self.terminal.id(), self.config.retry_backoff, || {
            self.terminal.dividend_records(&code, start, end)
        })
        .await
    }

    /// Trading calendar straight from the terminal.
    pub async fn trading_dates(
        &self,
        exchange: Exchange,
        start: Option<NaiveDate>,
        end: NaiveDate,
        count: Option<usize>,
    ) -> Result<Vec<NaiveDate>, MarketDataError> {
        with_retry(self.terminal.id(), self.config.retry_backoff, || {
            self.terminal.trading_dates(exchange, start, end, count)
        })
        .await
    }

    /// Index constituents straight from the terminal, as vendor codes.
    pub async fn index_members(
        &self,
        index: &SecurityCode,
        date: NaiveDate,
    ) -> Result<Vec<String>, MarketDataError> {
        let code = self.vendor_code(index)?;
        with_retry(self.terminal.id(), self.config.retry_backoff, || {
            self.terminal.index_members(&code, date)
        })
        .await
    }

    /// Raw tick frame straight from the terminal.
    pub async fn tick_history(
        &self,
        security: &SecurityCode,
        end: NaiveDateTime,
        count: usize,
    ) -> Result<RawFrame, MarketDataError> {
        let code = self.vendor_code(security)?;
        with_retry(self.terminal.id(), self.config.retry_backoff, || {
            self.terminal.tick_history(&code, end, count)
        })
        .await
    }

    /// Drop the cached entry for a key.
    pub async fn invalidate(
        &self,
        security: &SecurityCode,
        period: Period,
    ) -> Result<(), MarketDataError> {
        self.store
            .remove(&CacheKey::new(security.clone(), period))
            .await
    }
}

async fn download_range(
    terminal: Arc<dyn DataTerminal>,
    store: Arc<dyn CacheStore>,
    key: CacheKey,
    code: VendorCode,
    start: NaiveDate,
    end: NaiveDate,
    backoff: Duration,
) -> Result<(), MarketDataError> {
    let failed = |err: MarketDataError| {
        warn!("Download of {} [{} .. {}] failed: {}", key, start, end, err);
        MarketDataError::Download {
            security: key.security.to_string(),
            message: err.to_string(),
        }
    };

    info!(
        "Downloading {} ({}) [{} .. {}] via {}",
        key,
        code,
        start,
        end,
        terminal.id()
    );
    with_retry(terminal.id(), backoff, || {
        terminal.download_history(&code, key.period, start, end)
    })
    .await
    .map_err(failed)?;

    // A flight started from an older snapshot may be narrower than what
    // another flight has cached since.
    let (covered_start, covered_end) = match store.get(&key).await {
        Ok(Some(entry)) => (entry.covered_start.min(start), entry.covered_end.max(end)),
        Ok(None) => (start, end),
        Err(err) => {
            warn!("Cache read failed for {}, caching the download only: {}", key, err);
            (start, end)
        }
    };
    let frame = with_retry(terminal.id(), backoff, || {
        terminal.read_local(
            &code,
            key.period,
            Some(covered_start),
            Some(covered_end),
            VendorAdjust::None,
        )
    })
    .await
    .map_err(failed)?;

    debug!(
        "Caching {} rows for {} [{} .. {}]",
        frame.len(),
        key,
        covered_start,
        covered_end
    );
    store
        .put(CacheEntry {
            key: key.clone(),
            frame,
            covered_start,
            covered_end,
            last_refreshed_at: Utc::now(),
        })
        .await
}

/// One attempt, plus a single retry after `backoff` for transient errors.
async fn with_retry<T, F, Fut>(
    terminal: &str,
    backoff: Duration,
    mut call: F,
) -> Result<T, MarketDataError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, MarketDataError>>,
{
    match call().await {
        Err(err) if err.retry_class() == RetryClass::WithBackoff => {
            warn!(
                "{} call failed, retrying in {:?}: {}",
                terminal, backoff, err
            );
            tokio::time::sleep(backoff).await;
            call().await
        }
        result => result,
    }
}
