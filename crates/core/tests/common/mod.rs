#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{FixedOffset, NaiveDate, NaiveDateTime};

use bullet_trade_core::{MarketDataService, ProviderConfig, SessionContext, SimulationPhase};
use bullet_trade_market_data::normalize::date_to_millis;
use bullet_trade_market_data::{
    DataTerminal, Exchange, MarketDataError, Period, RawFrame, TerminalConventions, VendorAdjust,
    VendorCode,
};

pub const PING_AN: &str = "000001.XSHE";
pub const PING_AN_VENDOR: &str = "000001.SZ";
pub const PUDONG: &str = "600000.XSHG";
pub const PUDONG_VENDOR: &str = "600000.SH";

/// One vendor daily bar.
#[derive(Clone, Copy, Debug)]
pub struct SampleBar {
    pub date: NaiveDate,
    pub open: f64,
    pub close: f64,
}

pub fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

pub fn at(m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(m, d).and_hms_opt(h, min, 0).unwrap()
}

pub fn midnight(m: u32, d: u32) -> NaiveDateTime {
    at(m, d, 0, 0)
}

pub fn session(now: NaiveDateTime, phase: SimulationPhase) -> SessionContext {
    SessionContext::new(now, phase)
}

/// 2025-06-30 after the close.
pub fn after_close() -> SessionContext {
    session(at(6, 30, 15, 30), SimulationPhase::AfterClose)
}

/// Five bars with a cash dividend going ex on 2025-06-12.
pub fn ping_an_bars() -> Vec<SampleBar> {
    [
        (date(5, 20), 11.9, 12.0),
        (date(6, 11), 12.1, 12.5),
        (date(6, 12), 11.2, 11.0),
        (date(6, 13), 11.4, 11.5),
        (date(6, 30), 11.9, 12.2),
    ]
    .into_iter()
    .map(|(date, open, close)| SampleBar { date, open, close })
    .collect()
}

pub fn pudong_bars() -> Vec<SampleBar> {
    [
        (date(6, 11), 8.0, 8.1),
        (date(6, 12), 8.1, 8.2),
        (date(6, 13), 8.2, 8.3),
    ]
    .into_iter()
    .map(|(date, open, close)| SampleBar { date, open, close })
    .collect()
}

pub fn bar_frame(rows: &[SampleBar]) -> RawFrame {
    let offset = FixedOffset::east_opt(8 * 3600).unwrap();
    RawFrame::empty()
        .with_int("time", rows.iter().map(|r| date_to_millis(r.date, offset)).collect())
        .with_float("open", rows.iter().map(|r| r.open).collect())
        .with_float("high", rows.iter().map(|r| r.open.max(r.close) + 0.5).collect())
        .with_float("low", rows.iter().map(|r| r.open.min(r.close) - 0.5).collect())
        .with_float("close", rows.iter().map(|r| r.close).collect())
        .with_float("volume", rows.iter().map(|_| 1000.0).collect())
        .with_float("amount", rows.iter().map(|r| r.close * 1000.0).collect())
}

/// In-memory vendor terminal.
///
/// `remote` is what a download can fetch; reads only see rows that were
/// downloaded or preloaded into the local store.
pub struct FakeTerminal {
    per_base: u32,
    has_calendar: bool,
    download_delay: Duration,
    remote: HashMap<String, Vec<SampleBar>>,
    dividends: HashMap<String, Vec<(NaiveDate, f64)>>,
    index_members: HashMap<String, Vec<String>>,
    ticks: HashMap<String, Vec<(NaiveDateTime, f64)>>,
    local: Mutex<HashMap<String, BTreeMap<NaiveDate, SampleBar>>>,
    download_calls: Mutex<Vec<(String, NaiveDate, NaiveDate)>>,
    fail_downloads: AtomicBool,
    fail_dividends: AtomicBool,
}

impl FakeTerminal {
    pub fn new() -> Self {
        Self {
            per_base: 1,
            has_calendar: true,
            download_delay: Duration::ZERO,
            remote: HashMap::new(),
            dividends: HashMap::new(),
            index_members: HashMap::new(),
            ticks: HashMap::new(),
            local: Mutex::new(HashMap::new()),
            download_calls: Mutex::new(Vec::new()),
            fail_downloads: AtomicBool::new(false),
            fail_dividends: AtomicBool::new(false),
        }
    }

    /// Ping An with a 1.2 per share dividend, plus Pudong without actions.
    pub fn sample() -> Self {
        Self::new()
            .with_bars(PING_AN_VENDOR, ping_an_bars())
            .with_bars(PUDONG_VENDOR, pudong_bars())
            .with_dividend(PING_AN_VENDOR, date(6, 12), 1.2)
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<SampleBar>) -> Self {
        self.remote.insert(code.to_string(), bars);
        self
    }

    /// `cash` is per `per_base` shares.
    pub fn with_dividend(mut self, code: &str, ex_date: NaiveDate, cash: f64) -> Self {
        self.dividends
            .entry(code.to_string())
            .or_default()
            .push((ex_date, cash));
        self
    }

    pub fn with_index_members(mut self, index: &str, members: &[&str]) -> Self {
        self.index_members.insert(
            index.to_string(),
            members.iter().map(|code| code.to_string()).collect(),
        );
        self
    }

    /// Ticks in market-local time.
    pub fn with_ticks(mut self, code: &str, ticks: Vec<(NaiveDateTime, f64)>) -> Self {
        self.ticks.insert(code.to_string(), ticks);
        self
    }

    pub fn with_per_base(mut self, per_base: u32) -> Self {
        self.per_base = per_base;
        self
    }

    pub fn with_download_delay(mut self, delay: Duration) -> Self {
        self.download_delay = delay;
        self
    }

    pub fn without_calendar(mut self) -> Self {
        self.has_calendar = false;
        self
    }

    /// Copy every remote bar into the local store.
    pub fn preload(self) -> Self {
        {
            let mut local = self.local.lock().unwrap();
            for (code, bars) in &self.remote {
                let stored = local.entry(code.clone()).or_default();
                for bar in bars {
                    stored.insert(bar.date, *bar);
                }
            }
        }
        self
    }

    pub fn fail_downloads(&self, fail: bool) {
        self.fail_downloads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_dividends(&self, fail: bool) {
        self.fail_dividends.store(fail, Ordering::SeqCst);
    }

    pub fn download_calls(&self) -> Vec<(String, NaiveDate, NaiveDate)> {
        self.download_calls.lock().unwrap().clone()
    }

    fn link_down() -> MarketDataError {
        MarketDataError::Terminal {
            terminal: "QMT".to_string(),
            message: "link down".to_string(),
        }
    }
}

#[async_trait]
impl DataTerminal for FakeTerminal {
    fn id(&self) -> &'static str {
        "QMT"
    }

    fn conventions(&self) -> TerminalConventions {
        TerminalConventions {
            dividend_per_base: self.per_base,
            ..TerminalConventions::default()
        }
    }

    async fn download_history(
        &self,
        code: &VendorCode,
        _period: Period,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<(), MarketDataError> {
        self.download_calls
            .lock()
            .unwrap()
            .push((code.to_string(), start, end));
        tokio::task::yield_now().await;
        if !self.download_delay.is_zero() {
            tokio::time::sleep(self.download_delay).await;
        }
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(Self::link_down());
        }
        let mut local = self.local.lock().unwrap();
        let stored = local.entry(code.to_string()).or_default();
        for bar in self.remote.get(code.as_str()).into_iter().flatten() {
            if bar.date >= start && bar.date <= end {
                stored.insert(bar.date, *bar);
            }
        }
        Ok(())
    }

    async fn read_local(
        &self,
        code: &VendorCode,
        _period: Period,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        _adjust: VendorAdjust,
    ) -> Result<RawFrame, MarketDataError> {
        let local = self.local.lock().unwrap();
        let rows: Vec<SampleBar> = local
            .get(code.as_str())
            .into_iter()
            .flat_map(|stored| stored.values().copied())
            .filter(|bar| start.map_or(true, |s| bar.date >= s) && end.map_or(true, |e| bar.date <= e))
            .collect();
        if rows.is_empty() {
            return Ok(RawFrame::empty());
        }
        Ok(bar_frame(&rows))
    }

    async fn dividend_records(
        &self,
        code: &VendorCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Option<RawFrame>, MarketDataError> {
        if self.fail_dividends.load(Ordering::SeqCst) {
            return Err(Self::link_down());
        }
        let Some(records) = self.dividends.get(code.as_str()) else {
            return Ok(None);
        };
        let offset = FixedOffset::east_opt(8 * 3600).unwrap();
        let rows: Vec<&(NaiveDate, f64)> = records
            .iter()
            .filter(|(ex_date, _)| *ex_date >= start && *ex_date <= end)
            .collect();
        Ok(Some(
            RawFrame::empty()
                .with_int("time", rows.iter().map(|(d, _)| date_to_millis(*d, offset)).collect())
                .with_float("interest", rows.iter().map(|(_, cash)| *cash).collect()),
        ))
    }

    async fn index_members(
        &self,
        index: &VendorCode,
        _date: NaiveDate,
    ) -> Result<Vec<String>, MarketDataError> {
        Ok(self
            .index_members
            .get(index.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn tick_history(
        &self,
        code: &VendorCode,
        end: NaiveDateTime,
        count: usize,
    ) -> Result<RawFrame, MarketDataError> {
        let mut rows: Vec<(NaiveDateTime, f64)> = self
            .ticks
            .get(code.as_str())
            .into_iter()
            .flatten()
            .filter(|(time, _)| *time <= end)
            .copied()
            .collect();
        rows.sort_by_key(|(time, _)| *time);
        let excess = rows.len().saturating_sub(count);
        rows.drain(..excess);
        Ok(RawFrame::empty()
            .with_int(
                "time",
                rows.iter()
                    .map(|(time, _)| (*time - chrono::Duration::hours(8)).and_utc().timestamp_millis())
                    .collect(),
            )
            .with_float("lastPrice", rows.iter().map(|(_, price)| *price).collect()))
    }

    async fn trading_dates(
        &self,
        _exchange: Exchange,
        start: Option<NaiveDate>,
        end: NaiveDate,
        count: Option<usize>,
    ) -> Result<Vec<NaiveDate>, MarketDataError> {
        if !self.has_calendar {
            return Err(MarketDataError::NotSupported {
                operation: "trading_dates".to_string(),
                terminal: self.id().to_string(),
            });
        }
        let mut dates: Vec<NaiveDate> = self
            .remote
            .values()
            .flatten()
            .map(|bar| bar.date)
            .filter(|d| *d <= end && start.map_or(true, |s| *d >= s))
            .collect();
        dates.sort();
        dates.dedup();
        if let Some(count) = count {
            let excess = dates.len().saturating_sub(count);
            dates.drain(..excess);
        }
        Ok(dates)
    }
}

pub fn fast_retry() -> ProviderConfig {
    ProviderConfig {
        retry_backoff_ms: 1,
        ..ProviderConfig::default()
    }
}

pub fn service(terminal: &Arc<FakeTerminal>, config: &ProviderConfig) -> MarketDataService {
    MarketDataService::new(Arc::clone(terminal) as Arc<dyn DataTerminal>, config)
}
