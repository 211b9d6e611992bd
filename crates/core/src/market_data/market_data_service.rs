use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use futures::future::try_join_all;
use log::{debug, info, warn};

use bullet_trade_market_data::{
    adjust, AdjustMode, Bar, CacheManager, CacheManagerConfig, CacheStore, CodeResolver,
    DataTerminal, DiskCacheStore, DividendEvent, Exchange, MarketDataError, MemoryCacheStore,
    Normalizer, Period, SecurityCode, VendorAdjust,
};

use super::market_data_constants::*;
use super::market_data_model::{PanelShape, PriceQuery, PriceRange, Securities};
use super::market_data_traits::MarketDataServiceTrait;
use super::price_table::{LongFrame, PriceTable, SecurityFrame, WideFrame};
use crate::config::ProviderConfig;
use crate::constants::TICK_SEED_LOOKBACK_DAYS;
use crate::errors::{Error, Result};
use crate::guard::{FieldTiming, FutureDataError, QueryBoundary, SimulationPhase, TemporalGuard};
use crate::session::{SessionContext, Tick, TickSource};

pub struct MarketDataService {
    cache: CacheManager,
    normalizer: Normalizer,
    resolver: Arc<CodeResolver>,
}

impl MarketDataService {
    /// Service over `terminal`, caching on disk when `cache_dir` is set.
    pub fn new(terminal: Arc<dyn DataTerminal>, config: &ProviderConfig) -> Self {
        let store: Arc<dyn CacheStore> = match &config.cache_dir {
            Some(dir) => {
                info!("Using market data cache at {}", dir.display());
                Arc::new(DiskCacheStore::new(dir.clone()))
            }
            None => Arc::new(MemoryCacheStore::new()),
        };
        Self::with_store(
            terminal,
            store,
            Arc::new(CodeResolver::new()),
            config.cache_manager_config(),
        )
    }

    pub fn with_store(
        terminal: Arc<dyn DataTerminal>,
        store: Arc<dyn CacheStore>,
        resolver: Arc<CodeResolver>,
        config: CacheManagerConfig,
    ) -> Self {
        let normalizer = Normalizer::new(
            terminal.id(),
            terminal.conventions(),
            Arc::clone(&resolver),
        );
        let cache = CacheManager::new(terminal, store, Arc::clone(&resolver), config);
        Self {
            cache,
            normalizer,
            resolver,
        }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    /// Resolve every code, dropping repeats but keeping request order.
    fn resolve_all(&self, securities: &Securities) -> Result<Vec<SecurityCode>> {
        let mut resolved: Vec<SecurityCode> = Vec::new();
        for raw in securities.codes() {
            let code = self.resolve(raw)?;
            if !resolved.contains(&code) {
                resolved.push(code);
            }
        }
        if resolved.is_empty() {
            return Err(Error::InvalidQuery("no securities requested".to_string()));
        }
        Ok(resolved)
    }

    /// First date that has to be loaded for `range`.
    async fn window_start(&self, range: PriceRange, period: Period) -> Result<NaiveDate> {
        match range {
            PriceRange::Between { start, end } => {
                if start > end.day() {
                    return Err(Error::InvalidQuery(format!(
                        "start {} is after end {}",
                        start, end
                    )));
                }
                Ok(start)
            }
            PriceRange::Count { end, count } => {
                if count == 0 {
                    return Err(Error::InvalidQuery("count must be positive".to_string()));
                }
                let sessions = count
                    .div_ceil(period.bars_per_session())
                    .checked_add(COUNT_WINDOW_PADDING_DAYS)
                    .ok_or_else(|| Error::InvalidQuery(format!("count {} is too large", count)))?;
                let start = match self
                    .cache
                    .trading_dates(CALENDAR_EXCHANGE, None, end.day(), Some(sessions))
                    .await
                {
                    Ok(dates) => dates.first().copied(),
                    Err(err) => {
                        debug!(
                            "No trading calendar for count window ({}), using calendar days",
                            err
                        );
                        None
                    }
                };
                Ok(start.unwrap_or_else(|| calendar_window_start(end.day(), sessions)))
            }
        }
    }

    /// Unadjusted bars dated `[start, end]`.
    ///
    /// A failed download falls back to whatever is already available
    /// locally; the download error surfaces only when that is nothing.
    async fn load_bars(
        &self,
        security: &SecurityCode,
        period: Period,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Bar>> {
        let download_error = self.cache.ensure_range(security, period, start, end).await.err();
        if let Some(err) = &download_error {
            if !err.is_download() {
                return Err(err.clone().into());
            }
            warn!("Serving {} from local data: {}", security, err);
        }

        let frame = match self.cache.read(security, period, VendorAdjust::None).await {
            Ok(frame) => frame,
            Err(err) => return Err(download_error.unwrap_or(err).into()),
        };
        let bars: Vec<Bar> = self
            .normalizer
            .normalize(&frame, security, period)?
            .into_iter()
            .filter(|bar| bar.date() >= start && bar.date() <= end)
            .collect();

        match download_error {
            Some(err) if bars.is_empty() => Err(err.into()),
            _ => Ok(bars),
        }
    }

    /// Corporate actions with an ex-date in `[start, end]`.
    ///
    /// Vendor failures degrade to an empty list; malformed records do not.
    async fn load_events(
        &self,
        security: &SecurityCode,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DividendEvent>> {
        let frame = match self.cache.dividend_records(security, start, end).await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                debug!("No corporate actions recorded for {}", security);
                return Ok(Vec::new());
            }
            Err(MarketDataError::Schema(err)) => return Err(err.into()),
            Err(err) => {
                warn!(
                    "Corporate actions for {} unavailable, assuming none: {}",
                    security, err
                );
                return Ok(Vec::new());
            }
        };
        Ok(self
            .normalizer
            .normalize_dividends(&frame, security)?
            .into_iter()
            .filter(|event| {
                event.security == *security && event.ex_date >= start && event.ex_date <= end
            })
            .collect())
    }

    async fn load_security(
        &self,
        security: &SecurityCode,
        query: &PriceQuery,
        start: NaiveDate,
        load_end: NaiveDate,
        reference: NaiveDate,
    ) -> Result<Vec<Bar>> {
        let bars = self.load_bars(security, query.period, start, load_end).await?;

        let first_date = bars.first().map(Bar::date);
        let mut bars = match first_date {
            Some(first) if query.mode != AdjustMode::None && first < reference => {
                let events = self.load_events(security, first, reference).await?;
                adjust(&bars, &events, query.mode, reference)
            }
            _ => bars,
        };

        let end = query.range.end();
        bars.retain(|bar| match end {
            QueryBoundary::Date(day) => bar.date() <= day,
            QueryBoundary::Instant(at) => bar.timestamp <= at,
        });
        if let PriceRange::Count { count, .. } = query.range {
            let excess = bars.len().saturating_sub(count);
            bars.drain(..excess);
        }
        Ok(bars)
    }

    /// Last price visible in the current phase, from daily bars.
    async fn seed_tick(&self, ctx: &SessionContext, security: &SecurityCode) -> Option<Tick> {
        let today = ctx.today();
        let start = today - Duration::days(TICK_SEED_LOOKBACK_DAYS);
        let bars = match self.load_bars(security, Period::Daily, start, today).await {
            Ok(bars) => bars,
            Err(err) => {
                warn!("Could not seed a tick for {}: {}", security, err);
                return None;
            }
        };

        let previous_close = bars
            .iter()
            .rev()
            .find(|bar| bar.date() < today)
            .map(|bar| bar.close);
        let price = match ctx.phase() {
            SimulationPhase::BeforeOpen => previous_close,
            SimulationPhase::Intraday => bars
                .iter()
                .find(|bar| bar.date() == today)
                .map(|bar| bar.open)
                .or(previous_close),
            SimulationPhase::AfterClose => bars.last().map(|bar| bar.close),
        }?;
        Some(Tick {
            security: security.clone(),
            time: ctx.now(),
            last_price: price,
            source: TickSource::Synthetic,
        })
    }
}

/// Calendar-day estimate of where `sessions` trading days before `end`
/// begin, clamped to the earliest representable date.
fn calendar_window_start(end: NaiveDate, sessions: usize) -> NaiveDate {
    i64::try_from(sessions)
        .ok()
        .and_then(|n| n.checked_mul(CALENDAR_DAYS_PER_TRADING_DAY))
        .and_then(|days| days.checked_add(CALENDAR_FALLBACK_SLACK_DAYS))
        .and_then(Duration::try_days)
        .and_then(|span| end.checked_sub_signed(span))
        .unwrap_or(NaiveDate::MIN)
}

/// Last instant covered by `end`, never past `now`.
fn tick_cutoff(end: QueryBoundary, now: NaiveDateTime) -> NaiveDateTime {
    let last = match end {
        QueryBoundary::Instant(at) => at,
        QueryBoundary::Date(day) => day
            .succ_opt()
            .and_then(|next| {
                next.and_time(NaiveTime::MIN)
                    .checked_sub_signed(Duration::milliseconds(1))
            })
            .unwrap_or(now),
    };
    last.min(now)
}

/// Reject adjustment against a day the session has not reached.
fn check_reference_date(ctx: &SessionContext, reference: NaiveDate) -> Result<()> {
    if reference > ctx.today() {
        return Err(FutureDataError {
            phase: ctx.phase(),
            now: ctx.now(),
            end: QueryBoundary::Date(reference),
            reason: "adjustment reference date is after the current trading day",
        }
        .into());
    }
    Ok(())
}

fn check_date_order(start: NaiveDate, end: NaiveDate) -> Result<()> {
    if start > end {
        return Err(Error::InvalidQuery(format!(
            "start {} is after end {}",
            start, end
        )));
    }
    Ok(())
}

#[async_trait]
impl MarketDataServiceTrait for MarketDataService {
    fn resolve(&self, code: &str) -> Result<SecurityCode> {
        self.resolver.canonical(code).map_err(Error::from)
    }

    async fn get_price(&self, ctx: &SessionContext, query: &PriceQuery) -> Result<PriceTable> {
        let fields = query.resolved_fields();
        let end = query.range.end();
        TemporalGuard::validate(
            ctx.phase(),
            ctx.now(),
            end,
            query.period,
            FieldTiming::from_fields(&fields),
        )?;

        let reference = query.reference_date.unwrap_or_else(|| ctx.today());
        let load_end = if query.mode == AdjustMode::None {
            end.day()
        } else {
            check_reference_date(ctx, reference)?;
            end.day().max(reference)
        };

        let securities = self.resolve_all(&query.securities)?;
        let start = self.window_start(query.range, query.period).await?;
        debug!(
            "get_price {} securities [{} .. {}] {} {} ref {}",
            securities.len(),
            start,
            end,
            query.period,
            query.mode.as_str(),
            reference
        );

        let loaded = try_join_all(
            securities
                .iter()
                .map(|security| self.load_security(security, query, start, load_end, reference)),
        )
        .await?;
        let mut frames: Vec<SecurityFrame> = securities
            .into_iter()
            .zip(loaded)
            .map(|(security, bars)| SecurityFrame::from_bars(security, &fields, &bars))
            .collect();

        if frames.len() == 1 {
            if let Some(frame) = frames.pop() {
                return Ok(PriceTable::Single(frame));
            }
        }
        Ok(match query.panel {
            PanelShape::Long => PriceTable::Long(LongFrame::from_frames(&fields, &frames)),
            PanelShape::Wide => PriceTable::Wide(WideFrame::from_frames(&fields, &frames)),
        })
    }

    async fn get_split_dividend(
        &self,
        ctx: &SessionContext,
        security: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<DividendEvent>> {
        TemporalGuard::validate(
            ctx.phase(),
            ctx.now(),
            QueryBoundary::Date(end),
            Period::Daily,
            FieldTiming::Finalized,
        )?;
        check_date_order(start, end)?;
        let code = self.resolve(security)?;
        self.load_events(&code, start, end).await
    }

    async fn get_trade_days(
        &self,
        ctx: &SessionContext,
        exchange: Exchange,
        start: Option<NaiveDate>,
        end: NaiveDate,
        count: Option<usize>,
    ) -> Result<Vec<NaiveDate>> {
        TemporalGuard::validate(
            ctx.phase(),
            ctx.now(),
            QueryBoundary::Date(end),
            Period::Daily,
            FieldTiming::Finalized,
        )?;
        if let Some(start) = start {
            check_date_order(start, end)?;
        }
        let dates = self
            .cache
            .trading_dates(exchange, start, end, count)
            .await?;
        Ok(dates
            .into_iter()
            .filter(|date| *date <= end && start.map_or(true, |start| *date >= start))
            .collect())
    }

    async fn get_index_stocks(
        &self,
        ctx: &SessionContext,
        index: &str,
        date: NaiveDate,
    ) -> Result<Vec<SecurityCode>> {
        TemporalGuard::validate(
            ctx.phase(),
            ctx.now(),
            QueryBoundary::Date(date),
            Period::Daily,
            FieldTiming::Finalized,
        )?;
        let index = self.resolve(index)?;
        let members = self.cache.index_members(&index, date).await?;

        let mut codes: Vec<SecurityCode> = Vec::with_capacity(members.len());
        for raw in &members {
            match self.normalizer.canonical_code(raw) {
                Ok(code) if !codes.contains(&code) => codes.push(code),
                Ok(_) => {}
                Err(err) => warn!("Dropping member {} of {}: {}", raw, index, err),
            }
        }
        debug!("{} has {} members on {}", index, codes.len(), date);
        Ok(codes)
    }

    async fn get_ticks(
        &self,
        ctx: &SessionContext,
        security: &str,
        end: QueryBoundary,
        count: usize,
    ) -> Result<Vec<Tick>> {
        // A tick is final the instant it prints.
        TemporalGuard::validate(
            ctx.phase(),
            ctx.now(),
            end,
            Period::Minute1,
            FieldTiming::OpenOnly,
        )?;
        if count == 0 {
            return Err(Error::InvalidQuery("count must be positive".to_string()));
        }
        let code = self.resolve(security)?;
        let cutoff = tick_cutoff(end, ctx.now());
        let frame = self.cache.tick_history(&code, cutoff, count).await?;

        let mut ticks = self.normalizer.normalize_ticks(&frame, &code)?;
        ticks.retain(|tick| tick.time <= cutoff);
        let excess = ticks.len().saturating_sub(count);
        ticks.drain(..excess);
        Ok(ticks)
    }

    async fn subscribe_ticks(
        &self,
        ctx: &mut SessionContext,
        securities: &Securities,
    ) -> Result<Vec<SecurityCode>> {
        let codes = self.resolve_all(securities)?;
        for code in &codes {
            if ctx.ticks().is_subscribed(code) {
                continue;
            }
            let seed = self.seed_tick(ctx, code).await;
            if seed.is_none() {
                debug!("Subscribed {} without a visible price", code);
            }
            ctx.ticks_mut().subscribe(code.clone(), seed);
        }
        info!("Subscribed to ticks for {} securities", codes.len());
        Ok(codes)
    }

    fn unsubscribe_ticks(
        &self,
        ctx: &mut SessionContext,
        securities: Option<&Securities>,
    ) -> Result<()> {
        match securities {
            None => ctx.ticks_mut().clear(),
            Some(securities) => {
                for code in self.resolve_all(securities)? {
                    ctx.ticks_mut().unsubscribe(&code);
                }
            }
        }
        Ok(())
    }

    fn current_tick(&self, ctx: &SessionContext, security: &str) -> Result<Option<Tick>> {
        let code = self.resolve(security)?;
        Ok(ctx
            .ticks()
            .latest(&code)
            .filter(|tick| tick.time <= ctx.now())
            .cloned())
    }

    fn record_tick(&self, ctx: &mut SessionContext, tick: Tick) -> Result<bool> {
        if tick.time > ctx.now() {
            return Err(FutureDataError {
                phase: ctx.phase(),
                now: ctx.now(),
                end: QueryBoundary::Instant(tick.time),
                reason: "tick is stamped after the current instant",
            }
            .into());
        }
        Ok(ctx.ticks_mut().record(tick))
    }
}
