//! The refresh orchestrator.
//!
//! Startup fetches every category (retrying with backoff until each has
//! succeeded once or attempts run out), then two loops run side by side:
//!
//! - slow: every `api_update`, fetch, filter and replace cache entries
//! - fast: every `display_update`, project the cache, format and render
//!
//! The fast loop never touches the network. Fetch and render failures are
//! logged here and go no further. On shutdown both loops stop taking
//! ticks; a fetch still in flight is dropped and its result never reaches
//! the cache.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::{Mutex, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::board::{
    BoardConfig, FormattedRow, TimePalette, TrackedCategory, format_row, project,
    stale_categories,
};
use crate::cache::DepartureCache;
use crate::display::Renderer;
use crate::domain::{Category, ColorMapping, DepartureRecord};
use crate::transport::{DeparturesSource, FetchError};

use super::backoff::StartupBackoff;
use super::clock::Clock;

type FetchResults = Vec<(Category, Result<Vec<DepartureRecord>, FetchError>)>;

/// Periods of the two cycles. Both must be non-zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshIntervals {
    /// Slow cycle: how often to poll the API.
    pub api_update: Duration,
    /// Fast cycle: how often to recompute and redraw.
    pub display_update: Duration,
}

impl Default for RefreshIntervals {
    fn default() -> Self {
        Self {
            api_update: Duration::from_secs(60),
            display_update: Duration::from_secs(20),
        }
    }
}

/// Everything the orchestrator needs to know, fixed for its lifetime.
#[derive(Debug, Clone)]
pub struct RefreshSettings {
    /// Categories in display order.
    pub tracked: Vec<TrackedCategory>,
    pub board: BoardConfig,
    pub colors: ColorMapping,
    pub palette: TimePalette,
    pub intervals: RefreshIntervals,
    pub startup: StartupBackoff,
    /// How far ahead each fetch asks for departures.
    pub within_minutes: u32,
}

/// Which categories a fetch cycle updated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOutcome {
    pub succeeded: Vec<Category>,
    pub failed: Vec<Category>,
}

/// How the startup phase ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupOutcome {
    /// Every active category has data.
    Ready,
    /// Attempts ran out; these categories still have no data.
    Exhausted { pending: Vec<Category> },
    /// Shutdown was requested first.
    Cancelled,
}

/// Drives fetching and rendering around a shared departure cache.
pub struct Orchestrator<S, R, C> {
    settings: RefreshSettings,
    source: S,
    renderer: Mutex<R>,
    clock: C,
    cache: Arc<DepartureCache>,
}

impl<S, R, C> Orchestrator<S, R, C>
where
    S: DeparturesSource,
    R: Renderer,
    C: Clock,
{
    pub fn new(settings: RefreshSettings, source: S, renderer: R, clock: C) -> Self {
        Self {
            settings,
            source,
            renderer: Mutex::new(renderer),
            clock,
            cache: Arc::new(DepartureCache::new()),
        }
    }

    /// The cache the slow cycle writes and the fast cycle reads.
    pub fn cache(&self) -> &Arc<DepartureCache> {
        &self.cache
    }

    pub fn settings(&self) -> &RefreshSettings {
        &self.settings
    }

    /// Run until `shutdown` turns true (or its sender is dropped).
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            categories = ?self.active_categories(),
            api_update = ?self.settings.intervals.api_update,
            display_update = ?self.settings.intervals.display_update,
            "starting departure board"
        );

        match self.startup(&mut shutdown).await {
            StartupOutcome::Ready => info!("initial departures received"),
            StartupOutcome::Exhausted { pending } => {
                warn!(?pending, "starting without initial departures")
            }
            StartupOutcome::Cancelled => {
                info!("shutdown requested during startup");
                return;
            }
        }

        tokio::join!(
            self.slow_loop(shutdown.clone()),
            self.fast_loop(shutdown)
        );

        let mut renderer = self.renderer.lock().await;
        if let Err(e) = renderer.clear() {
            warn!(error = %e, "failed to clear display");
        }
        info!("departure board stopped");
    }

    /// Fetch until every active category has data, backing off between tries.
    pub async fn startup(&self, shutdown: &mut watch::Receiver<bool>) -> StartupOutcome {
        let backoff = &self.settings.startup;
        let mut pending = self.active_categories();
        let mut attempt = 0;

        while !pending.is_empty() {
            attempt += 1;

            let results = tokio::select! {
                results = self.fetch(&pending) => results,
                _ = shutdown_requested(shutdown) => return StartupOutcome::Cancelled,
            };
            if *shutdown.borrow() {
                return StartupOutcome::Cancelled;
            }

            pending = self.store(results).await.failed;
            if pending.is_empty() {
                break;
            }

            if !backoff.allows_retry(attempt) {
                warn!(attempt, ?pending, "initial fetch attempts exhausted");
                return StartupOutcome::Exhausted { pending };
            }

            let delay = backoff.delay_after(attempt);
            info!(attempt, ?pending, "no initial data yet, retrying in {:?}", delay);

            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown_requested(shutdown) => return StartupOutcome::Cancelled,
            }
        }

        StartupOutcome::Ready
    }

    /// One slow cycle: fetch every active category and update the cache.
    pub async fn fetch_cycle(&self) -> FetchOutcome {
        let results = self.fetch(&self.active_categories()).await;
        self.store(results).await
    }

    /// One fast cycle: project, format and render. Returns what was rendered.
    pub async fn display_cycle(&self) -> Vec<FormattedRow> {
        let settings = &self.settings;
        let now = self.clock.now();

        let categories: Vec<Category> = settings.tracked.iter().map(|t| t.category).collect();
        let snapshot = self.cache.snapshot_all(&categories).await;

        for category in stale_categories(&settings.tracked, &snapshot, now, &settings.board) {
            warn!(%category, "departure data is stale, showing N/A");
        }

        let formatted: Vec<FormattedRow> = project(&settings.tracked, &snapshot, now, &settings.board)
            .iter()
            .map(|row| format_row(row, &settings.colors, &settings.palette))
            .collect();

        let mut renderer = self.renderer.lock().await;
        match renderer.render(&formatted) {
            Ok(()) => debug!(rows = formatted.len(), "display updated"),
            Err(e) => warn!(error = %e, "render failed"),
        }

        formatted
    }

    async fn slow_loop(&self, mut shutdown: watch::Receiver<bool>) {
        let active = self.active_categories();
        if active.is_empty() {
            shutdown_requested(&mut shutdown).await;
            return;
        }

        // Startup has just fetched, so the first poll is one period away
        let period = self.settings.intervals.api_update;
        let Some(start) = Instant::now().checked_add(period) else {
            warn!(?period, "fetch interval out of range, polling disabled");
            shutdown_requested(&mut shutdown).await;
            return;
        };
        let mut interval = tokio::time::interval_at(start, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }

            let results = tokio::select! {
                results = self.fetch(&active) => results,
                _ = shutdown_requested(&mut shutdown) => {
                    debug!("shutdown during fetch, discarding results");
                    break;
                }
            };
            if *shutdown.borrow() {
                break;
            }

            self.store(results).await;
        }
    }

    async fn fast_loop(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = tokio::time::interval(self.settings.intervals.display_update);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                _ = shutdown_requested(&mut shutdown) => break,
            }

            self.display_cycle().await;
        }
    }

    /// Categories with lines to show, in display order.
    fn active_categories(&self) -> Vec<Category> {
        self.settings
            .tracked
            .iter()
            .filter(|t| t.is_active())
            .map(|t| t.category)
            .collect()
    }

    /// Fetch the given categories concurrently, filtering each result.
    async fn fetch(&self, categories: &[Category]) -> FetchResults {
        let within = self.settings.within_minutes;

        let fetches = self
            .settings
            .tracked
            .iter()
            .filter(|t| categories.contains(&t.category))
            .map(|t| async move {
                let result = self.source.fetch_departures(&t.station_id, within).await;
                (t.category, result.map(|records| t.filter.select(records)))
            });

        join_all(fetches).await
    }

    /// Write successful results to the cache, stamped with the current time.
    async fn store(&self, results: FetchResults) -> FetchOutcome {
        let now = self.clock.now();
        let mut outcome = FetchOutcome::default();

        for (category, result) in results {
            match result {
                Ok(records) => {
                    info!(%category, departures = records.len(), "fetched departures");
                    self.cache.update(category, records, now).await;
                    outcome.succeeded.push(category);
                }
                Err(e) => {
                    warn!(%category, error = %e, "fetch failed, keeping previous departures");
                    outcome.failed.push(category);
                }
            }
        }

        outcome
    }
}

/// Resolves once shutdown has been requested or the sender is gone.
async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|&stop| stop).await;
}
