//! Watermark poller - one tick per fixed delay
//!
//! ## Tick
//!
//! ```text
//! watermark W (or now - lookback when absent)
//!     ↓
//! window [W, now)
//!     ↓
//! per genre with a board: sessions ended in window → boards → SCOREBOARD subscribers
//!     ↓
//! connects / disconnects / joins / leaves → events → LOGS subscribers
//!     ↓
//! watermark := now
//! ```
//!
//! Any read failure aborts the tick before the watermark is written, so the
//! same window is read again next time. Deliveries are queued and never
//! block or fail a tick.
//!
//! ## Phases
//!
//! `Bootstrapping` until the first watermark exists. A bootstrap tick
//! still extracts events (the queries run) but discards them instead of
//! broadcasting old activity. The switch to `Running` happens once.

use super::boards::BoardBuilder;
use super::catalog::{self, Genre};
use super::config::PipelineConfig;
use super::delivery::{Delivery, DeliveryQueue};
use super::error::Result;
use super::extractor::extract_events;
use super::reader::{ActivityReader, WatermarkStore};
use super::router::{group_by_genre, plan_dispatches};
use super::scoreboard::ScoreboardBuilder;
use super::subscriptions::SubscriptionCache;
use super::teams::TeamClassifier;
use super::types::{Subscription, SubscriptionType, TimeWindow, VersFilter, Watermark};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Bootstrapping,
    Running,
}

/// What one tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub window: TimeWindow,
    pub phase: Phase,
    pub events_emitted: usize,
    pub events_discarded: usize,
    pub suppressed_joins: usize,
    pub scoreboards: usize,
    pub sessions_skipped: usize,
    pub deliveries: usize,
}

impl TickReport {
    fn empty(window: TimeWindow, phase: Phase) -> Self {
        Self {
            window,
            phase,
            events_emitted: 0,
            events_discarded: 0,
            suppressed_joins: 0,
            scoreboards: 0,
            sessions_skipped: 0,
            deliveries: 0,
        }
    }
}

pub struct Poller {
    reader: Arc<dyn ActivityReader>,
    watermarks: Arc<dyn WatermarkStore>,
    subscriptions: Arc<SubscriptionCache>,
    queue: DeliveryQueue,
    boards: BoardBuilder,
    watermark_name: String,
    lookback: chrono::Duration,
    poll_interval: Duration,
    events_enabled: bool,
    scoreboards_enabled: bool,
    phase: Phase,
    now_fn: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
}

impl Poller {
    pub fn new(
        config: &PipelineConfig,
        reader: Arc<dyn ActivityReader>,
        watermarks: Arc<dyn WatermarkStore>,
        subscriptions: Arc<SubscriptionCache>,
        queue: DeliveryQueue,
    ) -> Self {
        Self::new_with_clock(config, reader, watermarks, subscriptions, queue, Box::new(Utc::now))
    }

    /// Same as `new` with an injected clock (for testing)
    pub fn new_with_clock(
        config: &PipelineConfig,
        reader: Arc<dyn ActivityReader>,
        watermarks: Arc<dyn WatermarkStore>,
        subscriptions: Arc<SubscriptionCache>,
        queue: DeliveryQueue,
        now_fn: Box<dyn Fn() -> DateTime<Utc> + Send + Sync>,
    ) -> Self {
        Self {
            reader,
            watermarks,
            subscriptions,
            queue,
            boards: BoardBuilder::new(ScoreboardBuilder::new(
                config.page_size,
                TeamClassifier::new(config.team_tie_side),
            )),
            watermark_name: config.watermark_name.clone(),
            lookback: config.bootstrap_lookback(),
            poll_interval: config.poll_interval(),
            events_enabled: config.events_enabled,
            scoreboards_enabled: config.scoreboards_enabled,
            phase: Phase::Bootstrapping,
            now_fn,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Run one tick
    ///
    /// On error the watermark is left untouched.
    pub async fn tick(&mut self) -> Result<TickReport> {
        let now = Watermark::new((self.now_fn)());

        let start = match self.watermarks.get_watermark(&self.watermark_name).await? {
            Some(stored) => {
                if self.phase == Phase::Bootstrapping {
                    self.enter_running();
                }
                stored.at()
            }
            None => {
                log::info!(
                    "🌱 No {} watermark, bootstrapping from {}s ago",
                    self.watermark_name,
                    self.lookback.num_seconds()
                );
                now.at() - self.lookback
            }
        };

        let window = TimeWindow::new(start, now.at());
        let mut report = TickReport::empty(window, self.phase);

        if window.is_empty() {
            log::warn!("⚠️  Clock behind watermark ({} >= {}), skipping tick", start, now);
            return Ok(report);
        }

        if self.scoreboards_enabled {
            self.process_scoreboards(window, &mut report).await?;
        }

        if self.events_enabled {
            self.process_events(window, &mut report).await?;
        }

        self.watermarks.set_watermark(&self.watermark_name, now).await?;
        log::debug!("Watermark {} advanced to {}", self.watermark_name, now);

        if self.phase == Phase::Bootstrapping {
            self.enter_running();
        }

        Ok(report)
    }

    fn enter_running(&mut self) {
        log::info!("🚀 Poller running, events will be broadcast");
        self.phase = Phase::Running;
    }

    /// Sessions are looked up by the server codes of each genre with a
    /// board, and built with that genre's builder
    async fn process_scoreboards(&self, window: TimeWindow, report: &mut TickReport) -> Result<()> {
        for genre in BoardBuilder::genres() {
            let filter = VersFilter::Only(catalog::server_vers_for(genre));
            let sessions = self.reader.sessions_ended(window, &filter).await?;

            for session in &sessions {
                let Some(board) = self.boards.build(self.reader.as_ref(), genre, session).await? else {
                    report.sessions_skipped += 1;
                    continue;
                };
                report.scoreboards += 1;

                let channels = self
                    .subscriptions
                    .channels_for(SubscriptionType::Scoreboard, board.genre())
                    .await;
                if channels.is_empty() {
                    continue;
                }

                let delivery = Delivery::Scoreboard { channels, board: Box::new(board) };
                match self.queue.enqueue(delivery) {
                    Ok(()) => report.deliveries += 1,
                    Err(e) => log::error!("❌ Failed to queue {} scoreboard of session {}: {}", genre, session.id, e),
                }
            }
        }

        Ok(())
    }

    async fn process_events(&self, window: TimeWindow, report: &mut TickReport) -> Result<()> {
        let extraction = extract_events(self.reader.as_ref(), window, &VersFilter::Any).await?;
        report.suppressed_joins = extraction.suppressed_joins;

        if self.phase == Phase::Bootstrapping {
            report.events_discarded = extraction.events.len();
            if !extraction.events.is_empty() {
                log::info!("🌱 Discarded {} backlog events while bootstrapping", extraction.events.len());
            }
            return Ok(());
        }
        report.events_emitted = extraction.events.len();

        let groups = group_by_genre(&extraction.events);
        let mut subscribers: HashMap<Genre, Vec<Subscription>> = HashMap::new();
        for genre in groups.keys() {
            let subs = self.subscriptions.subscribers(SubscriptionType::Logs, *genre).await;
            subscribers.insert(*genre, subs.as_ref().clone());
        }

        for dispatch in plan_dispatches(groups, |genre| subscribers.remove(&genre).unwrap_or_default()) {
            let text = dispatch
                .events
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            match self.queue.enqueue(Delivery::Message { channels: dispatch.channels, text }) {
                Ok(()) => report.deliveries += 1,
                Err(e) => log::error!("❌ Failed to queue {} events: {}", dispatch.genre, e),
            }
        }

        Ok(())
    }

    /// Tick, then sleep the fixed delay, until `shutdown` flips to true
    ///
    /// A tick in progress always runs to completion.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        log::info!(
            "⏰ Starting poller (delay: {}ms, watermark: {})",
            self.poll_interval.as_millis(),
            self.watermark_name
        );

        loop {
            match self.tick().await {
                Ok(report) => log::info!(
                    "📊 Tick [{} → {}) {:?}: {} events ({} discarded, {} rotation joins), {} scoreboards ({} skipped), {} deliveries queued, backlog {}",
                    report.window.start.format("%H:%M:%S%.3f"),
                    report.window.end.format("%H:%M:%S%.3f"),
                    report.phase,
                    report.events_emitted,
                    report.events_discarded,
                    report.suppressed_joins,
                    report.scoreboards,
                    report.sessions_skipped,
                    report.deliveries,
                    self.queue.pending()
                ),
                Err(e) => log::error!("❌ Tick aborted, watermark kept: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        log::info!("✅ Poller stopped");
    }
}
