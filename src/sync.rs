//! Polling synchronization between the server's list and the local log.
//!
//! The server only ever exposes a full snapshot, so the client tracks how
//! many leading entries it has already rendered and renders only the rest.
//! [`SyncLoop::run`] polls on a fixed period, one tick at a time: a tick
//! finishes (fetch, compare, render) before the next one starts, and missed
//! periods are skipped rather than queued.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::client::ChatTransport;
use crate::error::Error;
use crate::observability::{
    SYNC_POLL_ERRORS, SYNC_POLLS, SYNC_RENDERED, SYNC_RESYNCS, SYNC_TICK_DURATION,
    SYNC_UNCHANGED,
};
use crate::render::{DEFAULT_BANNER, LogSurface, update_chat_log, welcome_message};
use crate::sync_logger::SyncLogger;
use crate::types::Message;

/// Default time between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// How much of the server's list has been rendered locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncState {
    rendered_count: usize,
}

impl SyncState {
    /// State of a freshly started client: nothing rendered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of leading server entries already rendered.
    pub fn rendered_count(&self) -> usize {
        self.rendered_count
    }
}

/// What one poll tick did.
#[derive(Debug, Clone)]
pub enum TickOutcome {
    /// The snapshot had exactly as many entries as are rendered.
    Unchanged,
    /// Entries `[from, to)` were rendered.
    Rendered {
        /// First newly rendered index.
        from: usize,
        /// One past the last rendered index; the new rendered count.
        to: usize,
    },
    /// The snapshot was shorter than what was rendered, so the log was reset
    /// and all `count` entries were rendered again.
    Resynced {
        /// Length of the snapshot, and the new rendered count.
        count: usize,
    },
    /// The poll failed. Nothing was rendered and the state is unchanged.
    Failed(Error),
}

impl TickOutcome {
    /// Number of chat lines appended by this tick.
    pub fn rendered(&self) -> usize {
        match self {
            TickOutcome::Rendered { from, to } => to - from,
            TickOutcome::Resynced { count } => *count,
            TickOutcome::Unchanged | TickOutcome::Failed(_) => 0,
        }
    }

    /// Returns true if the poll failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, TickOutcome::Failed(_))
    }
}

/// Running totals published after every tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Current rendered count.
    pub rendered_count: usize,
    /// Ticks run so far.
    pub polls: u64,
    /// Ticks whose poll failed.
    pub failures: u64,
    /// Ticks that found a shorter list and re-rendered it.
    pub resyncs: u64,
    /// Message of the most recent failure.
    pub last_error: Option<String>,
}

/// The poll, compare and render loop.
pub struct SyncLoop<T: ChatTransport + ?Sized, S: LogSurface> {
    transport: Arc<T>,
    surface: S,
    state: SyncState,
    interval: Duration,
    banner: Option<String>,
    banner_shown: bool,
    logger: Option<Arc<dyn SyncLogger>>,
    stats: SyncStats,
    stats_tx: watch::Sender<SyncStats>,
}

impl<T: ChatTransport + ?Sized, S: LogSurface> SyncLoop<T, S> {
    /// Creates a loop polling `transport` and rendering into `surface`.
    pub fn new(transport: Arc<T>, surface: S) -> Self {
        let (stats_tx, _) = watch::channel(SyncStats::default());
        Self {
            transport,
            surface,
            state: SyncState::new(),
            interval: DEFAULT_POLL_INTERVAL,
            banner: Some(DEFAULT_BANNER.to_string()),
            banner_shown: false,
            logger: None,
            stats: SyncStats::default(),
            stats_tx,
        }
    }

    /// Sets the time between polls.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the welcome banner text.
    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Starts without a welcome banner.
    pub fn without_banner(mut self) -> Self {
        self.banner = None;
        self
    }

    /// Attaches a logger.
    pub fn with_logger(mut self, logger: Arc<dyn SyncLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The current sync state.
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// The configured poll interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The surface lines are rendered into.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Consumes the loop, returning its surface.
    pub fn into_surface(self) -> S {
        self.surface
    }

    /// Subscribe to the stats published after each tick.
    pub fn subscribe(&self) -> watch::Receiver<SyncStats> {
        self.stats_tx.subscribe()
    }

    /// Show the welcome banner if it has not been shown yet.
    pub fn welcome(&mut self) {
        if self.banner_shown {
            return;
        }
        if let Some(banner) = &self.banner {
            welcome_message(&mut self.surface, banner);
        }
        self.banner_shown = true;
    }

    /// Reconcile the surface with one server snapshot.
    ///
    /// A snapshot as long as the rendered count is a no-op. A longer one
    /// renders only the new tail. A shorter one means the server's history
    /// was cut: the surface is reset and the whole snapshot rendered again.
    pub fn apply(&mut self, list: &[Message]) -> TickOutcome {
        self.welcome();
        let cached = self.state.rendered_count;
        let len = list.len();
        if len == cached {
            SYNC_UNCHANGED.click();
            return TickOutcome::Unchanged;
        }

        let outcome = if len > cached {
            update_chat_log(&mut self.surface, list, cached, len);
            TickOutcome::Rendered {
                from: cached,
                to: len,
            }
        } else {
            log::warn!("server history shrank from {cached} to {len} messages; re-rendering");
            SYNC_RESYNCS.click();
            self.stats.resyncs += 1;
            self.surface.reset();
            update_chat_log(&mut self.surface, list, 0, len);
            TickOutcome::Resynced { count: len }
        };
        self.state.rendered_count = len;
        SYNC_RENDERED.count(outcome.rendered() as u64);
        self.surface.scroll_to_end();
        outcome
    }

    /// Run one poll tick.
    ///
    /// Transport and parse failures are caught here and become
    /// [`TickOutcome::Failed`]; the state is left untouched.
    pub async fn tick(&mut self) -> TickOutcome {
        self.welcome();
        SYNC_POLLS.click();
        let start = Instant::now();
        let outcome = match self.transport.fetch_messages().await {
            Ok(list) => {
                if let Some(logger) = &self.logger {
                    logger.log_snapshot(&list);
                }
                self.apply(&list)
            }
            Err(err) => {
                SYNC_POLL_ERRORS.click();
                if err.is_transient() {
                    log::debug!("poll failed, skipping this tick: {err}");
                } else {
                    log::warn!("poll failed and will likely fail again: {err}");
                }
                TickOutcome::Failed(err)
            }
        };
        SYNC_TICK_DURATION.add(start.elapsed().as_secs_f64());

        if let Some(logger) = &self.logger {
            logger.log_tick(&outcome);
        }
        self.publish(&outcome);
        outcome
    }

    fn publish(&mut self, outcome: &TickOutcome) {
        self.stats.polls += 1;
        self.stats.rendered_count = self.state.rendered_count;
        if let TickOutcome::Failed(err) = outcome {
            self.stats.failures += 1;
            self.stats.last_error = Some(err.to_string());
        }
        self.stats_tx.send_replace(self.stats.clone());
    }

    /// Show the banner, then poll forever.
    ///
    /// The first poll happens one interval after start. There is no stop
    /// condition; drop or abort the task running this future to end it.
    pub async fn run(mut self) {
        self.welcome();
        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            self.tick().await;
        }
    }
}
