//! Application state — single-owner, main-thread only.
//!
//! `App` owns one instance of every controller. Worker threads only ever see
//! jobs and send back outcomes; everything they produce is applied here.

use std::sync::mpsc::{Receiver, Sender};
use std::time::Instant;

use chrono::Local;
use tracing::{debug, info, warn};

use pairdesk_core::DeskConfig;

use crate::charts::ChartController;
use crate::metrics::MetricsRenderer;
use crate::modal::ModalManager;
use crate::notify::{NoticeKind, NotificationCenter};
use crate::schedule::PeriodicTimer;
use crate::store::{notify_report, DataStore, LoadReason};
use crate::trade_table::TradeTableController;
use crate::worker::{Job, Outcome};
use crate::workflow::{AnalysisWorkflowController, Feedback, StrategySource};

/// Which dashboard section receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Trades,
    Symbols,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Focus::Trades => Focus::Symbols,
            Focus::Symbols => Focus::Trades,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Focus::Trades => "Trades",
            Focus::Symbols => "Symbols",
        }
    }
}

pub struct App {
    pub running: bool,
    pub store: DataStore,
    pub modals: ModalManager,
    pub notices: NotificationCenter,
    pub metrics: MetricsRenderer,
    pub charts: ChartController,
    pub table: TradeTableController,
    pub workflow: AnalysisWorkflowController,
    pub focus: Focus,
    /// Whether the terminal window has focus; timers pause without it.
    pub terminal_focused: bool,
    /// Last-updated text, refreshed by the clock timer.
    pub clock_label: String,
    clock: PeriodicTimer,
    refresh: PeriodicTimer,
    jobs: Sender<Job>,
    outcomes: Receiver<Outcome>,
    workers: usize,
}

impl App {
    pub fn new(
        config: &DeskConfig,
        jobs: Sender<Job>,
        outcomes: Receiver<Outcome>,
        now: Instant,
    ) -> Self {
        Self {
            running: true,
            store: DataStore::new(),
            modals: ModalManager::new(),
            notices: NotificationCenter::new(),
            metrics: MetricsRenderer::new(now),
            charts: ChartController::new(),
            table: TradeTableController::new(),
            workflow: AnalysisWorkflowController::new(config.backend.initial_balance),
            focus: Focus::Trades,
            terminal_focused: true,
            clock_label: "Loading…".to_string(),
            clock: PeriodicTimer::new(config.refresh.clock_period(), now),
            refresh: PeriodicTimer::new(config.refresh.summary_period(), now),
            jobs,
            outcomes,
            workers: config.backend.workers,
        }
    }

    /// Kick off the initial load.
    pub fn start(&mut self, now: Instant) {
        self.request_refresh(LoadReason::Startup, now);
    }

    pub fn dispatch(&mut self, job: Job, now: Instant) {
        let label = job.label();
        if self.jobs.send(job).is_err() {
            warn!(job = label, "worker pool is gone, dropping job");
            self.notices
                .notify("Background workers stopped; restart PairDesk", NoticeKind::Error, now);
        }
    }

    pub fn request_refresh(&mut self, reason: LoadReason, now: Instant) {
        let (request, reason) = self.store.request_load(reason);
        info!(request, ?reason, "snapshot refresh requested");
        self.dispatch(Job::LoadSnapshot { request, reason }, now);
    }

    /// Run a workflow entry point and dispatch the job it produces, if any.
    pub fn with_workflow(
        &mut self,
        now: Instant,
        action: impl FnOnce(&mut AnalysisWorkflowController, &mut Feedback<'_>) -> Option<Job>,
    ) {
        let job = {
            let mut fb = Feedback {
                modals: &mut self.modals,
                notices: &mut self.notices,
                now,
            };
            action(&mut self.workflow, &mut fb)
        };
        if let Some(job) = job {
            self.dispatch(job, now);
        }
    }

    pub fn handle_outcome(&mut self, outcome: Outcome, now: Instant) {
        match outcome {
            Outcome::Snapshot {
                request,
                reason,
                result,
            } => {
                if let Some(report) = self.store.apply(request, reason, result) {
                    notify_report(&report, &mut self.notices, now);
                    self.on_snapshot(now);
                }
            }
            other => {
                let mut fb = Feedback {
                    modals: &mut self.modals,
                    notices: &mut self.notices,
                    now,
                };
                self.workflow.apply(other, &mut fb);
            }
        }
    }

    /// Re-derive every view from the new snapshot.
    fn on_snapshot(&mut self, now: Instant) {
        let snapshot = self.store.snapshot();
        self.metrics.set_targets(&snapshot.summary, now);
        self.charts.update(&snapshot);
        let visible = self.table.rows(&snapshot.recent_trades).len();
        self.table.clamp_cursor(visible);
        self.update_clock();
    }

    /// Apply every outcome that has arrived, without blocking.
    pub fn drain_outcomes(&mut self, now: Instant) {
        while let Ok(outcome) = self.outcomes.try_recv() {
            self.handle_outcome(outcome, now);
        }
    }

    /// Advance timers and animations.
    pub fn tick(&mut self, now: Instant) {
        self.modals.tick(now);
        self.notices.tick(now);
        if self.clock.poll(now) {
            self.update_clock();
        }
        if self.refresh.poll(now) {
            if self.store.is_loading() {
                debug!("snapshot load still running, skipping periodic refresh");
            } else {
                self.request_refresh(LoadReason::Periodic, now);
            }
        }
    }

    fn update_clock(&mut self) {
        self.clock_label = match self.store.fetched_at() {
            Some(at) => {
                let age = (Local::now() - at).num_seconds().max(0);
                format!("Updated {} ({age}s ago)", at.format("%H:%M:%S"))
            }
            None => "Loading…".to_string(),
        };
    }

    /// Pause periodic work while the terminal is in the background.
    pub fn set_terminal_focus(&mut self, focused: bool, now: Instant) {
        if focused == self.terminal_focused {
            return;
        }
        self.terminal_focused = focused;
        if focused {
            self.clock.resume(now);
            self.refresh.resume(now);
            self.update_clock();
        } else {
            self.clock.pause();
            self.refresh.pause();
        }
        info!(focused, "terminal focus changed");
    }

    pub fn timers_paused(&self) -> bool {
        self.clock.is_paused() && self.refresh.is_paused()
    }

    // ── Dashboard actions ───────────────────────────────────────────

    pub fn visible_trade_count(&self) -> usize {
        self.table.rows(&self.store.current().recent_trades).len()
    }

    /// Trade analysis for the row under the cursor.
    pub fn open_selected_trade(&mut self, now: Instant) {
        let snapshot = self.store.snapshot();
        let Some(trade) = self
            .table
            .activate(&snapshot.recent_trades)
            .and_then(|id| snapshot.find_trade(id))
        else {
            return;
        };
        let job = self.workflow.open_trade_analysis(trade);
        self.dispatch(job, now);
    }

    pub fn selected_symbol(&self) -> Option<String> {
        self.charts.activate_slice()
    }

    pub fn open_currency_analysis(&mut self, symbol: &str, now: Instant) {
        let job = self.workflow.open_currency_analysis(symbol);
        self.dispatch(job, now);
    }

    pub fn open_strategy_editor(&mut self, symbol: &str, now: Instant) {
        let job = self.workflow.open_strategy_editor(symbol);
        self.dispatch(job, now);
    }

    pub fn backtest_saved_strategy(&mut self, symbol: &str, now: Instant) {
        let symbol = symbol.to_string();
        self.with_workflow(now, move |w, fb| w.run_backtest(&symbol, StrategySource::Fetch, fb));
    }

    /// Ask every worker to stop.
    pub fn shutdown(&mut self) {
        for _ in 0..self.workers {
            if self.jobs.send(Job::Shutdown).is_err() {
                break;
            }
        }
    }
}
