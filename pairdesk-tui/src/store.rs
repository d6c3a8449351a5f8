//! Current aggregate snapshot and where it came from.
//!
//! The snapshot is replaced wholesale: readers hold an `Arc` and always see
//! one complete generation. Any failed fetch installs the fallback dataset
//! so the dashboard never renders a half-populated state.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Local};
use tracing::{info, warn};

use pairdesk_core::fallback::fallback_snapshot;
use pairdesk_core::{ClientError, Snapshot, TradeId, TradeRecord, TradingBackend};

use crate::notify::{NoticeKind, NotificationCenter};

/// Origin of the snapshot on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    /// Nothing fetched yet.
    Pending,
    Live,
    Fallback,
}

impl SnapshotSource {
    pub fn label(self) -> &'static str {
        match self {
            SnapshotSource::Pending => "LOADING",
            SnapshotSource::Live => "LIVE",
            SnapshotSource::Fallback => "SAMPLE DATA",
        }
    }
}

/// Why a load was started; decides what gets notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadReason {
    Startup,
    Manual,
    Periodic,
}

impl LoadReason {
    /// Reason for a load that replaces `replaced` while it is in flight.
    /// A replaced manual refresh still owes the user a notice.
    pub fn absorb(self, replaced: LoadReason) -> LoadReason {
        if replaced == LoadReason::Manual {
            LoadReason::Manual
        } else {
            self
        }
    }
}

/// The newest load not yet applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct InFlight {
    request: u64,
    reason: LoadReason,
}

/// Outcome of one applied load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadReport {
    pub reason: LoadReason,
    pub source: SnapshotSource,
    pub generation: u64,
    pub error: Option<ClientError>,
}

impl LoadReport {
    pub fn is_live(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug)]
pub struct DataStore {
    snapshot: Arc<Snapshot>,
    source: SnapshotSource,
    generation: u64,
    latest_request: u64,
    in_flight: Option<InFlight>,
    fetched_at: Option<DateTime<Local>>,
    last_error: Option<ClientError>,
}

impl Default for DataStore {
    fn default() -> Self {
        Self {
            snapshot: Arc::new(Snapshot::default()),
            source: SnapshotSource::Pending,
            generation: 0,
            latest_request: 0,
            in_flight: None,
            fetched_at: None,
            last_error: None,
        }
    }
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a request number. Only the newest request may replace a
    /// snapshot already on screen. Returns the reason the load will be
    /// reported under.
    pub fn request_load(&mut self, reason: LoadReason) -> (u64, LoadReason) {
        self.latest_request += 1;
        let reason = match self.in_flight {
            Some(replaced) => reason.absorb(replaced.reason),
            None => reason,
        };
        self.in_flight = Some(InFlight {
            request: self.latest_request,
            reason,
        });
        (self.latest_request, reason)
    }

    /// Whether the newest requested load has not been applied yet.
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Apply the result of request `request`. A result for a replaced
    /// request is still applied while nothing has been shown yet. Returns
    /// `None` when the result is discarded.
    pub fn apply(
        &mut self,
        request: u64,
        reason: LoadReason,
        result: Result<Snapshot, ClientError>,
    ) -> Option<LoadReport> {
        match self.in_flight {
            Some(current) if current.request == request => {
                self.in_flight = None;
                Some(self.install(current.reason, result))
            }
            _ if self.source == SnapshotSource::Pending => {
                info!(
                    request,
                    latest = self.latest_request,
                    "applying replaced snapshot, nothing shown yet"
                );
                Some(self.install(reason, result))
            }
            _ => {
                info!(request, latest = self.latest_request, "discarding stale snapshot");
                None
            }
        }
    }

    /// Fetch and apply on the calling thread.
    pub fn load(&mut self, backend: &dyn TradingBackend, reason: LoadReason) -> LoadReport {
        let (_, reason) = self.request_load(reason);
        let result = backend.fetch_snapshot();
        self.in_flight = None;
        self.install(reason, result)
    }

    /// Manual reload with user feedback.
    pub fn refresh(
        &mut self,
        backend: &dyn TradingBackend,
        notices: &mut NotificationCenter,
        now: Instant,
    ) -> LoadReport {
        let report = self.load(backend, LoadReason::Manual);
        notify_report(&report, notices, now);
        report
    }

    fn install(&mut self, reason: LoadReason, result: Result<Snapshot, ClientError>) -> LoadReport {
        self.generation += 1;
        self.fetched_at = Some(Local::now());
        match result {
            Ok(snapshot) => {
                info!(
                    generation = self.generation,
                    trades = snapshot.recent_trades.len(),
                    symbols = snapshot.symbol_performance.len(),
                    "snapshot loaded"
                );
                self.snapshot = Arc::new(snapshot);
                self.source = SnapshotSource::Live;
                self.last_error = None;
            }
            Err(e) => {
                warn!(
                    generation = self.generation,
                    error = %e,
                    "snapshot fetch failed, using fallback data"
                );
                self.snapshot = Arc::new(fallback_snapshot());
                self.source = SnapshotSource::Fallback;
                self.last_error = Some(e);
            }
        }
        LoadReport {
            reason,
            source: self.source,
            generation: self.generation,
            error: self.last_error.clone(),
        }
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn current(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn source(&self) -> SnapshotSource {
        self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn fetched_at(&self) -> Option<DateTime<Local>> {
        self.fetched_at
    }

    pub fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    pub fn find_trade(&self, id: TradeId) -> Option<&TradeRecord> {
        self.snapshot.find_trade(id)
    }
}

/// Manual refreshes report both outcomes; background loads only failures.
pub fn notify_report(report: &LoadReport, notices: &mut NotificationCenter, now: Instant) {
    match (&report.error, report.reason) {
        (None, LoadReason::Manual) => {
            notices.notify("Dashboard refreshed", NoticeKind::Success, now);
        }
        (None, _) => {}
        (Some(e), LoadReason::Manual) => {
            notices.notify(
                format!("Refresh failed: {e}. Showing sample data."),
                NoticeKind::Error,
                now,
            );
        }
        (Some(e), _) => {
            notices.notify(
                format!("Backend unavailable: {e}. Showing sample data."),
                NoticeKind::Error,
                now,
            );
        }
    }
}
