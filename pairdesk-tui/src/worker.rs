//! Background workers: every backend call runs here.
//!
//! A small pool of threads shares one job queue. Jobs are executed in the
//! order they are picked up, so outcomes can come back out of order; the UI
//! thread sorts that out with tickets. Dependent calls (fetch the strategy
//! then backtest it, enhanced then basic analysis) run inside one job.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use serde_json::Value;
use tracing::{debug, warn};

use pairdesk_core::{
    AnalysisResult, BacktestResult, ClientError, OptimizationRequest, ParameterOptimization,
    Snapshot, StrategyDocument, SuggestionRequest, SuggestionResponse, TradeId, TradeRecord,
    TradingBackend,
};

use crate::store::LoadReason;
use crate::workflow::{StrategyPurpose, StrategySource, Ticket};

/// Work sent from the UI thread to the pool.
#[derive(Debug)]
pub enum Job {
    LoadSnapshot {
        request: u64,
        reason: LoadReason,
    },
    TradeAnalysis {
        ticket: Ticket,
        trade: TradeRecord,
    },
    CurrencyAnalysis {
        ticket: Ticket,
        symbol: String,
    },
    LoadStrategy {
        ticket: Ticket,
        symbol: String,
        purpose: StrategyPurpose,
    },
    SaveStrategy {
        ticket: Ticket,
        symbol: String,
        code: String,
    },
    Backtest {
        ticket: Ticket,
        symbol: String,
        source: StrategySource,
        initial_balance: f64,
    },
    Suggestions {
        ticket: Ticket,
        request: SuggestionRequest,
    },
    Optimize {
        ticket: Ticket,
        request: OptimizationRequest,
    },
    ApplyStrategy {
        ticket: Ticket,
        symbol: String,
        code: String,
    },
    Shutdown,
}

impl Job {
    pub fn label(&self) -> &'static str {
        match self {
            Job::LoadSnapshot { .. } => "load-snapshot",
            Job::TradeAnalysis { .. } => "trade-analysis",
            Job::CurrencyAnalysis { .. } => "currency-analysis",
            Job::LoadStrategy { .. } => "load-strategy",
            Job::SaveStrategy { .. } => "save-strategy",
            Job::Backtest { .. } => "backtest",
            Job::Suggestions { .. } => "suggestions",
            Job::Optimize { .. } => "optimize",
            Job::ApplyStrategy { .. } => "apply-strategy",
            Job::Shutdown => "shutdown",
        }
    }
}

/// Results sent back to the UI thread.
#[derive(Debug)]
pub enum Outcome {
    Snapshot {
        request: u64,
        reason: LoadReason,
        result: Result<Snapshot, ClientError>,
    },
    TradeAnalysis {
        ticket: Ticket,
        trade: TradeRecord,
        result: Result<AnalysisResult, ClientError>,
    },
    CurrencyAnalysis {
        ticket: Ticket,
        symbol: String,
        result: Result<Value, ClientError>,
    },
    Strategy {
        ticket: Ticket,
        symbol: String,
        purpose: StrategyPurpose,
        result: Result<StrategyDocument, ClientError>,
    },
    Saved {
        ticket: Ticket,
        symbol: String,
        code: String,
        result: Result<(), ClientError>,
    },
    Backtest {
        ticket: Ticket,
        symbol: String,
        /// Text the run used; empty when it could not be fetched.
        strategy: String,
        result: Result<BacktestResult, ClientError>,
    },
    Suggestions {
        ticket: Ticket,
        symbol: String,
        auto_apply: bool,
        result: Result<SuggestionResponse, ClientError>,
    },
    Optimization {
        ticket: Ticket,
        symbol: String,
        result: Result<ParameterOptimization, ClientError>,
    },
    Applied {
        ticket: Ticket,
        symbol: String,
        code: String,
        result: Result<(), ClientError>,
    },
}

impl Outcome {
    /// Workflow ticket, `None` for snapshot loads.
    pub fn ticket(&self) -> Option<Ticket> {
        match self {
            Outcome::Snapshot { .. } => None,
            Outcome::TradeAnalysis { ticket, .. }
            | Outcome::CurrencyAnalysis { ticket, .. }
            | Outcome::Strategy { ticket, .. }
            | Outcome::Saved { ticket, .. }
            | Outcome::Backtest { ticket, .. }
            | Outcome::Suggestions { ticket, .. }
            | Outcome::Optimization { ticket, .. }
            | Outcome::Applied { ticket, .. } => Some(*ticket),
        }
    }
}

/// Run one job against `backend`. `None` for `Shutdown`.
pub fn execute(backend: &dyn TradingBackend, job: Job) -> Option<Outcome> {
    let outcome = match job {
        Job::Shutdown => return None,
        Job::LoadSnapshot { request, reason } => Outcome::Snapshot {
            request,
            reason,
            result: backend.fetch_snapshot(),
        },
        Job::TradeAnalysis { ticket, trade } => {
            let result = trade_analysis(backend, trade.id);
            Outcome::TradeAnalysis {
                ticket,
                trade,
                result,
            }
        }
        Job::CurrencyAnalysis { ticket, symbol } => {
            let result = backend.currency_analysis(&symbol);
            Outcome::CurrencyAnalysis {
                ticket,
                symbol,
                result,
            }
        }
        Job::LoadStrategy {
            ticket,
            symbol,
            purpose,
        } => {
            let result = backend.strategy(&symbol);
            Outcome::Strategy {
                ticket,
                symbol,
                purpose,
                result,
            }
        }
        Job::SaveStrategy {
            ticket,
            symbol,
            code,
        } => {
            let result = backend.save_strategy(&symbol, &code);
            Outcome::Saved {
                ticket,
                symbol,
                code,
                result,
            }
        }
        Job::Backtest {
            ticket,
            symbol,
            source,
            initial_balance,
        } => {
            let (strategy, result) = match source {
                StrategySource::Inline(code) => {
                    let result = backend.run_backtest(&symbol, &code, initial_balance);
                    (code, result)
                }
                StrategySource::Fetch => match backend.strategy(&symbol) {
                    Ok(doc) => {
                        let result = backend.run_backtest(&symbol, &doc.code, initial_balance);
                        (doc.code, result)
                    }
                    Err(e) => (String::new(), Err(e)),
                },
            };
            Outcome::Backtest {
                ticket,
                symbol,
                strategy,
                result,
            }
        }
        Job::Suggestions { ticket, request } => {
            let result = backend.suggestions(&request);
            Outcome::Suggestions {
                ticket,
                symbol: request.symbol,
                auto_apply: request.auto_apply,
                result,
            }
        }
        Job::Optimize { ticket, request } => {
            let result = backend.optimize(&request);
            Outcome::Optimization {
                ticket,
                symbol: request.symbol,
                result,
            }
        }
        Job::ApplyStrategy {
            ticket,
            symbol,
            code,
        } => {
            let result = backend.save_strategy(&symbol, &code);
            Outcome::Applied {
                ticket,
                symbol,
                code,
                result,
            }
        }
    };
    Some(outcome)
}

/// Enhanced analysis, falling back to the backend's basic analysis.
fn trade_analysis(
    backend: &dyn TradingBackend,
    id: TradeId,
) -> Result<AnalysisResult, ClientError> {
    match backend.enhanced_trade_analysis(id) {
        Ok(analysis) => Ok(AnalysisResult::Enhanced(analysis)),
        Err(e) => {
            debug!(trade = %id, error = %e, "enhanced analysis unavailable, trying basic");
            backend
                .basic_trade_analysis(id)
                .map(AnalysisResult::Basic)
        }
    }
}

/// Spawn `count` workers sharing one job queue.
pub fn spawn_workers(
    count: usize,
    backend: Arc<dyn TradingBackend>,
    jobs: Receiver<Job>,
    outcomes: Sender<Outcome>,
) -> io::Result<Vec<JoinHandle<()>>> {
    let jobs = Arc::new(Mutex::new(jobs));
    (0..count)
        .map(|i| {
            let backend = Arc::clone(&backend);
            let jobs = Arc::clone(&jobs);
            let outcomes = outcomes.clone();
            thread::Builder::new()
                .name(format!("pairdesk-worker-{i}"))
                .spawn(move || worker_loop(backend.as_ref(), &jobs, &outcomes))
        })
        .collect()
}

fn worker_loop(
    backend: &dyn TradingBackend,
    jobs: &Mutex<Receiver<Job>>,
    outcomes: &Sender<Outcome>,
) {
    loop {
        let next = match jobs.lock() {
            Ok(rx) => rx.recv(),
            Err(_) => {
                warn!("job queue lock poisoned, worker exiting");
                break;
            }
        };
        let Ok(job) = next else { break };

        let label = job.label();
        debug!(job = label, backend = backend.name(), "job started");
        match execute(backend, job) {
            Some(outcome) => {
                if outcomes.send(outcome).is_err() {
                    break;
                }
                debug!(job = label, "job finished");
            }
            None => break,
        }
    }
    debug!("worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{sample_backtest, FakeBackend};
    use crate::workflow::Chain;
    use pairdesk_core::fallback::fallback_snapshot;
    use pairdesk_core::{BasicAnalysis, EnhancedAnalysis};
    use std::sync::mpsc;
    use std::time::Duration;

    fn ticket(chain: Chain) -> Ticket {
        Ticket { chain, seq: 1 }
    }

    fn trade() -> TradeRecord {
        fallback_snapshot().recent_trades[4].clone()
    }

    #[test]
    fn enhanced_analysis_preferred() {
        let backend = FakeBackend::default().with_enhanced(Ok(EnhancedAnalysis {
            symbol: "USD/JPY".into(),
            ..EnhancedAnalysis::default()
        }));
        let job = Job::TradeAnalysis {
            ticket: ticket(Chain::TradeAnalysis),
            trade: trade(),
        };
        match execute(&backend, job) {
            Some(Outcome::TradeAnalysis { result: Ok(a), .. }) => assert!(a.is_enhanced()),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(backend.calls(), vec!["enhanced 1003"]);
    }

    #[test]
    fn basic_analysis_when_enhanced_fails() {
        let backend = FakeBackend::default()
            .with_enhanced(Err(ClientError::Status {
                status: 404,
                message: "Trade not found".into(),
            }))
            .with_basic(Ok(BasicAnalysis {
                outcome: pairdesk_core::domain::TradeOutcome::Profit,
                headline: "server".into(),
                observations: vec![],
                remediation: vec![],
            }));
        let job = Job::TradeAnalysis {
            ticket: ticket(Chain::TradeAnalysis),
            trade: trade(),
        };
        match execute(&backend, job) {
            Some(Outcome::TradeAnalysis {
                result: Ok(AnalysisResult::Basic(b)),
                ..
            }) => assert_eq!(b.headline, "server"),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(backend.calls(), vec!["enhanced 1003", "basic 1003"]);
    }

    #[test]
    fn fetch_source_loads_strategy_before_backtest() {
        let backend = FakeBackend::default().with_backtest(Ok(sample_backtest()));
        let job = Job::Backtest {
            ticket: ticket(Chain::Backtest),
            symbol: "EUR/USD".into(),
            source: StrategySource::Fetch,
            initial_balance: 1000.0,
        };
        match execute(&backend, job) {
            Some(Outcome::Backtest {
                strategy,
                result: Ok(_),
                ..
            }) => assert_eq!(strategy, crate::test_helpers::STRATEGY_TEXT),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(backend.calls(), vec!["strategy EUR/USD", "backtest EUR/USD"]);
    }

    #[test]
    fn failed_strategy_fetch_skips_backtest() {
        let backend =
            FakeBackend::default().with_strategy(Err(ClientError::Backend("no file".into())));
        let job = Job::Backtest {
            ticket: ticket(Chain::Backtest),
            symbol: "EUR/USD".into(),
            source: StrategySource::Fetch,
            initial_balance: 1000.0,
        };
        match execute(&backend, job) {
            Some(Outcome::Backtest {
                strategy,
                result: Err(ClientError::Backend(_)),
                ..
            }) => assert!(strategy.is_empty()),
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(backend.calls(), vec!["strategy EUR/USD"]);
    }

    #[test]
    fn shutdown_yields_nothing() {
        assert!(execute(&FakeBackend::default(), Job::Shutdown).is_none());
    }

    #[test]
    fn pool_runs_jobs_and_stops() {
        let backend: Arc<dyn TradingBackend> = Arc::new(FakeBackend::default());
        let (job_tx, job_rx) = mpsc::channel();
        let (out_tx, out_rx) = mpsc::channel();
        let handles = spawn_workers(2, backend, job_rx, out_tx).unwrap();

        for request in 1..=3 {
            job_tx
                .send(Job::LoadSnapshot {
                    request,
                    reason: LoadReason::Periodic,
                })
                .unwrap();
        }
        let mut seen: Vec<u64> = (0..3)
            .map(|_| match out_rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                Outcome::Snapshot { request, .. } => request,
                other => panic!("unexpected outcome {other:?}"),
            })
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2, 3]);

        for _ in 0..handles.len() {
            job_tx.send(Job::Shutdown).unwrap();
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
