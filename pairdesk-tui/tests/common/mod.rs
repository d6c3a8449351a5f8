//! Shared setup: a scripted in-process backend behind the real worker pool.

#![allow(dead_code)]

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use serde_json::{json, Value};

use pairdesk_core::domain::{SimulatedTrade, TradeOutcome};
use pairdesk_core::fallback::fallback_snapshot;
use pairdesk_core::{
    AiSuggestionSet, BacktestResult, BasicAnalysis, ClientError, DeskConfig, EnhancedAnalysis,
    OptimizationRequest, ParameterOptimization, Snapshot, StrategyDocument, SuggestionRequest,
    SuggestionResponse, TradeId, TradingBackend,
};
use pairdesk_tui::app::App;
use pairdesk_tui::worker::spawn_workers;

pub const STRATEGY: &str = "ZONE_LOOKBACK = 300\n";
pub const PROPOSAL: &str = "ZONE_LOOKBACK = 200\n";

fn backtest(symbol: &str) -> BacktestResult {
    let trade = |usd_pnl: f64| SimulatedTrade {
        pair: symbol.to_string(),
        direction: "SELL".into(),
        usd_pnl,
        exit_reason: "stop_loss".into(),
        ..SimulatedTrade::default()
    };
    BacktestResult {
        target_pair: symbol.to_string(),
        initial_balance: 1000.0,
        final_balance: 980.0,
        total_pnl: -20.0,
        total_trades: 2,
        winning_trades: 0,
        losing_trades: 2,
        win_rate: 0.0,
        max_drawdown: 2.0,
        peak_balance: 1000.0,
        lowest_balance: 980.0,
        trades: vec![trade(-12.0), trade(-8.0)],
    }
}

/// Backend with swappable answers. Every call is recorded.
pub struct ScriptedBackend {
    pub snapshot: Mutex<Result<Snapshot, ClientError>>,
    pub enhanced: Mutex<Result<EnhancedAnalysis, ClientError>>,
    pub currency: Mutex<Result<Value, ClientError>>,
    pub suggestions: Mutex<Result<SuggestionResponse, ClientError>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            snapshot: Mutex::new(Ok(fallback_snapshot())),
            enhanced: Mutex::new(Ok(EnhancedAnalysis::default())),
            currency: Mutex::new(Ok(json!({ "totalPnL": 156.4, "winRate": 62.5 }))),
            suggestions: Mutex::new(Ok(SuggestionResponse {
                suggestions: AiSuggestionSet {
                    risk_management: vec!["Tighten stops".into()],
                    suggested_code_changes: vec![PROPOSAL.into()],
                    ..AiSuggestionSet::default()
                },
                auto_applied: true,
                applied_to: Some("eurusd_strategy.py".into()),
                auto_apply_error: None,
            })),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn set<T>(slot: &Mutex<T>, value: T) {
        *slot.lock().unwrap() = value;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

impl TradingBackend for ScriptedBackend {
    fn name(&self) -> &str {
        "scripted"
    }

    fn fetch_snapshot(&self) -> Result<Snapshot, ClientError> {
        self.record("snapshot".into());
        self.snapshot.lock().unwrap().clone()
    }

    fn enhanced_trade_analysis(&self, id: TradeId) -> Result<EnhancedAnalysis, ClientError> {
        self.record(format!("enhanced {id}"));
        self.enhanced.lock().unwrap().clone()
    }

    fn basic_trade_analysis(&self, id: TradeId) -> Result<BasicAnalysis, ClientError> {
        self.record(format!("basic {id}"));
        Ok(BasicAnalysis {
            outcome: TradeOutcome::Breakeven,
            headline: "Server-side summary".into(),
            observations: vec![],
            remediation: vec![],
        })
    }

    fn currency_analysis(&self, symbol: &str) -> Result<Value, ClientError> {
        self.record(format!("currency {symbol}"));
        self.currency.lock().unwrap().clone()
    }

    fn strategy(&self, symbol: &str) -> Result<StrategyDocument, ClientError> {
        self.record(format!("strategy {symbol}"));
        Ok(StrategyDocument {
            symbol: symbol.to_string(),
            file: "eurusd_strategy.py".into(),
            code: STRATEGY.into(),
        })
    }

    fn save_strategy(&self, symbol: &str, _code: &str) -> Result<(), ClientError> {
        self.record(format!("save {symbol}"));
        Ok(())
    }

    fn run_backtest(
        &self,
        symbol: &str,
        code: &str,
        _initial_balance: f64,
    ) -> Result<BacktestResult, ClientError> {
        self.record(format!("backtest {symbol} {}", code.trim()));
        Ok(backtest(symbol))
    }

    fn suggestions(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, ClientError> {
        self.record(format!("suggestions {} {}", request.symbol, request.auto_apply));
        self.suggestions.lock().unwrap().clone()
    }

    fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<ParameterOptimization, ClientError> {
        self.record(format!("optimize {}", request.symbol));
        Ok(ParameterOptimization::default())
    }
}

/// An `App` wired to two real worker threads.
pub struct Desk {
    pub app: App,
    workers: Vec<JoinHandle<()>>,
}

impl Desk {
    pub fn start(backend: Arc<ScriptedBackend>) -> Self {
        let (job_tx, job_rx) = mpsc::channel();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let workers = spawn_workers(2, backend, job_rx, outcome_tx).unwrap();
        let now = Instant::now();
        let mut app = App::new(&DeskConfig::default(), job_tx, outcome_rx, now);
        app.start(now);
        Self { app, workers }
    }

    /// Apply outcomes until `done` holds. Panics after five seconds.
    pub fn wait_for(&mut self, what: &str, done: impl Fn(&App) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            self.app.drain_outcomes(Instant::now());
            if done(&self.app) {
                return;
            }
            thread::sleep(Duration::from_millis(5));
        }
        panic!("timed out waiting for {what}");
    }

    pub fn stop(mut self) {
        self.app.shutdown();
        for handle in self.workers {
            handle.join().unwrap();
        }
    }
}
