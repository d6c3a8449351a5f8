//! Test helpers: an in-process backend with scripted answers.

use std::sync::Mutex;

use serde_json::{json, Value};

use pairdesk_core::domain::{SimulatedTrade, TradeOutcome};
use pairdesk_core::fallback::fallback_snapshot;
use pairdesk_core::{
    BacktestResult, BasicAnalysis, ClientError, EnhancedAnalysis, OptimizationRequest,
    ParameterOptimization, Snapshot, StrategyDocument, SuggestionRequest, SuggestionResponse,
    TradeId, TradingBackend,
};

pub const STRATEGY_TEXT: &str = "ZONE_LOOKBACK = 300\nBASE_MAX_CANDLES = 5\n";

pub fn sample_backtest() -> BacktestResult {
    let trade = |usd_pnl: f64| SimulatedTrade {
        pair: "EUR/USD".into(),
        direction: "BUY".into(),
        usd_pnl,
        exit_reason: if usd_pnl > 0.0 { "take_profit" } else { "stop_loss" }.into(),
        ..SimulatedTrade::default()
    };
    BacktestResult {
        target_pair: "EUR/USD".into(),
        initial_balance: 1000.0,
        final_balance: 1042.5,
        total_pnl: 42.5,
        total_trades: 3,
        winning_trades: 1,
        losing_trades: 2,
        win_rate: 33.3,
        max_drawdown: 1.2,
        peak_balance: 1060.0,
        lowest_balance: 990.0,
        trades: vec![trade(60.0), trade(-10.0), trade(-7.5)],
    }
}

/// Backend whose every answer is set up front. Records the calls it gets.
pub struct FakeBackend {
    snapshot: Result<Snapshot, ClientError>,
    enhanced: Result<EnhancedAnalysis, ClientError>,
    basic: Result<BasicAnalysis, ClientError>,
    currency: Result<Value, ClientError>,
    strategy: Result<StrategyDocument, ClientError>,
    save: Result<(), ClientError>,
    backtest: Result<BacktestResult, ClientError>,
    suggestions: Result<SuggestionResponse, ClientError>,
    optimization: Result<ParameterOptimization, ClientError>,
    calls: Mutex<Vec<String>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            snapshot: Ok(fallback_snapshot()),
            enhanced: Ok(EnhancedAnalysis::default()),
            basic: Ok(BasicAnalysis {
                outcome: TradeOutcome::Profit,
                headline: "basic".into(),
                observations: vec![],
                remediation: vec![],
            }),
            currency: Ok(json!({})),
            strategy: Ok(StrategyDocument {
                symbol: "EUR/USD".into(),
                file: "eurusd_strategy.py".into(),
                code: STRATEGY_TEXT.into(),
            }),
            save: Ok(()),
            backtest: Ok(sample_backtest()),
            suggestions: Ok(SuggestionResponse::default()),
            optimization: Ok(ParameterOptimization::default()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeBackend {
    pub fn with_snapshot(mut self, result: Result<Snapshot, ClientError>) -> Self {
        self.snapshot = result;
        self
    }

    pub fn with_enhanced(mut self, result: Result<EnhancedAnalysis, ClientError>) -> Self {
        self.enhanced = result;
        self
    }

    pub fn with_basic(mut self, result: Result<BasicAnalysis, ClientError>) -> Self {
        self.basic = result;
        self
    }

    pub fn with_strategy(mut self, result: Result<StrategyDocument, ClientError>) -> Self {
        self.strategy = result;
        self
    }

    pub fn with_backtest(mut self, result: Result<BacktestResult, ClientError>) -> Self {
        self.backtest = result;
        self
    }

    /// Calls received so far, e.g. `"backtest EUR/USD"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl TradingBackend for FakeBackend {
    fn name(&self) -> &str {
        "fake"
    }

    fn fetch_snapshot(&self) -> Result<Snapshot, ClientError> {
        self.record("snapshot".into());
        self.snapshot.clone()
    }

    fn enhanced_trade_analysis(&self, id: TradeId) -> Result<EnhancedAnalysis, ClientError> {
        self.record(format!("enhanced {id}"));
        self.enhanced.clone()
    }

    fn basic_trade_analysis(&self, id: TradeId) -> Result<BasicAnalysis, ClientError> {
        self.record(format!("basic {id}"));
        self.basic.clone()
    }

    fn currency_analysis(&self, symbol: &str) -> Result<Value, ClientError> {
        self.record(format!("currency {symbol}"));
        self.currency.clone()
    }

    fn strategy(&self, symbol: &str) -> Result<StrategyDocument, ClientError> {
        self.record(format!("strategy {symbol}"));
        self.strategy.clone()
    }

    fn save_strategy(&self, symbol: &str, _code: &str) -> Result<(), ClientError> {
        self.record(format!("save {symbol}"));
        self.save.clone()
    }

    fn run_backtest(
        &self,
        symbol: &str,
        _code: &str,
        _initial_balance: f64,
    ) -> Result<BacktestResult, ClientError> {
        self.record(format!("backtest {symbol}"));
        self.backtest.clone()
    }

    fn suggestions(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, ClientError> {
        self.record(format!("suggestions {}", request.symbol));
        self.suggestions.clone()
    }

    fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<ParameterOptimization, ClientError> {
        self.record(format!("optimize {}", request.symbol));
        self.optimization.clone()
    }
}
