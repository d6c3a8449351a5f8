//! PairDesk Core — domain types, backend contract, fallback data and analysis rules.
//!
//! This crate contains everything the dashboard needs that does not touch the
//! terminal:
//! - Domain types for the aggregate snapshot (summary, symbols, trades, P&L history)
//! - Analysis, backtest, suggestion and optimisation payloads
//! - The `TradingBackend` trait and its HTTP implementation
//! - The deterministic fallback snapshot used when the backend is unreachable
//! - Local basic trade analysis rules
//! - TOML configuration

pub mod analysis;
pub mod client;
pub mod config;
pub mod domain;
pub mod fallback;

pub use client::{
    validate_strategy_text, ClientError, ErrorKind, HttpBackend, OptimizationRequest,
    SuggestionRequest, TradingBackend,
};
pub use config::{BackendConfig, ConfigError, DeskConfig, LoggingConfig, RefreshConfig};
pub use domain::{
    AiSuggestionSet, AnalysisResult, BacktestMetrics, BacktestResult, BasicAnalysis,
    EnhancedAnalysis, ParameterOptimization, PnlPoint, Side, Snapshot, StrategyDocument,
    SuggestionResponse, SymbolPerformance, TradeId, TradeRecord, TradeStatus, TradingSummary,
};
