//! Backend contract and structured error types.
//!
//! The `TradingBackend` trait abstracts over the trading service so the
//! dashboard can run against the HTTP backend or an in-process fake in tests.

mod envelope;
mod http;

pub use envelope::{take_field, unwrap_envelope};
pub use http::HttpBackend;

use serde::Serialize;
use thiserror::Error;

use crate::domain::{
    BacktestMetrics, BacktestResult, BaselineParameters, BasicAnalysis, EnhancedAnalysis,
    ParameterOptimization, Snapshot, StrategyDocument, SuggestionResponse, TradeId,
};

/// Structured error types for backend calls.
///
/// These are designed to be displayable directly in a notification.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("network unreachable: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Malformed(String),

    #[error("{0}")]
    Backend(String),

    #[error("{0}")]
    Validation(String),
}

/// Failure category, independent of the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Connection, timeout or non-2xx status.
    Transport,
    /// Body was not the expected JSON shape.
    Malformed,
    /// Backend answered with its own failure discriminator.
    Backend,
    /// Rejected locally before any request was sent.
    Validation,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Transport(_) | ClientError::Status { .. } => ErrorKind::Transport,
            ClientError::Malformed(_) => ErrorKind::Malformed,
            ClientError::Backend(_) => ErrorKind::Backend,
            ClientError::Validation(_) => ErrorKind::Validation,
        }
    }
}

/// Body of an AI suggestion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionRequest {
    pub symbol: String,
    pub current_strategy: String,
    pub backtest_results: BacktestMetrics,
    pub auto_apply: bool,
}

/// Body of a parameter optimisation request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationRequest {
    pub symbol: String,
    pub backtest_results: BacktestMetrics,
    pub current_parameters: BaselineParameters,
}

/// Everything the dashboard asks of the trading service.
///
/// Calls block; the dashboard only invokes them from worker threads.
pub trait TradingBackend: Send + Sync {
    /// Human-readable name of this backend, for logs.
    fn name(&self) -> &str;

    /// The aggregate account snapshot.
    fn fetch_snapshot(&self) -> Result<Snapshot, ClientError>;

    /// Candle-context analysis of one trade.
    fn enhanced_trade_analysis(&self, id: TradeId) -> Result<EnhancedAnalysis, ClientError>;

    /// The backend's own rule-based analysis of one trade.
    fn basic_trade_analysis(&self, id: TradeId) -> Result<BasicAnalysis, ClientError>;

    /// Per-symbol report. Returned loosely typed: every field is optional.
    fn currency_analysis(&self, symbol: &str) -> Result<serde_json::Value, ClientError>;

    fn strategy(&self, symbol: &str) -> Result<StrategyDocument, ClientError>;

    fn save_strategy(&self, symbol: &str, code: &str) -> Result<(), ClientError>;

    fn run_backtest(
        &self,
        symbol: &str,
        code: &str,
        initial_balance: f64,
    ) -> Result<BacktestResult, ClientError>;

    fn suggestions(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, ClientError>;

    fn optimize(&self, request: &OptimizationRequest)
        -> Result<ParameterOptimization, ClientError>;
}

/// Reject strategy text that is empty or whitespace only.
pub fn validate_strategy_text(code: &str) -> Result<(), ClientError> {
    if code.trim().is_empty() {
        Err(ClientError::Validation("strategy text is empty".to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_are_transport_failures() {
        let err = ClientError::Status {
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.to_string(), "HTTP 503: maintenance");
    }

    #[test]
    fn whitespace_strategy_is_rejected() {
        let err = validate_strategy_text("  \n\t").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(validate_strategy_text("class S: pass").is_ok());
    }

    #[test]
    fn optimisation_request_carries_baseline() {
        let req = OptimizationRequest {
            symbol: "EUR/USD".into(),
            backtest_results: BacktestMetrics::default(),
            current_parameters: BaselineParameters::default(),
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["current_parameters"]["zone_width_max_pips"], 30);
        assert_eq!(value["backtest_results"]["total_trades"], 0);
    }
}
