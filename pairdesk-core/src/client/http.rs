//! HTTP implementation of the trading backend.
//!
//! Talks to the dashboard API over a blocking reqwest client. Path
//! parameters are appended as URL segments, so symbols such as `EUR/USD`
//! are percent-escaped rather than splitting the path.

use std::time::{Duration, Instant};

use reqwest::blocking::{Client, Response};
use reqwest::Url;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use super::envelope::{failure_message, take_field, unwrap_envelope};
use super::{
    validate_strategy_text, ClientError, OptimizationRequest, SuggestionRequest, TradingBackend,
};
use crate::config::BackendConfig;
use crate::domain::{
    BacktestResult, BasicAnalysis, EnhancedAnalysis, ParameterOptimization, Snapshot,
    StrategyDocument, SuggestionResponse, TradeId,
};

/// Trading backend reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, ClientError> {
        let base = Url::parse(&config.base_url).map_err(|e| {
            ClientError::Validation(format!("invalid backend URL '{}': {e}", config.base_url))
        })?;
        if base.cannot_be_a_base() {
            return Err(ClientError::Validation(format!(
                "backend URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("pairdesk/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(transport)?;

        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Base URL with `segments` appended, each percent-escaped.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Validation(format!("'{}' cannot carry a path", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, segments: &[&str]) -> Result<Map<String, Value>, ClientError> {
        let url = self.endpoint(segments)?;
        debug!(method = "GET", %url, "backend request");
        let started = Instant::now();
        let resp = self.client.get(url).send().map_err(transport)?;
        Self::read(resp, started)
    }

    fn post<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Map<String, Value>, ClientError> {
        let url = self.endpoint(segments)?;
        debug!(method = "POST", %url, "backend request");
        let started = Instant::now();
        let resp = self.client.post(url).json(body).send().map_err(transport)?;
        Self::read(resp, started)
    }

    /// Map status and body to an envelope or an error.
    fn read(resp: Response, started: Instant) -> Result<Map<String, Value>, ClientError> {
        let status = resp.status();
        let url = resp.url().clone();
        let text = resp.text().map_err(transport)?;
        debug!(
            %url,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "backend response"
        );

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.as_object().and_then(failure_message))
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("request failed")
                        .to_string()
                });
            warn!(%url, status = status.as_u16(), %message, "backend returned error status");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: Value = serde_json::from_str(&text)
            .map_err(|e| ClientError::Malformed(format!("invalid JSON: {e}")))?;
        unwrap_envelope(body)
    }
}

fn transport(e: reqwest::Error) -> ClientError {
    if e.is_timeout() {
        ClientError::Transport(format!("request timed out: {e}"))
    } else {
        ClientError::Transport(e.to_string())
    }
}

impl TradingBackend for HttpBackend {
    fn name(&self) -> &str {
        "http"
    }

    fn fetch_snapshot(&self) -> Result<Snapshot, ClientError> {
        let mut envelope = self.get(&["api", "all"])?;
        take_field(&mut envelope, "data")
    }

    fn enhanced_trade_analysis(&self, id: TradeId) -> Result<EnhancedAnalysis, ClientError> {
        let id = id.to_string();
        let mut envelope = self.get(&["api", "trade-analysis", &id])?;
        let mut data: Map<String, Value> = take_field(&mut envelope, "data")?;
        take_field(&mut data, "analysis")
    }

    fn basic_trade_analysis(&self, id: TradeId) -> Result<BasicAnalysis, ClientError> {
        let id = id.to_string();
        let mut envelope = self.get(&["api", "analyze-trade", &id])?;
        take_field(&mut envelope, "data")
    }

    fn currency_analysis(&self, symbol: &str) -> Result<Value, ClientError> {
        let mut envelope = self.get(&["api", "currency-analysis", symbol])?;
        let data: Value = take_field(&mut envelope, "data")?;
        if !data.is_object() {
            return Err(ClientError::Malformed(
                "currency analysis payload is not an object".to_string(),
            ));
        }
        Ok(data)
    }

    fn strategy(&self, symbol: &str) -> Result<StrategyDocument, ClientError> {
        let mut envelope = self.get(&["api", "get-strategy-code", symbol])?;
        let code: String = take_field(&mut envelope, "strategy_code")?;
        let file: String = take_field(&mut envelope, "strategy_file").unwrap_or_default();
        Ok(StrategyDocument {
            symbol: symbol.to_string(),
            file,
            code,
        })
    }

    fn save_strategy(&self, symbol: &str, code: &str) -> Result<(), ClientError> {
        validate_strategy_text(code)?;
        self.post(
            &["api", "save-strategy-code"],
            &json!({ "symbol": symbol, "strategy_code": code }),
        )?;
        Ok(())
    }

    fn run_backtest(
        &self,
        symbol: &str,
        code: &str,
        initial_balance: f64,
    ) -> Result<BacktestResult, ClientError> {
        validate_strategy_text(code)?;
        let mut envelope = self.post(
            &["api", "backtest"],
            &json!({
                "currency_pair": symbol,
                "strategy_code": code,
                "initial_balance": initial_balance,
            }),
        )?;
        take_field(&mut envelope, "results")
    }

    fn suggestions(&self, request: &SuggestionRequest) -> Result<SuggestionResponse, ClientError> {
        let envelope = self.post(&["api", "ai-strategy-suggestions"], request)?;
        serde_json::from_value(Value::Object(envelope))
            .map_err(|e| ClientError::Malformed(format!("suggestions: {e}")))
    }

    fn optimize(
        &self,
        request: &OptimizationRequest,
    ) -> Result<ParameterOptimization, ClientError> {
        let mut envelope = self.post(&["api", "ai-parameter-optimization"], request)?;
        take_field(&mut envelope, "optimization")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ErrorKind;

    fn backend(base_url: &str) -> Result<HttpBackend, ClientError> {
        HttpBackend::new(&BackendConfig {
            base_url: base_url.to_string(),
            ..BackendConfig::default()
        })
    }

    #[test]
    fn symbols_are_escaped_as_one_segment() {
        let backend = backend("http://127.0.0.1:5000").unwrap();
        let url = backend
            .endpoint(&["api", "currency-analysis", "EUR/USD"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:5000/api/currency-analysis/EUR%2FUSD"
        );
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let backend = backend("http://desk.local/trading/").unwrap();
        let url = backend.endpoint(&["api", "all"]).unwrap();
        assert_eq!(url.as_str(), "http://desk.local/trading/api/all");
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = backend("not a url").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = backend("mailto:desk@example.com").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
