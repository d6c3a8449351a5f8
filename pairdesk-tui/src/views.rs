//! View models held by each modal.

use std::time::Instant;

use serde_json::Value;

use pairdesk_core::domain::{Priority, ParameterRecommendation};
use pairdesk_core::{
    AnalysisResult, BacktestMetrics, BacktestResult, ParameterOptimization, StrategyDocument,
    SuggestionResponse, TradeRecord,
};

use crate::workflow::Ticket;

/// A trade with one of its two analysis representations.
#[derive(Debug, Clone)]
pub struct TradeAnalysisView {
    pub trade: TradeRecord,
    pub analysis: AnalysisResult,
    /// True when the analysis was derived locally because the backend failed.
    pub local: bool,
}

pub const NO_MARKET_ANALYSIS: &str = "No market analysis available for this pair yet.";

/// Per-symbol report with every field defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyAnalysisView {
    pub symbol: String,
    pub total_pnl: f64,
    pub win_rate: f64,
    pub total_trades: u64,
    pub profit_factor: f64,
    pub best_trade: f64,
    pub worst_trade: f64,
    pub max_drawdown: f64,
    pub avg_trade_size: f64,
    pub insights: Vec<String>,
    pub market_analysis: String,
    pub recommendations: Vec<String>,
    pub strategy_code: Option<String>,
    pub strategy_improvements: Vec<String>,
    pub recent_trades: Vec<TradeRecord>,
}

impl CurrencyAnalysisView {
    /// Build from the loosely typed payload. Returns the view and the wire
    /// names of fields that were absent or had the wrong type.
    pub fn from_payload(symbol: &str, payload: &Value) -> (Self, Vec<&'static str>) {
        let mut missing = Vec::new();

        let mut number = |key: &'static str| match payload.get(key).and_then(Value::as_f64) {
            Some(v) => v,
            None => {
                missing.push(key);
                0.0
            }
        };
        let total_pnl = number("totalPnL");
        let win_rate = number("winRate");
        let total_trades = number("totalTrades").max(0.0).round() as u64;
        let profit_factor = number("profitFactor");
        let best_trade = number("bestTrade");
        let worst_trade = number("worstTrade");
        let max_drawdown = number("maxDrawdown");
        let avg_trade_size = number("avgTradeSize");

        let mut lines = |key: &'static str| match payload.get(key).and_then(Value::as_array) {
            Some(items) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect::<Vec<String>>(),
            None => {
                missing.push(key);
                Vec::new()
            }
        };
        let insights = lines("aiInsights");
        let recommendations = lines("recommendations");
        let strategy_improvements = lines("strategyImprovements");

        let market_analysis = match payload.get("marketAnalysis").and_then(Value::as_str) {
            Some(text) if !text.trim().is_empty() => text.to_string(),
            _ => {
                missing.push("marketAnalysis");
                NO_MARKET_ANALYSIS.to_string()
            }
        };

        let strategy_code = payload
            .get("strategyCode")
            .and_then(Value::as_str)
            .filter(|code| !code.trim().is_empty())
            .map(str::to_string);

        let recent_trades = match payload.get("recentTrades").and_then(Value::as_array) {
            Some(items) => {
                let parsed: Vec<TradeRecord> = items
                    .iter()
                    .filter_map(|v| serde_json::from_value(v.clone()).ok())
                    .collect();
                if parsed.len() != items.len() {
                    missing.push("recentTrades");
                }
                parsed
            }
            None => {
                missing.push("recentTrades");
                Vec::new()
            }
        };

        let view = Self {
            symbol: symbol.to_string(),
            total_pnl,
            win_rate,
            total_trades,
            profit_factor,
            best_trade,
            worst_trade,
            max_drawdown,
            avg_trade_size,
            insights,
            market_analysis,
            recommendations,
            strategy_code,
            strategy_improvements,
            recent_trades,
        };
        (view, missing)
    }
}

/// Editable strategy text.
///
/// The cursor is a byte offset into `buffer` and always sits on a char
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorView {
    pub symbol: String,
    pub file: String,
    /// Text as last loaded from or saved to the backend.
    pub original: String,
    pub buffer: String,
    pub cursor: usize,
}

impl EditorView {
    pub fn new(doc: StrategyDocument) -> Self {
        Self {
            cursor: doc.code.len(),
            buffer: doc.code.clone(),
            original: doc.code,
            symbol: doc.symbol,
            file: doc.file,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.buffer != self.original
    }

    /// Discard edits.
    pub fn revert(&mut self) {
        self.buffer = self.original.clone();
        self.cursor = self.cursor.min(self.buffer.len());
        self.snap_cursor();
    }

    /// Replace both the saved and edited text.
    pub fn reload(&mut self, code: String) {
        self.original = code.clone();
        self.buffer = code;
        self.cursor = self.cursor.min(self.buffer.len());
        self.snap_cursor();
    }

    pub fn mark_saved(&mut self, code: &str) {
        self.original = code.to_string();
    }

    pub fn insert(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
            self.buffer.remove(self.cursor);
        }
    }

    pub fn left(&mut self) {
        if let Some(prev) = self.buffer[..self.cursor].chars().next_back() {
            self.cursor -= prev.len_utf8();
        }
    }

    pub fn right(&mut self) {
        if let Some(next) = self.buffer[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = self.line_start();
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer[self.cursor..]
            .find('\n')
            .map_or(self.buffer.len(), |i| self.cursor + i);
    }

    pub fn up(&mut self) {
        let start = self.line_start();
        if start == 0 {
            self.cursor = 0;
            return;
        }
        let column = self.buffer[start..self.cursor].chars().count();
        let prev_start = self.buffer[..start - 1].rfind('\n').map_or(0, |i| i + 1);
        self.cursor = Self::offset_at_column(&self.buffer, prev_start, column);
    }

    pub fn down(&mut self) {
        let start = self.line_start();
        let column = self.buffer[start..self.cursor].chars().count();
        match self.buffer[self.cursor..].find('\n') {
            Some(i) => {
                let next_start = self.cursor + i + 1;
                self.cursor = Self::offset_at_column(&self.buffer, next_start, column);
            }
            None => self.cursor = self.buffer.len(),
        }
    }

    /// Zero-based (line, column) of the cursor, in chars.
    pub fn position(&self) -> (usize, usize) {
        let before = &self.buffer[..self.cursor];
        let line = before.matches('\n').count();
        let column = before[self.line_start()..].chars().count();
        (line, column)
    }

    fn line_start(&self) -> usize {
        self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1)
    }

    fn offset_at_column(text: &str, line_start: usize, column: usize) -> usize {
        let line = &text[line_start..];
        let line_end = line.find('\n').unwrap_or(line.len());
        line[..line_end]
            .char_indices()
            .nth(column)
            .map_or(line_start + line_end, |(i, _)| line_start + i)
    }

    fn snap_cursor(&mut self) {
        while !self.buffer.is_char_boundary(self.cursor) {
            self.cursor -= 1;
        }
    }
}

#[derive(Debug, Clone)]
pub enum BacktestState {
    Loading { started: Instant },
    Results(Box<BacktestResult>),
    Failed(String),
}

/// A backtest run: the request and its resolution.
#[derive(Debug, Clone)]
pub struct BacktestView {
    pub ticket: Ticket,
    pub symbol: String,
    /// Strategy text the run was started with.
    pub strategy: String,
    pub state: BacktestState,
}

impl BacktestView {
    pub fn loading(ticket: Ticket, symbol: String, strategy: String, now: Instant) -> Self {
        Self {
            ticket,
            symbol,
            strategy,
            state: BacktestState::Loading { started: now },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, BacktestState::Loading { .. })
    }

    pub fn result(&self) -> Option<&BacktestResult> {
        match &self.state {
            BacktestState::Results(result) => Some(result.as_ref()),
            _ => None,
        }
    }

    pub fn metrics(&self) -> Option<BacktestMetrics> {
        self.result().map(BacktestMetrics::from_result)
    }
}

/// What happened to an auto-apply request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoApplyStatus {
    NotRequested,
    Applied { path: Option<String> },
    Failed { reason: String },
}

#[derive(Debug, Clone)]
pub struct SuggestionsView {
    pub symbol: String,
    pub response: SuggestionResponse,
    pub auto_apply: AutoApplyStatus,
    /// Index into `suggested_code_changes`.
    pub selected: usize,
}

impl SuggestionsView {
    pub fn new(symbol: String, response: SuggestionResponse, auto_apply_requested: bool) -> Self {
        let auto_apply = if !auto_apply_requested {
            AutoApplyStatus::NotRequested
        } else if response.auto_applied {
            AutoApplyStatus::Applied {
                path: response.applied_to.clone(),
            }
        } else {
            AutoApplyStatus::Failed {
                reason: response
                    .auto_apply_error
                    .clone()
                    .unwrap_or_else(|| "no code changes were suggested".to_string()),
            }
        };
        Self {
            symbol,
            response,
            auto_apply,
            selected: 0,
        }
    }

    pub fn proposals(&self) -> &[String] {
        &self.response.suggestions.suggested_code_changes
    }

    pub fn selected_proposal(&self) -> Option<&str> {
        self.proposals().get(self.selected).map(String::as_str)
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.proposals().len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[derive(Debug, Clone)]
pub struct OptimizationView {
    pub symbol: String,
    pub optimization: ParameterOptimization,
}

impl OptimizationView {
    pub fn new(symbol: String, optimization: ParameterOptimization) -> Self {
        Self {
            symbol,
            optimization,
        }
    }

    pub fn grouped(&self) -> Vec<(Priority, Vec<(&str, &ParameterRecommendation)>)> {
        self.optimization.by_priority()
    }
}
