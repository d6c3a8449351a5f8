//! Analysis workflow: trade inspection, strategy editing, backtests and the
//! AI suggestion loop.
//!
//! Every user action on a chain issues a fresh `Ticket` and produces a `Job`
//! for the worker pool. Only the newest ticket per chain may land: anything
//! older that resolves later is dropped. Each resolution ends in a modal or a
//! notification, never silently.

use std::collections::HashMap;
use std::time::Instant;

use tracing::{debug, info, warn};

use pairdesk_core::analysis::basic_analysis;
use pairdesk_core::domain::BaselineParameters;
use pairdesk_core::{
    validate_strategy_text, AnalysisResult, BacktestMetrics, OptimizationRequest,
    SuggestionRequest, TradeRecord,
};

use crate::modal::{ModalContent, ModalId, ModalManager};
use crate::notify::{NoticeKind, NotificationCenter};
use crate::views::{
    AutoApplyStatus, BacktestState, BacktestView, CurrencyAnalysisView, EditorView,
    OptimizationView, SuggestionsView, TradeAnalysisView,
};
use crate::worker::{Job, Outcome};

/// Independent request chains. Each keeps its own latest ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Chain {
    TradeAnalysis,
    CurrencyAnalysis,
    StrategyLoad,
    StrategySave,
    Backtest,
    Suggestions,
    Optimization,
    ApplyStrategy,
}

impl Chain {
    pub const ALL: [Chain; 8] = [
        Chain::TradeAnalysis,
        Chain::CurrencyAnalysis,
        Chain::StrategyLoad,
        Chain::StrategySave,
        Chain::Backtest,
        Chain::Suggestions,
        Chain::Optimization,
        Chain::ApplyStrategy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Chain::TradeAnalysis => "trade analysis",
            Chain::CurrencyAnalysis => "currency analysis",
            Chain::StrategyLoad => "loading strategy",
            Chain::StrategySave => "saving strategy",
            Chain::Backtest => "backtest",
            Chain::Suggestions => "AI suggestions",
            Chain::Optimization => "optimisation",
            Chain::ApplyStrategy => "applying strategy",
        }
    }
}

/// Identifies one request on one chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub chain: Chain,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainPhase {
    Idle,
    Requesting,
    Succeeded,
    /// Resolved with a degraded representation.
    FellBack,
    Failed,
}

/// Where a backtest gets its strategy text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategySource {
    Inline(String),
    /// Load the symbol's saved strategy first.
    Fetch,
}

/// Why a strategy is being loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyPurpose {
    Open,
    Reset,
}

/// A strategy that was just written and can be backtested again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RerunOffer {
    pub symbol: String,
    pub strategy: String,
}

/// Where workflow results are reported.
pub struct Feedback<'a> {
    pub modals: &'a mut ModalManager,
    pub notices: &'a mut NotificationCenter,
    pub now: Instant,
}

impl Feedback<'_> {
    fn error(&mut self, message: impl Into<String>) {
        self.notices.notify(message, NoticeKind::Error, self.now);
    }

    fn success(&mut self, message: impl Into<String>) {
        self.notices.notify(message, NoticeKind::Success, self.now);
    }

    fn info(&mut self, message: impl Into<String>) {
        self.notices.notify(message, NoticeKind::Info, self.now);
    }
}

#[derive(Debug)]
pub struct AnalysisWorkflowController {
    next_seq: u64,
    latest: HashMap<Chain, u64>,
    phases: HashMap<Chain, ChainPhase>,
    rerun: Option<RerunOffer>,
    initial_balance: f64,
}

impl AnalysisWorkflowController {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            next_seq: 0,
            latest: HashMap::new(),
            phases: HashMap::new(),
            rerun: None,
            initial_balance,
        }
    }

    fn begin(&mut self, chain: Chain) -> Ticket {
        self.next_seq += 1;
        self.latest.insert(chain, self.next_seq);
        self.phases.insert(chain, ChainPhase::Requesting);
        Ticket {
            chain,
            seq: self.next_seq,
        }
    }

    fn finish(&mut self, chain: Chain, phase: ChainPhase) {
        self.phases.insert(chain, phase);
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.get(&ticket.chain) == Some(&ticket.seq)
    }

    pub fn phase(&self, chain: Chain) -> ChainPhase {
        self.phases.get(&chain).copied().unwrap_or(ChainPhase::Idle)
    }

    /// Chains with a request in flight, in a fixed order.
    pub fn pending_chains(&self) -> Vec<Chain> {
        Chain::ALL
            .into_iter()
            .filter(|&c| self.phase(c) == ChainPhase::Requesting)
            .collect()
    }

    pub fn rerun_offer(&self) -> Option<&RerunOffer> {
        self.rerun.as_ref()
    }

    pub fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    // ── Entry points ────────────────────────────────────────────────

    pub fn open_trade_analysis(&mut self, trade: &TradeRecord) -> Job {
        let ticket = self.begin(Chain::TradeAnalysis);
        debug!(trade = %trade.id, seq = ticket.seq, "trade analysis requested");
        Job::TradeAnalysis {
            ticket,
            trade: trade.clone(),
        }
    }

    pub fn open_currency_analysis(&mut self, symbol: &str) -> Job {
        let ticket = self.begin(Chain::CurrencyAnalysis);
        Job::CurrencyAnalysis {
            ticket,
            symbol: symbol.to_string(),
        }
    }

    pub fn open_strategy_editor(&mut self, symbol: &str) -> Job {
        let ticket = self.begin(Chain::StrategyLoad);
        Job::LoadStrategy {
            ticket,
            symbol: symbol.to_string(),
            purpose: StrategyPurpose::Open,
        }
    }

    /// Save the editor buffer as is. Blank text never leaves the client.
    pub fn save_strategy(&mut self, fb: &mut Feedback<'_>) -> Option<Job> {
        let editor = fb.modals.editor()?;
        let (symbol, code) = (editor.symbol.clone(), editor.buffer.clone());
        if let Err(e) = validate_strategy_text(&code) {
            fb.error(format!("Cannot save strategy: {e}"));
            return None;
        }
        let ticket = self.begin(Chain::StrategySave);
        Some(Job::SaveStrategy {
            ticket,
            symbol,
            code,
        })
    }

    /// Drop local edits and reload the saved text.
    pub fn reset_strategy(&mut self, fb: &mut Feedback<'_>) -> Option<Job> {
        let editor = fb.modals.editor_mut()?;
        editor.revert();
        let symbol = editor.symbol.clone();
        let ticket = self.begin(Chain::StrategyLoad);
        Some(Job::LoadStrategy {
            ticket,
            symbol,
            purpose: StrategyPurpose::Reset,
        })
    }

    /// Start a backtest and show its loading view right away.
    pub fn run_backtest(
        &mut self,
        symbol: &str,
        source: StrategySource,
        fb: &mut Feedback<'_>,
    ) -> Option<Job> {
        let strategy = match &source {
            StrategySource::Inline(code) => {
                if let Err(e) = validate_strategy_text(code) {
                    fb.error(format!("Cannot run backtest: {e}"));
                    return None;
                }
                code.clone()
            }
            StrategySource::Fetch => String::new(),
        };

        let ticket = self.begin(Chain::Backtest);
        info!(symbol, seq = ticket.seq, "backtest requested");
        let view = BacktestView::loading(ticket, symbol.to_string(), strategy, fb.now);
        fb.modals
            .show(ModalId::BacktestResults, ModalContent::Backtest(view), fb.now);
        Some(Job::Backtest {
            ticket,
            symbol: symbol.to_string(),
            source,
            initial_balance: self.initial_balance,
        })
    }

    pub fn run_backtest_from_editor(&mut self, fb: &mut Feedback<'_>) -> Option<Job> {
        let editor = fb.modals.editor()?;
        let (symbol, code) = (editor.symbol.clone(), editor.buffer.clone());
        self.run_backtest(&symbol, StrategySource::Inline(code), fb)
    }

    /// Backtest the proposal selected in the suggestions modal.
    pub fn backtest_selected_proposal(&mut self, fb: &mut Feedback<'_>) -> Option<Job> {
        let view = fb.modals.suggestions()?;
        let symbol = view.symbol.clone();
        let Some(code) = view.selected_proposal().map(str::to_string) else {
            fb.info("No suggested strategy to backtest");
            return None;
        };
        self.run_backtest(&symbol, StrategySource::Inline(code), fb)
    }

    /// Ask for suggestions on the finished backtest currently shown.
    pub fn request_suggestions(&mut self, auto_apply: bool, fb: &mut Feedback<'_>) -> Option<Job> {
        let Some((symbol, strategy, metrics)) = finished_backtest(fb.modals) else {
            fb.info("Run a backtest before asking for suggestions");
            return None;
        };
        let ticket = self.begin(Chain::Suggestions);
        info!(symbol = %symbol, auto_apply, "AI suggestions requested");
        Some(Job::Suggestions {
            ticket,
            request: SuggestionRequest {
                symbol,
                current_strategy: strategy,
                backtest_results: metrics,
                auto_apply,
            },
        })
    }

    pub fn request_optimization(&mut self, fb: &mut Feedback<'_>) -> Option<Job> {
        let Some((symbol, _, metrics)) = finished_backtest(fb.modals) else {
            fb.info("Run a backtest before optimising parameters");
            return None;
        };
        let ticket = self.begin(Chain::Optimization);
        Some(Job::Optimize {
            ticket,
            request: OptimizationRequest {
                symbol,
                backtest_results: metrics,
                current_parameters: BaselineParameters::default(),
            },
        })
    }

    /// Persist the selected proposal as the symbol's strategy.
    pub fn apply_suggested_strategy(&mut self, fb: &mut Feedback<'_>) -> Option<Job> {
        let view = fb.modals.suggestions()?;
        let symbol = view.symbol.clone();
        let Some(code) = view.selected_proposal().map(str::to_string) else {
            fb.info("No code changes to apply");
            return None;
        };
        if let Err(e) = validate_strategy_text(&code) {
            fb.error(format!("Cannot apply strategy: {e}"));
            return None;
        }
        let ticket = self.begin(Chain::ApplyStrategy);
        Some(Job::ApplyStrategy {
            ticket,
            symbol,
            code,
        })
    }

    /// Re-run the backtest with the strategy that was just written.
    pub fn accept_rerun_offer(&mut self, fb: &mut Feedback<'_>) -> Option<Job> {
        let offer = self.rerun.take()?;
        self.run_backtest(&offer.symbol, StrategySource::Inline(offer.strategy), fb)
    }

    pub fn dismiss_rerun_offer(&mut self) {
        self.rerun = None;
    }

    // ── Resolution ─────────────────────────────────────────────────

    /// Land a worker outcome. Stale and snapshot outcomes are ignored.
    pub fn apply(&mut self, outcome: Outcome, fb: &mut Feedback<'_>) {
        let Some(ticket) = outcome.ticket() else {
            return;
        };
        if !self.is_current(ticket) {
            debug!(chain = ticket.chain.label(), seq = ticket.seq, "discarding stale result");
            return;
        }

        match outcome {
            Outcome::Snapshot { .. } => {}
            Outcome::TradeAnalysis { trade, result, .. } => {
                let (view, phase) = match result {
                    Ok(analysis @ AnalysisResult::Enhanced(_)) => (
                        TradeAnalysisView {
                            trade,
                            analysis,
                            local: false,
                        },
                        ChainPhase::Succeeded,
                    ),
                    Ok(analysis @ AnalysisResult::Basic(_)) => (
                        TradeAnalysisView {
                            trade,
                            analysis,
                            local: false,
                        },
                        ChainPhase::FellBack,
                    ),
                    Err(e) => {
                        warn!(
                            trade = %trade.id,
                            error = %e,
                            "trade analysis unavailable, using local rules"
                        );
                        fb.info("AI analysis unavailable; showing basic analysis");
                        let analysis = AnalysisResult::Basic(basic_analysis(&trade));
                        (
                            TradeAnalysisView {
                                trade,
                                analysis,
                                local: true,
                            },
                            ChainPhase::FellBack,
                        )
                    }
                };
                let (show, hide) = if view.analysis.is_enhanced() {
                    (ModalId::EnhancedTradeAnalysis, ModalId::TradeAnalysis)
                } else {
                    (ModalId::TradeAnalysis, ModalId::EnhancedTradeAnalysis)
                };
                fb.modals.close(hide, fb.now);
                fb.modals.show(show, ModalContent::Trade(view), fb.now);
                self.finish(Chain::TradeAnalysis, phase);
            }
            Outcome::CurrencyAnalysis { symbol, result, .. } => match result {
                Ok(payload) if payload.is_object() => {
                    let (view, missing) = CurrencyAnalysisView::from_payload(&symbol, &payload);
                    if !missing.is_empty() {
                        warn!(
                            symbol = %symbol,
                            missing = ?missing,
                            "currency analysis incomplete, using defaults"
                        );
                    }
                    fb.modals.show(
                        ModalId::CurrencyAnalysis,
                        ModalContent::Currency(view),
                        fb.now,
                    );
                    self.finish(Chain::CurrencyAnalysis, ChainPhase::Succeeded);
                }
                Ok(_) => {
                    fb.error(format!("Currency analysis for {symbol} failed: unexpected response"));
                    self.finish(Chain::CurrencyAnalysis, ChainPhase::Failed);
                }
                Err(e) => {
                    fb.error(format!("Currency analysis for {symbol} failed: {e}"));
                    self.finish(Chain::CurrencyAnalysis, ChainPhase::Failed);
                }
            },
            Outcome::Strategy {
                symbol,
                purpose,
                result,
                ..
            } => match result {
                Ok(mut doc) => {
                    if doc.symbol.is_empty() {
                        doc.symbol = symbol.clone();
                    }
                    match purpose {
                        StrategyPurpose::Open => {
                            fb.modals.show(
                                ModalId::StrategyEditor,
                                ModalContent::Editor(EditorView::new(doc)),
                                fb.now,
                            );
                        }
                        StrategyPurpose::Reset => {
                            match fb.modals.editor_mut().filter(|e| e.symbol == symbol) {
                                Some(editor) => {
                                    editor.reload(doc.code);
                                    fb.info(format!("Reloaded strategy for {symbol}"));
                                }
                                None => debug!(symbol = %symbol, "editor closed before reload"),
                            }
                        }
                    }
                    self.finish(Chain::StrategyLoad, ChainPhase::Succeeded);
                }
                Err(e) => {
                    fb.error(format!("Could not load strategy for {symbol}: {e}"));
                    self.finish(Chain::StrategyLoad, ChainPhase::Failed);
                }
            },
            Outcome::Saved {
                symbol,
                code,
                result,
                ..
            } => match result {
                Ok(()) => {
                    if let Some(editor) = fb.modals.editor_mut().filter(|e| e.symbol == symbol) {
                        editor.mark_saved(&code);
                    }
                    fb.success(format!("Strategy saved for {symbol}"));
                    self.finish(Chain::StrategySave, ChainPhase::Succeeded);
                }
                Err(e) => {
                    fb.error(format!("Could not save strategy: {e}"));
                    self.finish(Chain::StrategySave, ChainPhase::Failed);
                }
            },
            Outcome::Backtest {
                ticket,
                symbol,
                strategy,
                result,
            } => {
                let failure = result.as_ref().err().map(ToString::to_string);
                let view = fb.modals.backtest_mut().filter(|v| v.ticket == ticket);
                match (view, result) {
                    (Some(view), Ok(res)) => {
                        info!(
                            symbol = %symbol,
                            trades = res.total_trades,
                            pnl = res.total_pnl,
                            "backtest finished"
                        );
                        view.strategy = strategy;
                        view.state = BacktestState::Results(Box::new(res));
                    }
                    (Some(view), Err(e)) => {
                        view.state = BacktestState::Failed(e.to_string());
                    }
                    (None, Ok(res)) => {
                        fb.info(format!(
                            "Backtest for {symbol} finished: {} trades, P&L ${:+.2}",
                            res.total_trades, res.total_pnl
                        ));
                    }
                    (None, Err(_)) => {}
                }
                match failure {
                    Some(reason) => {
                        fb.error(format!("Backtest for {symbol} failed: {reason}"));
                        self.finish(Chain::Backtest, ChainPhase::Failed);
                    }
                    None => self.finish(Chain::Backtest, ChainPhase::Succeeded),
                }
            }
            Outcome::Suggestions {
                symbol,
                auto_apply,
                result,
                ..
            } => match result {
                Ok(response) => {
                    let view = SuggestionsView::new(symbol.clone(), response, auto_apply);
                    match &view.auto_apply {
                        AutoApplyStatus::NotRequested => {}
                        AutoApplyStatus::Applied { path } => {
                            let target = path.as_deref().unwrap_or(symbol.as_str());
                            fb.success(format!(
                                "Applied suggested strategy to {target}. Press r to re-run the backtest."
                            ));
                            if let Some(code) = view.response.suggestions.first_proposal() {
                                if let Some(editor) =
                                    fb.modals.editor_mut().filter(|e| e.symbol == symbol)
                                {
                                    editor.reload(code.to_string());
                                }
                                self.rerun = Some(RerunOffer {
                                    symbol: symbol.clone(),
                                    strategy: code.to_string(),
                                });
                            }
                        }
                        AutoApplyStatus::Failed { reason } => {
                            fb.error(format!("Auto-apply failed: {reason}"));
                        }
                    }
                    fb.modals.show(
                        ModalId::AiSuggestions,
                        ModalContent::Suggestions(view),
                        fb.now,
                    );
                    self.finish(Chain::Suggestions, ChainPhase::Succeeded);
                }
                Err(e) => {
                    fb.error(format!("AI suggestions for {symbol} failed: {e}"));
                    self.finish(Chain::Suggestions, ChainPhase::Failed);
                }
            },
            Outcome::Optimization { symbol, result, .. } => match result {
                Ok(optimization) => {
                    fb.modals.show(
                        ModalId::ParameterOptimization,
                        ModalContent::Optimization(OptimizationView::new(symbol, optimization)),
                        fb.now,
                    );
                    self.finish(Chain::Optimization, ChainPhase::Succeeded);
                }
                Err(e) => {
                    fb.error(format!("Parameter optimisation for {symbol} failed: {e}"));
                    self.finish(Chain::Optimization, ChainPhase::Failed);
                }
            },
            Outcome::Applied {
                symbol,
                code,
                result,
                ..
            } => match result {
                Ok(()) => {
                    fb.modals.close(ModalId::AiSuggestions, fb.now);
                    if let Some(editor) = fb.modals.editor_mut().filter(|e| e.symbol == symbol) {
                        editor.reload(code.clone());
                    }
                    fb.success(format!(
                        "Applied suggested strategy to {symbol}. Press r to re-run the backtest."
                    ));
                    self.rerun = Some(RerunOffer {
                        symbol,
                        strategy: code,
                    });
                    self.finish(Chain::ApplyStrategy, ChainPhase::Succeeded);
                }
                Err(e) => {
                    fb.error(format!("Could not apply strategy: {e}"));
                    self.finish(Chain::ApplyStrategy, ChainPhase::Failed);
                }
            },
        }
    }
}

/// Symbol, strategy text and metrics of the finished backtest on screen.
fn finished_backtest(modals: &ModalManager) -> Option<(String, String, BacktestMetrics)> {
    let view = modals.backtest()?;
    let metrics = view.metrics()?;
    Some((view.symbol.clone(), view.strategy.clone(), metrics))
}
