//! Modal dialogs with singleton identities.
//!
//! Every modal has an identity from a closed set. Showing an identity first
//! removes any instance of it that is still around (including one playing
//! its exit), so there is never more than one instance per identity. Closing
//! starts the exit; the instance is destroyed when the exit finishes.

use std::time::{Duration, Instant};

use crate::views::{
    BacktestView, CurrencyAnalysisView, EditorView, OptimizationView, SuggestionsView,
    TradeAnalysisView,
};

pub const ENTER_DURATION: Duration = Duration::from_millis(150);
pub const EXIT_DURATION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalId {
    TradeAnalysis,
    EnhancedTradeAnalysis,
    CurrencyAnalysis,
    StrategyEditor,
    BacktestResults,
    AiSuggestions,
    ParameterOptimization,
}

impl ModalId {
    pub fn title(self) -> &'static str {
        match self {
            ModalId::TradeAnalysis => "Trade Analysis",
            ModalId::EnhancedTradeAnalysis => "AI Trade Analysis",
            ModalId::CurrencyAnalysis => "Currency Analysis",
            ModalId::StrategyEditor => "Strategy Editor",
            ModalId::BacktestResults => "Backtest Results",
            ModalId::AiSuggestions => "AI Strategy Suggestions",
            ModalId::ParameterOptimization => "Parameter Optimization",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalPhase {
    Entering,
    Open,
    Leaving,
}

/// Typed view model of each modal.
#[derive(Debug, Clone)]
pub enum ModalContent {
    Trade(TradeAnalysisView),
    Currency(CurrencyAnalysisView),
    Editor(EditorView),
    Backtest(BacktestView),
    Suggestions(SuggestionsView),
    Optimization(OptimizationView),
}

#[derive(Debug, Clone)]
pub struct Modal {
    pub id: ModalId,
    pub content: ModalContent,
    pub phase: ModalPhase,
    /// Start of the current phase.
    pub since: Instant,
    /// First visible line of the body.
    pub scroll: u16,
}

impl Modal {
    pub fn is_live(&self) -> bool {
        self.phase != ModalPhase::Leaving
    }
}

/// Owns every modal instance, bottom to top.
#[derive(Debug, Default)]
pub struct ModalManager {
    stack: Vec<Modal>,
}

impl ModalManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `content` under `id`, replacing any existing instance.
    pub fn show(&mut self, id: ModalId, content: ModalContent, now: Instant) {
        self.stack.retain(|m| m.id != id);
        self.stack.push(Modal {
            id,
            content,
            phase: ModalPhase::Entering,
            since: now,
            scroll: 0,
        });
    }

    /// Start the exit of `id`. Returns false when it was not live.
    pub fn close(&mut self, id: ModalId, now: Instant) -> bool {
        match self.stack.iter_mut().find(|m| m.id == id && m.is_live()) {
            Some(modal) => {
                modal.phase = ModalPhase::Leaving;
                modal.since = now;
                true
            }
            None => false,
        }
    }

    /// Close the topmost live modal, returning its identity.
    pub fn close_top(&mut self, now: Instant) -> Option<ModalId> {
        let id = self.top()?.id;
        self.close(id, now);
        Some(id)
    }

    /// Advance phase transitions and destroy finished exits.
    pub fn tick(&mut self, now: Instant) {
        for modal in &mut self.stack {
            if modal.phase == ModalPhase::Entering
                && now.saturating_duration_since(modal.since) >= ENTER_DURATION
            {
                modal.phase = ModalPhase::Open;
                modal.since = now;
            }
        }
        self.stack.retain(|m| {
            m.phase != ModalPhase::Leaving
                || now.saturating_duration_since(m.since) < EXIT_DURATION
        });
    }

    pub fn is_live(&self, id: ModalId) -> bool {
        self.stack.iter().any(|m| m.id == id && m.is_live())
    }

    /// Number of instances of `id` still mounted, live or leaving.
    pub fn instances(&self, id: ModalId) -> usize {
        self.stack.iter().filter(|m| m.id == id).count()
    }

    pub fn get(&self, id: ModalId) -> Option<&Modal> {
        self.stack.iter().find(|m| m.id == id && m.is_live())
    }

    pub fn get_mut(&mut self, id: ModalId) -> Option<&mut Modal> {
        self.stack.iter_mut().find(|m| m.id == id && m.is_live())
    }

    /// The live modal that receives input.
    pub fn top(&self) -> Option<&Modal> {
        self.stack.iter().rev().find(|m| m.is_live())
    }

    pub fn top_mut(&mut self) -> Option<&mut Modal> {
        self.stack.iter_mut().rev().find(|m| m.is_live())
    }

    /// All mounted modals, bottom first, for drawing.
    pub fn iter(&self) -> impl Iterator<Item = &Modal> {
        self.stack.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn has_live(&self) -> bool {
        self.top().is_some()
    }

    pub fn editor(&self) -> Option<&EditorView> {
        match self.get(ModalId::StrategyEditor).map(|m| &m.content) {
            Some(ModalContent::Editor(view)) => Some(view),
            _ => None,
        }
    }

    pub fn editor_mut(&mut self) -> Option<&mut EditorView> {
        match self.get_mut(ModalId::StrategyEditor).map(|m| &mut m.content) {
            Some(ModalContent::Editor(view)) => Some(view),
            _ => None,
        }
    }

    pub fn backtest(&self) -> Option<&BacktestView> {
        match self.get(ModalId::BacktestResults).map(|m| &m.content) {
            Some(ModalContent::Backtest(view)) => Some(view),
            _ => None,
        }
    }

    pub fn backtest_mut(&mut self) -> Option<&mut BacktestView> {
        match self.get_mut(ModalId::BacktestResults).map(|m| &mut m.content) {
            Some(ModalContent::Backtest(view)) => Some(view),
            _ => None,
        }
    }

    pub fn suggestions(&self) -> Option<&SuggestionsView> {
        match self.get(ModalId::AiSuggestions).map(|m| &m.content) {
            Some(ModalContent::Suggestions(view)) => Some(view),
            _ => None,
        }
    }

    pub fn suggestions_mut(&mut self) -> Option<&mut SuggestionsView> {
        match self.get_mut(ModalId::AiSuggestions).map(|m| &mut m.content) {
            Some(ModalContent::Suggestions(view)) => Some(view),
            _ => None,
        }
    }
}
