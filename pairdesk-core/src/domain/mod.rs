//! Domain types for PairDesk

pub mod analysis;
pub mod backtest;
pub mod ids;
pub mod snapshot;
pub mod suggestions;

pub use analysis::{
    AnalysisResult, BasicAnalysis, EnhancedAnalysis, LossSeverity, MarketConditions,
    StrategyCompliance, TradeOutcome,
};
pub use backtest::{BacktestMetrics, BacktestResult, SimulatedTrade, StrategyDocument};
pub use ids::TradeId;
pub use snapshot::{
    PnlPoint, RiskMetrics, Side, Snapshot, SymbolPerformance, TradeRecord, TradeStatus,
    TradingSummary,
};
pub use suggestions::{
    AiSuggestionSet, BaselineParameters, ParameterOptimization, ParameterRecommendation,
    Priority, PriorityItem, SuggestionResponse,
};
