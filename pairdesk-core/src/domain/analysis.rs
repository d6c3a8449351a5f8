//! Trade analysis payloads.
//!
//! A trade can be explained two ways: the backend's candle-context analysis
//! (`Enhanced`) or the rule-based summary derived from the trade's own fields
//! (`Basic`). They describe the same thing but share no fields, so they are
//! kept as separate variants of one tagged union.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Either representation of a trade analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum AnalysisResult {
    Basic(BasicAnalysis),
    Enhanced(EnhancedAnalysis),
}

impl AnalysisResult {
    pub fn is_enhanced(&self) -> bool {
        matches!(self, AnalysisResult::Enhanced(_))
    }
}

/// Loss magnitude bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossSeverity {
    Minor,
    Moderate,
    Major,
}

impl LossSeverity {
    pub fn label(self) -> &'static str {
        match self {
            LossSeverity::Minor => "Minor Loss",
            LossSeverity::Moderate => "Moderate Loss",
            LossSeverity::Major => "Major Loss",
        }
    }
}

/// Qualitative classification of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "severity", rename_all = "snake_case")]
pub enum TradeOutcome {
    Profit,
    Breakeven,
    Loss(LossSeverity),
}

impl TradeOutcome {
    pub fn label(self) -> &'static str {
        match self {
            TradeOutcome::Profit => "Profitable",
            TradeOutcome::Breakeven => "Breakeven",
            TradeOutcome::Loss(severity) => severity.label(),
        }
    }
}

/// Rule-based analysis built from a single trade record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicAnalysis {
    pub outcome: TradeOutcome,
    pub headline: String,
    #[serde(default)]
    pub observations: Vec<String>,
    #[serde(default)]
    pub remediation: Vec<String>,
}

/// Market context before entry, computed from the candle history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketConditions {
    #[serde(default)]
    pub trend_direction: Option<String>,
    #[serde(default)]
    pub rsi_at_entry: Option<f64>,
    #[serde(default)]
    pub recent_high: Option<f64>,
    #[serde(default)]
    pub recent_low: Option<f64>,
    #[serde(default)]
    pub market_structure: Option<String>,
    #[serde(default)]
    pub volatility: Option<f64>,
}

/// How the trade measured up against the symbol's strategy rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyCompliance {
    #[serde(default)]
    pub strategy_available: bool,
    #[serde(default)]
    pub strategy_type: Option<String>,
    /// Check name → verdict (`YES`, `NO`, `PARTIAL`, `UNKNOWN`).
    #[serde(default)]
    pub trade_compliance: BTreeMap<String, String>,
    #[serde(default)]
    pub strategy_violations: Vec<String>,
}

/// Backend analysis with market context, compliance checks and narrative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnhancedAnalysis {
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub total_candles_analyzed: u32,
    #[serde(default, rename = "market_conditions")]
    pub market: Option<MarketConditions>,
    #[serde(default, rename = "strategy_analysis")]
    pub compliance: Option<StrategyCompliance>,
    #[serde(default, rename = "ai_loss_insights")]
    pub insights: Vec<String>,
    #[serde(default)]
    pub stop_loss: Option<f64>,
    #[serde(default)]
    pub take_profit: Option<f64>,
    #[serde(default)]
    pub actual_loss: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enhanced_analysis_parses_partial_payload() {
        let json = r#"{
            "symbol": "GBP/USD",
            "total_candles_analyzed": 312,
            "market_conditions": {"trend_direction": "BEARISH", "rsi_at_entry": 71.2},
            "strategy_analysis": {
                "strategy_available": true,
                "strategy_type": "Supply & Demand",
                "trade_compliance": {"proper_risk_reward": "NO"},
                "strategy_violations": ["Entered against trend"]
            },
            "ai_loss_insights": ["Stop loss too tight for volatility"],
            "actual_loss": -42.5
        }"#;
        let analysis: EnhancedAnalysis = serde_json::from_str(json).unwrap();
        let market = analysis.market.unwrap();
        assert_eq!(market.trend_direction.as_deref(), Some("BEARISH"));
        assert!(market.recent_high.is_none());
        let compliance = analysis.compliance.unwrap();
        assert_eq!(compliance.trade_compliance["proper_risk_reward"], "NO");
        assert_eq!(compliance.strategy_violations.len(), 1);
        assert_eq!(analysis.actual_loss, Some(-42.5));
    }

    #[test]
    fn winning_trade_payload_without_context_still_parses() {
        let json = r#"{"symbol": "EUR/USD", "ai_loss_insights": ["Good trade"], "total_candles_analyzed": 0, "actual_loss": 12.0}"#;
        let analysis: EnhancedAnalysis = serde_json::from_str(json).unwrap();
        assert!(analysis.market.is_none());
        assert!(analysis.compliance.is_none());
    }

    #[test]
    fn basic_analysis_roundtrips_with_tag() {
        let result = AnalysisResult::Basic(BasicAnalysis {
            outcome: TradeOutcome::Loss(LossSeverity::Major),
            headline: "Major Loss".into(),
            observations: vec![],
            remediation: vec![],
        });
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["source"], "basic");
        assert_eq!(value["outcome"]["kind"], "loss");
        assert_eq!(value["outcome"]["severity"], "major");
        assert!(!result.is_enhanced());
    }

    #[test]
    fn outcome_labels() {
        assert_eq!(TradeOutcome::Profit.label(), "Profitable");
        assert_eq!(TradeOutcome::Loss(LossSeverity::Moderate).label(), "Moderate Loss");
    }
}
