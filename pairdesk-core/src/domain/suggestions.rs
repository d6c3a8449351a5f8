//! AI suggestion and parameter optimisation payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Improvement suggestions grouped by theme, plus replacement strategy texts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiSuggestionSet {
    pub performance_analysis: Vec<String>,
    #[serde(alias = "structural_improvements")]
    pub supply_demand_improvements: Vec<String>,
    pub risk_management: Vec<String>,
    pub parameter_optimization: Vec<String>,
    /// Complete replacement strategy sources, best first.
    pub suggested_code_changes: Vec<String>,
}

impl AiSuggestionSet {
    /// Groups in display order, skipping nothing (empty groups render a placeholder).
    pub fn groups(&self) -> [(&'static str, &[String]); 4] {
        [
            ("Performance Analysis", &self.performance_analysis),
            ("Structural Improvements", &self.supply_demand_improvements),
            ("Risk Management", &self.risk_management),
            ("Parameter Tuning", &self.parameter_optimization),
        ]
    }

    pub fn first_proposal(&self) -> Option<&str> {
        self.suggested_code_changes.first().map(String::as_str)
    }
}

/// Response of the suggestion endpoint, including the auto-apply outcome.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    #[serde(default)]
    pub suggestions: AiSuggestionSet,
    #[serde(default)]
    pub auto_applied: bool,
    #[serde(default)]
    pub applied_to: Option<String>,
    #[serde(default)]
    pub auto_apply_error: Option<String>,
}

/// Recommendation priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
    #[serde(other)]
    Unranked,
}

impl Priority {
    pub const ORDERED: [Priority; 5] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
        Priority::Unranked,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Priority::Critical => "CRITICAL",
            Priority::High => "HIGH",
            Priority::Medium => "MEDIUM",
            Priority::Low => "LOW",
            Priority::Unranked => "OTHER",
        }
    }
}

/// Suggested value for one strategy parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRecommendation {
    pub current: f64,
    pub recommended: f64,
    pub priority: Priority,
    #[serde(default)]
    pub reason: String,
}

/// One entry of the ordered change list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityItem {
    pub priority: Priority,
    pub action: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub timeframe: String,
}

/// Tuned parameter values and the rationale behind them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterOptimization {
    pub performance_assessment: Vec<String>,
    pub parameter_recommendations: BTreeMap<String, ParameterRecommendation>,
    pub risk_management_settings: serde_json::Map<String, serde_json::Value>,
    pub technical_filters: serde_json::Map<String, serde_json::Value>,
    pub implementation_priority: Vec<PriorityItem>,
}

impl ParameterOptimization {
    /// Parameter recommendations bucketed by priority, most urgent first.
    /// Empty buckets are omitted; names stay alphabetical within a bucket.
    pub fn by_priority(&self) -> Vec<(Priority, Vec<(&str, &ParameterRecommendation)>)> {
        Priority::ORDERED
            .iter()
            .filter_map(|&priority| {
                let entries: Vec<_> = self
                    .parameter_recommendations
                    .iter()
                    .filter(|(_, rec)| rec.priority == priority)
                    .map(|(name, rec)| (name.as_str(), rec))
                    .collect();
                (!entries.is_empty()).then_some((priority, entries))
            })
            .collect()
    }
}

/// Baseline supply & demand parameters sent with every optimisation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineParameters {
    pub zone_lookback: u32,
    pub base_max_candles: u32,
    pub move_min_ratio: f64,
    pub zone_width_max_pips: u32,
}

impl Default for BaselineParameters {
    fn default() -> Self {
        Self {
            zone_lookback: 300,
            base_max_candles: 5,
            move_min_ratio: 2.0,
            zone_width_max_pips: 30,
        }
    }
}
