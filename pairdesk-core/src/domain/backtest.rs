//! Backtest results and the strategy text they were run with.

use serde::{Deserialize, Serialize};

/// Strategy source as stored by the backend for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyDocument {
    #[serde(default)]
    pub symbol: String,
    #[serde(rename = "strategy_file", default)]
    pub file: String,
    #[serde(rename = "strategy_code")]
    pub code: String,
}

/// One simulated trade from a backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatedTrade {
    pub entry_time: String,
    pub exit_time: String,
    pub pair: String,
    pub direction: String,
    pub entry_price: f64,
    pub exit_price: f64,
    pub stop_loss: Option<f64>,
    pub take_profit: Option<f64>,
    pub pips_gained: f64,
    pub usd_pnl: f64,
    pub duration_hours: Option<f64>,
    pub exit_reason: String,
    pub reason: Option<String>,
}

/// Summary and trade list of a strategy simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestResult {
    pub target_pair: String,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub total_pnl: f64,
    pub total_trades: u32,
    pub winning_trades: u32,
    pub losing_trades: u32,
    /// Percentage, 0–100.
    pub win_rate: f64,
    /// Percentage of peak balance.
    pub max_drawdown: f64,
    pub peak_balance: f64,
    pub lowest_balance: f64,
    pub trades: Vec<SimulatedTrade>,
}

/// Metric digest sent to the suggestion and optimisation endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestMetrics {
    pub total_trades: u32,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_loss: f64,
    pub max_drawdown: f64,
    pub final_balance: f64,
}

impl BacktestMetrics {
    /// Average loss is the mean P&L of non-positive trades (zero when there are none).
    pub fn from_result(result: &BacktestResult) -> Self {
        let losses: Vec<f64> = result
            .trades
            .iter()
            .map(|t| t.usd_pnl)
            .filter(|pnl| *pnl <= 0.0)
            .collect();
        let avg_loss = if losses.is_empty() {
            0.0
        } else {
            losses.iter().sum::<f64>() / losses.len() as f64
        };

        Self {
            total_trades: result.total_trades,
            win_rate: result.win_rate,
            total_pnl: result.total_pnl,
            avg_loss,
            max_drawdown: result.max_drawdown,
            final_balance: result.final_balance,
        }
    }
}
