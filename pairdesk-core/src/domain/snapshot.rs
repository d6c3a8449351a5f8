//! Aggregate account snapshot as served by `/api/all`.
//!
//! The snapshot is immutable once fetched; the dashboard replaces it wholesale
//! on every refresh.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::ids::TradeId;

/// Account-level counters, recomputed by the backend on every fetch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradingSummary {
    #[serde(rename = "totalPnL")]
    pub total_pnl: f64,
    #[serde(rename = "totalTrades")]
    pub total_trades: u32,
    /// Percentage, 0–100.
    #[serde(rename = "winRate")]
    pub win_rate: f64,
    #[serde(rename = "totalVolume")]
    pub total_volume: f64,
    #[serde(rename = "winningTrades", default, skip_serializing_if = "Option::is_none")]
    pub winning_trades: Option<u32>,
    #[serde(rename = "losingTrades", default, skip_serializing_if = "Option::is_none")]
    pub losing_trades: Option<u32>,
    #[serde(rename = "lastUpdate", default, skip_serializing_if = "Option::is_none")]
    pub last_update: Option<String>,
}

/// Per-instrument performance row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolPerformance {
    pub symbol: String,
    pub pnl: f64,
    pub trades: u32,
    pub volume: f64,
    #[serde(rename = "winRate", default, skip_serializing_if = "Option::is_none")]
    pub win_rate: Option<f64>,
}

/// Trade direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "BUY", alias = "LONG", alias = "Buy", alias = "buy")]
    Long,
    #[serde(rename = "SELL", alias = "SHORT", alias = "Sell", alias = "sell")]
    Short,
}

impl Side {
    pub fn label(self) -> &'static str {
        match self {
            Side::Long => "BUY",
            Side::Short => "SELL",
        }
    }
}

/// Backend order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    Filled,
    Pending,
    #[serde(alias = "CANCELED")]
    Cancelled,
    Rejected,
    #[serde(other)]
    Other,
}

impl TradeStatus {
    pub fn label(self) -> &'static str {
        match self {
            TradeStatus::Filled => "FILLED",
            TradeStatus::Pending => "PENDING",
            TradeStatus::Cancelled => "CANCELLED",
            TradeStatus::Rejected => "REJECTED",
            TradeStatus::Other => "OTHER",
        }
    }
}

/// One executed (or attempted) trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: TradeId,
    #[serde(with = "wire_time")]
    pub time: NaiveDateTime,
    pub symbol: String,
    pub side: Side,
    pub volume: f64,
    #[serde(rename = "entry")]
    pub entry_price: f64,
    #[serde(rename = "exit")]
    pub exit_price: f64,
    /// Signed pip movement.
    pub pips: f64,
    /// Signed realised P&L.
    pub pnl: f64,
    pub status: TradeStatus,
    /// Holding time in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
}

/// One day of the account P&L curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PnlPoint {
    pub date: NaiveDate,
    pub cumulative: f64,
    pub daily: f64,
}

/// Risk figures the backend attaches to the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    #[serde(rename = "maxDrawdown", default)]
    pub max_drawdown: f64,
    #[serde(rename = "avgTradeSize", default)]
    pub avg_trade_size: f64,
    #[serde(rename = "profitFactor", default)]
    pub profit_factor: f64,
    #[serde(rename = "sharpeRatio", default)]
    pub sharpe_ratio: f64,
}

/// The complete aggregate payload of one fetch generation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub summary: TradingSummary,
    #[serde(rename = "symbolPerformance", default)]
    pub symbol_performance: Vec<SymbolPerformance>,
    #[serde(rename = "recentTrades", default)]
    pub recent_trades: Vec<TradeRecord>,
    #[serde(rename = "pnlHistory", default)]
    pub pnl_history: Vec<PnlPoint>,
    #[serde(rename = "riskMetrics", default, skip_serializing_if = "Option::is_none")]
    pub risk_metrics: Option<RiskMetrics>,
    #[serde(default)]
    pub insights: Vec<String>,
}

impl Snapshot {
    pub fn find_trade(&self, id: TradeId) -> Option<&TradeRecord> {
        self.recent_trades.iter().find(|t| t.id == id)
    }
}

/// `%Y-%m-%d %H:%M:%S` timestamps, with ISO-8601 `T` separators also accepted.
pub mod wire_time {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f"))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRADE_JSON: &str = r#"{
        "id": 4211,
        "time": "2025-06-20 14:32:10",
        "symbol": "EUR/USD",
        "side": "SELL",
        "volume": 0.5,
        "entry": 1.0842,
        "exit": 1.0874,
        "pips": -32.0,
        "pnl": -75.0,
        "status": "FILLED",
        "duration": 95
    }"#;

    #[test]
    fn trade_record_parses_backend_shape() {
        let trade: TradeRecord = serde_json::from_str(TRADE_JSON).unwrap();
        assert_eq!(trade.id, TradeId(4211));
        assert_eq!(trade.side, Side::Short);
        assert_eq!(trade.status, TradeStatus::Filled);
        assert_eq!(trade.entry_price, 1.0842);
        assert_eq!(trade.duration, Some(95.0));
        assert_eq!(trade.time.format("%H:%M").to_string(), "14:32");
    }

    #[test]
    fn unknown_status_is_preserved_as_other() {
        let json = TRADE_JSON.replace("FILLED", "MISSED");
        let trade: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(trade.status, TradeStatus::Other);
    }

    #[test]
    fn iso_timestamps_are_accepted() {
        let json = TRADE_JSON.replace("2025-06-20 14:32:10", "2025-06-20T14:32:10.250");
        let trade: TradeRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(trade.time.format("%S").to_string(), "10");
    }

    #[test]
    fn snapshot_tolerates_missing_optional_sections() {
        let json = r#"{"summary": {"totalPnL": 12.5, "totalTrades": 2, "winRate": 50.0, "totalVolume": 1.0}}"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.summary.total_trades, 2);
        assert!(snapshot.recent_trades.is_empty());
        assert!(snapshot.pnl_history.is_empty());
        assert!(snapshot.risk_metrics.is_none());
    }

    #[test]
    fn find_trade_by_id() {
        let trade: TradeRecord = serde_json::from_str(TRADE_JSON).unwrap();
        let snapshot = Snapshot {
            recent_trades: vec![trade],
            ..Snapshot::default()
        };
        assert!(snapshot.find_trade(TradeId(4211)).is_some());
        assert!(snapshot.find_trade(TradeId(1)).is_none());
    }
}
