//! Deterministic snapshot shown when the backend cannot be reached.
//!
//! Values are fixed so the dashboard always has something coherent to show
//! and so tests can assert exact figures.

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{
    PnlPoint, RiskMetrics, Side, Snapshot, SymbolPerformance, TradeId, TradeRecord, TradeStatus,
    TradingSummary,
};

const HISTORY_START: (i32, u32, u32) = (2025, 6, 16);
const DAILY_PNL: [f64; 7] = [45.20, -12.35, 68.90, 33.10, -28.40, 52.80, 42.50];

/// The full fallback snapshot.
pub fn fallback_snapshot() -> Snapshot {
    Snapshot {
        summary: TradingSummary {
            total_pnl: 201.75,
            total_trades: 23,
            win_rate: 39.1,
            total_volume: 12.5,
            winning_trades: Some(9),
            losing_trades: Some(14),
            last_update: None,
        },
        symbol_performance: fallback_symbols(),
        recent_trades: fallback_trades(),
        pnl_history: fallback_history(),
        risk_metrics: Some(RiskMetrics {
            max_drawdown: 40.75,
            avg_trade_size: 0.54,
            profit_factor: 1.58,
            sharpe_ratio: 0.0,
        }),
        insights: vec![
            "Backend unavailable: showing sample data".to_string(),
            "EUR/USD remains the strongest contributor".to_string(),
        ],
    }
}

fn fallback_symbols() -> Vec<SymbolPerformance> {
    [
        ("EUR/USD", 156.40, 8, 4.0),
        ("GBP/USD", 88.25, 5, 2.5),
        ("USD/JPY", -42.10, 4, 2.0),
        ("EUR/GBP", 23.45, 3, 1.5),
        ("GBP/JPY", -24.25, 3, 2.5),
    ]
    .into_iter()
    .map(|(symbol, pnl, trades, volume)| SymbolPerformance {
        symbol: symbol.to_string(),
        pnl,
        trades,
        volume,
        win_rate: None,
    })
    .collect()
}

fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, day)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .unwrap_or_default()
}

fn fallback_trades() -> Vec<TradeRecord> {
    #[rustfmt::skip]
    let rows = [
        (1007, at(22, 15, 40), "GBP/USD", Side::Long,  0.2, 1.2702, 1.2702,   0.0,   0.00, TradeStatus::Pending, None),
        (1006, at(22, 11,  5), "EUR/USD", Side::Short, 0.4, 1.0890, 1.0899,  -9.0, -36.00, TradeStatus::Filled, Some(42.0)),
        (1005, at(21, 16, 20), "GBP/JPY", Side::Long,  0.1, 199.40, 199.12, -28.0, -18.50, TradeStatus::Filled, Some(75.0)),
        (1004, at(21,  9, 45), "EUR/GBP", Side::Short, 0.2, 0.8550, 0.8538,  12.0,  24.00, TradeStatus::Filled, Some(130.0)),
        (1003, at(20, 14, 32), "USD/JPY", Side::Long,  0.5, 157.20, 156.88,  32.0, -75.00, TradeStatus::Filled, Some(95.0)),
        (1002, at(20, 10, 15), "GBP/USD", Side::Short, 0.3, 1.2710, 1.2685,  25.0,  75.00, TradeStatus::Filled, Some(210.0)),
        (1001, at(19, 13,  0), "EUR/USD", Side::Long,  0.5, 1.0842, 1.0874,  32.0, 160.00, TradeStatus::Filled, Some(180.0)),
    ];

    rows.into_iter()
        .map(
            |(id, time, symbol, side, volume, entry, exit, pips, pnl, status, duration)| {
                TradeRecord {
                    id: TradeId(id),
                    time,
                    symbol: symbol.to_string(),
                    side,
                    volume,
                    entry_price: entry,
                    exit_price: exit,
                    pips,
                    pnl,
                    status,
                    duration,
                }
            },
        )
        .collect()
}

fn fallback_history() -> Vec<PnlPoint> {
    let (y, m, d) = HISTORY_START;
    let start = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();

    let mut cumulative = 0.0;
    start
        .iter_days()
        .zip(DAILY_PNL)
        .map(|(date, daily)| {
            cumulative += daily;
            PnlPoint {
                date,
                // Round to cents so the curve ends exactly at the summary total.
                cumulative: (cumulative * 100.0_f64).round() / 100.0,
                daily,
            }
        })
        .collect()
}
