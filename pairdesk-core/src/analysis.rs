//! Local rule-based trade analysis.
//!
//! Used when neither the enhanced nor the per-trade analysis endpoint
//! answers. Everything here is a pure function of the trade record.

use crate::domain::{BasicAnalysis, LossSeverity, TradeOutcome, TradeRecord};

/// Losses strictly below this magnitude are minor.
pub const MINOR_LOSS_LIMIT: f64 = 20.0;
/// Losses up to and including this magnitude are moderate; above it, major.
pub const MODERATE_LOSS_LIMIT: f64 = 50.0;
/// Pip moves beyond this magnitude suggest the position was too large.
pub const POSITION_SIZE_PIPS: f64 = 20.0;
/// Losses beyond this magnitude suggest the stop was too loose.
pub const TIGHTER_STOP_LOSS: f64 = 30.0;

pub const HINT_SMALLER_POSITION: &str =
    "Consider a smaller position size: the price moved more than 20 pips against you";
pub const HINT_TIGHTER_STOPS: &str =
    "Consider tighter stop losses: this loss exceeded $30";

/// Classify a loss magnitude.
pub fn loss_severity(loss: f64) -> LossSeverity {
    let loss = loss.abs();
    if loss < MINOR_LOSS_LIMIT {
        LossSeverity::Minor
    } else if loss <= MODERATE_LOSS_LIMIT {
        LossSeverity::Moderate
    } else {
        LossSeverity::Major
    }
}

/// Classify a trade by its signed P&L.
pub fn classify(pnl: f64) -> TradeOutcome {
    if pnl > 0.0 {
        TradeOutcome::Profit
    } else if pnl == 0.0 {
        TradeOutcome::Breakeven
    } else {
        TradeOutcome::Loss(loss_severity(pnl))
    }
}

/// Build the basic analysis for one trade.
pub fn basic_analysis(trade: &TradeRecord) -> BasicAnalysis {
    let outcome = classify(trade.pnl);

    let headline = match outcome {
        TradeOutcome::Profit => format!(
            "Profitable trade: {} {} closed +${:.2}",
            trade.side.label(),
            trade.symbol,
            trade.pnl
        ),
        TradeOutcome::Breakeven => format!(
            "Breakeven trade: {} {} closed flat",
            trade.side.label(),
            trade.symbol
        ),
        TradeOutcome::Loss(severity) => format!(
            "{}: {} {} closed -${:.2}",
            severity.label(),
            trade.side.label(),
            trade.symbol,
            trade.pnl.abs()
        ),
    };

    let mut observations = vec![
        format!(
            "Entry {:.5}, exit {:.5}, volume {:.2} lots",
            trade.entry_price, trade.exit_price, trade.volume
        ),
        format!("Price moved {:+.1} pips", trade.pips),
    ];
    if let Some(minutes) = trade.duration {
        observations.push(format!("Held for {minutes:.0} minutes"));
    }

    let mut remediation = Vec::new();
    if let TradeOutcome::Loss(_) = outcome {
        if trade.pips.abs() > POSITION_SIZE_PIPS {
            remediation.push(HINT_SMALLER_POSITION.to_string());
        }
        if trade.pnl.abs() > TIGHTER_STOP_LOSS {
            remediation.push(HINT_TIGHTER_STOPS.to_string());
        }
    }

    BasicAnalysis {
        outcome,
        headline,
        observations,
        remediation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Side, TradeId, TradeStatus};
    use chrono::NaiveDate;

    fn trade(pnl: f64, pips: f64) -> TradeRecord {
        TradeRecord {
            id: TradeId(1),
            time: NaiveDate::from_ymd_opt(2025, 6, 20)
                .unwrap()
                .and_hms_opt(10, 0, 0)
                .unwrap(),
            symbol: "USD/JPY".into(),
            side: Side::Long,
            volume: 0.5,
            entry_price: 157.20,
            exit_price: 156.88,
            pips,
            pnl,
            status: TradeStatus::Filled,
            duration: None,
        }
    }

    #[test]
    fn major_loss_gets_both_hints() {
        let analysis = basic_analysis(&trade(-75.0, 32.0));
        assert_eq!(analysis.outcome, TradeOutcome::Loss(LossSeverity::Major));
        assert!(analysis.headline.starts_with("Major Loss"));
        assert_eq!(
            analysis.remediation,
            vec![HINT_SMALLER_POSITION.to_string(), HINT_TIGHTER_STOPS.to_string()]
        );
    }

    #[test]
    fn severity_bucket_boundaries() {
        assert_eq!(loss_severity(-19.99), LossSeverity::Minor);
        assert_eq!(loss_severity(-20.0), LossSeverity::Moderate);
        assert_eq!(loss_severity(-50.0), LossSeverity::Moderate);
        assert_eq!(loss_severity(-50.01), LossSeverity::Major);
    }

    #[test]
    fn zero_pnl_is_breakeven() {
        let analysis = basic_analysis(&trade(0.0, 0.0));
        assert_eq!(analysis.outcome, TradeOutcome::Breakeven);
        assert!(analysis.remediation.is_empty());
    }

    #[test]
    fn profit_has_no_remediation() {
        let analysis = basic_analysis(&trade(160.0, 32.0));
        assert_eq!(analysis.outcome, TradeOutcome::Profit);
        assert!(analysis.headline.contains("+$160.00"));
        assert!(analysis.remediation.is_empty());
    }

    #[test]
    fn small_loss_with_small_move_has_no_hints() {
        let analysis = basic_analysis(&trade(-18.5, -9.0));
        assert_eq!(analysis.outcome, TradeOutcome::Loss(LossSeverity::Minor));
        assert!(analysis.remediation.is_empty());
    }
}
