//! Property tests for the local analysis rules and the fallback dataset.
//!
//! Uses proptest to verify:
//! 1. Outcome classification follows the sign and magnitude of P&L
//! 2. Remediation hints appear exactly when their thresholds are crossed
//! 3. The fallback P&L history is cumulative

use chrono::NaiveDate;
use proptest::prelude::*;
use pairdesk_core::analysis::{basic_analysis, HINT_SMALLER_POSITION, HINT_TIGHTER_STOPS};
use pairdesk_core::domain::{LossSeverity, Side, TradeId, TradeOutcome, TradeRecord, TradeStatus};
use pairdesk_core::fallback::fallback_snapshot;

fn trade(pnl: f64, pips: f64) -> TradeRecord {
    TradeRecord {
        id: TradeId(1),
        time: NaiveDate::from_ymd_opt(2025, 6, 20)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap(),
        symbol: "EUR/USD".into(),
        side: Side::Short,
        volume: 0.3,
        entry_price: 1.08,
        exit_price: 1.09,
        pips,
        pnl,
        status: TradeStatus::Filled,
        duration: Some(60.0),
    }
}

// ── 1. Classification ───────────────────────────────────────────────

proptest! {
    #[test]
    fn positive_pnl_is_profit(pnl in 0.01..10_000.0_f64, pips in -200.0..200.0_f64) {
        let analysis = basic_analysis(&trade(pnl, pips));
        prop_assert_eq!(analysis.outcome, TradeOutcome::Profit);
        prop_assert!(analysis.remediation.is_empty());
    }

    #[test]
    fn large_losses_are_major(loss in 50.01..10_000.0_f64) {
        let analysis = basic_analysis(&trade(-loss, 0.0));
        prop_assert_eq!(analysis.outcome, TradeOutcome::Loss(LossSeverity::Major));
    }

    #[test]
    fn small_losses_are_minor(loss in 0.01..19.99_f64) {
        let analysis = basic_analysis(&trade(-loss, 0.0));
        prop_assert_eq!(analysis.outcome, TradeOutcome::Loss(LossSeverity::Minor));
    }
}

// ── 2. Hints ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn hints_follow_thresholds(loss in 0.01..500.0_f64, pips in -100.0..100.0_f64) {
        let analysis = basic_analysis(&trade(-loss, pips));
        let smaller = analysis.remediation.iter().any(|h| h == HINT_SMALLER_POSITION);
        let tighter = analysis.remediation.iter().any(|h| h == HINT_TIGHTER_STOPS);
        prop_assert_eq!(smaller, pips.abs() > 20.0);
        prop_assert_eq!(tighter, loss > 30.0);
    }
}

// ── 3. Fallback history ─────────────────────────────────────────────

#[test]
fn fallback_history_is_cumulative() {
    let snapshot = fallback_snapshot();
    let mut running = 0.0;
    for point in &snapshot.pnl_history {
        running += point.daily;
        assert!((point.cumulative - running).abs() < 0.01);
    }
    assert!((running - snapshot.summary.total_pnl).abs() < 0.01);
}
