//! Recent trades table: filter, row limit and cursor.
//!
//! Pure view state over the store's trade list. Nothing here fetches.

use thiserror::Error;

use pairdesk_core::{TradeId, TradeRecord};

pub const DISPLAY_COUNTS: [usize; 5] = [10, 20, 30, 50, 100];
pub const DEFAULT_DISPLAY_COUNT: usize = 30;
/// Trades losing more than this much are major losses.
pub const MAJOR_LOSS_THRESHOLD: f64 = -50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeFilter {
    All,
    Profitable,
    Losing,
    MajorLoss,
}

impl TradeFilter {
    pub fn matches(self, trade: &TradeRecord) -> bool {
        match self {
            TradeFilter::All => true,
            TradeFilter::Profitable => trade.pnl > 0.0,
            TradeFilter::Losing => trade.pnl < 0.0,
            TradeFilter::MajorLoss => trade.pnl < MAJOR_LOSS_THRESHOLD,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TradeFilter::All => "All",
            TradeFilter::Profitable => "Profitable",
            TradeFilter::Losing => "Losing",
            TradeFilter::MajorLoss => "Major Loss",
        }
    }

    pub fn next(self) -> Self {
        match self {
            TradeFilter::All => TradeFilter::Profitable,
            TradeFilter::Profitable => TradeFilter::Losing,
            TradeFilter::Losing => TradeFilter::MajorLoss,
            TradeFilter::MajorLoss => TradeFilter::All,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TableError {
    #[error("unsupported display count {0} (expected one of 10, 20, 30, 50, 100)")]
    UnsupportedCount(usize),
}

#[derive(Debug)]
pub struct TradeTableController {
    display_count: usize,
    filter: TradeFilter,
    cursor: usize,
    needs_render: bool,
}

impl Default for TradeTableController {
    fn default() -> Self {
        Self {
            display_count: DEFAULT_DISPLAY_COUNT,
            filter: TradeFilter::All,
            cursor: 0,
            needs_render: true,
        }
    }
}

impl TradeTableController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Filtered trades in original order, at most `display_count` of them.
    pub fn rows<'a>(&self, trades: &'a [TradeRecord]) -> Vec<&'a TradeRecord> {
        trades
            .iter()
            .filter(|t| self.filter.matches(t))
            .take(self.display_count)
            .collect()
    }

    pub fn display_count(&self) -> usize {
        self.display_count
    }

    pub fn filter(&self) -> TradeFilter {
        self.filter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_display_count(&mut self, count: usize) -> Result<(), TableError> {
        if !DISPLAY_COUNTS.contains(&count) {
            return Err(TableError::UnsupportedCount(count));
        }
        self.display_count = count;
        self.reset_view();
        Ok(())
    }

    pub fn cycle_display_count(&mut self) {
        let idx = DISPLAY_COUNTS
            .iter()
            .position(|&c| c == self.display_count)
            .map_or(0, |i| (i + 1) % DISPLAY_COUNTS.len());
        self.display_count = DISPLAY_COUNTS[idx];
        self.reset_view();
    }

    pub fn set_filter(&mut self, filter: TradeFilter) {
        self.filter = filter;
        self.reset_view();
    }

    pub fn cycle_filter(&mut self) {
        self.set_filter(self.filter.next());
    }

    fn reset_view(&mut self) {
        self.cursor = 0;
        self.needs_render = true;
    }

    pub fn move_down(&mut self, visible_rows: usize) {
        if self.cursor + 1 < visible_rows {
            self.cursor += 1;
        }
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Keep the cursor on a row after the trade list changed.
    pub fn clamp_cursor(&mut self, visible_rows: usize) {
        self.cursor = self.cursor.min(visible_rows.saturating_sub(1));
        self.needs_render = true;
    }

    /// Id of the trade under the cursor.
    pub fn activate(&self, trades: &[TradeRecord]) -> Option<TradeId> {
        self.rows(trades).get(self.cursor).map(|t| t.id)
    }

    pub fn take_render(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pairdesk_core::fallback::fallback_snapshot;
    use proptest::prelude::*;

    fn trades() -> Vec<TradeRecord> {
        fallback_snapshot().recent_trades
    }

    #[test]
    fn default_view() {
        let table = TradeTableController::new();
        assert_eq!(table.display_count(), 30);
        assert_eq!(table.filter(), TradeFilter::All);
        assert_eq!(table.rows(&trades()).len(), 7);
    }

    #[test]
    fn major_loss_only_yields_large_losses() {
        let mut table = TradeTableController::new();
        table.set_filter(TradeFilter::MajorLoss);
        let trades = trades();
        let rows = table.rows(&trades);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, TradeId(1003));
    }

    #[test]
    fn breakeven_is_neither_profitable_nor_losing() {
        let trades = trades();
        let pending = trades.iter().find(|t| t.id == TradeId(1007)).unwrap();
        assert!(!TradeFilter::Profitable.matches(pending));
        assert!(!TradeFilter::Losing.matches(pending));
    }

    #[test]
    fn changing_view_resets_cursor() {
        let trades = trades();
        let mut table = TradeTableController::new();
        table.move_down(7);
        table.move_down(7);
        assert_eq!(table.cursor(), 2);
        table.take_render();
        table.cycle_filter();
        assert_eq!(table.cursor(), 0);
        assert!(table.take_render());
        assert_eq!(table.activate(&trades), Some(TradeId(1004)));
    }

    #[test]
    fn invalid_count_is_rejected() {
        let mut table = TradeTableController::new();
        assert_eq!(
            table.set_display_count(25),
            Err(TableError::UnsupportedCount(25))
        );
        assert_eq!(table.display_count(), 30);
        table.set_display_count(10).unwrap();
        assert_eq!(table.display_count(), 10);
    }

    #[test]
    fn count_cycle_wraps() {
        let mut table = TradeTableController::new();
        let seen: Vec<usize> = (0..5)
            .map(|_| {
                table.cycle_display_count();
                table.display_count()
            })
            .collect();
        assert_eq!(seen, vec![50, 100, 10, 20, 30]);
    }

    fn arb_trades() -> impl Strategy<Value = Vec<TradeRecord>> {
        let template = trades()[0].clone();
        prop::collection::vec((-200.0..200.0_f64, 0u64..10_000), 0..150).prop_map(move |rows| {
            rows.into_iter()
                .map(|(pnl, id)| TradeRecord {
                    id: TradeId(id),
                    pnl,
                    ..template.clone()
                })
                .collect()
        })
    }

    fn arb_filter() -> impl Strategy<Value = TradeFilter> {
        prop_oneof![
            Just(TradeFilter::All),
            Just(TradeFilter::Profitable),
            Just(TradeFilter::Losing),
            Just(TradeFilter::MajorLoss),
        ]
    }

    proptest! {
        #[test]
        fn rows_are_bounded_by_count(
            trades in arb_trades(),
            filter in arb_filter(),
            count in prop::sample::select(DISPLAY_COUNTS.to_vec()),
        ) {
            let mut table = TradeTableController::new();
            table.set_filter(filter);
            table.set_display_count(count).unwrap();
            let matching = trades.iter().filter(|t| filter.matches(t)).count();
            prop_assert_eq!(table.rows(&trades).len(), count.min(matching));
        }

        #[test]
        fn filtering_is_idempotent(trades in arb_trades(), filter in arb_filter()) {
            let once: Vec<TradeRecord> =
                trades.iter().filter(|t| filter.matches(t)).cloned().collect();
            let twice: Vec<TradeRecord> =
                once.iter().filter(|t| filter.matches(t)).cloned().collect();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn major_loss_rows_are_below_threshold(trades in arb_trades()) {
            let mut table = TradeTableController::new();
            table.set_filter(TradeFilter::MajorLoss);
            for row in table.rows(&trades) {
                prop_assert!(row.pnl < MAJOR_LOSS_THRESHOLD);
            }
        }
    }
}
