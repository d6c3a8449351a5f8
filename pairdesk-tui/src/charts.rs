//! Chart data for the performance curve and the symbol breakdown.
//!
//! The controller keeps derived series between snapshots. `initialize`
//! builds them from scratch; `update` swaps the values in place and only
//! flags a redraw, so selection and other chart state survive a refresh.

use chrono::NaiveDate;

use pairdesk_core::Snapshot;

/// Cumulative line and daily bars over the same dates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PerformanceSeries {
    pub dates: Vec<NaiveDate>,
    /// `(index, cumulative)` points for the line chart.
    pub cumulative: Vec<(f64, f64)>,
    pub daily: Vec<f64>,
}

impl PerformanceSeries {
    fn fill(&mut self, snapshot: &Snapshot) {
        self.dates.clear();
        self.cumulative.clear();
        self.daily.clear();
        for (i, point) in snapshot.pnl_history.iter().enumerate() {
            self.dates.push(point.date);
            self.cumulative.push((i as f64, point.cumulative));
            self.daily.push(point.daily);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// `(min, max)` over cumulative and daily values, always spanning zero.
    pub fn y_bounds(&self) -> (f64, f64) {
        self.cumulative
            .iter()
            .map(|&(_, y)| y)
            .chain(self.daily.iter().copied())
            .fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)))
    }
}

/// One symbol's share of the breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownSlice {
    pub symbol: String,
    /// Signed P&L; the slice size is its magnitude.
    pub pnl: f64,
    /// Fraction of the summed magnitudes, 0–1.
    pub share: f64,
}

impl BreakdownSlice {
    pub fn magnitude(&self) -> f64 {
        self.pnl.abs()
    }

    /// `EUR/USD +156.40`
    pub fn label(&self) -> String {
        let sign = if self.pnl < 0.0 { '-' } else { '+' };
        format!("{} {sign}{:.2}", self.symbol, self.pnl.abs())
    }
}

#[derive(Debug, Default)]
pub struct ChartController {
    performance: PerformanceSeries,
    breakdown: Vec<BreakdownSlice>,
    initialized: bool,
    builds: u32,
    needs_redraw: bool,
    selected: usize,
}

impl ChartController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build both charts from scratch.
    pub fn initialize(&mut self, snapshot: &Snapshot) {
        self.performance = PerformanceSeries::default();
        self.performance.fill(snapshot);
        self.breakdown = Vec::with_capacity(snapshot.symbol_performance.len());
        Self::fill_breakdown(&mut self.breakdown, snapshot);
        self.initialized = true;
        self.builds += 1;
        self.needs_redraw = true;
        self.clamp_selection();
    }

    /// Replace chart values in place. Builds on first use.
    pub fn update(&mut self, snapshot: &Snapshot) {
        if !self.initialized {
            self.initialize(snapshot);
            return;
        }
        self.performance.fill(snapshot);
        Self::fill_breakdown(&mut self.breakdown, snapshot);
        self.needs_redraw = true;
        self.clamp_selection();
    }

    fn fill_breakdown(slices: &mut Vec<BreakdownSlice>, snapshot: &Snapshot) {
        let total: f64 = snapshot
            .symbol_performance
            .iter()
            .map(|s| s.pnl.abs())
            .sum();
        slices.clear();
        slices.extend(snapshot.symbol_performance.iter().map(|s| BreakdownSlice {
            symbol: s.symbol.clone(),
            pnl: s.pnl,
            share: if total > 0.0 { s.pnl.abs() / total } else { 0.0 },
        }));
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.breakdown.len().saturating_sub(1));
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// How many times the charts were built from scratch.
    pub fn builds(&self) -> u32 {
        self.builds
    }

    /// Consume the redraw request.
    pub fn take_redraw(&mut self) -> bool {
        std::mem::take(&mut self.needs_redraw)
    }

    pub fn performance(&self) -> &PerformanceSeries {
        &self.performance
    }

    pub fn breakdown(&self) -> &[BreakdownSlice] {
        &self.breakdown
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        if self.selected + 1 < self.breakdown.len() {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn selected_slice(&self) -> Option<&BreakdownSlice> {
        self.breakdown.get(self.selected)
    }

    /// Symbol of the selected slice, for the currency analysis.
    pub fn activate_slice(&self) -> Option<String> {
        self.selected_slice().map(|s| s.symbol.clone())
    }
}
