//! PairDesk TUI — terminal trading dashboard.
//!
//! Provides:
//! - Animated headline metrics and a P&L performance chart
//! - Per-symbol breakdown with drill-down into currency analysis
//! - Filterable recent-trades table with per-trade analysis
//! - Strategy editor, backtests, AI suggestions and parameter optimisation
//! - Sample data whenever the backend cannot be reached

pub mod app;
pub mod charts;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modal;
pub mod notify;
pub mod schedule;
pub mod store;
pub mod theme;
pub mod trade_table;
pub mod ui;
pub mod views;
pub mod worker;
pub mod workflow;

pub use app::App;
pub use input::handle_key;
pub use theme::Theme;

#[cfg(test)]
mod test_helpers;
