//! Dashboard — metric cards, performance chart, symbol breakdown, trade table.

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Axis, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table, TableState, Wrap,
};

use pairdesk_core::TradeRecord;

use crate::app::{App, Focus};
use crate::charts::PerformanceSeries;
use crate::metrics::MetricKind;
use crate::store::SnapshotSource;
use crate::theme::{self, Theme};

const BAR_WIDTH: usize = 16;

pub fn render(f: &mut Frame, area: Rect, app: &App, now: Instant) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Percentage(45),
            Constraint::Min(6),
        ])
        .split(area);

    render_metric_cards(f, rows[0], app, now);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(rows[1]);
    render_performance(f, middle[0], app);
    render_breakdown(f, middle[1], app);

    render_trades(f, rows[2], app);
}

fn render_metric_cards(f: &mut Frame, area: Rect, app: &App, now: Instant) {
    let theme = Theme::default();
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);

    for (kind, card) in MetricKind::ALL.into_iter().zip(cards.iter()) {
        let shown = app.metrics.displayed(kind, now);
        let style = match kind {
            MetricKind::TotalPnl => theme::pnl(app.metrics.target(kind)),
            MetricKind::WinRate => {
                Style::default().fg(theme.win_rate_color(app.metrics.target(kind)))
            }
            MetricKind::TotalTrades | MetricKind::TotalVolume => theme::accent(),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme::muted())
            .title(format!(" {} ", kind.label()))
            .title_style(theme::muted());

        let value = Paragraph::new(Line::from(Span::styled(
            kind.format(shown),
            style.add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(value, *card);
    }
}

pub(crate) fn source_style(source: SnapshotSource) -> Style {
    match source {
        SnapshotSource::Live => theme::positive(),
        SnapshotSource::Fallback => theme::warning().add_modifier(Modifier::BOLD),
        SnapshotSource::Pending => theme::muted(),
    }
}

fn render_performance(f: &mut Frame, area: Rect, app: &App) {
    let source = app.store.source();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(false))
        .title(Line::from(vec![
            Span::styled(" Performance ", theme::panel_title(false)),
            Span::styled(format!("[{}] ", source.label()), source_style(source)),
        ]));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let series = app.charts.performance();
    if series.is_empty() {
        let text = Paragraph::new(Span::styled("No P&L history yet.", theme::muted()));
        f.render_widget(text, inner);
        return;
    }
    render_performance_chart(f, inner, series);
}

fn render_performance_chart(f: &mut Frame, area: Rect, series: &PerformanceSeries) {
    let (lo, hi) = series.y_bounds();
    let padding = ((hi - lo).abs() * 0.05).max(1.0);
    let y_min = lo - padding;
    let y_max = hi + padding;
    let x_max = series.dates.len().saturating_sub(1) as f64;

    // Daily bars split by sign so each gets its own colour.
    let gains: Vec<(f64, f64)> = series
        .daily
        .iter()
        .enumerate()
        .filter(|(_, d)| **d >= 0.0)
        .map(|(i, &d)| (i as f64, d))
        .collect();
    let losses: Vec<(f64, f64)> = series
        .daily
        .iter()
        .enumerate()
        .filter(|(_, d)| **d < 0.0)
        .map(|(i, &d)| (i as f64, d))
        .collect();

    let datasets = vec![
        Dataset::default()
            .name("Daily +")
            .marker(symbols::Marker::HalfBlock)
            .style(Style::default().fg(theme::POSITIVE))
            .graph_type(GraphType::Bar)
            .data(&gains),
        Dataset::default()
            .name("Daily -")
            .marker(symbols::Marker::HalfBlock)
            .style(Style::default().fg(theme::NEGATIVE))
            .graph_type(GraphType::Bar)
            .data(&losses),
        Dataset::default()
            .name("Cumulative")
            .marker(symbols::Marker::Braille)
            .style(Style::default().fg(theme::ACCENT))
            .graph_type(GraphType::Line)
            .data(&series.cumulative),
    ];

    let first = series
        .dates
        .first()
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_default();
    let last = series
        .dates
        .last()
        .map(|d| d.format("%m-%d").to_string())
        .unwrap_or_default();

    let chart = Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title(Span::styled("Date", theme::muted()))
                .style(theme::muted())
                .bounds([0.0, x_max.max(1.0)])
                .labels(vec![
                    Span::styled(first, theme::muted()),
                    Span::styled(last, theme::muted()),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled("P&L", theme::muted()))
                .style(theme::muted())
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::styled(format!("{:.0}", y_min), theme::muted()),
                    Span::styled("0", theme::muted()),
                    Span::styled(format!("{:.0}", y_max), theme::muted()),
                ]),
        );

    f.render_widget(chart, area);
}

fn render_breakdown(f: &mut Frame, area: Rect, app: &App) {
    let active = app.focus == Focus::Symbols;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(active))
        .title(" Symbols [Enter]analysis [e]strategy [b]backtest ")
        .title_style(theme::panel_title(active));

    let inner = block.inner(area);
    f.render_widget(block, area);

    let slices = app.charts.breakdown();
    let mut lines: Vec<Line> = Vec::new();

    if slices.is_empty() {
        lines.push(Line::from(Span::styled("No symbol activity.", theme::muted())));
    }

    for (i, slice) in slices.iter().enumerate() {
        let is_cursor = active && i == app.charts.selected();
        let filled = ((slice.share * BAR_WIDTH as f64).round() as usize).clamp(1, BAR_WIDTH);
        let name_style = if is_cursor {
            theme::selected()
        } else {
            Style::default().fg(Theme::default().text_primary)
        };

        lines.push(Line::from(vec![
            Span::styled(if is_cursor { "▶ " } else { "  " }, theme::accent()),
            Span::styled(format!("{:<8}", slice.symbol), name_style),
            Span::raw(" "),
            Span::styled("█".repeat(filled), theme::pnl(slice.pnl)),
            Span::styled(
                "░".repeat(BAR_WIDTH - filled),
                Style::default().fg(theme::BACKGROUND),
            ),
            Span::styled(format!(" {:>+9.2}", slice.pnl), theme::pnl(slice.pnl)),
            Span::styled(format!(" {:>3.0}%", slice.share * 100.0), theme::muted()),
        ]));
    }

    let insights = &app.store.current().insights;
    if !insights.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Insights", theme::accent_bold())));
        for insight in insights {
            lines.push(Line::from(Span::styled(format!("• {insight}"), theme::muted())));
        }
    }

    let para = Paragraph::new(lines).wrap(Wrap { trim: true });
    f.render_widget(para, inner);
}

fn format_pnl(pnl: f64) -> String {
    format!("${:+.2}", pnl)
}

fn format_duration(minutes: Option<f64>) -> String {
    match minutes {
        Some(m) if m >= 60.0 => format!("{}h{:02}m", (m / 60.0).floor(), (m % 60.0).round()),
        Some(m) => format!("{m:.0}m"),
        None => "-".to_string(),
    }
}

fn trade_row<'a>(trade: &TradeRecord, theme: &Theme) -> Row<'a> {
    let cells = vec![
        Cell::from(trade.id.to_string()),
        Cell::from(trade.time.format("%m-%d %H:%M").to_string()),
        Cell::from(trade.symbol.clone()),
        Cell::from(trade.side.label()).style(Style::default().fg(theme.side_color(trade.side))),
        Cell::from(format!("{:.2}", trade.volume)),
        Cell::from(format!("{:.5}", trade.entry_price)),
        Cell::from(format!("{:.5}", trade.exit_price)),
        Cell::from(format!("{:+.1}", trade.pips)),
        Cell::from(format_pnl(trade.pnl)).style(Style::default().fg(theme.pnl_color(trade.pnl))),
        Cell::from(trade.status.label()),
        Cell::from(format_duration(trade.duration)),
    ];
    Row::new(cells).style(Style::default().fg(theme.text_primary)).height(1)
}

fn render_trades(f: &mut Frame, area: Rect, app: &App) {
    let theme = Theme::default();
    let active = app.focus == Focus::Trades;
    let rows = app.table.rows(&app.store.current().recent_trades);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme::panel_border(active))
        .title(format!(
            " Recent Trades ({}) | Filter: {} [f] | Show: {} [n] ",
            rows.len(),
            app.table.filter().label(),
            app.table.display_count(),
        ))
        .title_style(theme::panel_title(active));

    if rows.is_empty() {
        let text = Paragraph::new(Span::styled(
            "No trades match this filter.",
            theme::muted(),
        ))
        .block(block);
        f.render_widget(text, area);
        return;
    }

    let header_cells = [
        "ID", "Time", "Symbol", "Side", "Volume", "Entry", "Exit", "Pips", "P&L", "Status",
        "Duration",
    ]
    .iter()
    .map(|h| Cell::from(*h).style(theme::accent_bold()));
    let header = Row::new(header_cells).height(1);

    let body = rows.iter().map(|trade| trade_row(trade, &theme));

    let widths = [
        Constraint::Length(6),
        Constraint::Length(12),
        Constraint::Length(8),
        Constraint::Length(6),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Length(7),
        Constraint::Length(10),
        Constraint::Length(10),
        Constraint::Min(8),
    ];

    let highlight = if active {
        theme::selected()
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let table = Table::new(body, widths)
        .header(header)
        .block(block)
        .column_spacing(1)
        .row_highlight_style(highlight);

    let mut state = TableState::default().with_selected(Some(app.table.cursor()));
    f.render_stateful_widget(table, area, &mut state);
}
