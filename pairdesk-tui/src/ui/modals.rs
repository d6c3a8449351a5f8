//! Modal overlays — one renderer per modal content kind.

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use pairdesk_core::domain::TradeOutcome;
use pairdesk_core::{AnalysisResult, BasicAnalysis, EnhancedAnalysis, TradeRecord};

use crate::metrics::{format_currency, format_percent};
use crate::modal::{Modal, ModalContent, ModalId, ModalPhase, ENTER_DURATION, EXIT_DURATION};
use crate::theme::{self, Theme};
use crate::ui::centered_rect;
use crate::views::{
    AutoApplyStatus, BacktestState, BacktestView, CurrencyAnalysisView, EditorView,
    OptimizationView, SuggestionsView, TradeAnalysisView,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Draw one modal. `is_top` marks the modal receiving input.
pub fn render(f: &mut Frame, area: Rect, modal: &Modal, is_top: bool, now: Instant) {
    let popup = popup_area(modal, now, area);
    f.render_widget(Clear, popup);

    let border = if modal.is_live() {
        theme::accent()
    } else {
        theme::muted()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" {} ", title(modal)))
        .title_style(if modal.is_live() {
            theme::accent_bold()
        } else {
            theme::muted()
        })
        .title_bottom(Line::from(Span::styled(format!(" {} ", hints(modal)), theme::muted())));

    let inner = block.inner(popup);
    f.render_widget(block, popup);

    if let ModalContent::Editor(view) = &modal.content {
        render_editor(f, inner, view, is_top);
        return;
    }

    let lines = match &modal.content {
        ModalContent::Trade(view) => trade_lines(view),
        ModalContent::Currency(view) => currency_lines(view),
        ModalContent::Backtest(view) => backtest_lines(view, now),
        ModalContent::Suggestions(view) => suggestion_lines(view),
        ModalContent::Optimization(view) => optimization_lines(view),
        ModalContent::Editor(_) => Vec::new(),
    };

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((modal.scroll, 0));
    f.render_widget(para, inner);
}

fn size(id: ModalId) -> (u16, u16) {
    match id {
        ModalId::TradeAnalysis | ModalId::EnhancedTradeAnalysis => (70, 75),
        ModalId::CurrencyAnalysis => (75, 80),
        ModalId::StrategyEditor => (85, 85),
        ModalId::BacktestResults => (70, 70),
        ModalId::AiSuggestions | ModalId::ParameterOptimization => (80, 80),
    }
}

/// Popups grow in on entry and shrink on exit.
fn popup_area(modal: &Modal, now: Instant, area: Rect) -> Rect {
    let elapsed = now.saturating_duration_since(modal.since).as_secs_f64();
    let progress = match modal.phase {
        ModalPhase::Entering => elapsed / ENTER_DURATION.as_secs_f64(),
        ModalPhase::Open => 1.0,
        ModalPhase::Leaving => 1.0 - elapsed / EXIT_DURATION.as_secs_f64(),
    }
    .clamp(0.0, 1.0);
    let scale = 0.85 + 0.15 * progress;

    let (x, y) = size(modal.id);
    let scaled = |p: u16| ((f64::from(p) * scale).round() as u16).clamp(10, 100);
    centered_rect(scaled(x), scaled(y), area)
}

fn title(modal: &Modal) -> String {
    match &modal.content {
        ModalContent::Trade(view) => format!(
            "{}: #{} {}",
            modal.id.title(),
            view.trade.id,
            view.trade.symbol
        ),
        ModalContent::Currency(view) => format!("{}: {}", modal.id.title(), view.symbol),
        ModalContent::Editor(view) => format!(
            "{}: {}{}",
            modal.id.title(),
            view.file,
            if view.is_dirty() { " [modified]" } else { "" }
        ),
        ModalContent::Backtest(view) => format!("{}: {}", modal.id.title(), view.symbol),
        ModalContent::Suggestions(view) => format!("{}: {}", modal.id.title(), view.symbol),
        ModalContent::Optimization(view) => format!("{}: {}", modal.id.title(), view.symbol),
    }
}

fn hints(modal: &Modal) -> &'static str {
    match modal.id {
        ModalId::TradeAnalysis
        | ModalId::EnhancedTradeAnalysis
        | ModalId::ParameterOptimization => "[j/k]scroll [Esc]close",
        ModalId::CurrencyAnalysis => "[j/k]scroll [e]strategy [b]backtest [Esc]close",
        ModalId::StrategyEditor => "[Ctrl-S]save [Ctrl-R]reset [Ctrl-B]backtest [Esc]close",
        ModalId::BacktestResults => "[a]suggest [A]suggest+apply [o]optimize [Esc]close",
        ModalId::AiSuggestions => "[n/N]proposal [p]apply [b]backtest [Esc]close",
    }
}

fn heading(lines: &mut Vec<Line<'static>>, text: &str) {
    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(text.to_string(), theme::accent_bold())));
}

fn field(lines: &mut Vec<Line<'static>>, label: &str, value: String, style: Style) {
    lines.push(Line::from(vec![
        Span::styled(format!("  {:<20}", label), theme::muted()),
        Span::styled(value, style),
    ]));
}

fn bullets(lines: &mut Vec<Line<'static>>, items: &[String], empty: &str) {
    if items.is_empty() {
        lines.push(Line::from(Span::styled(format!("  {empty}"), theme::muted())));
    }
    for item in items {
        lines.push(Line::from(vec![
            Span::styled("  • ", theme::accent()),
            Span::raw(item.clone()),
        ]));
    }
}

fn price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.5}"))
}

// ── Trade analysis ──────────────────────────────────────────────────

fn trade_header(lines: &mut Vec<Line<'static>>, trade: &TradeRecord) {
    let theme = Theme::default();
    lines.push(Line::from(vec![
        Span::styled(format!("{} ", trade.symbol), theme::accent_bold()),
        Span::styled(
            format!("{} ", trade.side.label()),
            Style::default().fg(theme.side_color(trade.side)),
        ),
        Span::raw(format!(
            "{:.2} lots @ {:.5} → {:.5}  ",
            trade.volume, trade.entry_price, trade.exit_price
        )),
        Span::styled(
            format!("{} ({:+.1} pips)", format_currency(trade.pnl), trade.pips),
            theme::pnl(trade.pnl),
        ),
    ]));
    lines.push(Line::from(Span::styled(
        format!(
            "{} | {}",
            trade.time.format("%Y-%m-%d %H:%M"),
            trade.status.label()
        ),
        theme::muted(),
    )));
}

fn trade_lines(view: &TradeAnalysisView) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    trade_header(&mut lines, &view.trade);
    match &view.analysis {
        AnalysisResult::Enhanced(analysis) => enhanced_lines(&mut lines, analysis),
        AnalysisResult::Basic(analysis) => basic_lines(&mut lines, analysis, view.local),
    }
    lines
}

fn enhanced_lines(lines: &mut Vec<Line<'static>>, analysis: &EnhancedAnalysis) {
    let theme = Theme::default();
    let text = Style::default().fg(theme.text_primary);

    heading(lines, "Market Conditions");
    field(
        lines,
        "Candles analysed",
        analysis.total_candles_analyzed.to_string(),
        text,
    );
    match &analysis.market {
        Some(market) => {
            let opt = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
            field(lines, "Trend", opt(&market.trend_direction), text);
            field(lines, "Structure", opt(&market.market_structure), text);
            field(
                lines,
                "RSI at entry",
                market.rsi_at_entry.map_or("-".to_string(), |v| format!("{v:.1}")),
                text,
            );
            field(lines, "Recent high", price(market.recent_high), text);
            field(lines, "Recent low", price(market.recent_low), text);
            field(
                lines,
                "Volatility",
                market.volatility.map_or("-".to_string(), |v| format!("{v:.5}")),
                text,
            );
        }
        None => lines.push(Line::from(Span::styled(
            "  No candle context available.",
            theme::muted(),
        ))),
    }

    heading(lines, "Risk Levels");
    field(lines, "Stop loss", price(analysis.stop_loss), theme::negative());
    field(lines, "Take profit", price(analysis.take_profit), theme::positive());
    if let Some(loss) = analysis.actual_loss {
        field(lines, "Actual loss", format_currency(loss), theme::pnl(loss));
    }

    heading(lines, "Strategy Compliance");
    match &analysis.compliance {
        Some(compliance) if compliance.strategy_available => {
            if let Some(kind) = &compliance.strategy_type {
                field(lines, "Strategy", kind.clone(), text);
            }
            for (check, verdict) in &compliance.trade_compliance {
                field(
                    lines,
                    &check.replace('_', " "),
                    verdict.clone(),
                    Style::default()
                        .fg(theme.verdict_color(verdict))
                        .add_modifier(Modifier::BOLD),
                );
            }
            if !compliance.strategy_violations.is_empty() {
                lines.push(Line::from(Span::styled("  Violations", theme::negative())));
                bullets(lines, &compliance.strategy_violations, "");
            }
        }
        _ => lines.push(Line::from(Span::styled(
            "  No strategy on file for this pair.",
            theme::muted(),
        ))),
    }

    heading(lines, "AI Insights");
    bullets(lines, &analysis.insights, "No insights returned.");
}

fn basic_lines(lines: &mut Vec<Line<'static>>, analysis: &BasicAnalysis, local: bool) {
    let outcome_style = match analysis.outcome {
        TradeOutcome::Profit => theme::positive(),
        TradeOutcome::Breakeven => theme::neutral(),
        TradeOutcome::Loss(_) => theme::negative(),
    };

    if local {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Backend analysis unavailable; summary derived from the trade record.",
            theme::warning(),
        )));
    }

    heading(lines, "Outcome");
    lines.push(Line::from(vec![
        Span::styled(
            format!("  {} ", analysis.outcome.label()),
            outcome_style.add_modifier(Modifier::BOLD),
        ),
        Span::raw(analysis.headline.clone()),
    ]));

    heading(lines, "Observations");
    bullets(lines, &analysis.observations, "Nothing notable.");

    heading(lines, "What To Change");
    bullets(lines, &analysis.remediation, "No changes suggested.");
}

// ── Currency analysis ───────────────────────────────────────────────

fn currency_lines(view: &CurrencyAnalysisView) -> Vec<Line<'static>> {
    let theme = Theme::default();
    let text = Style::default().fg(theme.text_primary);
    let mut lines = Vec::new();

    heading(&mut lines, "Performance");
    field(&mut lines, "Total P&L", format_currency(view.total_pnl), theme::pnl(view.total_pnl));
    field(
        &mut lines,
        "Win rate",
        format_percent(view.win_rate),
        Style::default().fg(theme.win_rate_color(view.win_rate)),
    );
    field(&mut lines, "Trades", view.total_trades.to_string(), text);
    field(&mut lines, "Profit factor", format!("{:.2}", view.profit_factor), text);
    field(&mut lines, "Best trade", format_currency(view.best_trade), theme::positive());
    field(&mut lines, "Worst trade", format_currency(view.worst_trade), theme::negative());
    field(&mut lines, "Max drawdown", format_currency(view.max_drawdown), theme::warning());
    field(&mut lines, "Avg trade size", format!("{:.2}", view.avg_trade_size), text);

    heading(&mut lines, "Market Analysis");
    lines.push(Line::from(format!("  {}", view.market_analysis)));

    heading(&mut lines, "AI Insights");
    bullets(&mut lines, &view.insights, "No insights yet.");

    heading(&mut lines, "Recommendations");
    bullets(&mut lines, &view.recommendations, "No recommendations yet.");

    heading(&mut lines, "Strategy");
    match &view.strategy_code {
        Some(code) => lines.push(Line::from(Span::styled(
            format!("  {} lines on file. Press e to edit.", code.lines().count()),
            theme::accent(),
        ))),
        None => lines.push(Line::from(Span::styled(
            "  No strategy on file. Press e to create one.",
            theme::muted(),
        ))),
    }
    bullets(&mut lines, &view.strategy_improvements, "No improvements suggested.");

    heading(&mut lines, "Recent Trades");
    if view.recent_trades.is_empty() {
        lines.push(Line::from(Span::styled("  None.", theme::muted())));
    }
    for trade in &view.recent_trades {
        lines.push(Line::from(vec![
            Span::styled(format!("  #{:<6}", trade.id), theme::muted()),
            Span::raw(format!("{} ", trade.time.format("%m-%d %H:%M"))),
            Span::styled(
                format!("{:<6}", trade.side.label()),
                Style::default().fg(theme.side_color(trade.side)),
            ),
            Span::styled(format_currency(trade.pnl), theme::pnl(trade.pnl)),
        ]));
    }
    lines
}

// ── Strategy editor ─────────────────────────────────────────────────

const GUTTER: u16 = 5;

fn render_editor(f: &mut Frame, area: Rect, view: &EditorView, is_top: bool) {
    let (line, column) = view.position();
    let height = usize::from(area.height.max(1));
    let offset = line.saturating_sub(height - 1);

    let lines: Vec<Line> = view
        .buffer
        .split('\n')
        .enumerate()
        .map(|(i, text)| {
            Line::from(vec![
                Span::styled(format!("{:>4} ", i + 1), theme::muted()),
                Span::raw(text),
            ])
        })
        .collect();

    let scroll = u16::try_from(offset).unwrap_or(u16::MAX);
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), area);

    if is_top {
        let x = area
            .x
            .saturating_add(GUTTER)
            .saturating_add(u16::try_from(column).unwrap_or(u16::MAX))
            .min(area.right().saturating_sub(1));
        let y = area
            .y
            .saturating_add(u16::try_from(line - offset).unwrap_or(0));
        f.set_cursor_position((x, y));
    }
}

// ── Backtest ────────────────────────────────────────────────────────

fn backtest_lines(view: &BacktestView, now: Instant) -> Vec<Line<'static>> {
    let theme = Theme::default();
    let text = Style::default().fg(theme.text_primary);
    let mut lines = Vec::new();

    match &view.state {
        BacktestState::Loading { started } => {
            let elapsed = now.saturating_duration_since(*started);
            let frame = SPINNER[(elapsed.as_millis() / 100) as usize % SPINNER.len()];
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!(
                    "  {frame} Running backtest for {}… {}s",
                    view.symbol,
                    elapsed.as_secs()
                ),
                theme::accent(),
            )));
        }
        BacktestState::Failed(message) => {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("  Backtest failed: {message}"),
                theme::negative(),
            )));
        }
        BacktestState::Results(result) => {
            let metrics = pairdesk_core::BacktestMetrics::from_result(result);
            heading(&mut lines, "Summary");
            field(&mut lines, "Trades", metrics.total_trades.to_string(), text);
            field(
                &mut lines,
                "Win rate",
                format_percent(metrics.win_rate),
                Style::default().fg(theme.win_rate_color(metrics.win_rate)),
            );
            field(
                &mut lines,
                "Total P&L",
                format_currency(metrics.total_pnl),
                theme::pnl(metrics.total_pnl),
            );
            field(
                &mut lines,
                "Average loss",
                format_currency(metrics.avg_loss),
                theme::negative(),
            );
            field(
                &mut lines,
                "Max drawdown",
                format_percent(metrics.max_drawdown),
                theme::warning(),
            );
            field(
                &mut lines,
                "Balance",
                format!(
                    "{} → {}",
                    format_currency(result.initial_balance),
                    format_currency(metrics.final_balance)
                ),
                text,
            );
            field(
                &mut lines,
                "Peak / low",
                format!(
                    "{} / {}",
                    format_currency(result.peak_balance),
                    format_currency(result.lowest_balance)
                ),
                theme::muted(),
            );

            heading(&mut lines, "Simulated Trades");
            if result.trades.is_empty() {
                lines.push(Line::from(Span::styled(
                    "  The strategy produced no trades.",
                    theme::muted(),
                )));
            }
            for trade in &result.trades {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {:<17}", trade.entry_time), theme::muted()),
                    Span::raw(format!("{:<5}", trade.direction)),
                    Span::styled(
                        format!("{:>10}", format_currency(trade.usd_pnl)),
                        theme::pnl(trade.usd_pnl),
                    ),
                    Span::styled(format!(" {:+.1} pips ", trade.pips_gained), theme::muted()),
                    Span::raw(trade.exit_reason.clone()),
                ]));
            }
        }
    }
    lines
}

// ── AI suggestions ──────────────────────────────────────────────────

fn suggestion_lines(view: &SuggestionsView) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match &view.auto_apply {
        AutoApplyStatus::NotRequested => {}
        AutoApplyStatus::Applied { path } => lines.push(Line::from(Span::styled(
            match path {
                Some(path) => format!("Applied to {path}"),
                None => "Applied to the strategy on file".to_string(),
            },
            theme::positive().add_modifier(Modifier::BOLD),
        ))),
        AutoApplyStatus::Failed { reason } => lines.push(Line::from(Span::styled(
            format!("Auto-apply failed: {reason}"),
            theme::negative(),
        ))),
    }

    for (title, items) in view.response.suggestions.groups() {
        heading(&mut lines, title);
        bullets(&mut lines, items, "Nothing suggested.");
    }

    let proposals = view.proposals();
    heading(
        &mut lines,
        &format!("Suggested Code Changes ({})", proposals.len()),
    );
    if proposals.is_empty() {
        lines.push(Line::from(Span::styled("  No code changes proposed.", theme::muted())));
    }
    for (i, proposal) in proposals.iter().enumerate() {
        let is_cursor = i == view.selected;
        lines.push(Line::from(Span::styled(
            format!("{} Proposal {}", if is_cursor { "▶" } else { " " }, i + 1),
            if is_cursor {
                theme::selected()
            } else {
                theme::accent()
            },
        )));
        for code_line in proposal.lines() {
            lines.push(Line::from(Span::styled(
                format!("    {code_line}"),
                if is_cursor {
                    Style::default().fg(Theme::default().text_primary)
                } else {
                    theme::muted()
                },
            )));
        }
    }
    lines
}

// ── Parameter optimisation ──────────────────────────────────────────

fn optimization_lines(view: &OptimizationView) -> Vec<Line<'static>> {
    let theme = Theme::default();
    let opt = &view.optimization;
    let mut lines = Vec::new();

    heading(&mut lines, "Assessment");
    bullets(&mut lines, &opt.performance_assessment, "No assessment returned.");

    heading(&mut lines, "Parameter Recommendations");
    let grouped = view.grouped();
    if grouped.is_empty() {
        lines.push(Line::from(Span::styled("  No parameter changes.", theme::muted())));
    }
    for (priority, recs) in grouped {
        lines.push(Line::from(Span::styled(
            format!("  {}", priority.label()),
            theme::warning().add_modifier(Modifier::BOLD),
        )));
        for (name, rec) in recs {
            lines.push(Line::from(vec![
                Span::styled(format!("    {:<22}", name), Style::default().fg(theme.text_primary)),
                Span::styled(format!("{} → ", rec.current), theme::muted()),
                Span::styled(rec.recommended.to_string(), theme::accent_bold()),
            ]));
            if !rec.reason.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("      {}", rec.reason),
                    theme::muted(),
                )));
            }
        }
    }

    for (title, settings) in [
        ("Risk Management", &opt.risk_management_settings),
        ("Technical Filters", &opt.technical_filters),
    ] {
        if settings.is_empty() {
            continue;
        }
        heading(&mut lines, title);
        for (key, value) in settings {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            field(&mut lines, key, value, Style::default().fg(theme.text_primary));
        }
    }

    if !opt.implementation_priority.is_empty() {
        heading(&mut lines, "Implementation Order");
        for (i, item) in opt.implementation_priority.iter().enumerate() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {}. ", i + 1), theme::muted()),
                Span::styled(format!("[{}] ", item.priority.label()), theme::warning()),
                Span::raw(item.action.clone()),
            ]));
            if !item.impact.is_empty() || !item.timeframe.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("       {} {}", item.impact, item.timeframe),
                    theme::muted(),
                )));
            }
        }
    }
    lines
}
