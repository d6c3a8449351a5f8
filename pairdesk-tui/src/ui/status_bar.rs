//! Bottom status bar — data source, last update, pending work, key hints.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::app::{App, Focus};
use crate::theme;
use crate::ui::dashboard::source_style;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let mut spans: Vec<Span> = Vec::new();

    let source = app.store.source();
    spans.push(Span::styled(format!(" {} ", source.label()), source_style(source)));
    spans.push(Span::styled(app.clock_label.as_str(), theme::muted()));

    if !app.terminal_focused {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled("paused", theme::neutral()));
    }

    let pending = app.workflow.pending_chains();
    if !pending.is_empty() {
        let labels: Vec<&str> = pending.iter().map(|c| c.label()).collect();
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("Working: {}", labels.join(", ")),
            theme::accent(),
        ));
    }

    if let Some(offer) = app.workflow.rerun_offer() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!("[r] re-run backtest for {} [x] dismiss", offer.symbol),
            theme::warning(),
        ));
    }

    // Key hints
    spans.push(Span::raw(" | "));
    let hints = match app.focus {
        Focus::Trades => "[Tab]symbols [j/k]move [Enter]analyse [R]efresh [q]uit",
        Focus::Symbols => "[Tab]trades [j/k]move [Enter]analyse [R]efresh [q]uit",
    };
    spans.push(Span::styled(hints, theme::muted()));

    let line = Line::from(spans);
    let para = Paragraph::new(line);
    f.render_widget(para, area);
}
