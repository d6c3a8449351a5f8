//! Toasts stacked in the top-right corner, newest at the bottom.

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::App;
use crate::notify::NoticePhase;
use crate::theme::{self, Theme};

const TOAST_WIDTH: u16 = 48;
const TOAST_HEIGHT: u16 = 3;

pub fn render(f: &mut Frame, area: Rect, app: &App, now: Instant) {
    let theme = Theme::default();
    let width = TOAST_WIDTH.min(area.width);
    let x = area.right().saturating_sub(width);
    let fits = usize::from(area.height / TOAST_HEIGHT);

    let shown: Vec<_> = app.notices.shown(now).collect();
    // Keep the newest ones when the stack is taller than the screen.
    let skip = shown.len().saturating_sub(fits);

    for (slot, (notice, phase)) in shown.into_iter().skip(skip).enumerate() {
        let y = area.y + slot as u16 * TOAST_HEIGHT;
        let toast = Rect::new(x, y, width, TOAST_HEIGHT);
        f.render_widget(Clear, toast);

        let color = theme.notice_color(notice.kind);
        let style = match phase {
            NoticePhase::Leaving => Style::default().fg(color).add_modifier(Modifier::DIM),
            NoticePhase::Visible | NoticePhase::Pending => Style::default().fg(color),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .style(Style::default().bg(theme::BACKGROUND));
        let line = Line::from(vec![
            Span::styled(
                format!("{} ", notice.kind.label()),
                style.add_modifier(Modifier::BOLD),
            ),
            Span::styled(notice.message.as_str(), Style::default().fg(theme.text_primary)),
        ]);
        f.render_widget(
            Paragraph::new(line).block(block).wrap(Wrap { trim: true }),
            toast,
        );
    }
}
