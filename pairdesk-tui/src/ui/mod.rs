//! Top-level UI layout — dashboard, status bar, then modals and toasts on top.

pub mod dashboard;
pub mod modals;
pub mod notifications;
pub mod status_bar;

use std::time::Instant;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

use crate::app::App;

/// Draw the entire UI.
pub fn draw(f: &mut Frame, app: &App, now: Instant) {
    // Split: main area + 1-line status bar.
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(f.area());

    let main_area = chunks[0];
    let status_area = chunks[1];

    dashboard::render(f, main_area, app, now);
    status_bar::render(f, status_area, app);

    // Modals bottom first, so the input-receiving one ends up on top.
    let top = app.modals.top().map(|m| m.id);
    for modal in app.modals.iter() {
        let is_top = modal.is_live() && Some(modal.id) == top;
        modals::render(f, main_area, modal, is_top, now);
    }

    notifications::render(f, main_area, app, now);
}

/// Compute a centered rect for overlays.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{Job, Outcome};
    use pairdesk_core::{ClientError, DeskConfig};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::sync::mpsc;

    fn screen(app: &App, now: Instant) -> String {
        let mut terminal = Terminal::new(TestBackend::new(160, 48)).unwrap();
        terminal.draw(|f| draw(f, app, now)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect()
    }

    #[test]
    fn fallback_dashboard_renders() {
        let now = Instant::now();
        let (job_tx, job_rx) = mpsc::channel();
        let (_out_tx, out_rx) = mpsc::channel();
        let mut app = App::new(&DeskConfig::default(), job_tx, out_rx, now);
        assert!(screen(&app, now).contains("LOADING"));

        app.start(now);
        let Ok(Job::LoadSnapshot { request, reason }) = job_rx.try_recv() else {
            panic!("no startup load");
        };
        app.handle_outcome(
            Outcome::Snapshot {
                request,
                reason,
                result: Err(ClientError::Transport("down".into())),
            },
            now,
        );

        let text = screen(&app, now);
        assert!(text.contains("SAMPLE DATA"));
        assert!(text.contains("USD/JPY"));
        assert!(text.contains("Recent Trades (7)"));
    }

    #[test]
    fn centered_rect_is_inside_area() {
        let area = Rect::new(0, 0, 100, 50);
        let popup = centered_rect(60, 40, area);
        assert_eq!(popup.width, 60);
        assert_eq!(popup.height, 20);
        assert_eq!(popup.x, 20);
        assert_eq!(popup.y, 15);
    }
}
