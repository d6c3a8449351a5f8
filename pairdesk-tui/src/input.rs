//! Keyboard input dispatch — modals → global keys → focused section.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::{App, Focus};
use crate::modal::{ModalContent, ModalId};
use crate::store::LoadReason;

/// Handle a key event.
pub fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    // Only handle key press events (Windows sends both Press and Release).
    if key.kind != KeyEventKind::Press {
        return;
    }

    // 1. A pending re-run offer answers to r/x everywhere but the editor.
    if handle_rerun_key(app, key, now) {
        return;
    }

    // 2. The topmost live modal consumes input next.
    if let Some(id) = app.modals.top().map(|m| m.id) {
        handle_modal_key(app, id, key, now);
        return;
    }

    // 3. Global keys.
    match key.code {
        KeyCode::Char('q') => {
            app.running = false;
            return;
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus = app.focus.toggle();
            return;
        }
        KeyCode::Char('R') => {
            app.request_refresh(LoadReason::Manual, now);
            return;
        }
        _ => {}
    }

    // 4. Section keys.
    match app.focus {
        Focus::Trades => handle_trades_key(app, key, now),
        Focus::Symbols => handle_symbols_key(app, key, now),
    }
}

fn handle_rerun_key(app: &mut App, key: KeyEvent, now: Instant) -> bool {
    if app.workflow.rerun_offer().is_none()
        || !key.modifiers.is_empty()
        || app.modals.top().map(|m| m.id) == Some(ModalId::StrategyEditor)
    {
        return false;
    }
    match key.code {
        KeyCode::Char('r') => {
            app.with_workflow(now, |w, fb| w.accept_rerun_offer(fb));
            true
        }
        KeyCode::Char('x') => {
            app.workflow.dismiss_rerun_offer();
            true
        }
        _ => false,
    }
}

fn handle_trades_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            let visible = app.visible_trade_count();
            app.table.move_down(visible);
        }
        KeyCode::Char('k') | KeyCode::Up => app.table.move_up(),
        KeyCode::Char('f') => app.table.cycle_filter(),
        KeyCode::Char('n') => app.table.cycle_display_count(),
        KeyCode::Enter => app.open_selected_trade(now),
        _ => {}
    }
}

fn handle_symbols_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char('j') | KeyCode::Down | KeyCode::Char('l') | KeyCode::Right => {
            app.charts.select_next()
        }
        KeyCode::Char('k') | KeyCode::Up | KeyCode::Char('h') | KeyCode::Left => {
            app.charts.select_prev()
        }
        KeyCode::Enter | KeyCode::Char('c') => {
            if let Some(symbol) = app.selected_symbol() {
                app.open_currency_analysis(&symbol, now);
            }
        }
        KeyCode::Char('e') => {
            if let Some(symbol) = app.selected_symbol() {
                app.open_strategy_editor(&symbol, now);
            }
        }
        KeyCode::Char('b') => {
            if let Some(symbol) = app.selected_symbol() {
                app.backtest_saved_strategy(&symbol, now);
            }
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut App, id: ModalId, key: KeyEvent, now: Instant) {
    if key.code == KeyCode::Esc {
        app.modals.close_top(now);
        return;
    }

    match id {
        ModalId::StrategyEditor => handle_editor_key(app, key, now),
        ModalId::BacktestResults => match key.code {
            KeyCode::Char('a') => app.with_workflow(now, |w, fb| w.request_suggestions(false, fb)),
            KeyCode::Char('A') => app.with_workflow(now, |w, fb| w.request_suggestions(true, fb)),
            KeyCode::Char('o') => app.with_workflow(now, |w, fb| w.request_optimization(fb)),
            _ => handle_scroll_key(app, key),
        },
        ModalId::AiSuggestions => match key.code {
            KeyCode::Char('n') => {
                if let Some(view) = app.modals.suggestions_mut() {
                    view.select_next();
                }
            }
            KeyCode::Char('N') => {
                if let Some(view) = app.modals.suggestions_mut() {
                    view.select_prev();
                }
            }
            KeyCode::Char('p') => app.with_workflow(now, |w, fb| w.apply_suggested_strategy(fb)),
            KeyCode::Char('b') => {
                app.with_workflow(now, |w, fb| w.backtest_selected_proposal(fb))
            }
            _ => handle_scroll_key(app, key),
        },
        ModalId::CurrencyAnalysis => {
            let symbol = match app.modals.top().map(|m| &m.content) {
                Some(ModalContent::Currency(view)) => Some(view.symbol.clone()),
                _ => None,
            };
            match (key.code, symbol) {
                (KeyCode::Char('e'), Some(symbol)) => app.open_strategy_editor(&symbol, now),
                (KeyCode::Char('b'), Some(symbol)) => app.backtest_saved_strategy(&symbol, now),
                _ => handle_scroll_key(app, key),
            }
        }
        ModalId::TradeAnalysis
        | ModalId::EnhancedTradeAnalysis
        | ModalId::ParameterOptimization => match key.code {
            KeyCode::Char('q') => {
                app.modals.close_top(now);
            }
            _ => handle_scroll_key(app, key),
        },
    }
}

fn handle_scroll_key(app: &mut App, key: KeyEvent) {
    let Some(modal) = app.modals.top_mut() else {
        return;
    };
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => modal.scroll = modal.scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => modal.scroll = modal.scroll.saturating_sub(1),
        KeyCode::PageDown => modal.scroll = modal.scroll.saturating_add(10),
        KeyCode::PageUp => modal.scroll = modal.scroll.saturating_sub(10),
        KeyCode::Home => modal.scroll = 0,
        _ => {}
    }
}

fn handle_editor_key(app: &mut App, key: KeyEvent, now: Instant) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('s') => app.with_workflow(now, |w, fb| w.save_strategy(fb)),
            KeyCode::Char('r') => app.with_workflow(now, |w, fb| w.reset_strategy(fb)),
            KeyCode::Char('b') => app.with_workflow(now, |w, fb| w.run_backtest_from_editor(fb)),
            _ => {}
        }
        return;
    }

    let Some(editor) = app.modals.editor_mut() else {
        return;
    };
    match key.code {
        KeyCode::Char(c) => editor.insert(c),
        KeyCode::Enter => editor.insert('\n'),
        KeyCode::Tab => {
            for _ in 0..4 {
                editor.insert(' ');
            }
        }
        KeyCode::Backspace => editor.backspace(),
        KeyCode::Left => editor.left(),
        KeyCode::Right => editor.right(),
        KeyCode::Up => editor.up(),
        KeyCode::Down => editor.down(),
        KeyCode::Home => editor.home(),
        KeyCode::End => editor.end(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{Job, Outcome};
    use crate::test_helpers::sample_backtest;
    use crate::workflow::{StrategyPurpose, StrategySource};
    use crossterm::event::KeyEventState;
    use pairdesk_core::{DeskConfig, StrategyDocument, SuggestionResponse};
    use std::sync::mpsc::{self, Receiver, Sender};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn app_with_fallback() -> (App, Receiver<Job>, Sender<Outcome>, Instant) {
        let now = Instant::now();
        let (job_tx, job_rx) = mpsc::channel();
        let (out_tx, out_rx) = mpsc::channel();
        let mut app = App::new(&DeskConfig::default(), job_tx, out_rx, now);
        app.start(now);
        let Ok(Job::LoadSnapshot { request, reason }) = job_rx.try_recv() else {
            panic!("no startup load");
        };
        app.handle_outcome(
            Outcome::Snapshot {
                request,
                reason,
                result: Err(pairdesk_core::ClientError::Transport("down".into())),
            },
            now,
        );
        (app, job_rx, out_tx, now)
    }

    fn open_editor(app: &mut App, jobs: &Receiver<Job>, now: Instant) {
        app.focus = Focus::Symbols;
        handle_key(app, press(KeyCode::Char('e')), now);
        let Ok(Job::LoadStrategy { ticket, symbol, .. }) = jobs.try_recv() else {
            panic!("no strategy load");
        };
        assert_eq!(symbol, "EUR/USD");
        app.handle_outcome(
            Outcome::Strategy {
                ticket,
                symbol,
                purpose: StrategyPurpose::Open,
                result: Ok(StrategyDocument {
                    symbol: "EUR/USD".into(),
                    file: "eurusd_strategy.py".into(),
                    code: "A = 1".into(),
                }),
            },
            now,
        );
    }

    /// Editor, backtest results and auto-applied suggestions, in that order.
    fn offer_rerun(app: &mut App, jobs: &Receiver<Job>, now: Instant) {
        open_editor(app, jobs, now);
        handle_key(app, ctrl('b'), now);
        let Ok(Job::Backtest { ticket, symbol, .. }) = jobs.try_recv() else {
            panic!("no backtest");
        };
        app.handle_outcome(
            Outcome::Backtest {
                ticket,
                symbol,
                strategy: "A = 1".into(),
                result: Ok(sample_backtest()),
            },
            now,
        );

        handle_key(app, press(KeyCode::Char('A')), now);
        let Ok(Job::Suggestions { ticket, request }) = jobs.try_recv() else {
            panic!("no suggestions request");
        };
        let mut response = SuggestionResponse::default();
        response.suggestions.suggested_code_changes = vec!["A = 2\n".into()];
        response.auto_applied = true;
        app.handle_outcome(
            Outcome::Suggestions {
                ticket,
                symbol: request.symbol,
                auto_apply: true,
                result: Ok(response),
            },
            now,
        );
        assert!(app.workflow.rerun_offer().is_some());
    }

    #[test]
    fn rerun_offer_is_taken_from_the_results_modal() {
        let (mut app, jobs, _out, now) = app_with_fallback();
        offer_rerun(&mut app, &jobs, now);
        assert_eq!(app.modals.top().unwrap().id, ModalId::AiSuggestions);

        handle_key(&mut app, press(KeyCode::Esc), now);
        assert_eq!(app.modals.top().unwrap().id, ModalId::BacktestResults);
        handle_key(&mut app, press(KeyCode::Char('r')), now);

        assert!(app.workflow.rerun_offer().is_none());
        assert!(matches!(
            jobs.try_recv(),
            Ok(Job::Backtest { source: StrategySource::Inline(ref code), .. }) if code == "A = 2\n"
        ));
        assert!(app.modals.backtest().unwrap().is_loading());
    }

    #[test]
    fn rerun_offer_is_dismissed_over_suggestions() {
        let (mut app, jobs, _out, now) = app_with_fallback();
        offer_rerun(&mut app, &jobs, now);

        handle_key(&mut app, press(KeyCode::Char('x')), now);
        assert!(app.workflow.rerun_offer().is_none());
        assert!(jobs.try_recv().is_err());
        assert_eq!(app.modals.top().unwrap().id, ModalId::AiSuggestions);
    }

    #[test]
    fn editor_keeps_r_while_an_offer_is_pending() {
        let (mut app, jobs, _out, now) = app_with_fallback();
        offer_rerun(&mut app, &jobs, now);
        handle_key(&mut app, press(KeyCode::Esc), now);
        handle_key(&mut app, press(KeyCode::Esc), now);
        assert_eq!(app.modals.top().unwrap().id, ModalId::StrategyEditor);

        handle_key(&mut app, press(KeyCode::Char('r')), now);
        assert!(app.modals.editor().unwrap().buffer.contains('r'));
        assert!(app.workflow.rerun_offer().is_some());
        assert!(jobs.try_recv().is_err());
    }

    #[test]
    fn q_quits() {
        let (mut app, _jobs, _out, now) = app_with_fallback();
        handle_key(&mut app, press(KeyCode::Char('q')), now);
        assert!(!app.running);
    }

    #[test]
    fn release_events_are_ignored() {
        let (mut app, _jobs, _out, now) = app_with_fallback();
        let mut key = press(KeyCode::Char('q'));
        key.kind = KeyEventKind::Release;
        key.state = KeyEventState::NONE;
        handle_key(&mut app, key, now);
        assert!(app.running);
    }

    #[test]
    fn enter_requests_analysis_of_selected_row() {
        let (mut app, jobs, _out, now) = app_with_fallback();
        handle_key(&mut app, press(KeyCode::Char('j')), now);
        handle_key(&mut app, press(KeyCode::Enter), now);
        match jobs.try_recv() {
            Ok(Job::TradeAnalysis { trade, .. }) => assert_eq!(trade.id.0, 1006),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn filter_key_resets_cursor() {
        let (mut app, _jobs, _out, now) = app_with_fallback();
        handle_key(&mut app, press(KeyCode::Char('j')), now);
        handle_key(&mut app, press(KeyCode::Char('f')), now);
        assert_eq!(app.table.cursor(), 0);
        assert_eq!(app.visible_trade_count(), 3);
    }

    #[test]
    fn editor_captures_typing_and_saves() {
        let (mut app, jobs, _out, now) = app_with_fallback();
        open_editor(&mut app, &jobs, now);

        handle_key(&mut app, press(KeyCode::Char('q')), now);
        assert!(app.running);
        assert_eq!(app.modals.editor().unwrap().buffer, "A = 1q");

        handle_key(&mut app, ctrl('s'), now);
        match jobs.try_recv() {
            Ok(Job::SaveStrategy { code, .. }) => assert_eq!(code, "A = 1q"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn escape_closes_top_modal() {
        let (mut app, jobs, _out, now) = app_with_fallback();
        open_editor(&mut app, &jobs, now);
        handle_key(&mut app, ctrl('b'), now);
        assert_eq!(app.modals.top().unwrap().id, ModalId::BacktestResults);

        handle_key(&mut app, press(KeyCode::Esc), now);
        assert_eq!(app.modals.top().unwrap().id, ModalId::StrategyEditor);
        handle_key(&mut app, press(KeyCode::Esc), now);
        assert!(!app.modals.has_live());
    }

    #[test]
    fn manual_refresh_key() {
        let (mut app, jobs, _out, now) = app_with_fallback();
        handle_key(&mut app, press(KeyCode::Char('R')), now);
        assert!(matches!(
            jobs.try_recv(),
            Ok(Job::LoadSnapshot { reason: LoadReason::Manual, .. })
        ));
    }
}
