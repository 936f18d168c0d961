use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

/// Detail view of one ticket
pub(super) fn handle_detail(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_detail(),
        KeyCode::Char('e') => app.open_edit_form(),
        KeyCode::Char('f') => app.open_feedback(),
        KeyCode::Char('p') => app.copy_ticket_prompt(),
        _ => {}
    }
    // The ticket can vanish underneath the view when files change
    if app.mode == Mode::Detail && app.viewed_ticket().is_none() {
        app.close_detail();
    }
}

pub(super) fn handle_feedback(app: &mut App, key: KeyEvent) {
    if matches!(
        key.code,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('f')
    ) {
        app.mode = Mode::Detail;
    }
}

pub(super) fn handle_help(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
        app.mode = Mode::Navigate;
    }
}
