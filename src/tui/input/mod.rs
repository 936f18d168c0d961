mod confirm;
mod form;
mod move_mode;
mod navigate;
mod prompt;
mod view;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // Ctrl-C quits from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    match app.mode {
        Mode::Navigate => navigate::handle_navigate(app, key),
        Mode::Filter => prompt::handle_filter(app, key),
        Mode::Move => move_mode::handle_move(app, key),
        Mode::ConfirmDelete => confirm::handle_confirm_delete(app, key),
        Mode::Detail => view::handle_detail(app, key),
        Mode::Feedback => view::handle_feedback(app, key),
        Mode::Form => form::handle_form(app, key),
        Mode::Help => view::handle_help(app, key),
    }
}
