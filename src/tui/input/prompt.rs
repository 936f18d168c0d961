use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

/// Shared line editing for prompts. Returns true if the key was consumed.
pub(super) fn edit_line(input: &mut String, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) => {
            input.push(c);
            true
        }
        KeyCode::Backspace => {
            input.pop();
            true
        }
        _ => false,
    }
}

pub(super) fn handle_filter(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            let query = std::mem::take(&mut app.input);
            app.board.set_filter(&query);
            app.mode = Mode::Navigate;
        }
        KeyCode::Esc => {
            app.input.clear();
            app.board.clear_filter();
            app.mode = Mode::Navigate;
        }
        _ => {
            edit_line(&mut app.input, key);
        }
    }
}
