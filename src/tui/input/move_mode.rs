use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

pub(super) fn handle_move(app: &mut App, key: KeyEvent) {
    let last = app.board.columns.len().saturating_sub(1);
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => {
            app.move_target = app.move_target.saturating_sub(1);
        }
        KeyCode::Char('l') | KeyCode::Right => {
            app.move_target = (app.move_target + 1).min(last);
        }
        KeyCode::Enter => {
            app.mode = Mode::Navigate;
            app.move_to_target();
        }
        KeyCode::Esc => app.mode = Mode::Navigate,
        _ => {}
    }
}
