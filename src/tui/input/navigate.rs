use crossterm::event::{KeyCode, KeyEvent};

use crate::model::board::Direction;
use crate::tui::app::{App, Mode};

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('h') | KeyCode::Left => app.board.move_selection(Direction::Left),
        KeyCode::Char('l') | KeyCode::Right => app.board.move_selection(Direction::Right),
        KeyCode::Char('k') | KeyCode::Up => app.board.move_selection(Direction::Up),
        KeyCode::Char('j') | KeyCode::Down => app.board.move_selection(Direction::Down),
        KeyCode::Char('/') => {
            app.input = app.board.filter().unwrap_or_default().to_string();
            app.mode = Mode::Filter;
        }
        KeyCode::Char('n') => app.open_new_form(),
        KeyCode::Enter => app.open_detail(),
        KeyCode::Char('p') => app.copy_ticket_prompt(),
        KeyCode::Char('P') => app.copy_batch_prompt(),
        KeyCode::Char('?') => app.mode = Mode::Help,
        KeyCode::Char('m') => {
            if app.board.selected_ticket().is_some() {
                app.move_target = app.board.active_column();
                app.mode = Mode::Move;
            } else {
                app.set_error("no ticket selected");
            }
        }
        KeyCode::Char('d') => {
            if app.board.selected_ticket().is_some() {
                app.mode = Mode::ConfirmDelete;
            } else {
                app.set_error("no ticket selected");
            }
        }
        KeyCode::Char('e') => match app.board.selected_ticket() {
            Some(ticket) => app.edit_request = Some(ticket.path.clone()),
            None => app.set_error("no ticket selected"),
        },
        KeyCode::Char('r') => {
            app.reload();
            app.set_status("reloaded");
        }
        _ => {}
    }
}
