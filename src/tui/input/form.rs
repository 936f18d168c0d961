use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::tui::app::{App, FormField};

use super::prompt::edit_line;

pub(super) fn handle_form(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('s') {
            app.submit_form();
        }
        return;
    }

    let Some(form) = app.form.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Tab => form.focus = form.focus.next(),
        KeyCode::BackTab => form.focus = form.focus.prev(),
        KeyCode::Enter => match form.focus {
            FormField::Content => form.content.push('\n'),
            _ => form.focus = form.focus.next(),
        },
        _ => {
            edit_line(form.focused_mut(), key);
        }
    }
}
