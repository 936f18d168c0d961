pub mod board_view;
pub mod detail_view;
pub mod form_view;
pub mod help_overlay;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use super::app::{App, Mode};

/// Main render function: the board (or a full-screen ticket view) above a
/// one-line status row
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // columns
            Constraint::Length(1), // status row
        ])
        .split(area);

    match app.mode {
        Mode::Detail => detail_view::render_detail(frame, app, chunks[0]),
        Mode::Feedback => detail_view::render_feedback(frame, app, chunks[0]),
        Mode::Form => form_view::render_form(frame, app, chunks[0]),
        Mode::Help => {
            board_view::render_board(frame, app, chunks[0]);
            help_overlay::render_help_overlay(frame, app, chunks[0]);
        }
        _ => board_view::render_board(frame, app, chunks[0]),
    }
    status_row::render_status_row(frame, app, chunks[1]);
}
