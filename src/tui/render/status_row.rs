use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::util::unicode::{display_width, truncate_to_width};

const NAVIGATE_HINT: &str = "n new  Enter view  e edit  m move  d delete  p prompt  ? help";

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;
    let cursor = Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)); // ▌ cursor
    let bright = Style::default().fg(app.theme.text_bright).bg(bg);

    let (mut spans, hint) = match app.mode {
        Mode::Navigate => (navigate_spans(app), NAVIGATE_HINT),
        Mode::Filter => (
            vec![Span::styled(format!("/{}", app.input), bright), cursor],
            "Enter apply  Esc clear",
        ),
        Mode::Detail => (navigate_spans(app), "e edit  f feedback  p prompt  Esc back"),
        Mode::Feedback => (navigate_spans(app), "Esc back"),
        Mode::Form => (
            navigate_spans(app),
            "Tab next field  Ctrl-S save  Esc cancel",
        ),
        Mode::Help => (Vec::new(), "Esc close"),
        Mode::Move => {
            let target = app
                .board
                .columns
                .get(app.move_target)
                .map(|c| c.config.name.as_str())
                .unwrap_or_default();
            (
                vec![Span::styled(format!("move to {}", target), bright)],
                "h/l choose  Enter confirm  Esc cancel",
            )
        }
        Mode::ConfirmDelete => {
            let title = app
                .board
                .selected_ticket()
                .map(|t| t.title.as_str())
                .unwrap_or_default();
            (
                vec![Span::styled(
                    format!("delete \"{}\"? y/n", truncate_to_width(title, width / 2)),
                    Style::default().fg(app.theme.red).bg(bg),
                )],
                "",
            )
        }
    };

    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(hint);
    if !hint.is_empty() && content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Status message if one is live, otherwise the active filter (dimmed)
/// while on the board
fn navigate_spans(app: &App) -> Vec<Span<'static>> {
    let bg = app.theme.background;
    if let Some(status) = &app.status {
        let fg = if status.is_error {
            app.theme.red
        } else {
            app.theme.green
        };
        return vec![Span::styled(status.text.clone(), Style::default().fg(fg).bg(bg))];
    }
    match app.board.filter().filter(|_| app.mode == Mode::Navigate) {
        Some(query) => vec![Span::styled(
            format!("/{}", query),
            Style::default().fg(app.theme.dim).bg(bg),
        )],
        None => Vec::new(),
    }
}
