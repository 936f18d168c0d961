use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::tui::app::{App, FormField, TicketForm};

/// Create/edit form: title and tags on one line each, content below
pub fn render_form(frame: &mut Frame, app: &App, area: Rect) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // title
            Constraint::Length(3), // tags
            Constraint::Min(3),    // content
        ])
        .split(area);

    let heading = if form.editing.is_some() {
        "Edit"
    } else {
        "New ticket"
    };
    render_field(frame, app, form, FormField::Title, &format!(" {}: title ", heading), chunks[0]);
    render_field(frame, app, form, FormField::Tags, " tags (comma-separated) ", chunks[1]);
    render_field(frame, app, form, FormField::Content, " content ", chunks[2]);
}

fn render_field(
    frame: &mut Frame,
    app: &App,
    form: &TicketForm,
    field: FormField,
    label: &str,
    area: Rect,
) {
    let bg = app.theme.background;
    let focused = form.focus == field;
    let value = match field {
        FormField::Title => &form.title,
        FormField::Tags => &form.tags,
        FormField::Content => &form.content,
    };
    let text = Style::default().fg(app.theme.text_bright).bg(bg);

    let mut lines: Vec<Line> = value
        .split('\n')
        .map(|l| Line::from(Span::styled(l.to_string(), text)))
        .collect();
    if focused && let Some(last) = lines.last_mut() {
        last.push_span(Span::styled(
            "\u{258C}",
            Style::default().fg(app.theme.highlight).bg(bg),
        ));
    }

    let border = if focused {
        Style::default().fg(app.theme.highlight).bg(bg)
    } else {
        Style::default().fg(app.theme.dim).bg(bg)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if focused {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(border)
        .title(Span::styled(label.to_string(), border))
        .style(Style::default().bg(bg));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}
