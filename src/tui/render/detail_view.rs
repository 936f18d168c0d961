use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};

use crate::parse::ticket_serializer::format_timestamp;
use crate::tui::app::App;

/// Full-screen view of the ticket being viewed
pub fn render_detail(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let Some(ticket) = app.viewed_ticket() else {
        let empty = Paragraph::new(" Ticket not found")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    };

    let dim = Style::default().fg(app.theme.dim).bg(bg);
    let text = Style::default().fg(app.theme.text).bg(bg);
    let label = |name: &'static str| Span::styled(format!("{:<10}", name), dim);

    let mut lines = vec![
        Line::from(Span::styled(
            ticket.title.clone(),
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![label("column"), Span::styled(ticket.column.clone(), text)]),
        Line::from(vec![label("tags"), Span::styled(ticket.tags.join(", "), text)]),
        Line::from(vec![
            label("created"),
            Span::styled(format_timestamp(&ticket.created), text),
        ]),
        Line::from(vec![
            label("updated"),
            Span::styled(format_timestamp(&ticket.updated), text),
        ]),
        Line::from(vec![
            label("file"),
            Span::styled(ticket.path.display().to_string(), dim),
        ]),
    ];
    if let Some(feedback) = ticket.agent_feedback.as_deref() {
        let first = feedback.lines().next().unwrap_or_default();
        lines.push(Line::from(vec![
            label("feedback"),
            Span::styled(first.to_string(), Style::default().fg(app.theme.green).bg(bg)),
            Span::styled("  (f to expand)", dim),
        ]));
    }
    lines.push(Line::from(""));
    lines.extend(ticket.body.lines().map(|l| Line::from(Span::styled(l.to_string(), text))));

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.highlight).bg(bg))
        .title(Span::styled(" Ticket ", Style::default().fg(app.theme.highlight).bg(bg)))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Full-screen agent feedback of the viewed ticket
pub fn render_feedback(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let (title, feedback) = match app.viewed_ticket() {
        Some(t) => (t.title.as_str(), t.agent_feedback.as_deref().unwrap_or_default()),
        None => ("", ""),
    };
    let text = Style::default().fg(app.theme.text).bg(bg);
    let lines: Vec<Line> = feedback
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), text)))
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.green).bg(bg))
        .title(Span::styled(
            format!(" Agent feedback: {} ", title),
            Style::default().fg(app.theme.green).bg(bg),
        ))
        .style(Style::default().bg(bg));
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
