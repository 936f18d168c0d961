use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "Navigation",
        &[
            ("h l \u{2190} \u{2192}", "change column"),
            ("j k \u{2193} \u{2191}", "change ticket"),
        ],
    ),
    (
        "Tickets",
        &[
            ("Enter", "view ticket (e edit, f agent feedback)"),
            ("n", "new ticket (Tab next field, Ctrl-S save)"),
            ("e", "open in the editor"),
            ("m", "move to another column"),
            ("d", "delete"),
        ],
    ),
    (
        "Agents",
        &[
            ("p", "copy prompt for the selected ticket"),
            ("P", "copy prompt for the first column"),
        ],
    ),
    (
        "Other",
        &[
            ("/", "filter by title"),
            ("r", "reload"),
            ("?", "toggle this help"),
            ("q", "quit"),
        ],
    ),
];

/// Key binding overlay (toggled with ?)
pub fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let overlay_area = centered_rect(60, 80, area);
    frame.render_widget(Clear, overlay_area);

    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    for (section, bindings) in BINDINGS {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(format!(" {}", section), header_style)));
        for (key, desc) in *bindings {
            lines.push(Line::from(vec![
                Span::styled(format!(" {:<12}", key), key_style),
                Span::styled(*desc, desc_style),
            ]));
        }
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .title(Span::styled(" Keys ", header_style))
        .style(Style::default().bg(bg));
    frame.render_widget(Paragraph::new(lines).block(block), overlay_area);
}

/// Create a centered rectangle of the given percentage of the parent
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(rows[1])[1]
}
