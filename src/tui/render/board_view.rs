use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, ListState};

use crate::model::ticket::Ticket;
use crate::tui::app::{App, Mode};
use crate::util::unicode::{fit_to_width, truncate_to_width};

/// Render every column side by side, equal widths
pub fn render_board(frame: &mut Frame, app: &App, area: Rect) {
    let count = app.board.columns.len();
    if count == 0 {
        return;
    }
    let constraints: Vec<Constraint> = (0..count)
        .map(|_| Constraint::Ratio(1, count as u32))
        .collect();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(constraints)
        .split(area);

    for (index, chunk) in chunks.iter().enumerate() {
        render_column(frame, app, index, *chunk);
    }
}

fn render_column(frame: &mut Frame, app: &App, index: usize, area: Rect) {
    let theme = &app.theme;
    let bg = theme.background;
    let column = &app.board.columns[index];
    let tickets = app.board.visible_tickets(index);
    let is_active = index == app.board.active_column();
    let is_move_target = app.mode == Mode::Move && index == app.move_target;

    let color = theme.column_color(index);
    let border_style = if is_move_target {
        Style::default().fg(theme.highlight).bg(bg)
    } else if is_active {
        Style::default().fg(color).bg(bg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.dim).bg(bg)
    };

    let marker = if is_move_target { "\u{2192} " } else { "" };
    let title = Line::from(vec![
        Span::styled(
            format!(" {}{} ", marker, column.config.name),
            Style::default().fg(color).bg(bg).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("({}) ", tickets.len()),
            Style::default().fg(theme.dim).bg(bg),
        ),
    ]);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(if is_active {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(border_style)
        .title(title)
        .style(Style::default().bg(bg));

    let inner_width = area.width.saturating_sub(2) as usize;
    let items: Vec<ListItem> = tickets
        .iter()
        .map(|t| ticket_item(app, t, inner_width))
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(theme.selection_bg)
            .fg(theme.text_bright),
    );

    let mut state = ListState::default();
    if is_active && !tickets.is_empty() {
        state.select(Some(app.board.active_ticket()));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Title line plus an optional dimmed tag line
fn ticket_item<'a>(app: &App, ticket: &Ticket, width: usize) -> ListItem<'a> {
    let theme = &app.theme;
    let mut lines = vec![Line::from(Span::styled(
        fit_to_width(&ticket.title, width),
        Style::default().fg(theme.text),
    ))];
    if !ticket.tags.is_empty() {
        let tags = ticket
            .tags
            .iter()
            .map(|t| format!("#{}", t))
            .collect::<Vec<_>>()
            .join(" ");
        lines.push(Line::from(Span::styled(
            truncate_to_width(&format!("  {}", tags), width),
            Style::default().fg(theme.dim),
        )));
    }
    ListItem::new(Text::from(lines))
}
