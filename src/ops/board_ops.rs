use crate::io::ticket_store::{SkippedTicket, StoreError, TicketStore};
use crate::model::board::Board;
use crate::model::ticket::Ticket;

#[derive(Debug, thiserror::Error)]
pub enum BoardError {
    #[error("title cannot be empty")]
    EmptyTitle,
    #[error("no ticket selected")]
    NoSelection,
    #[error("no column '{0}'")]
    UnknownColumn(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A column that could not be listed during a reload.
#[derive(Debug)]
pub struct ColumnFailure {
    pub column: String,
    pub error: StoreError,
}

/// What a reload could not load. The board itself is always refreshed as far
/// as possible.
#[derive(Debug, Default)]
pub struct ReloadReport {
    pub failed_columns: Vec<ColumnFailure>,
    pub skipped: Vec<SkippedTicket>,
}

impl ReloadReport {
    pub fn is_clean(&self) -> bool {
        self.failed_columns.is_empty() && self.skipped.is_empty()
    }
}

/// Re-read every column from disk and replace its tickets wholesale.
///
/// A column whose directory cannot be listed keeps its previous tickets and is
/// reported. Unparseable files are reported and left out. The selection is
/// clamped afterwards. Reloading unchanged files leaves the board unchanged.
pub fn reload(board: &mut Board, store: &TicketStore) -> ReloadReport {
    let mut report = ReloadReport::default();

    for index in 0..board.columns.len() {
        let dir = board.columns[index].config.dir.clone();
        match store.scan(&dir) {
            Ok(scan) => {
                board.replace_tickets(index, scan.tickets);
                report.skipped.extend(scan.skipped);
            }
            Err(error) => report.failed_columns.push(ColumnFailure { column: dir, error }),
        }
    }

    board.clamp_selection();
    report
}

/// Create a ticket in the active column and reload.
///
/// Tags are trimmed and empty ones dropped. The filename comes from today's
/// date and the title; an existing ticket with the same filename is
/// overwritten.
pub fn create_ticket(
    board: &mut Board,
    store: &TicketStore,
    title: &str,
    tags: &[String],
    body: &str,
) -> Result<Ticket, BoardError> {
    let column = board
        .active_column_config()
        .map(|c| c.dir.clone())
        .ok_or(BoardError::NoSelection)?;
    create_ticket_in(board, store, &column, title, tags, body)
}

/// Create a ticket in a named column and reload.
pub fn create_ticket_in(
    board: &mut Board,
    store: &TicketStore,
    column: &str,
    title: &str,
    tags: &[String],
    body: &str,
) -> Result<Ticket, BoardError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(BoardError::EmptyTitle);
    }

    let mut ticket = Ticket::new(title, column);
    ticket.tags = clean_tags(tags);
    ticket.body = body.trim().to_string();
    ticket.set_path(store.new_ticket_path(column, &ticket));

    store.write(&ticket)?;
    reload(board, store);
    Ok(ticket)
}

/// Rewrite an existing ticket in place with a fresh `updated` time, then reload.
pub fn save_ticket(
    board: &mut Board,
    store: &TicketStore,
    ticket: &mut Ticket,
) -> Result<(), BoardError> {
    if ticket.title.trim().is_empty() {
        return Err(BoardError::EmptyTitle);
    }
    let previous = ticket.updated;
    ticket.touch();
    if let Err(e) = store.write(ticket) {
        ticket.updated = previous;
        return Err(e.into());
    }
    reload(board, store);
    Ok(())
}

/// Move the selected ticket to another column, then reload. The selection
/// stays in the current column.
pub fn move_selected(
    board: &mut Board,
    store: &TicketStore,
    target_column: usize,
) -> Result<Ticket, BoardError> {
    let target = board
        .columns
        .get(target_column)
        .map(|c| c.config.dir.clone())
        .ok_or_else(|| BoardError::UnknownColumn(target_column.to_string()))?;
    let mut ticket = board.selected_ticket().cloned().ok_or(BoardError::NoSelection)?;

    if ticket.column == target {
        return Ok(ticket);
    }

    store.move_ticket(&mut ticket, &target)?;
    reload(board, store);
    Ok(ticket)
}

/// Delete the selected ticket, then reload.
pub fn delete_selected(board: &mut Board, store: &TicketStore) -> Result<Ticket, BoardError> {
    let ticket = board.selected_ticket().cloned().ok_or(BoardError::NoSelection)?;
    store.delete(&ticket)?;
    reload(board, store);
    Ok(ticket)
}

/// Parse a comma-separated tag list as typed by a user.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
