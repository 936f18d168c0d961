use super::config::ColumnConfig;
use super::ticket::Ticket;

/// One column of the board and its tickets, newest first.
#[derive(Debug, Clone)]
pub struct ColumnState {
    pub config: ColumnConfig,
    pub tickets: Vec<Ticket>,
}

/// Direction for keyboard selection moves
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// In-memory board: columns, selection and the active filter.
///
/// The board never touches the filesystem; `ops::board_ops` refills it from the
/// ticket store. Selection indices address the *visible* (filtered) sequence of
/// the active column and are kept within bounds after every change.
#[derive(Debug, Clone)]
pub struct Board {
    pub columns: Vec<ColumnState>,
    active_column: usize,
    active_ticket: usize,
    filter: Option<String>,
}

impl Board {
    pub fn new(columns: &[ColumnConfig]) -> Self {
        Board {
            columns: columns
                .iter()
                .map(|c| ColumnState {
                    config: c.clone(),
                    tickets: Vec::new(),
                })
                .collect(),
            active_column: 0,
            active_ticket: 0,
            filter: None,
        }
    }

    pub fn active_column(&self) -> usize {
        self.active_column
    }

    pub fn active_ticket(&self) -> usize {
        self.active_ticket
    }

    pub fn filter(&self) -> Option<&str> {
        self.filter.as_deref()
    }

    /// Tickets of a column that pass the current filter, in stored order.
    pub fn visible_tickets(&self, column: usize) -> Vec<&Ticket> {
        let Some(col) = self.columns.get(column) else {
            return Vec::new();
        };
        match self.filter.as_deref() {
            Some(query) => col
                .tickets
                .iter()
                .filter(|t| t.title_matches(query))
                .collect(),
            None => col.tickets.iter().collect(),
        }
    }

    pub fn visible_count(&self, column: usize) -> usize {
        self.visible_tickets(column).len()
    }

    /// The highlighted ticket, if the active column has any visible tickets.
    pub fn selected_ticket(&self) -> Option<&Ticket> {
        self.visible_tickets(self.active_column)
            .get(self.active_ticket)
            .copied()
    }

    /// Column config of the active column.
    pub fn active_column_config(&self) -> Option<&ColumnConfig> {
        self.columns.get(self.active_column).map(|c| &c.config)
    }

    /// Select a ticket by position; both indices are clamped.
    pub fn select(&mut self, column: usize, ticket: usize) {
        self.active_column = column.min(self.columns.len().saturating_sub(1));
        let count = self.visible_count(self.active_column);
        self.active_ticket = ticket.min(count.saturating_sub(1));
    }

    /// Move the selection one step. Changing column starts at its first ticket.
    pub fn move_selection(&mut self, direction: Direction) {
        match direction {
            Direction::Up => {
                self.active_ticket = self.active_ticket.saturating_sub(1);
            }
            Direction::Down => {
                if self.active_ticket + 1 < self.visible_count(self.active_column) {
                    self.active_ticket += 1;
                }
            }
            Direction::Left => {
                if self.active_column > 0 {
                    self.active_column -= 1;
                    self.active_ticket = 0;
                }
            }
            Direction::Right => {
                if self.active_column + 1 < self.columns.len() {
                    self.active_column += 1;
                    self.active_ticket = 0;
                }
            }
        }
    }

    /// Set the title filter. An empty (or all-whitespace) query clears it.
    /// The selection restarts at the first visible ticket.
    pub fn set_filter(&mut self, query: &str) {
        let query = query.trim();
        self.filter = if query.is_empty() {
            None
        } else {
            Some(query.to_string())
        };
        self.active_ticket = 0;
    }

    pub fn clear_filter(&mut self) {
        self.set_filter("");
    }

    /// Replace one column's tickets wholesale. Does not clamp; call
    /// `clamp_selection` once all columns are refreshed.
    pub fn replace_tickets(&mut self, column: usize, tickets: Vec<Ticket>) {
        if let Some(col) = self.columns.get_mut(column) {
            col.tickets = tickets;
        }
    }

    /// Pull the selection back inside the visible range.
    ///
    /// An index past the end steps back by one rather than jumping to the top,
    /// then is capped at the last visible ticket if several disappeared.
    pub fn clamp_selection(&mut self) {
        if self.active_column >= self.columns.len() {
            self.active_column = self.columns.len().saturating_sub(1);
        }
        let count = self.visible_count(self.active_column);
        if self.active_ticket >= count {
            self.active_ticket = self
                .active_ticket
                .saturating_sub(1)
                .min(count.saturating_sub(1));
        }
    }

    /// The ticket stored at `path`, in any column (ignores the filter).
    pub fn find_ticket(&self, path: &std::path::Path) -> Option<&Ticket> {
        self.columns
            .iter()
            .flat_map(|c| c.tickets.iter())
            .find(|t| t.path == path)
    }

    /// Total tickets stored across all columns (ignores the filter).
    pub fn ticket_count(&self) -> usize {
        self.columns.iter().map(|c| c.tickets.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::default_columns;

    fn ticket(title: &str) -> Ticket {
        Ticket::new(title, "todo")
    }

    fn board_with(todo: &[&str]) -> Board {
        let mut board = Board::new(&default_columns());
        board.replace_tickets(0, todo.iter().map(|t| ticket(t)).collect());
        board
    }

    #[test]
    fn move_selection_within_column() {
        let mut board = board_with(&["a", "b", "c"]);
        board.move_selection(Direction::Down);
        board.move_selection(Direction::Down);
        board.move_selection(Direction::Down);
        assert_eq!(board.active_ticket(), 2);
        board.move_selection(Direction::Up);
        assert_eq!(board.active_ticket(), 1);
    }

    #[test]
    fn changing_column_resets_ticket() {
        let mut board = board_with(&["a", "b"]);
        board.select(0, 1);
        board.move_selection(Direction::Right);
        assert_eq!(board.active_column(), 1);
        assert_eq!(board.active_ticket(), 0);
        board.move_selection(Direction::Right);
        board.move_selection(Direction::Right);
        assert_eq!(board.active_column(), 2);
        board.move_selection(Direction::Left);
        assert_eq!(board.active_column(), 1);
    }

    #[test]
    fn clamp_steps_back_one_after_removal() {
        let mut board = board_with(&["a", "b", "c"]);
        board.select(0, 2);
        board.replace_tickets(0, vec![ticket("a"), ticket("b")]);
        board.clamp_selection();
        assert_eq!(board.active_ticket(), 1);
    }

    #[test]
    fn find_ticket_by_path_ignores_filter() {
        let mut board = board_with(&["a", "b"]);
        board.columns[0].tickets[1].set_path("/b/todo/b.md".into());
        board.set_filter("a");
        let found = board.find_ticket(std::path::Path::new("/b/todo/b.md")).unwrap();
        assert_eq!(found.title, "b");
        assert!(board.find_ticket(std::path::Path::new("/b/todo/zzz.md")).is_none());
    }

    #[test]
    fn clamp_keeps_valid_index() {
        let mut board = board_with(&["a", "b", "c"]);
        board.select(0, 1);
        board.replace_tickets(0, vec![ticket("a"), ticket("c")]);
        board.clamp_selection();
        assert_eq!(board.active_ticket(), 1);
    }

    #[test]
    fn clamp_caps_when_many_removed() {
        let mut board = board_with(&["a", "b", "c", "d"]);
        board.select(0, 3);
        board.replace_tickets(0, vec![ticket("a")]);
        board.clamp_selection();
        assert_eq!(board.active_ticket(), 0);
    }

    #[test]
    fn clamp_on_empty_column_is_zero() {
        let mut board = board_with(&["a"]);
        board.replace_tickets(0, Vec::new());
        board.clamp_selection();
        assert_eq!(board.active_ticket(), 0);
        assert!(board.selected_ticket().is_none());
    }

    #[test]
    fn filter_is_case_insensitive_and_non_destructive() {
        let mut board = board_with(&["Fix login", "Write docs", "LOGIN page"]);
        board.set_filter("login");
        let titles: Vec<&str> = board
            .visible_tickets(0)
            .iter()
            .map(|t| t.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Fix login", "LOGIN page"]);
        assert_eq!(board.columns[0].tickets.len(), 3);

        board.clear_filter();
        assert_eq!(board.visible_count(0), 3);
        assert_eq!(board.filter(), None);
    }

    #[test]
    fn filter_resets_selection_and_is_idempotent() {
        let mut board = board_with(&["a1", "b", "a2"]);
        board.select(0, 2);
        board.set_filter("a");
        assert_eq!(board.active_ticket(), 0);
        let first: Vec<String> = board.visible_tickets(0).iter().map(|t| t.title.clone()).collect();
        board.set_filter("a");
        let second: Vec<String> = board.visible_tickets(0).iter().map(|t| t.title.clone()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn whitespace_filter_clears() {
        let mut board = board_with(&["a"]);
        board.set_filter("   ");
        assert_eq!(board.filter(), None);
    }

    #[test]
    fn select_clamps_out_of_range() {
        let mut board = board_with(&["a", "b"]);
        board.select(10, 10);
        assert_eq!(board.active_column(), 2);
        assert_eq!(board.active_ticket(), 0);
        board.select(0, 10);
        assert_eq!(board.active_ticket(), 1);
        assert_eq!(board.selected_ticket().map(|t| t.title.as_str()), Some("b"));
    }
}
