use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use crate::io::recovery::{RecoveryCategory, RecoveryEntry, log_recovery};
use crate::io::ticket_store::TicketStore;
use crate::io::watcher::{BoardWatcher, FileEvent, WatcherError, WatcherFeed};
use crate::model::board::Board;
use crate::model::config::BoardConfig;
use crate::model::ticket::Ticket;
use crate::ops::board_ops::{self, ReloadReport};
use crate::ops::prompt_ops;
use crate::parse::serialize_ticket;
use crate::util::clipboard::clipboard_set;
use crate::util::unicode::truncate_to_width;

use super::input;
use super::render;
use super::theme::Theme;

/// How long a status message stays visible
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Keyboard poll timeout; watcher feeds are drained between polls
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Current interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Navigate,
    /// Typing a filter query
    Filter,
    /// Choosing a target column for the selected ticket
    Move,
    /// Waiting for y/n before deleting the selected ticket
    ConfirmDelete,
    /// Full-screen view of one ticket
    Detail,
    /// Full-screen view of a ticket's agent feedback
    Feedback,
    /// Create/edit form (title, tags, content)
    Form,
    /// Key binding overlay
    Help,
}

/// Field with the cursor in the ticket form
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Tags,
    Content,
}

impl FormField {
    pub fn next(self) -> Self {
        match self {
            FormField::Title => FormField::Tags,
            FormField::Tags => FormField::Content,
            FormField::Content => FormField::Title,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormField::Title => FormField::Content,
            FormField::Tags => FormField::Title,
            FormField::Content => FormField::Tags,
        }
    }
}

/// Text of the ticket form while it is open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketForm {
    /// Ticket being edited; `None` when creating
    pub editing: Option<PathBuf>,
    pub title: String,
    /// Comma-separated
    pub tags: String,
    pub content: String,
    pub focus: FormField,
}

impl TicketForm {
    pub fn blank() -> Self {
        TicketForm {
            editing: None,
            title: String::new(),
            tags: String::new(),
            content: String::new(),
            focus: FormField::Title,
        }
    }

    pub fn for_ticket(ticket: &Ticket) -> Self {
        TicketForm {
            editing: Some(ticket.path.clone()),
            title: ticket.title.clone(),
            tags: ticket.tags.join(", "),
            content: ticket.body.clone(),
            focus: FormField::Title,
        }
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FormField::Title => &mut self.title,
            FormField::Tags => &mut self.tags,
            FormField::Content => &mut self.content,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

/// Main application state
pub struct App {
    pub board: Board,
    pub store: TicketStore,
    pub config: BoardConfig,
    pub theme: Theme,
    pub mode: Mode,
    pub should_quit: bool,
    /// Text typed in the filter prompt
    pub input: String,
    /// Open create/edit form
    pub form: Option<TicketForm>,
    /// Ticket shown in the detail and feedback views
    pub viewing: Option<PathBuf>,
    /// Target column index in move mode
    pub move_target: usize,
    pub status: Option<StatusMessage>,
    /// Ticket file to open in the editor on the next loop iteration
    pub edit_request: Option<PathBuf>,
    /// Skipped files already written to the recovery log this session
    reported_skips: HashSet<PathBuf>,
    /// Puts prompt text on the clipboard
    pub clipboard: fn(&str) -> io::Result<()>,
}

impl App {
    pub fn new(config: BoardConfig) -> Self {
        App {
            board: Board::new(&config.columns),
            store: TicketStore::new(&config.board_dir),
            theme: Theme::from_columns(&config.columns),
            config,
            mode: Mode::Navigate,
            should_quit: false,
            input: String::new(),
            form: None,
            viewing: None,
            move_target: 0,
            status: None,
            edit_request: None,
            reported_skips: HashSet::new(),
            clipboard: clipboard_set,
        }
    }

    pub fn board_dir(&self) -> &Path {
        self.store.board_dir()
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    /// Drop the status message once it has been shown long enough.
    pub fn expire_status(&mut self, now: Instant) {
        if self
            .status
            .as_ref()
            .is_some_and(|s| now.duration_since(s.shown_at) >= STATUS_TTL)
        {
            self.status = None;
        }
    }

    /// Reload every column and report anything that could not be loaded.
    pub fn reload(&mut self) {
        let report = board_ops::reload(&mut self.board, &self.store);
        self.apply_report(report);
    }

    fn apply_report(&mut self, report: ReloadReport) {
        for skipped in report.skipped {
            if self.reported_skips.insert(skipped.path.clone()) {
                log_recovery(
                    self.store.board_dir(),
                    RecoveryEntry::new(RecoveryCategory::Parser, "ticket skipped")
                        .field("path", skipped.path.display())
                        .field("error", &skipped.error),
                );
                self.set_error(format!("skipped {}", file_label(&skipped.path)));
            }
        }
        if let Some(failure) = report.failed_columns.first() {
            self.set_error(format!("{}: {}", failure.column, failure.error));
        }
    }

    /// The ticket shown in the detail view, if it is still on the board.
    pub fn viewed_ticket(&self) -> Option<&Ticket> {
        self.viewing.as_deref().and_then(|p| self.board.find_ticket(p))
    }

    pub fn open_detail(&mut self) {
        match self.board.selected_ticket() {
            Some(ticket) => {
                self.viewing = Some(ticket.path.clone());
                self.mode = Mode::Detail;
            }
            None => self.set_error("no ticket selected"),
        }
    }

    /// Show the viewed ticket's agent feedback full screen.
    pub fn open_feedback(&mut self) {
        let has_feedback = self
            .viewed_ticket()
            .and_then(|t| t.agent_feedback.as_deref())
            .is_some_and(|f| !f.trim().is_empty());
        if has_feedback {
            self.mode = Mode::Feedback;
        } else {
            self.set_error("no agent feedback");
        }
    }

    pub fn close_detail(&mut self) {
        self.viewing = None;
        self.mode = Mode::Navigate;
    }

    pub fn open_new_form(&mut self) {
        self.form = Some(TicketForm::blank());
        self.mode = Mode::Form;
    }

    /// Open the form on the viewed ticket, or the selected one.
    pub fn open_edit_form(&mut self) {
        let ticket = self.viewed_ticket().or_else(|| self.board.selected_ticket());
        match ticket.map(TicketForm::for_ticket) {
            Some(form) => {
                self.form = Some(form);
                self.mode = Mode::Form;
            }
            None => self.set_error("no ticket selected"),
        }
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.viewing = None;
        self.mode = Mode::Navigate;
    }

    /// Save the form: create a ticket in the active column, or rewrite the
    /// edited one. The form stays open when saving fails.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };
        if form.title.trim().is_empty() {
            self.set_error("title cannot be empty");
            return;
        }
        let tags = board_ops::parse_tags(&form.tags);

        let result = match &form.editing {
            None => board_ops::create_ticket(
                &mut self.board,
                &self.store,
                &form.title,
                &tags,
                &form.content,
            )
            .map(|t| (t, "created")),
            Some(path) => {
                let Some(mut ticket) = self.board.find_ticket(path).cloned() else {
                    self.set_error(format!("{} is no longer on the board", file_label(path)));
                    return;
                };
                ticket.title = form.title.trim().to_string();
                ticket.tags = tags.clone();
                ticket.body = form.content.trim().to_string();
                board_ops::save_ticket(&mut self.board, &self.store, &mut ticket)
                    .map(|()| (ticket, "updated"))
            }
        };

        match result {
            Ok((ticket, verb)) => {
                self.form = None;
                self.viewing = None;
                self.mode = Mode::Navigate;
                self.select_path(&ticket.path);
                self.set_status(format!("{} {}", verb, file_label(&ticket.path)));
            }
            Err(e) => {
                let column = self
                    .board
                    .active_column_config()
                    .map(|c| c.dir.clone())
                    .unwrap_or_default();
                let mut draft = Ticket::new(form.title.trim(), &column);
                draft.tags = tags;
                draft.body = form.content.trim().to_string();
                let description = if form.editing.is_some() {
                    "save failed"
                } else {
                    "create failed"
                };
                let path = form
                    .editing
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                log_recovery(
                    self.store.board_dir(),
                    RecoveryEntry::new(RecoveryCategory::Write, description)
                        .field("column", &column)
                        .field("path", path)
                        .field("error", &e)
                        .body(recovery_text(&draft)),
                );
                self.set_error(e.to_string());
            }
        }
    }

    /// Copy the agent prompt for the viewed or selected ticket.
    pub fn copy_ticket_prompt(&mut self) {
        let Some(ticket) = self
            .viewed_ticket()
            .or_else(|| self.board.selected_ticket())
            .cloned()
        else {
            self.set_error("no ticket selected");
            return;
        };
        match prompt_ops::render_ticket_prompt(&ticket, &self.config) {
            Ok(text) => {
                let done = format!("copied prompt for {}", truncate_to_width(&ticket.title, 30));
                self.copy(&text, done);
            }
            Err(e) => self.set_error(format!("prompt template: {}", e)),
        }
    }

    /// Copy the batch prompt for every ticket in the first column.
    pub fn copy_batch_prompt(&mut self) {
        let tickets = match self.board.columns.first() {
            Some(column) => column.tickets.clone(),
            None => Vec::new(),
        };
        if tickets.is_empty() {
            self.set_error("no tickets in the first column");
            return;
        }
        match prompt_ops::render_batch_prompt(&tickets, &self.config) {
            Ok(text) => {
                let done = format!("copied prompt for {} ticket(s)", tickets.len());
                self.copy(&text, done);
            }
            Err(e) => self.set_error(format!("prompt template: {}", e)),
        }
    }

    fn copy(&mut self, text: &str, done: String) {
        match (self.clipboard)(text) {
            Ok(()) => self.set_status(done),
            Err(e) => self.set_error(format!("clipboard: {}", e)),
        }
    }

    /// Move the selected ticket to the column chosen in move mode.
    pub fn move_to_target(&mut self) {
        let Some(ticket) = self.board.selected_ticket().cloned() else {
            self.set_error("no ticket selected");
            return;
        };
        let target = self.move_target;
        match board_ops::move_selected(&mut self.board, &self.store, target) {
            Ok(moved) => {
                let name = self
                    .board
                    .columns
                    .get(target)
                    .map(|c| c.config.name.clone())
                    .unwrap_or_default();
                self.set_status(format!("moved {} to {}", file_label(&moved.path), name));
            }
            Err(e) => {
                log_recovery(
                    self.store.board_dir(),
                    RecoveryEntry::new(RecoveryCategory::Move, "move failed")
                        .field("path", ticket.path.display())
                        .field("error", &e)
                        .body(recovery_text(&ticket)),
                );
                self.set_error(e.to_string());
            }
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(ticket) = self.board.selected_ticket().cloned() else {
            self.set_error("no ticket selected");
            return;
        };
        match board_ops::delete_selected(&mut self.board, &self.store) {
            Ok(deleted) => self.set_status(format!("deleted {}", file_label(&deleted.path))),
            Err(e) => {
                log_recovery(
                    self.store.board_dir(),
                    RecoveryEntry::new(RecoveryCategory::Delete, "delete failed")
                        .field("path", ticket.path.display())
                        .field("error", &e)
                        .body(recovery_text(&ticket)),
                );
                self.set_error(e.to_string());
            }
        }
    }

    /// React to one drain of the watcher feed: any change reloads once,
    /// runtime errors are logged and shown.
    pub fn handle_watch_feed(&mut self, events: Vec<FileEvent>, errors: Vec<WatcherError>) {
        if !events.is_empty() {
            self.reload();
        }
        for error in errors {
            log_recovery(
                self.store.board_dir(),
                RecoveryEntry::new(RecoveryCategory::Watcher, "watcher error")
                    .field("error", &error),
            );
            self.set_error(format!("watcher: {}", error));
        }
    }

    /// Put the selection on the ticket at `path` if it is visible.
    fn select_path(&mut self, path: &Path) {
        for (col, _) in self.board.columns.iter().enumerate() {
            let found = self
                .board
                .visible_tickets(col)
                .iter()
                .position(|t| t.path == path);
            if let Some(idx) = found {
                self.board.select(col, idx);
                return;
            }
        }
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// File text for a recovery entry; the bare body if the header will not serialize.
fn recovery_text(ticket: &Ticket) -> String {
    serialize_ticket(ticket).unwrap_or_else(|_| ticket.body.clone())
}

/// Run the board until the user quits.
///
/// The watcher covers every column directory; failing to watch one is fatal.
pub fn run(config: BoardConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(config);

    let (mut watcher, feed) = BoardWatcher::start(app.config.debounce())?;
    for column in &app.config.columns {
        watcher.watch(&app.config.column_path(&column.dir))?;
    }

    app.reload();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let result = run_event_loop(&mut terminal, &mut app, &feed);

    watcher.close();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    feed: &WatcherFeed,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| render::render(frame, app))?;

        if event::poll(POLL_INTERVAL)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            input::handle_key(app, key);
        }

        if let Some(path) = app.edit_request.take() {
            open_in_editor(terminal, app, &path)?;
        }

        app.handle_watch_feed(feed.drain_events(), feed.drain_errors());
        app.expire_status(Instant::now());

        if app.should_quit {
            break;
        }
    }
    Ok(())
}

/// Hand the terminal to the editor, then take it back and reload.
fn open_in_editor(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    path: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    let status = editor_command(&app.config.editor_command(), path).status();

    enable_raw_mode()?;
    execute!(terminal.backend_mut(), EnterAlternateScreen)?;
    terminal.clear()?;

    match status {
        Ok(s) if s.success() => {}
        Ok(s) => app.set_error(format!("editor exited with {}", s)),
        Err(e) => app.set_error(format!("could not start editor: {}", e)),
    }
    app.reload();
    Ok(())
}

/// Build the editor invocation. The configured command may carry arguments
/// (`code --wait`); the ticket path is appended last.
pub fn editor_command(editor: &str, path: &Path) -> Command {
    let mut parts = editor.split_whitespace();
    let program = parts.next().unwrap_or("vi");
    let mut cmd = Command::new(program);
    cmd.args(parts).arg(path);
    cmd
}
