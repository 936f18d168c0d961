use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::io::recovery::atomic_write;
use crate::model::ticket::{Ticket, is_ticket_path};
use crate::parse::{ParseError, parse_ticket, serialize_ticket};

/// Error type for ticket file operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("ticket has no file path")]
    NoPath,
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not list {path}: {source}")]
    List {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not move {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
    #[error("could not delete {path}: {source}")]
    Delete {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse { path: PathBuf, source: ParseError },
    #[error("could not serialize {path}: {source}")]
    Serialize {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// A ticket file that was left out of a listing.
#[derive(Debug)]
pub struct SkippedTicket {
    pub path: PathBuf,
    pub error: StoreError,
}

/// Result of scanning one column directory.
#[derive(Debug, Default)]
pub struct ColumnScan {
    /// Parsed tickets, most recently updated first
    pub tickets: Vec<Ticket>,
    /// Files that could not be read or parsed
    pub skipped: Vec<SkippedTicket>,
}

/// Reads and writes ticket files beneath a board directory.
#[derive(Debug, Clone)]
pub struct TicketStore {
    board_dir: PathBuf,
}

impl TicketStore {
    pub fn new(board_dir: impl Into<PathBuf>) -> Self {
        TicketStore {
            board_dir: board_dir.into(),
        }
    }

    pub fn board_dir(&self) -> &Path {
        &self.board_dir
    }

    /// Full path of a column directory.
    pub fn column_path(&self, column_dir: &str) -> PathBuf {
        self.board_dir.join(column_dir)
    }

    /// Path a new ticket would be written to in `column_dir`.
    pub fn new_ticket_path(&self, column_dir: &str, ticket: &Ticket) -> PathBuf {
        self.column_path(column_dir).join(ticket.generate_filename())
    }

    /// Tickets in a column, most recently updated first. Unparseable files
    /// are dropped; use `scan` to see which.
    pub fn list(&self, column_dir: &str) -> Result<Vec<Ticket>, StoreError> {
        self.scan(column_dir).map(|scan| scan.tickets)
    }

    /// Read every ticket file directly inside a column directory.
    ///
    /// A missing directory is an empty column. Each file is parsed on its own;
    /// a bad file is reported in `skipped` and never stops the rest loading.
    pub fn scan(&self, column_dir: &str) -> Result<ColumnScan, StoreError> {
        let dir = self.column_path(column_dir);
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ColumnScan::default()),
            Err(e) => {
                return Err(StoreError::List {
                    path: dir,
                    source: e,
                });
            }
        };

        let mut scan = ColumnScan::default();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::List {
                path: dir.clone(),
                source: e,
            })?;
            let path = entry.path();

            // Regular files only (symlinks to files are followed)
            if !path.is_file() || !is_ticket_path(&path) {
                continue;
            }

            match read_ticket(&path) {
                Ok(ticket) => scan.tickets.push(ticket),
                // Deleted between listing and reading
                Err(StoreError::Read { ref source, .. }) if source.kind() == ErrorKind::NotFound => {}
                Err(error) => scan.skipped.push(SkippedTicket { path, error }),
            }
        }

        sort_tickets(&mut scan.tickets);
        Ok(scan)
    }

    /// Write a ticket to its path, creating the column directory if needed.
    /// Readers never observe a half-written file.
    pub fn write(&self, ticket: &Ticket) -> Result<(), StoreError> {
        if !ticket.has_path() {
            return Err(StoreError::NoPath);
        }
        if let Some(dir) = ticket.path.parent() {
            create_dir(dir)?;
        }
        let text = serialize_ticket(ticket).map_err(|e| StoreError::Serialize {
            path: ticket.path.clone(),
            source: e,
        })?;
        atomic_write(&ticket.path, text.as_bytes()).map_err(|e| StoreError::Write {
            path: ticket.path.clone(),
            source: e,
        })
    }

    /// Move a ticket file into another column by renaming it.
    ///
    /// On success the ticket's path and column point at the new location. On
    /// failure the ticket is unchanged; a created target directory is left in
    /// place.
    pub fn move_ticket(&self, ticket: &mut Ticket, target_column: &str) -> Result<(), StoreError> {
        if !ticket.has_path() {
            return Err(StoreError::NoPath);
        }
        let target_dir = self.column_path(target_column);
        create_dir(&target_dir)?;

        let file_name = ticket.path.file_name().ok_or(StoreError::NoPath)?;
        let new_path = target_dir.join(file_name);
        fs::rename(&ticket.path, &new_path).map_err(|e| StoreError::Rename {
            from: ticket.path.clone(),
            to: new_path.clone(),
            source: e,
        })?;

        ticket.set_path(new_path);
        Ok(())
    }

    /// Remove a ticket file. A file that is already gone is an error.
    pub fn delete(&self, ticket: &Ticket) -> Result<(), StoreError> {
        if !ticket.has_path() {
            return Err(StoreError::NoPath);
        }
        fs::remove_file(&ticket.path).map_err(|e| StoreError::Delete {
            path: ticket.path.clone(),
            source: e,
        })
    }

    /// Find a ticket file by path, accepting paths relative to the board
    /// directory as well as absolute or cwd-relative ones.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() || path.exists() {
            return path.to_path_buf();
        }
        self.board_dir.join(path)
    }
}

/// Read and parse one ticket file, filling in its path and column.
///
/// A header without a title falls back to the filename stem so the ticket
/// still has something to display.
pub fn read_ticket(path: &Path) -> Result<Ticket, StoreError> {
    let text = fs::read_to_string(path).map_err(|e| StoreError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut ticket = parse_ticket(&text).map_err(|e| StoreError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    if ticket.title.trim().is_empty() {
        ticket.title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
    }
    ticket.set_path(path.to_path_buf());
    Ok(ticket)
}

/// Newest `updated` first; equal timestamps fall back to path order so
/// repeated scans of the same files always agree.
pub fn sort_tickets(tickets: &mut [Ticket]) {
    tickets.sort_by(|a, b| b.updated.cmp(&a.updated).then_with(|| a.path.cmp(&b.path)));
}

fn create_dir(dir: &Path) -> Result<(), StoreError> {
    fs::create_dir_all(dir).map_err(|e| StoreError::CreateDir {
        path: dir.to_path_buf(),
        source: e,
    })
}
