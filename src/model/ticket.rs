use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate, Utc};

/// File extension shared by every ticket file.
pub const TICKET_EXTENSION: &str = "md";

/// A single ticket, backed by one markdown file in a column directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Display title (non-empty for tickets created through the board)
    pub title: String,
    /// Ordered tags; duplicates are kept as written
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    /// Markdown body, without the metadata header
    pub body: String,
    /// Summary left by an agent when it finishes the ticket
    pub agent_feedback: Option<String>,
    /// Absolute path of the backing file. Empty until the ticket is placed.
    pub path: PathBuf,
    /// Directory name of the column the file lives in
    pub column: String,
}

impl Ticket {
    /// A fresh ticket stamped with the current time.
    pub fn new(title: &str, column: &str) -> Self {
        let now = Utc::now();
        Ticket {
            title: title.to_string(),
            tags: Vec::new(),
            created: now,
            updated: now,
            body: String::new(),
            agent_feedback: None,
            path: PathBuf::new(),
            column: column.to_string(),
        }
    }

    /// Whether the ticket has been assigned a backing file.
    pub fn has_path(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }

    /// Set the backing path and derive the column from its parent directory.
    pub fn set_path(&mut self, path: PathBuf) {
        self.column = column_of(&path);
        self.path = path;
    }

    /// Refresh the updated timestamp before an in-place rewrite.
    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }

    /// Filename for this ticket: creation date (local calendar) plus title slug.
    pub fn generate_filename(&self) -> String {
        crate::parse::ticket_filename(&self.title, filename_date(&self.created))
    }

    /// Filename component of the backing path, if any.
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name().and_then(|n| n.to_str())
    }

    /// Case-insensitive substring match on the title.
    pub fn title_matches(&self, query: &str) -> bool {
        self.title.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Column directory name for a ticket path (its parent directory's name).
pub fn column_of(path: &Path) -> String {
    path.parent()
        .and_then(|p| p.file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .to_string()
}

/// Whether a path carries the ticket file extension.
pub fn is_ticket_path(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some(TICKET_EXTENSION)
}

/// Calendar date used in filenames.
pub fn filename_date(ts: &DateTime<Utc>) -> NaiveDate {
    ts.with_timezone(&Local).date_naive()
}
