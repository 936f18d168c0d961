use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::model::config::BoardConfig;
use crate::model::ticket::Ticket;
use crate::parse::template::{TemplateError, render_template};

/// Substitution data for one ticket's agent prompt. Paths are relative to
/// the project root (the directory holding the board directory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TicketPromptData {
    pub title: String,
    /// Tags joined with `", "`
    pub tags: String,
    pub content: String,
    pub ticket_path: String,
    /// Where the ticket goes while being worked on
    pub doing_path: String,
    /// Where the ticket goes when finished
    pub done_path: String,
}

/// Substitution data for the batch prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchPromptData {
    pub tickets: Vec<TicketPromptData>,
}

/// Build the prompt data for a ticket.
pub fn prompt_data(ticket: &Ticket, config: &BoardConfig) -> TicketPromptData {
    let root = project_root(config);
    let board = relative_to(&config.board_dir, root);
    let file_name = ticket.path.file_name().map(PathBuf::from).unwrap_or_default();
    let doing = config.doing_column().map_or("doing", |c| c.dir.as_str());
    let done = config.done_column().map_or("done", |c| c.dir.as_str());

    TicketPromptData {
        title: ticket.title.clone(),
        tags: ticket.tags.join(", "),
        content: ticket.body.clone(),
        ticket_path: relative_to(&ticket.path, root).display().to_string(),
        doing_path: board.join(doing).join(&file_name).display().to_string(),
        done_path: board.join(done).join(&file_name).display().to_string(),
    }
}

/// Build the batch data for `tickets`, in order.
pub fn batch_prompt_data(tickets: &[Ticket], config: &BoardConfig) -> BatchPromptData {
    BatchPromptData {
        tickets: tickets.iter().map(|t| prompt_data(t, config)).collect(),
    }
}

/// Render the configured single-ticket prompt.
pub fn render_ticket_prompt(ticket: &Ticket, config: &BoardConfig) -> Result<String, TemplateError> {
    render_template(&config.single_ticket_prompt, &prompt_data(ticket, config))
}

/// Render the configured batch prompt.
pub fn render_batch_prompt(tickets: &[Ticket], config: &BoardConfig) -> Result<String, TemplateError> {
    render_template(&config.batch_ticket_prompt, &batch_prompt_data(tickets, config))
}

fn project_root(config: &BoardConfig) -> &Path {
    config.board_dir.parent().unwrap_or(Path::new(""))
}

/// `path` without the `root` prefix, or unchanged when outside it.
fn relative_to<'a>(path: &'a Path, root: &Path) -> &'a Path {
    path.strip_prefix(root).unwrap_or(path)
}
