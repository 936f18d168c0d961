use serde::Serialize;

use crate::model::ticket::Ticket;
use crate::parse::ticket_serializer::format_timestamp;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TicketJson {
    pub title: String,
    pub tags: Vec<String>,
    pub created: String,
    pub updated: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_feedback: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub body: String,
}

#[derive(Serialize)]
pub struct ColumnJson {
    pub name: String,
    pub dir: String,
    pub tickets: Vec<TicketJson>,
}

pub fn ticket_to_json(ticket: &Ticket) -> TicketJson {
    TicketJson {
        title: ticket.title.clone(),
        tags: ticket.tags.clone(),
        created: format_timestamp(&ticket.created),
        updated: format_timestamp(&ticket.updated),
        path: ticket.path.display().to_string(),
        agent_feedback: ticket.agent_feedback.clone(),
        body: ticket.body.clone(),
    }
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

/// `  <file>  <title>  [tag, tag]`
pub fn format_ticket_line(ticket: &Ticket) -> String {
    let mut line = format!(
        "  {}  {}",
        ticket.file_name().unwrap_or_default(),
        ticket.title
    );
    if !ticket.tags.is_empty() {
        line.push_str(&format!("  [{}]", ticket.tags.join(", ")));
    }
    line
}
