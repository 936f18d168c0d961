use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::model::ticket::Ticket;

/// Line that opens and closes the metadata header.
pub const HEADER_DELIMITER: &str = "---";

/// `0001-01-01T00:00:00Z`, written by tools that emit an unset timestamp.
const ZERO_TIME_SECS: i64 = -62_135_596_800;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("malformed ticket metadata: {0}")]
    MalformedMetadata(#[from] serde_yaml::Error),
}

/// Header fields as written on disk. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
struct Header {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    created: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    updated: Option<DateTime<Utc>>,
    #[serde(default)]
    agent_feedback: Option<String>,
}

/// Parse a ticket file's text. The returned ticket has no path or column;
/// the store fills those in from the file's location.
pub fn parse_ticket(text: &str) -> Result<Ticket, ParseError> {
    let (header_text, body) = split_header(text);

    let header = match header_text {
        Some(h) if !h.trim().is_empty() => serde_yaml::from_str::<Option<Header>>(&h)?
            .unwrap_or_default(),
        _ => Header::default(),
    };

    // A file without `created` is stamped with the parse time, on every parse.
    let created = header
        .created
        .filter(|ts| !is_unset(ts))
        .unwrap_or_else(Utc::now);
    let updated = header
        .updated
        .filter(|ts| !is_unset(ts))
        .unwrap_or(created);

    let mut ticket = Ticket::new(&header.title.unwrap_or_default(), "");
    ticket.tags = header.tags.unwrap_or_default();
    ticket.created = created;
    ticket.updated = updated;
    ticket.body = body.trim().to_string();
    ticket.agent_feedback = header.agent_feedback;
    Ok(ticket)
}

/// Split text into (header, body).
///
/// The header is everything between the first and second delimiter lines.
/// Lines before the first delimiter and after the second belong to the body.
/// With no delimiter at all the whole text is body.
pub fn split_header(text: &str) -> (Option<String>, String) {
    enum State {
        Before,
        Header,
        After,
    }

    let mut state = State::Before;
    let mut header: Option<Vec<&str>> = None;
    let mut body = Vec::new();

    for line in text.lines() {
        match state {
            State::Before if line.trim_end() == HEADER_DELIMITER => {
                header = Some(Vec::new());
                state = State::Header;
            }
            State::Header if line.trim_end() == HEADER_DELIMITER => {
                state = State::After;
            }
            State::Header => {
                if let Some(h) = header.as_mut() {
                    h.push(line);
                }
            }
            State::Before | State::After => body.push(line),
        }
    }

    (header.map(|h| h.join("\n")), body.join("\n"))
}

fn is_unset(ts: &DateTime<Utc>) -> bool {
    ts.timestamp() <= ZERO_TIME_SECS
}

/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS` (taken as UTC), or a bare date.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", s))),
    }
}
