use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::model::ticket::Ticket;

use super::ticket_parser::HEADER_DELIMITER;

/// Header fields in the order they are written.
#[derive(Serialize)]
struct HeaderOut<'a> {
    title: &'a str,
    tags: &'a [String],
    created: String,
    updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    agent_feedback: Option<&'a str>,
}

/// Serialize a ticket to its on-disk form.
///
/// Header fields are always written in the same order so that rewriting an
/// unchanged ticket produces identical bytes.
pub fn serialize_ticket(ticket: &Ticket) -> Result<String, serde_yaml::Error> {
    let header = HeaderOut {
        title: &ticket.title,
        tags: &ticket.tags,
        created: format_timestamp(&ticket.created),
        updated: format_timestamp(&ticket.updated),
        agent_feedback: ticket.agent_feedback.as_deref(),
    };

    let mut out = String::new();
    out.push_str(HEADER_DELIMITER);
    out.push('\n');
    out.push_str(&serde_yaml::to_string(&header)?);
    out.push_str(HEADER_DELIMITER);
    out.push_str("\n\n");

    let body = ticket.body.trim();
    if !body.is_empty() {
        out.push_str(body);
        out.push('\n');
    }

    Ok(out)
}

/// RFC 3339 in UTC, with only as many fractional digits as needed.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_ticket;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample() -> Ticket {
        let mut t = Ticket::new("Fix login bug", "todo");
        t.created = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        t.updated = Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap();
        t
    }

    fn ser(t: &Ticket) -> String {
        serialize_ticket(t).unwrap()
    }

    #[test]
    fn canonical_layout() {
        let mut t = sample();
        t.tags = vec!["bug".into(), "auth".into()];
        t.body = "\n  Steps to reproduce.\n\n".into();
        let out = ser(&t);
        assert!(out.starts_with("---\ntitle: Fix login bug\ntags:\n"));
        assert!(out.contains("- bug\n- auth\n"));
        assert!(out.contains(
            "created: 2025-06-01T10:00:00Z\nupdated: 2025-06-01T10:00:00Z\n---\n\nSteps to reproduce.\n"
        ));
        assert!(out.ends_with("---\n\nSteps to reproduce.\n"));
    }

    #[test]
    fn empty_body_and_tags() {
        let out = ser(&sample());
        assert!(out.ends_with("---\n\n"));
        assert!(out.contains("tags: []\n"));
        assert!(!out.contains("agent_feedback"));
    }

    #[test]
    fn feedback_is_written_last() {
        let mut t = sample();
        t.agent_feedback = Some("Done: added retry".into());
        let out = ser(&t);
        let fb = out.find("agent_feedback:").unwrap();
        assert!(fb > out.find("updated:").unwrap());
    }

    #[test]
    fn special_characters_survive_round_trip() {
        let mut t = sample();
        t.title = "Quote \"this\" \\ and: #hash - [x]".into();
        t.tags = vec!["a,b".into(), "with space".into(), "a,b".into(), "true".into(), "42".into()];
        t.agent_feedback = Some("line one\nline two\ttabbed".into());
        t.created = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_789);
        let parsed = parse_ticket(&ser(&t)).unwrap();
        assert_eq!(parsed.title, t.title);
        assert_eq!(parsed.tags, t.tags);
        assert_eq!(parsed.agent_feedback, t.agent_feedback);
        assert_eq!(parsed.created, t.created);
        assert_eq!(parsed.updated, t.updated);
    }

    #[test]
    fn unicode_line_breaks_and_bom_survive_round_trip() {
        let mut t = sample();
        t.title = "next\u{85}line sep\u{2028}para\u{2029}bom\u{FEFF}end".into();
        t.tags = vec![
            "\u{85}".into(),
            "a\u{2028}b".into(),
            "c\u{2029}d".into(),
            "\u{FEFF}tag".into(),
        ];
        let parsed = parse_ticket(&ser(&t)).unwrap();
        assert_eq!(parsed.title, t.title);
        assert_eq!(parsed.tags, t.tags);
    }

    #[test]
    fn feedback_with_delimiter_line_stays_in_header() {
        let mut t = sample();
        t.agent_feedback = Some("summary\n---\nmore".into());
        t.body = "body text".into();
        let parsed = parse_ticket(&ser(&t)).unwrap();
        assert_eq!(parsed.agent_feedback, t.agent_feedback);
        assert_eq!(parsed.body, "body text");
    }

    #[test]
    fn serializing_twice_is_stable() {
        let mut t = sample();
        t.body = "hello".into();
        t.agent_feedback = Some("multi\nline".into());
        let once = ser(&t);
        let again = ser(&parse_ticket(&once).unwrap());
        assert_eq!(once, again);
    }
}
