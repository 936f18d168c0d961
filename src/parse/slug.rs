use chrono::NaiveDate;

use crate::model::ticket::TICKET_EXTENSION;

/// Longest slug kept in a filename.
pub const MAX_SLUG_LEN: usize = 50;

/// Slug used when a title has no usable characters.
pub const FALLBACK_SLUG: &str = "untitled";

/// `YYYY-MM-DD-<slug>.md`
pub fn ticket_filename(title: &str, date: NaiveDate) -> String {
    format!(
        "{}-{}.{}",
        date.format("%Y-%m-%d"),
        slugify(title),
        TICKET_EXTENSION
    )
}

/// Lower-case, hyphen-separated, `[a-z0-9-]` only.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.to_lowercase().chars() {
        let c = if c == ' ' { '-' } else { c };
        if !(c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-') {
            continue;
        }
        // Collapse runs of hyphens as we go
        if c == '-' && slug.ends_with('-') {
            continue;
        }
        slug.push(c);
    }

    let mut slug = slug.trim_matches('-').to_string();
    if slug.len() > MAX_SLUG_LEN {
        // ASCII only, so byte truncation is safe
        slug.truncate(MAX_SLUG_LEN);
        slug = slug.trim_end_matches('-').to_string();
    }

    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}
