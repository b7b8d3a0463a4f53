// src/date.rs
//! Feed timestamp normalization: feed-native date strings → UTC instants.

use chrono::{DateTime, NaiveDateTime, Utc};

/// RFC-2822 without a zone, as emitted by some feed generators.
const RFC2822_NO_ZONE: &str = "%a, %d %b %Y %H:%M:%S";

/// Parse a feed-native timestamp. Absent, empty, or unparseable input yields
/// `None`; a missing zone is read as UTC. Pure, no side effects.
pub fn normalize(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, RFC2822_NO_ZONE)
        .ok()
        .map(|naive| naive.and_utc())
}
