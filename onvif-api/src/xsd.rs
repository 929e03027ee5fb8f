//! Conversions between Rust time types and their XML Schema lexical forms

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use std::time::Duration;

/// Format a duration as an `xs:duration`, e.g. `PT1H`, `PT1M30S`, `PT0.5S`
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let millis = duration.subsec_millis();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut out = String::from("PT");
    if hours > 0 {
        out.push_str(&format!("{}H", hours));
    }
    if minutes > 0 {
        out.push_str(&format!("{}M", minutes));
    }
    if millis > 0 {
        let fraction = format!("{:03}", millis);
        out.push_str(&format!("{}.{}S", seconds, fraction.trim_end_matches('0')));
    } else if seconds > 0 || out.len() == 2 {
        out.push_str(&format!("{}S", seconds));
    }
    out
}

/// Parse an `xs:dateTime`, assuming UTC when the device omits the offset
pub fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Read an `xs:boolean`, which may be `true`/`false` or `1`/`0`
///
/// Anything else reads as false.
pub fn parse_boolean(text: &str) -> bool {
    matches!(text.trim(), "true" | "1")
}

/// Render a timestamp as ISO-8601 with millisecond precision and a `Z` suffix
pub fn format_datetime(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
