//! Shared utility functions

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

/// Parse a datetime string (RFC3339 format) or return current time
///
/// Used when decoding rows; a malformed timestamp column falls back to now
/// rather than failing the whole read.
pub fn parse_datetime_or_now(s: &str) -> DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

/// Format a timestamp for storage
///
/// Always microsecond precision with a `Z` suffix, so the stored strings are
/// fixed width and sort lexically in chronological order.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use notekeep_db::utils::format_timestamp;
///
/// let ts = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(format_timestamp(&ts), "2024-01-01T12:00:00.000000Z");
/// ```
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Current time at the precision timestamps are stored with
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Case-folded copy of `input` used for case-insensitive matching
///
/// SQLite's `NOCASE` and `LIKE` only fold ASCII, so searchable text is stored
/// alongside a copy lowercased here with full Unicode rules.
pub fn fold_case(input: &str) -> String {
    input.to_lowercase()
}

/// Escape `%`, `_` and `\` so user input is matched literally by `LIKE ... ESCAPE '\'`
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
