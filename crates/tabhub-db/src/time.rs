use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};

/// Current time in the text form stored in every timestamp column.
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored timestamp. Accepts RFC 3339 as written by [`now`] and
/// SQLite's own `YYYY-MM-DD HH:MM:SS` form (naive, UTC).
pub fn parse(value: &str) -> Option<DateTime<Utc>> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .ok()
}
