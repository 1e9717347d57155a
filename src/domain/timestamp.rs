// Timestamp parsing for the formats the analyzer backend emits
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Device-side report format, e.g. "11 Apr 2025 12:03 AM".
pub const REPORT_TIMESTAMP_FORMAT: &str = "%d %b %Y %I:%M %p";

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp into UTC.
///
/// Zoned forms (RFC 3339, RFC 2822 / HTTP-date) keep their offset. Naive
/// date-times and the report format are read as local time; a bare date is
/// UTC midnight.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return from_local(naive);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, REPORT_TIMESTAMP_FORMAT) {
        return from_local(naive);
    }

    None
}

fn from_local(naive: NaiveDateTime) -> Option<DateTime<Utc>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
