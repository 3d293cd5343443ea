//! Timestamp helpers.
//!
//! Every timestamp the clinic persists is an RFC 3339 UTC string with second
//! precision (`2026-10-18T09:30:00Z`). Keeping one spelling means the local
//! store can compare timestamps as plain strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use super::ModelError;

/// Input shapes accepted in addition to RFC 3339. Naive values are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Format a UTC instant in the canonical spelling.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current time in the canonical spelling.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}

/// Normalise user input (RFC 3339, datetime-local or a bare date) to UTC.
pub fn normalize_timestamp(input: &str) -> Result<String, ModelError> {
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(format_timestamp(parsed.with_timezone(&Utc)));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(format_timestamp(naive.and_utc()));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(format_timestamp(date.and_time(NaiveTime::MIN).and_utc()));
    }

    Err(ModelError::InvalidTimestamp(input.to_string()))
}

/// Validate a calendar date (`YYYY-MM-DD`), returning its canonical form.
pub fn normalize_date(input: &str) -> Result<String, ModelError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| ModelError::InvalidDate(input.to_string()))
}

/// Half-open `[start, end)` bounds covering one UTC day.
pub fn day_bounds(day: NaiveDate) -> (String, String) {
    let next = day.succ_opt().unwrap_or(NaiveDate::MAX);
    (
        format_timestamp(day.and_time(NaiveTime::MIN).and_utc()),
        format_timestamp(next.and_time(NaiveTime::MIN).and_utc()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rfc3339_with_offset() {
        let ts = normalize_timestamp("2026-10-18T11:30:00+02:00").unwrap();
        assert_eq!(ts, "2026-10-18T09:30:00Z");
    }

    #[test]
    fn test_normalize_datetime_local() {
        let ts = normalize_timestamp("2026-10-18T09:30").unwrap();
        assert_eq!(ts, "2026-10-18T09:30:00Z");
    }

    #[test]
    fn test_normalize_bare_date() {
        let ts = normalize_timestamp("2026-10-18").unwrap();
        assert_eq!(ts, "2026-10-18T00:00:00Z");
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(matches!(
            normalize_timestamp("next tuesday"),
            Err(ModelError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_day_bounds() {
        let day = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();
        let (start, end) = day_bounds(day);
        assert_eq!(start, "2026-12-31T00:00:00Z");
        assert_eq!(end, "2027-01-01T00:00:00Z");
    }

    #[test]
    fn test_normalize_date() {
        assert_eq!(normalize_date(" 1990-02-03 ").unwrap(), "1990-02-03");
        assert!(normalize_date("1990-02-30").is_err());
    }
}
