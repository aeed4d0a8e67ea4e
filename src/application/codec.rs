//! Text encodings used by the JSON export format.
//!
//! Attachments travel as standard base64 without a data-URL prefix and
//! timestamps as RFC 3339 with at least millisecond precision.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Timelike, Utc};

/// Encode binary content as standard base64.
#[must_use]
pub fn encode_base64(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard base64, tolerating surrounding whitespace and a
/// `data:<mime>;base64,` prefix.
///
/// # Errors
/// Returns the decoder error if the payload is not valid base64.
pub fn decode_base64(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let trimmed = text.trim();
    let payload = match trimmed.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => trimmed,
    };
    STANDARD.decode(payload)
}

/// Format a timestamp the way exports carry it, e.g. `2024-01-01T00:00:00.000Z`.
///
/// Sub-millisecond digits are only printed when present, so any stored
/// value parses back unchanged.
#[must_use]
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    let format = if value.nanosecond() % 1_000_000 == 0 {
        SecondsFormat::Millis
    } else {
        SecondsFormat::AutoSi
    };
    value.to_rfc3339_opts(format, true)
}

/// Parse a timestamp from the textual forms found in exports.
///
/// Accepts RFC 3339, a naive `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC),
/// a bare `YYYY-MM-DD` (midnight UTC) or epoch milliseconds.
#[must_use]
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let s = value.trim();

    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
        .or_else(|| s.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis))
}

/// Timestamp from epoch milliseconds.
#[must_use]
pub fn timestamp_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}
