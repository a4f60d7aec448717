//! Time utilities for date resolution
//!
//! All timestamps are UTC. Offsets are signed `chrono::TimeDelta` values.
//!
//! # Mock Time for Development
//!
//! In debug builds, the `WHEN_MOCK_TIME` environment variable overrides the
//! current time used to classify dates as past or upcoming.
//!
//! Format: any format accepted by [`parse_timestamp`] (e.g. `2025-01-15 10:00:00`)

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use std::sync::OnceLock;

/// A point in time. Timezone normalization happens before values reach us.
pub type Timestamp = DateTime<Utc>;

/// Environment variable name for mock time (debug builds only)
pub const MOCK_TIME_ENV_VAR: &str = "WHEN_MOCK_TIME";

const SECONDS_PER_DAY: i64 = 86_400;

static MOCK_TIME_OFFSET: OnceLock<Option<TimeDelta>> = OnceLock::new();

#[allow(clippy::disallowed_methods)] // Wraps Utc::now()
fn get_mock_time_offset() -> Option<TimeDelta> {
    *MOCK_TIME_OFFSET.get_or_init(|| {
        #[cfg(debug_assertions)]
        {
            if let Ok(mock_time_str) = std::env::var(MOCK_TIME_ENV_VAR) {
                match parse_timestamp(&mock_time_str) {
                    Ok(mock_dt) => {
                        let offset = mock_dt.signed_duration_since(Utc::now());
                        tracing::info!(
                            mock_time = %mock_time_str,
                            offset_secs = offset.num_seconds(),
                            "Mock time enabled"
                        );
                        return Some(offset);
                    }
                    Err(e) => {
                        tracing::warn!(
                            mock_time = %mock_time_str,
                            error = %e,
                            "Invalid mock time"
                        );
                    }
                }
            }
            None
        }
        #[cfg(not(debug_assertions))]
        {
            None
        }
    })
}

/// Returns whether mock time is currently active.
pub fn is_mock_time_active() -> bool {
    get_mock_time_offset().is_some()
}

/// Get the current time, respecting `WHEN_MOCK_TIME` in debug builds.
#[allow(clippy::disallowed_methods)]
pub fn now() -> Timestamp {
    let real_now = Utc::now();

    match get_mock_time_offset() {
        Some(offset) => real_now + offset,
        None => real_now,
    }
}

/// Parse a timestamp.
///
/// Accepts RFC 3339 (`2020-01-01T00:00:00Z`), `YYYY-MM-DD HH:MM:SS` and
/// `YYYY-MM-DD`. The last two are taken as UTC.
pub fn parse_timestamp(s: &str) -> Result<Timestamp, String> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    Err("Expected RFC 3339, YYYY-MM-DD HH:MM:SS or YYYY-MM-DD".into())
}

/// Build an offset from whole days plus seconds.
///
/// Returns `None` if either part, or their sum, is out of range.
pub fn offset_from_parts(days: i64, seconds: i64) -> Option<TimeDelta> {
    let day_secs = days.checked_mul(SECONDS_PER_DAY)?;
    let total = day_secs.checked_add(seconds)?;
    TimeDelta::try_seconds(total)
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Format a signed offset in human-readable form, e.g. `+1d 2h` or `-30m`.
pub fn format_offset(d: TimeDelta) -> String {
    let total_secs = d.num_seconds();
    let sign = if total_secs < 0 { '-' } else { '+' };
    let abs = total_secs.unsigned_abs();

    let days = abs / SECONDS_PER_DAY as u64;
    let hours = (abs % SECONDS_PER_DAY as u64) / 3600;
    let minutes = (abs % 3600) / 60;
    let seconds = abs % 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{}s", seconds));
    }

    format!("{}{}", sign, parts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();

        assert_eq!(parse_timestamp("2020-01-01T00:00:00Z").unwrap(), expected);
        assert_eq!(parse_timestamp("2020-01-01 00:00:00").unwrap(), expected);
        assert_eq!(parse_timestamp("2020-01-01").unwrap(), expected);
        assert_eq!(parse_timestamp("  2020-01-01  ").unwrap(), expected);
    }

    #[test]
    fn test_parse_timestamp_normalizes_offsets() {
        let dt = parse_timestamp("2020-01-01T02:00:00+02:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("").is_err());
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("2020-13-01").is_err());
    }

    #[test]
    fn test_offset_from_parts() {
        assert_eq!(offset_from_parts(1, 0), Some(TimeDelta::days(1)));
        assert_eq!(offset_from_parts(1, -3600), Some(TimeDelta::hours(23)));
        assert_eq!(offset_from_parts(0, 0), Some(TimeDelta::zero()));
        assert_eq!(offset_from_parts(i64::MAX, 0), None);
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(TimeDelta::zero()), "+0s");
        assert_eq!(format_offset(TimeDelta::days(1)), "+1d");
        assert_eq!(format_offset(TimeDelta::seconds(93_784)), "+1d 2h 3m 4s");
        assert_eq!(format_offset(TimeDelta::minutes(-30)), "-30m");
    }

    #[test]
    fn test_format_timestamp() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        assert_eq!(format_timestamp(&dt), "2025-01-15 10:00:00 UTC");
    }
}
