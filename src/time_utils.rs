// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time handling.
//!
//! Workouts store a local calendar date and wall-clock time in the club's
//! civil timezone. Everything that compares them against "now" goes through
//! [`resolve_start`] so there is exactly one place that knows about DST.

use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset, SecondsFormat,
    TimeZone, Utc,
};
use chrono_tz::Tz;

/// Format a UTC timestamp as RFC3339 using a `Z` suffix.
pub fn format_utc_rfc3339(date: DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_local_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// Parse a wall-clock time in `HH:MM` or `HH:MM:SS` form.
pub fn parse_local_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

/// Resolve a workout's local date and time to an absolute instant.
///
/// Returns `None` when either part is missing. A repeated hour (DST fall-back)
/// resolves to the earlier instant; a skipped hour (DST spring-forward) is
/// shifted forward by the length of the gap, so 02:30 on a spring-forward day
/// becomes 03:30 local.
pub fn resolve_start(
    date: Option<NaiveDate>,
    time: Option<NaiveTime>,
    tz: Tz,
) -> Option<DateTime<Utc>> {
    let local = NaiveDateTime::new(date?, time?);

    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            // Interpret the wall-clock time with the offset in force before the gap.
            let before = tz
                .from_local_datetime(&(local - Duration::days(1)))
                .earliest()?;
            let offset_secs = before.offset().fix().local_minus_utc();
            let utc = local - Duration::seconds(i64::from(offset_secs));
            Some(Utc.from_utc_datetime(&utc))
        }
    }
}

/// Same as [`resolve_start`] but for raw strings; unparseable input yields `None`.
pub fn resolve_start_str(date: Option<&str>, time: Option<&str>, tz: Tz) -> Option<DateTime<Utc>> {
    resolve_start(
        date.and_then(parse_local_date),
        time.and_then(parse_local_time),
        tz,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::America::Toronto;

    fn utc(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn test_summer_and_winter_offsets() {
        let summer = resolve_start_str(Some("2024-07-01"), Some("06:00"), Toronto);
        assert_eq!(summer, Some(utc("2024-07-01T10:00:00Z")));

        let winter = resolve_start_str(Some("2024-01-15"), Some("06:00:00"), Toronto);
        assert_eq!(winter, Some(utc("2024-01-15T11:00:00Z")));
    }

    #[test]
    fn test_repeated_hour_prefers_earlier_instant() {
        // 2024-11-03 01:30 happens twice in Toronto (EDT then EST).
        let start = resolve_start_str(Some("2024-11-03"), Some("01:30"), Toronto);
        assert_eq!(start, Some(utc("2024-11-03T05:30:00Z")));
    }

    #[test]
    fn test_skipped_hour_moves_forward() {
        // 2024-03-10 02:30 does not exist in Toronto; it lands on 03:30 EDT.
        let start = resolve_start_str(Some("2024-03-10"), Some("02:30"), Toronto).unwrap();
        assert_eq!(start, utc("2024-03-10T07:30:00Z"));
        assert_eq!(
            start.with_timezone(&Toronto).format("%H:%M").to_string(),
            "03:30"
        );
    }

    #[test]
    fn test_missing_or_unparseable_parts() {
        assert!(resolve_start_str(None, Some("06:00"), Toronto).is_none());
        assert!(resolve_start_str(Some("2024-07-01"), None, Toronto).is_none());
        assert!(resolve_start_str(Some("07/01/2024"), Some("06:00"), Toronto).is_none());
        assert!(resolve_start_str(Some("2024-07-01"), Some("6am"), Toronto).is_none());
    }

    #[test]
    fn test_format_utc_rfc3339() {
        assert_eq!(
            format_utc_rfc3339(utc("2024-07-01T10:00:00.250Z")),
            "2024-07-01T10:00:00Z"
        );
    }
}
