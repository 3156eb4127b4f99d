//! Boundary test: is an instant exactly on a grid boundary?
//!
//! This does not reuse the rounding functions. Instead it compares the
//! instant's civil fields with those of the instant one nanosecond earlier:
//! a boundary is where the relevant field changes. Because the comparison
//! is between two physical instants, a repeated wall-clock time at a
//! fall-back transition is judged by what actually preceded it, not by a
//! reconstructed civil time.

use chrono::{DateTime, Datelike, NaiveDateTime, Offset, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::error::{Result, TimeGridError};
use crate::period::{Period, Unit};
use crate::round::{resolution, shift};

/// Check whether `dt` sits exactly on a boundary of `period`.
///
/// Boundaries are read in `timezone` if given, otherwise in `dt`'s own
/// zone. Supported periods are `second[-N]`, `minute[-N]`, `hour[-N]` and
/// `day`.
///
/// At a fall-back transition both passes of a repeated top-of-hour count as
/// `hour` boundaries, but only the first pass of a repeated midnight counts
/// as a `day` boundary.
///
/// # Errors
///
/// Returns [`TimeGridError::InvalidPeriod`] for unrecognized periods and
/// [`TimeGridError::UnsupportedPeriod`] for `week`.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use time_grid::is_snapped_to;
///
/// let quarter = Utc.with_ymd_and_hms(2015, 3, 1, 4, 15, 0).unwrap();
/// assert!(is_snapped_to(&quarter, "minute-15", None).unwrap());
///
/// let off_grid = Utc.with_ymd_and_hms(2015, 3, 1, 4, 25, 0).unwrap();
/// assert!(!is_snapped_to(&off_grid, "minute-15", None).unwrap());
/// ```
pub fn is_snapped_to<Z: TimeZone>(
    dt: &DateTime<Z>,
    period: &str,
    timezone: Option<Tz>,
) -> Result<bool> {
    let period = period.parse::<Period>()?.on_grid()?;
    match timezone {
        Some(tz) => crosses_boundary(&dt.with_timezone(&tz), period),
        None => crosses_boundary(dt, period),
    }
}

/// Shorthand for `is_snapped_to(dt, "minute-15", timezone)`.
pub fn is_snapped_to_15min<Z: TimeZone>(dt: &DateTime<Z>, timezone: Option<Tz>) -> Result<bool> {
    match timezone {
        Some(tz) => crosses_boundary(&dt.with_timezone(&tz), Period::QUARTER_HOUR),
        None => crosses_boundary(dt, Period::QUARTER_HOUR),
    }
}

/// [`is_snapped_to`] for a datetime without a zone.
///
/// A naive datetime has no civil calendar of its own, so `timezone` is
/// required; the datetime is read as UTC and judged in that zone.
///
/// # Errors
///
/// Returns [`TimeGridError::MissingTimezone`] when `timezone` is `None`.
pub fn is_snapped_to_naive(
    dt: &NaiveDateTime,
    period: &str,
    timezone: Option<Tz>,
) -> Result<bool> {
    let tz = require_timezone(dt, timezone)?;
    is_snapped_to(&Utc.from_utc_datetime(dt), period, Some(tz))
}

/// [`is_snapped_to_15min`] for a datetime without a zone.
pub fn is_snapped_to_15min_naive(dt: &NaiveDateTime, timezone: Option<Tz>) -> Result<bool> {
    let tz = require_timezone(dt, timezone)?;
    is_snapped_to_15min(&Utc.from_utc_datetime(dt), Some(tz))
}

fn require_timezone(dt: &NaiveDateTime, timezone: Option<Tz>) -> Result<Tz> {
    timezone.ok_or_else(|| {
        TimeGridError::MissingTimezone(format!("'{dt}' has no zone and none was given"))
    })
}

fn crosses_boundary<Z: TimeZone>(current: &DateTime<Z>, period: Period) -> Result<bool> {
    let previous = shift(current, -resolution())?;
    let step = period.quantity();
    let bucket = |value: u32| value / step;

    let snapped = match period.unit() {
        Unit::Second => bucket(previous.second()) != bucket(current.second()),
        Unit::Minute => bucket(previous.minute()) != bucket(current.minute()),
        Unit::Hour => {
            // A fall-back repeats part of an hour: the hour field stays put
            // while the offset changes and the minutes run backwards. The
            // repeated hour only counts if it starts on the grid itself.
            bucket(previous.hour()) != bucket(current.hour())
                || (current.hour() % step == 0
                    && current.minute() == 0
                    && previous.offset().fix() != current.offset().fix()
                    && previous.minute() > current.minute())
        }
        Unit::Day => previous.day() != current.day(),
        Unit::Week => {
            return Err(TimeGridError::UnsupportedPeriod(
                "'week' cannot be checked for snapping; round down to 'week' instead".to_string(),
            ))
        }
    };
    Ok(snapped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use chrono_tz::{America, Asia, Australia, Europe};

    // UTC-03:30 in March 2015.
    const NEWFOUNDLAND: Tz = America::St_Johns;

    fn naive(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    fn local(tz: Tz, y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        tz.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    /// Check `dt` in its own zone, in `tz` explicitly, and as UTC judged in `tz`.
    fn assert_snapped(dt: &DateTime<Tz>, period: &str, expected: bool) {
        let tz = dt.timezone();
        assert_eq!(is_snapped_to(dt, period, None).unwrap(), expected, "{dt} own zone");
        assert_eq!(is_snapped_to(dt, period, Some(tz)).unwrap(), expected, "{dt} explicit");
        let as_utc = dt.with_timezone(&Utc);
        assert_eq!(is_snapped_to(&as_utc, period, Some(tz)).unwrap(), expected, "{dt} via UTC");
    }

    #[test]
    fn test_naive_requires_timezone() {
        let err = is_snapped_to_naive(&naive(2015, 3, 1, 4, 1, 0), "minute", None).unwrap_err();
        assert!(matches!(err, TimeGridError::MissingTimezone(_)), "got: {err}");
        let err = is_snapped_to_15min_naive(&naive(2015, 3, 1, 4, 15, 0), None).unwrap_err();
        assert!(matches!(err, TimeGridError::MissingTimezone(_)), "got: {err}");
    }

    #[test]
    fn test_naive_in_utc() {
        let utc = Some(Tz::UTC);
        let cases = [
            ("minute", naive(2015, 3, 1, 4, 1, 0), true),
            ("minute", naive(2015, 3, 1, 4, 1, 35), false),
            ("minute-15", naive(2015, 3, 1, 4, 15, 0), true),
            ("minute-15", naive(2015, 3, 1, 4, 25, 0), false),
            ("hour", naive(2015, 3, 1, 4, 0, 0), true),
            ("hour", naive(2015, 3, 1, 4, 1, 0), false),
            ("day", naive(2015, 3, 1, 0, 0, 0), true),
            ("day", naive(2015, 3, 1, 4, 1, 0), false),
        ];
        for (period, dt, expected) in cases {
            assert_eq!(is_snapped_to_naive(&dt, period, utc).unwrap(), expected, "{period} {dt}");
        }
        assert!(is_snapped_to_15min_naive(&naive(2015, 3, 1, 4, 15, 0), utc).unwrap());
    }

    #[test]
    fn test_minute() {
        assert_snapped(&local(NEWFOUNDLAND, 2015, 3, 1, 4, 1), "minute", true);
        let with_seconds = NEWFOUNDLAND.with_ymd_and_hms(2015, 3, 1, 4, 1, 35).unwrap();
        assert_snapped(&with_seconds, "minute", false);
    }

    #[test]
    fn test_quarter_hour() {
        assert_snapped(&local(NEWFOUNDLAND, 2015, 3, 1, 4, 45), "minute-15", true);
        assert_snapped(&local(NEWFOUNDLAND, 2015, 3, 1, 4, 35), "minute-15", false);
        let dt = local(NEWFOUNDLAND, 2015, 3, 1, 4, 45);
        assert!(is_snapped_to_15min(&dt, None).unwrap());
    }

    #[test]
    fn test_hour() {
        assert_snapped(&local(NEWFOUNDLAND, 2015, 3, 1, 4, 0), "hour", true);
        assert_snapped(&local(NEWFOUNDLAND, 2015, 3, 1, 4, 35), "hour", false);
    }

    #[test]
    fn test_day() {
        assert_snapped(&local(NEWFOUNDLAND, 2015, 3, 1, 0, 0), "day", true);
        assert_snapped(&local(NEWFOUNDLAND, 2015, 3, 1, 4, 35), "day", false);
    }

    #[test]
    fn test_explicit_timezone_is_respected() {
        // UTC midnight is 20:30 in Newfoundland: a boundary in UTC only.
        let dt = Utc.with_ymd_and_hms(2015, 3, 1, 0, 0, 0).unwrap();
        assert!(is_snapped_to(&dt, "hour", None).unwrap());
        assert!(!is_snapped_to(&dt, "hour", Some(NEWFOUNDLAND)).unwrap());
        assert!(!is_snapped_to(&dt, "day", Some(NEWFOUNDLAND)).unwrap());
        assert!(is_snapped_to(&dt, "minute-15", Some(NEWFOUNDLAND)).unwrap());
    }

    #[test]
    fn test_day_sao_paulo_transitions() {
        let tz = America::Sao_Paulo;
        // 2015-02-22 00:00 -02:00 fell back to 2015-02-21 23:00 -03:00.
        let after_fall_back = Utc.with_ymd_and_hms(2015, 2, 22, 3, 0, 0).unwrap();
        assert_snapped(&after_fall_back.with_timezone(&tz), "day", true);

        // 2015-10-18 00:00 -03:00 sprang forward to 01:00 -02:00.
        let transition = Utc.with_ymd_and_hms(2015, 10, 18, 3, 0, 0).unwrap();
        assert_snapped(&transition.with_timezone(&tz), "day", true);

        let later = Utc.with_ymd_and_hms(2015, 10, 18, 3, 35, 0).unwrap();
        assert_snapped(&later.with_timezone(&tz), "day", false);
    }

    #[test]
    fn test_day_amman_missing_midnight() {
        // 2015-03-27 00:00 +02:00 -> 01:00 +03:00, at 22:00 UTC.
        let transition = Utc.with_ymd_and_hms(2015, 3, 26, 22, 0, 0).unwrap();
        assert_snapped(&transition.with_timezone(&Asia::Amman), "day", true);
    }

    #[test]
    fn test_day_amman_repeated_midnight() {
        let tz = Asia::Amman;
        // 2015-10-30 01:00 +03:00 -> 00:00 +02:00: midnight happens twice.
        let first = Utc.with_ymd_and_hms(2015, 10, 29, 21, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2015, 10, 29, 22, 0, 0).unwrap();
        assert_eq!(first.with_timezone(&tz).to_rfc3339(), "2015-10-30T00:00:00+03:00");
        assert_eq!(second.with_timezone(&tz).to_rfc3339(), "2015-10-30T00:00:00+02:00");

        assert_snapped(&first.with_timezone(&tz), "day", true);
        assert_snapped(&second.with_timezone(&tz), "day", false);

        for minutes_past in [35, 95] {
            let dt = first + chrono::Duration::minutes(minutes_past);
            assert_snapped(&dt.with_timezone(&tz), "day", false);
        }
    }

    #[test]
    fn test_hour_amman_repeated_midnight() {
        let tz = Asia::Amman;
        let first = Utc.with_ymd_and_hms(2015, 10, 29, 21, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2015, 10, 29, 22, 0, 0).unwrap();

        assert_snapped(&first.with_timezone(&tz), "hour", true);
        assert_snapped(&second.with_timezone(&tz), "hour", true);

        for dt in [first, second] {
            let five_past = dt + chrono::Duration::minutes(5);
            assert_snapped(&five_past.with_timezone(&tz), "hour", false);
        }
    }

    #[test]
    fn test_hour_multiple_repeated_hour_off_grid() {
        // Berlin, 2015-10-25: 03:00 CEST fell back to 02:00 CET. 01:00Z is
        // the second 02:00, which starts an hour but not a six-hour block.
        let tz = Europe::Berlin;
        let second_two = Utc.with_ymd_and_hms(2015, 10, 25, 1, 0, 0).unwrap();

        assert_snapped(&second_two.with_timezone(&tz), "hour", true);
        assert_snapped(&second_two.with_timezone(&tz), "hour-2", true);
        assert_snapped(&second_two.with_timezone(&tz), "hour-6", false);
    }

    #[test]
    fn test_hour_half_hour_fall_back_is_not_an_hour() {
        // Lord Howe, 2016-04-03: 02:00 +11:00 fell back to 01:30 +10:30.
        let tz = Australia::Lord_Howe;
        let fall_back = Utc.with_ymd_and_hms(2016, 4, 2, 15, 0, 0).unwrap();

        assert_snapped(&fall_back.with_timezone(&tz), "hour", false);
        assert_snapped(&fall_back.with_timezone(&tz), "minute-15", true);
    }

    #[test]
    fn test_week_is_unsupported() {
        let dt = Utc.with_ymd_and_hms(2015, 3, 2, 0, 0, 0).unwrap();
        let err = is_snapped_to(&dt, "week", None).unwrap_err();
        assert!(matches!(err, TimeGridError::UnsupportedPeriod(_)), "got: {err}");
    }

    #[test]
    fn test_unrecognized_period() {
        let dt = Utc.with_ymd_and_hms(2015, 3, 2, 0, 0, 0).unwrap();
        for bad in ["month", "minute-7", "hours"] {
            let err = is_snapped_to(&dt, bad, None).unwrap_err();
            assert!(matches!(err, TimeGridError::InvalidPeriod(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn test_second_grid() {
        let dt = Utc.with_ymd_and_hms(2015, 3, 1, 4, 1, 30).unwrap();
        assert!(is_snapped_to(&dt, "second", None).unwrap());
        assert!(is_snapped_to(&dt, "second-30", None).unwrap());
        assert!(!is_snapped_to(&(dt + chrono::Duration::milliseconds(1)), "second", None).unwrap());
    }
}
