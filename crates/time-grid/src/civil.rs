//! Civil-time fields and the per-unit truncation table.
//!
//! Truncation works on wall-clock fields only. It knows nothing about
//! offsets; turning the truncated fields back into an instant is the job of
//! [`crate::localize`](mod@crate::localize).

use std::fmt;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{Result, TimeGridError};
use crate::period::{Period, Unit};

/// Wall-clock fields of an instant as read in some timezone.
///
/// Sub-second precision is dropped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CivilFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl CivilFields {
    /// Truncate every field below the period's unit.
    ///
    /// | unit | result |
    /// |---|---|
    /// | `week` | Monday of the ISO week, 00:00:00 |
    /// | `day` | same date, 00:00:00 |
    /// | `hour-N` | hour floored to a multiple of N, :00:00 |
    /// | `minute-N` | minute floored to a multiple of N, second 0 |
    /// | `second-N` | second floored to a multiple of N |
    ///
    /// The period is expected to have passed [`Period::on_grid`].
    pub fn truncate(self, period: Period) -> Result<Self> {
        let step = period.quantity();
        let truncated = match period.unit() {
            Unit::Second => Self {
                second: floor_to(self.second, step),
                ..self
            },
            Unit::Minute => Self {
                minute: floor_to(self.minute, step),
                second: 0,
                ..self
            },
            Unit::Hour => Self {
                hour: floor_to(self.hour, step),
                minute: 0,
                second: 0,
                ..self
            },
            Unit::Day => self.midnight(),
            Unit::Week => {
                let monday = iso_week_monday(self.date()?)?;
                Self {
                    year: monday.year(),
                    month: monday.month(),
                    day: monday.day(),
                    ..self.midnight()
                }
            }
        };
        Ok(truncated)
    }

    pub fn date(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
            .ok_or_else(|| TimeGridError::InvalidDatetime(format!("no such date: {self}")))
    }

    pub fn to_naive(&self) -> Result<NaiveDateTime> {
        self.date()?
            .and_hms_opt(self.hour, self.minute, self.second)
            .ok_or_else(|| TimeGridError::InvalidDatetime(format!("no such time: {self}")))
    }

    fn midnight(self) -> Self {
        Self {
            hour: 0,
            minute: 0,
            second: 0,
            ..self
        }
    }
}

impl From<&NaiveDateTime> for CivilFields {
    fn from(dt: &NaiveDateTime) -> Self {
        Self {
            year: dt.year(),
            month: dt.month(),
            day: dt.day(),
            hour: dt.hour(),
            minute: dt.minute(),
            second: dt.second(),
        }
    }
}

impl fmt::Display for CivilFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// The Monday that starts the ISO week containing `date`.
///
/// # Errors
///
/// Returns [`TimeGridError::OutOfRange`] if that Monday precedes the
/// earliest representable date.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use time_grid::iso_week_monday;
///
/// // 2015-03-01 is a Sunday; its ISO week began on the 23rd of February.
/// let sunday = NaiveDate::from_ymd_opt(2015, 3, 1).unwrap();
/// assert_eq!(
///     iso_week_monday(sunday).unwrap(),
///     NaiveDate::from_ymd_opt(2015, 2, 23).unwrap()
/// );
/// ```
pub fn iso_week_monday(date: NaiveDate) -> Result<NaiveDate> {
    let days_since_monday = i64::from(date.weekday().num_days_from_monday());
    date.checked_sub_signed(Duration::days(days_since_monday))
        .ok_or_else(|| TimeGridError::OutOfRange(format!("ISO week of {date}")))
}

fn floor_to(value: u32, step: u32) -> u32 {
    value / step * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn fields(s: &str) -> CivilFields {
        let dt = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").unwrap();
        CivilFields::from(&dt)
    }

    fn truncate(s: &str, period: &str) -> String {
        fields(s)
            .truncate(period.parse().unwrap())
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_truncate_table() {
        let at = "2015-03-04T04:37:52.250";
        assert_eq!(truncate(at, "second"), "2015-03-04T04:37:52");
        assert_eq!(truncate(at, "second-30"), "2015-03-04T04:37:30");
        assert_eq!(truncate(at, "minute"), "2015-03-04T04:37:00");
        assert_eq!(truncate(at, "minute-15"), "2015-03-04T04:30:00");
        assert_eq!(truncate(at, "hour"), "2015-03-04T04:00:00");
        assert_eq!(truncate(at, "hour-6"), "2015-03-04T00:00:00");
        assert_eq!(truncate(at, "day"), "2015-03-04T00:00:00");
        assert_eq!(truncate(at, "week"), "2015-03-02T00:00:00");
    }

    #[test]
    fn test_quarter_hour_edges() {
        assert_eq!(truncate("2015-03-01T04:14:59", "minute-15"), "2015-03-01T04:00:00");
        assert_eq!(truncate("2015-03-01T04:15:00", "minute-15"), "2015-03-01T04:15:00");
        assert_eq!(truncate("2015-03-01T04:59:59", "minute-15"), "2015-03-01T04:45:00");
    }

    #[test]
    fn test_week_crosses_month_and_year() {
        assert_eq!(truncate("2015-03-01T12:00:00", "week"), "2015-02-23T00:00:00");
        // 2016-01-01 is a Friday in ISO week 53 of 2015.
        assert_eq!(truncate("2016-01-01T08:00:00", "week"), "2015-12-28T00:00:00");
    }

    #[test]
    fn test_iso_week_monday_every_weekday() {
        let monday = NaiveDate::from_ymd_opt(2026, 2, 16).unwrap();
        for offset in 0..7 {
            let date = monday + Duration::days(offset);
            assert_eq!(iso_week_monday(date).unwrap(), monday, "{date}");
        }
        assert_eq!(monday.weekday(), Weekday::Mon);
    }

    #[test]
    fn test_invalid_fields_do_not_convert() {
        let bogus = CivilFields {
            year: 2015,
            month: 2,
            day: 30,
            hour: 0,
            minute: 0,
            second: 0,
        };
        assert!(bogus.to_naive().is_err());
    }
}
