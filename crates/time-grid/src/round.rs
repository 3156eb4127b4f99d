//! Floor and ceiling rounding onto a civil time grid.
//!
//! Rounding reads the instant's wall-clock fields in a working timezone,
//! truncates them (see [`CivilFields::truncate`]) and resolves the result
//! back to an instant with the [`crate::localize`](mod@crate::localize) policy. The result is
//! handed back in the zone the caller passed in.
//!
//! # Functions
//!
//! - [`round_down`] / [`round_down_naive`] — latest boundary at or before
//! - [`round_up`] / [`round_up_naive`] — earliest boundary at or after
//! - [`round_to_15min`] / [`round_to_15min_naive`] — nearest quarter hour

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

use crate::civil::CivilFields;
use crate::error::{Result, TimeGridError};
use crate::localize::localize;
use crate::period::Period;

/// Per-call options for the rounding functions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundOptions {
    /// Round in this zone's civil calendar instead of the instant's own.
    pub timezone: Option<Tz>,
    /// Move an instant that is already on a boundary to the neighbouring
    /// boundary instead of returning it unchanged.
    pub force: bool,
}

impl RoundOptions {
    pub fn in_timezone(tz: Tz) -> Self {
        Self {
            timezone: Some(tz),
            ..Self::default()
        }
    }

    pub fn forced(self) -> Self {
        Self {
            force: true,
            ..self
        }
    }
}

/// The smallest step chrono can represent, used by `force` and by the
/// boundary test's lookback.
pub(crate) fn resolution() -> Duration {
    Duration::nanoseconds(1)
}

pub(crate) fn shift<Z: TimeZone>(dt: &DateTime<Z>, delta: Duration) -> Result<DateTime<Z>> {
    dt.clone()
        .checked_add_signed(delta)
        .ok_or_else(|| TimeGridError::OutOfRange(format!("{} + {delta}", dt.naive_utc())))
}

/// Round `dt` down to the latest boundary of `period` at or before it.
///
/// The grid is laid out in the civil calendar of `options.timezone` if set,
/// otherwise in `dt`'s own zone. The result carries `dt`'s zone either way.
///
/// # Errors
///
/// Returns [`TimeGridError::InvalidPeriod`] for unrecognized periods
/// (including `month`), or [`TimeGridError::OutOfRange`] at the edges of
/// chrono's range.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use time_grid::{round_down, RoundOptions};
///
/// let dt = Utc.with_ymd_and_hms(2015, 3, 1, 4, 35, 0).unwrap();
/// let floor = round_down(&dt, "minute-15", &RoundOptions::default()).unwrap();
/// assert_eq!(floor, Utc.with_ymd_and_hms(2015, 3, 1, 4, 30, 0).unwrap());
/// ```
pub fn round_down<Z: TimeZone>(
    dt: &DateTime<Z>,
    period: &str,
    options: &RoundOptions,
) -> Result<DateTime<Z>> {
    floor_with(dt, period.parse::<Period>()?.on_grid()?, options)
}

/// Round `dt` up to the earliest boundary of `period` at or after it.
///
/// The step to the next boundary is taken on the wall clock, so a 23- or
/// 25-hour day still lands on the following civil midnight. The result is
/// always a fixed point of [`round_down`]: inside the second pass of a
/// fall-back overlap, repeated wall-clock boundaries resolve to their first
/// pass and are skipped.
///
/// # Errors
///
/// Same as [`round_down`].
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use time_grid::{round_up, RoundOptions};
///
/// let dt = Utc.with_ymd_and_hms(2015, 3, 1, 4, 35, 0).unwrap();
/// let ceil = round_up(&dt, "minute-15", &RoundOptions::default()).unwrap();
/// assert_eq!(ceil, Utc.with_ymd_and_hms(2015, 3, 1, 4, 45, 0).unwrap());
/// ```
pub fn round_up<Z: TimeZone>(
    dt: &DateTime<Z>,
    period: &str,
    options: &RoundOptions,
) -> Result<DateTime<Z>> {
    ceil_with(dt, period.parse::<Period>()?.on_grid()?, options)
}

/// Round `dt` to the nearest quarter hour: down when it is at most seven
/// minutes past a boundary, up otherwise.
///
/// The minute is read in the working timezone, which matters for zones
/// with a 30- or 45-minute offset.
pub fn round_to_15min<Z: TimeZone>(dt: &DateTime<Z>, options: &RoundOptions) -> Result<DateTime<Z>> {
    let minute = match options.timezone {
        Some(tz) => dt.with_timezone(&tz).minute(),
        None => dt.minute(),
    };
    if minute % 15 <= 7 {
        floor_with(dt, Period::QUARTER_HOUR, options)
    } else {
        ceil_with(dt, Period::QUARTER_HOUR, options)
    }
}

/// [`round_down`] for a datetime without a zone. The instant is read as
/// UTC and the result is returned without a zone.
pub fn round_down_naive(
    dt: &NaiveDateTime,
    period: &str,
    options: &RoundOptions,
) -> Result<NaiveDateTime> {
    round_down(&Utc.from_utc_datetime(dt), period, options).map(|r| r.naive_utc())
}

/// [`round_up`] for a datetime without a zone, read as UTC.
pub fn round_up_naive(
    dt: &NaiveDateTime,
    period: &str,
    options: &RoundOptions,
) -> Result<NaiveDateTime> {
    round_up(&Utc.from_utc_datetime(dt), period, options).map(|r| r.naive_utc())
}

/// [`round_to_15min`] for a datetime without a zone, read as UTC.
pub fn round_to_15min_naive(dt: &NaiveDateTime, options: &RoundOptions) -> Result<NaiveDateTime> {
    round_to_15min(&Utc.from_utc_datetime(dt), options).map(|r| r.naive_utc())
}

fn floor_with<Z: TimeZone>(
    dt: &DateTime<Z>,
    period: Period,
    options: &RoundOptions,
) -> Result<DateTime<Z>> {
    let dt = if options.force {
        shift(dt, -resolution())?
    } else {
        dt.clone()
    };
    match options.timezone {
        Some(tz) => Ok(floor_in(&dt.with_timezone(&tz), period)?.with_timezone(&dt.timezone())),
        None => floor_in(&dt, period),
    }
}

fn ceil_with<Z: TimeZone>(
    dt: &DateTime<Z>,
    period: Period,
    options: &RoundOptions,
) -> Result<DateTime<Z>> {
    let dt = if options.force {
        shift(dt, resolution())?
    } else {
        dt.clone()
    };
    match options.timezone {
        Some(tz) => Ok(ceil_in(&dt.with_timezone(&tz), period)?.with_timezone(&dt.timezone())),
        None => ceil_in(&dt, period),
    }
}

/// Floor within `dt`'s own zone.
fn floor_in<Z: TimeZone>(dt: &DateTime<Z>, period: Period) -> Result<DateTime<Z>> {
    let truncated = CivilFields::from(&dt.naive_local()).truncate(period)?;
    localize(&dt.timezone(), &truncated.to_naive()?)
}

/// Ceiling within `dt`'s own zone.
fn ceil_in<Z: TimeZone>(dt: &DateTime<Z>, period: Period) -> Result<DateTime<Z>> {
    let tz = dt.timezone();
    let mut civil = CivilFields::from(&dt.naive_local())
        .truncate(period)?
        .to_naive()?;
    let mut boundary = localize(&tz, &civil)?;
    // Only loops more than once on the second pass of an overlap, where
    // every repeated boundary localizes behind `dt`.
    while boundary < *dt {
        let ahead = civil
            .checked_add_signed(period.duration())
            .ok_or_else(|| TimeGridError::OutOfRange(format!("{civil} + {period}")))?;
        civil = CivilFields::from(&ahead).truncate(period)?.to_naive()?;
        boundary = localize(&tz, &civil)?;
    }
    Ok(boundary)
}
