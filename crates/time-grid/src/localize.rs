//! Civil time → instant, with an explicit DST policy.
//!
//! A civil time can occur once, twice (fall-back overlap) or not at all
//! (spring-forward gap) in a given zone. The grid functions always need a
//! single answer, so the policy is fixed here:
//!
//! - **Ambiguous**: the earliest occurrence (pre-transition offset).
//! - **Non-existent**: the transition instant itself, i.e. the first
//!   instant carrying the post-transition offset. The gap collapses forward
//!   onto the first valid local time after it.

use chrono::{DateTime, Duration, LocalResult, NaiveDateTime, Offset, TimeZone};
use chrono_tz::Tz;
use tracing::trace;

use crate::error::{Result, TimeGridError};

/// Resolve a civil time in `tz` to an instant.
///
/// # Errors
///
/// Returns [`TimeGridError::OutOfRange`] if probing around a gap leaves
/// chrono's representable range.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use time_grid::localize;
///
/// // Amman skipped from 00:00 to 01:00 on 2015-03-27.
/// let midnight = NaiveDate::from_ymd_opt(2015, 3, 27).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let resolved = localize(&chrono_tz::Asia::Amman, &midnight).unwrap();
/// assert_eq!(resolved.to_rfc3339(), "2015-03-27T01:00:00+03:00");
/// ```
pub fn localize<Z: TimeZone>(tz: &Z, local: &NaiveDateTime) -> Result<DateTime<Z>> {
    match tz.from_local_datetime(local) {
        LocalResult::Single(dt) => Ok(dt),
        LocalResult::Ambiguous(earliest, latest) => {
            trace!(
                %local,
                earliest = %earliest.naive_utc(),
                latest = %latest.naive_utc(),
                "ambiguous local time, taking earliest"
            );
            Ok(earliest)
        }
        LocalResult::None => collapse_gap(tz, local),
    }
}

/// Parse an IANA timezone name into a [`Tz`].
///
/// # Errors
///
/// Returns [`TimeGridError::InvalidTimezone`] if the name is not in the
/// compiled-in tz database.
pub fn parse_timezone(s: &str) -> Result<Tz> {
    s.parse::<Tz>()
        .map_err(|_| TimeGridError::InvalidTimezone(format!("'{s}'")))
}

/// Find the first instant whose local reading is at or after `local`.
///
/// Reading `local` with the post-gap offset gives an instant before the
/// transition; reading it with the pre-gap offset gives one after. The
/// transition is bisected between the two at whole-second resolution,
/// which is the resolution of the tz database.
fn collapse_gap<Z: TimeZone>(tz: &Z, local: &NaiveDateTime) -> Result<DateTime<Z>> {
    let day = Duration::days(1);
    let offset_near = |probe: Option<NaiveDateTime>| -> Result<i64> {
        let probe = probe.ok_or_else(|| out_of_range(local))?;
        Ok(i64::from(
            tz.offset_from_utc_datetime(&probe).fix().local_minus_utc(),
        ))
    };
    let before = offset_near(local.checked_sub_signed(day))?;
    let after = offset_near(local.checked_add_signed(day))?;

    let wall = local.and_utc().timestamp();
    let mut lo = wall - after;
    let mut hi = wall - before;
    if lo >= hi {
        return Err(TimeGridError::InvalidDatetime(format!(
            "{local} does not exist and no forward transition was found"
        )));
    }

    let at = |ts: i64| -> Result<DateTime<Z>> {
        tz.timestamp_opt(ts, 0)
            .single()
            .ok_or_else(|| out_of_range(local))
    };
    while hi - lo > 1 {
        let mid = lo + (hi - lo) / 2;
        if at(mid)?.naive_local() >= *local {
            hi = mid;
        } else {
            lo = mid;
        }
    }

    let resolved = at(hi)?;
    trace!(
        %local,
        resolved = %resolved.naive_local(),
        "non-existent local time, collapsed forward to transition"
    );
    Ok(resolved)
}

fn out_of_range(local: &NaiveDateTime) -> TimeGridError {
    TimeGridError::OutOfRange(format!("resolving {local}"))
}
