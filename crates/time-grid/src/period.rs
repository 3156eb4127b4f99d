//! Period descriptors: `"<unit>[-<quantity>]"`.
//!
//! A period names a grid: `"minute-15"` is a quarter-hour grid, `"day"` a
//! grid of civil midnights. Parsing is generic over the quantity, but only
//! quantities that tile their parent field evenly (`minute-15`, `hour-6`)
//! can be rounded to or tested against; see [`Period::on_grid`].
//!
//! # Functions
//!
//! - [`parse_period`] — descriptor → `(unit, quantity)`
//! - [`period_to_duration`] — descriptor → nominal fixed-length duration

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::error::{Result, TimeGridError};

/// Units with a calendar meaning but no fixed length.
const CALENDAR_UNITS: [&str; 2] = ["month", "year"];

/// The unit part of a period descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Second,
    Minute,
    Hour,
    Day,
    /// ISO week, Monday through Sunday.
    Week,
}

impl Unit {
    /// Canonical length of one unit in seconds.
    pub fn seconds(self) -> i64 {
        match self {
            Unit::Second => 1,
            Unit::Minute => 60,
            Unit::Hour => 3_600,
            Unit::Day => 86_400,
            Unit::Week => 604_800,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Second => "second",
            Unit::Minute => "minute",
            Unit::Hour => "hour",
            Unit::Day => "day",
            Unit::Week => "week",
        }
    }

    /// How many of this unit make up the next larger civil field, for units
    /// whose quantity may be subdivided.
    fn cycle(self) -> Option<u32> {
        match self {
            Unit::Second | Unit::Minute => Some(60),
            Unit::Hour => Some(24),
            Unit::Day | Unit::Week => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Unit {
    type Err = TimeGridError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "second" => Ok(Unit::Second),
            "minute" => Ok(Unit::Minute),
            "hour" => Ok(Unit::Hour),
            "day" => Ok(Unit::Day),
            "week" => Ok(Unit::Week),
            _ => Err(TimeGridError::InvalidPeriod(format!(
                "unrecognized unit '{s}' (expected second, minute, hour, day or week)"
            ))),
        }
    }
}

/// A parsed period descriptor: a unit and a positive quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Period {
    unit: Unit,
    quantity: u32,
}

impl Period {
    /// The quarter-hour grid, `"minute-15"`.
    pub const QUARTER_HOUR: Period = Period {
        unit: Unit::Minute,
        quantity: 15,
    };

    pub fn new(unit: Unit, quantity: u32) -> Result<Self> {
        if quantity == 0 {
            return Err(TimeGridError::InvalidPeriod(format!(
                "'{unit}-0': quantity must be a positive integer"
            )));
        }
        Ok(Self { unit, quantity })
    }

    pub fn unit(&self) -> Unit {
        self.unit
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Nominal length of the period. Across a DST transition the civil
    /// distance between two boundaries may differ from this.
    pub fn duration(&self) -> Duration {
        Duration::seconds(self.unit.seconds() * i64::from(self.quantity))
    }

    /// Check that the period tiles its parent civil field evenly, so that
    /// truncating a field to a multiple of the quantity yields a grid.
    ///
    /// `minute-15` and `hour-6` pass; `minute-7` and `day-2` do not.
    pub fn on_grid(self) -> Result<Self> {
        let fits = match self.unit.cycle() {
            Some(cycle) => cycle % self.quantity == 0,
            None => self.quantity == 1,
        };
        if fits {
            Ok(self)
        } else {
            Err(TimeGridError::InvalidPeriod(format!(
                "'{self}': quantity does not divide a {} evenly",
                match self.unit {
                    Unit::Second => "minute",
                    Unit::Minute => "hour",
                    Unit::Hour => "day",
                    Unit::Day | Unit::Week => "calendar",
                }
            )))
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quantity == 1 {
            write!(f, "{}", self.unit)
        } else {
            write!(f, "{}-{}", self.unit, self.quantity)
        }
    }
}

impl FromStr for Period {
    type Err = TimeGridError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split('-');
        let unit: Unit = parts.next().unwrap_or_default().parse()?;
        let quantity = match parts.next() {
            None => 1,
            Some(q) => q.parse::<u32>().map_err(|e| {
                TimeGridError::InvalidPeriod(format!("'{s}': bad quantity '{q}': {e}"))
            })?,
        };
        if parts.next().is_some() {
            return Err(TimeGridError::InvalidPeriod(format!(
                "'{s}': expected '<unit>[-<quantity>]'"
            )));
        }
        let period = Period::new(unit, quantity)?;
        debug!(descriptor = s, %period, "parsed period");
        Ok(period)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Parse a period descriptor into its unit and quantity.
///
/// The quantity defaults to 1 when omitted.
///
/// # Errors
///
/// Returns [`TimeGridError::InvalidPeriod`] for an unknown unit, a
/// non-positive quantity or a malformed descriptor.
///
/// # Examples
///
/// ```
/// use time_grid::{parse_period, Unit};
///
/// assert_eq!(parse_period("minute-15").unwrap(), (Unit::Minute, 15));
/// assert_eq!(parse_period("day").unwrap(), (Unit::Day, 1));
/// ```
pub fn parse_period(period: &str) -> Result<(Unit, u32)> {
    let parsed: Period = period.parse()?;
    Ok((parsed.unit, parsed.quantity))
}

/// Map a period descriptor to its fixed-length duration.
///
/// # Errors
///
/// Returns [`TimeGridError::UnsupportedPeriod`] for `month` and `year`,
/// whose length varies, and [`TimeGridError::InvalidPeriod`] for anything
/// else that does not parse.
pub fn period_to_duration(period: &str) -> Result<Duration> {
    let unit = period.split('-').next().unwrap_or_default();
    if CALENDAR_UNITS.contains(&unit) {
        return Err(TimeGridError::UnsupportedPeriod(format!(
            "'{period}': {unit}s have no fixed length"
        )));
    }
    Ok(period.parse::<Period>()?.duration())
}
