//! # time-grid
//!
//! Deterministic rounding and snapping of timestamps to civil time grids.
//!
//! A grid is named by a period descriptor such as `"minute-15"`, `"hour"`
//! or `"week"`. Boundaries are laid out on the wall clock of a timezone, so
//! "top of the hour in Amman" means what a clock in Amman shows, including
//! across daylight-saving transitions where naive offset arithmetic goes
//! wrong.
//!
//! ## Modules
//!
//! - [`period`] — period descriptors → unit, quantity and nominal duration
//! - [`civil`] — civil-field struct and the per-unit truncation table
//! - [`localize`](mod@localize) — civil time → instant, with the gap/overlap policy
//! - [`round`] — floor, ceiling and nearest-quarter-hour rounding
//! - [`snap`] — boundary test against the immediately preceding instant
//! - [`error`] — Error types
//!
//! ## DST policy
//!
//! A truncated civil time that falls in a spring-forward gap resolves to
//! the transition instant. One that occurs twice in a fall-back overlap
//! resolves to its first occurrence.

pub mod civil;
pub mod error;
pub mod localize;
pub mod period;
pub mod round;
pub mod snap;

pub use civil::{iso_week_monday, CivilFields};
pub use error::{Result, TimeGridError};
pub use localize::{localize, parse_timezone};
pub use period::{parse_period, period_to_duration, Period, Unit};
pub use round::{
    round_down, round_down_naive, round_to_15min, round_to_15min_naive, round_up, round_up_naive,
    RoundOptions,
};
pub use snap::{is_snapped_to, is_snapped_to_15min, is_snapped_to_15min_naive, is_snapped_to_naive};
