//! Error types for time-grid operations.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeGridError {
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),

    #[error("Unsupported period: {0}")]
    UnsupportedPeriod(String),

    #[error("Missing timezone: {0}")]
    MissingTimezone(String),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Invalid datetime: {0}")]
    InvalidDatetime(String),

    #[error("Datetime out of range: {0}")]
    OutOfRange(String),
}

pub type Result<T> = std::result::Result<T, TimeGridError>;
