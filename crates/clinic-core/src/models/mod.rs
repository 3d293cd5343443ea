//! Domain models for the clinic desk.

mod appointment;
mod medical_record;
mod patient;
mod staff;
mod time;

pub use appointment::*;
pub use medical_record::*;
pub use patient::*;
pub use staff::*;
pub use time::*;

use thiserror::Error;

/// Errors raised while parsing model values from their wire spelling.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Unknown appointment status: {0}")]
    UnknownStatus(String),

    #[error("Unknown staff role: {0}")]
    UnknownRole(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

/// Trim a free-text field, mapping blank input to `None`.
pub fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
