//! General validation error types
//!
//! This module contains the error types shared by every field codec in the
//! crate: [`LengthError`] for violations of a field's declared serialized
//! length bounds, and [`ValidateError`] for rejections by a codec's
//! character-set or structural grammar checks.
//!
//! More specific error families (preamble extraction, field typing, dispatch)
//! are defined alongside the components that produce them, and compose these
//! types via `From` conversions.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Enumerated error type for failures related to fields that impose
/// lower or upper bounds on the character-count of their serialized values.
///
/// Length bounds are checked before any character-set or grammar validation
/// runs, so a value that is both too long and malformed reports `TooLong`.
#[derive(Clone, Copy, PartialEq, PartialOrd, Eq, Ord, Debug)]
pub enum LengthError {
    /// Restriction on maximum character-count exceeded
    TooLong { limit: usize, actual: usize },
    /// Restriction on minimum character-count not met
    TooShort { limit: usize, actual: usize },
}

impl Display for LengthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LengthError::TooLong { limit, actual } => {
                write!(f, "{actual}-character value exceeded limit of {limit} characters")
            }
            LengthError::TooShort { limit, actual } => {
                write!(
                    f,
                    "{actual}-character value fell short of minimum of {limit} characters"
                )
            }
        }
    }
}

impl Error for LengthError {}

/// Error type representing all possible conditions of invalidity a field
/// codec may report about an in-bounds raw value, or about an already-typed
/// value being re-admitted from another layer.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ValidateError {
    /// Value contains a character outside the codec's allowed set
    Charset { value: String },
    /// Check digit or check character does not match the computed value
    Checksum { value: String },
    /// Value is in the allowed character set but does not satisfy the
    /// codec's structural grammar (wrong shape, unresolvable date, ...)
    Malformed {
        value: String,
        expected: &'static str,
    },
}

impl Display for ValidateError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidateError::Charset { value } => {
                write!(f, "illegal character in value `{value}`")
            }
            ValidateError::Checksum { value } => {
                write!(f, "check digit mismatch in value `{value}`")
            }
            ValidateError::Malformed { value, expected } => {
                write!(f, "value `{value}` does not match expected shape {expected}")
            }
        }
    }
}

impl Error for ValidateError {}

#[cfg(test)]
mod error_tests {
    use super::*;

    fn assert_threadsafe<T: Send + Sync>() {}

    #[test]
    fn validation_errors_threadsafe() {
        assert_threadsafe::<LengthError>();
        assert_threadsafe::<ValidateError>();
    }

    #[test]
    fn length_error_reports_counts() {
        let msg = LengthError::TooLong {
            limit: 20,
            actual: 23,
        }
        .to_string();
        assert!(msg.contains("23") && msg.contains("20"));
    }
}
