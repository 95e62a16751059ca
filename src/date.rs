//! Calendar dates restricted to a barcode format's precision
//!
//! Date fields in serialized barcodes carry less information than a full
//! calendar date: the ubiquitous `YYMMDD` layout has a two-digit year, and a
//! day component of `00` denotes "the end of the named month" rather than a
//! specific day. [`BarcodeDate`] preserves both views of such a value: the
//! raw six characters exactly as scanned (so re-serialization is
//! byte-faithful) and the resolved [`chrono::NaiveDate`] alongside the
//! [`DatePrecision`] the raw form was able to express.

use std::fmt::{Display, Formatter};

use chrono::{Datelike, NaiveDate};

use crate::error::ValidateError;

/// Precision a serialized date was able to express.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DatePrecision {
    /// Year, month and day were all present
    Day,
    /// Day was elided (`00`); the resolved date is the last day of the month
    Month,
}

/// A validated date field value: the raw serialized characters plus the
/// resolved calendar date.
///
/// Construction through [`BarcodeDate::parse_yymmdd`] is the only way to
/// obtain an instance, so every value in circulation satisfies the `YYMMDD`
/// grammar and resolves to a real calendar date.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct BarcodeDate {
    raw: String,
    date: NaiveDate,
    precision: DatePrecision,
}

impl BarcodeDate {
    /// Parses a six-character `YYMMDD` value.
    ///
    /// Two-digit years are resolved into the 2000s. A day component of `00`
    /// resolves to the last day of the month with [`DatePrecision::Month`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidateError::Malformed`] unless the input is exactly six
    /// ASCII digits naming a resolvable month (and day, when non-zero).
    ///
    /// # Examples
    ///
    /// ```
    /// # use scansion::date::{BarcodeDate, DatePrecision};
    /// let eom = BarcodeDate::parse_yymmdd("230600").unwrap();
    /// assert_eq!(eom.precision(), DatePrecision::Month);
    /// assert_eq!(eom.raw(), "230600");
    /// assert_eq!(eom.date().to_string(), "2023-06-30");
    /// ```
    pub fn parse_yymmdd(raw: &str) -> Result<Self, ValidateError> {
        let malformed = || ValidateError::Malformed {
            value: raw.to_owned(),
            expected: "YYMMDD",
        };
        if raw.len() != 6 || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let component = |range: std::ops::Range<usize>| -> u32 {
            // validated as all-digit above, so the unwrap path is dead
            raw[range].parse().unwrap_or_default()
        };
        let year = 2000 + component(0..2) as i32;
        let month = component(2..4);
        let day = component(4..6);

        let (date, precision) = if day == 0 {
            (
                last_day_of_month(year, month).ok_or_else(malformed)?,
                DatePrecision::Month,
            )
        } else {
            (
                NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)?,
                DatePrecision::Day,
            )
        };
        Ok(Self {
            raw: raw.to_owned(),
            date,
            precision,
        })
    }

    /// Returns the raw serialized characters this value was parsed from.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the resolved calendar date.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Returns the precision the raw form expressed.
    #[must_use]
    pub fn precision(&self) -> DatePrecision {
        self.precision
    }

    /// Returns the resolved year, including the implied century.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

impl Display for BarcodeDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.precision {
            DatePrecision::Day => Display::fmt(&self.date, f),
            DatePrecision::Month => write!(f, "{:04}-{:02}", self.date.year(), self.date.month()),
        }
    }
}

#[cfg(feature = "serde_impls")]
impl serde::Serialize for BarcodeDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    if !(1..=12).contains(&month) {
        return None;
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()
}

#[cfg(test)]
mod date_tests {
    use super::*;

    #[test]
    fn day_precision_roundtrips_raw() {
        let date = BarcodeDate::parse_yymmdd("251231").unwrap();
        assert_eq!(date.precision(), DatePrecision::Day);
        assert_eq!(date.raw(), "251231");
        assert_eq!(date.date(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn zero_day_resolves_to_end_of_month() {
        let feb = BarcodeDate::parse_yymmdd("240200").unwrap();
        assert_eq!(feb.precision(), DatePrecision::Month);
        assert_eq!(feb.date(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let dec = BarcodeDate::parse_yymmdd("231200").unwrap();
        assert_eq!(dec.date(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        for bad in ["", "2306", "23063012", "2306AA", "231330", "230231", "230034", "230000"] {
            let err = BarcodeDate::parse_yymmdd(bad).unwrap_err();
            assert!(
                matches!(err, ValidateError::Malformed { .. }),
                "expected Malformed for {bad:?}, got {err:?}"
            );
        }
    }

    #[test]
    fn display_reflects_precision() {
        assert_eq!(BarcodeDate::parse_yymmdd("230630").unwrap().to_string(), "2023-06-30");
        assert_eq!(BarcodeDate::parse_yymmdd("230600").unwrap().to_string(), "2023-06");
    }
}
