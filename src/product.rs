//! Validated product code values
//!
//! A [`ProductCode`] is the primary payload of most linear barcodes: the
//! article number identifying what was scanned. Different symbologies impose
//! different grammars on it, so each value carries a [`ProductCodeKind`]
//! naming the grammar it was validated against.
//!
//! The named constructors are the only way to obtain a `ProductCode`; each
//! enforces the character set, shape and (where the grammar has one) the
//! mod-10 check digit at construction, so no unvalidated instance can reach a
//! field collection.

use std::fmt::{Display, Formatter};

use crate::error::ValidateError;

/// Character set of the Code 39 symbology, excluding the `*` delimiters that
/// readers never transmit.
pub const CODE39_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ -.$/+%";

/// Grammar a [`ProductCode`] was validated against.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ProductCodeKind {
    /// 14-digit GTIN with verified mod-10 check digit
    Gtin,
    /// 6- to 13-digit EAN/UPC article number with verified mod-10 check digit
    Ean,
    /// Code 39 label text
    Code39,
}

/// A validated product code.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ProductCode {
    value: String,
    kind: ProductCodeKind,
}

impl ProductCode {
    /// Validates a 14-digit GTIN, verifying its mod-10 check digit.
    ///
    /// # Errors
    ///
    /// [`ValidateError::Charset`] for non-digit characters,
    /// [`ValidateError::Malformed`] for a length other than 14, and
    /// [`ValidateError::Checksum`] when the check digit does not match.
    pub fn gtin(value: &str) -> Result<Self, ValidateError> {
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidateError::Charset {
                value: value.to_owned(),
            });
        }
        if value.len() != 14 {
            return Err(ValidateError::Malformed {
                value: value.to_owned(),
                expected: "14-digit GTIN",
            });
        }
        Self::checked_mod10(value, ProductCodeKind::Gtin)
    }

    /// Validates an EAN/UPC article number of 6 to 13 digits, verifying its
    /// mod-10 check digit.
    ///
    /// # Errors
    ///
    /// [`ValidateError::Charset`] for non-digit characters,
    /// [`ValidateError::Malformed`] for a length outside `6..=13`, and
    /// [`ValidateError::Checksum`] when the check digit does not match.
    pub fn ean(value: &str) -> Result<Self, ValidateError> {
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidateError::Charset {
                value: value.to_owned(),
            });
        }
        if !(6..=13).contains(&value.len()) {
            return Err(ValidateError::Malformed {
                value: value.to_owned(),
                expected: "6- to 13-digit EAN",
            });
        }
        Self::checked_mod10(value, ProductCodeKind::Ean)
    }

    /// Validates a Code 39 label against the transmissible Code 39 character
    /// set.
    ///
    /// # Errors
    ///
    /// [`ValidateError::Charset`] when any character falls outside
    /// [`CODE39_CHARSET`].
    pub fn code39(value: &str) -> Result<Self, ValidateError> {
        if value.chars().all(|c| CODE39_CHARSET.contains(c)) {
            Ok(Self {
                value: value.to_owned(),
                kind: ProductCodeKind::Code39,
            })
        } else {
            Err(ValidateError::Charset {
                value: value.to_owned(),
            })
        }
    }

    fn checked_mod10(value: &str, kind: ProductCodeKind) -> Result<Self, ValidateError> {
        if has_valid_mod10(value) {
            Ok(Self {
                value: value.to_owned(),
                kind,
            })
        } else {
            Err(ValidateError::Checksum {
                value: value.to_owned(),
            })
        }
    }

    /// Returns the code itself, exactly as validated.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.value
    }

    /// Returns the grammar this code was validated against.
    #[must_use]
    pub fn kind(&self) -> ProductCodeKind {
        self.kind
    }
}

impl Display for ProductCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(feature = "serde_impls")]
impl serde::Serialize for ProductCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.value)
    }
}

/// Computes the GS1 mod-10 check digit over a digit string (which must not
/// include the check digit itself): weights alternate 3, 1, 3, ... from the
/// rightmost digit.
#[must_use]
pub(crate) fn mod10_check_digit(payload: &str) -> u32 {
    let sum: u32 = payload
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let digit = u32::from(b - b'0');
            if i % 2 == 0 {
                digit * 3
            } else {
                digit
            }
        })
        .sum();
    (10 - sum % 10) % 10
}

/// Verifies the trailing mod-10 check digit of an all-digit string.
fn has_valid_mod10(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let Some(payload) = value.get(..value.len() - 1) else {
        return false;
    };
    let Some(check) = value.bytes().last().map(|b| u32::from(b - b'0')) else {
        return false;
    };
    mod10_check_digit(payload) == check
}

#[cfg(test)]
mod product_tests {
    use super::*;

    #[test]
    fn known_check_digits_verify() {
        // 5449000000996 and 96385074 are published EAN-13/EAN-8 examples
        assert!(ProductCode::ean("5449000000996").is_ok());
        assert!(ProductCode::ean("96385074").is_ok());
        assert!(ProductCode::gtin("05449000000996").is_ok());
    }

    #[test]
    fn corrupted_check_digits_are_rejected() {
        assert_eq!(
            ProductCode::ean("5449000000997"),
            Err(ValidateError::Checksum {
                value: "5449000000997".to_owned()
            })
        );
        assert!(matches!(
            ProductCode::gtin("05449000000990"),
            Err(ValidateError::Checksum { .. })
        ));
    }

    #[test]
    fn gtin_shape_is_enforced() {
        assert!(matches!(
            ProductCode::gtin("5449000000996"),
            Err(ValidateError::Malformed { .. })
        ));
        assert!(matches!(
            ProductCode::gtin("0544900000099X"),
            Err(ValidateError::Charset { .. })
        ));
    }

    #[test]
    fn ean_length_band_is_enforced() {
        assert!(matches!(
            ProductCode::ean("12345"),
            Err(ValidateError::Malformed { .. })
        ));
        assert!(matches!(
            ProductCode::ean("12345678901234"),
            Err(ValidateError::Malformed { .. })
        ));
    }

    #[test]
    fn code39_charset_is_enforced() {
        assert!(ProductCode::code39("ABC-123.$/+% 9").is_ok());
        assert!(matches!(
            ProductCode::code39("abc123"),
            Err(ValidateError::Charset { .. })
        ));
        assert!(matches!(
            ProductCode::code39("ABC\u{1}23"),
            Err(ValidateError::Charset { .. })
        ));
    }

    #[test]
    fn check_digit_computation_matches_published_values() {
        assert_eq!(mod10_check_digit("544900000099"), 6);
        assert_eq!(mod10_check_digit("9638507"), 4);
        assert_eq!(mod10_check_digit("0544900000099"), 6);
    }
}
