//! Symbology identifier preamble handling
//!
//! Barcode readers conforming to ISO/IEC 15424 prepend a short preamble to
//! every transmitted reading: a flag character `]`, followed by one *code
//! character* identifying the symbology of the scanned symbol, followed by one
//! or more *modifier characters* describing optional processing the reader
//! applied (check-character verification, stripping, full-ASCII conversion,
//! and so on).
//!
//! This module defines [`SymbologyIdentifier`], the immutable value extracted
//! from that preamble, along with the free function [`strip_identifier`] that
//! removes the preamble from a reading, and [`ReaderModifier`], the
//! informational record of reader-side processing that a decoded barcode may
//! carry.
//!
//! The preamble is reader metadata, not barcode data: it never participates in
//! the equality of a decoded record, and formats that do not use a preamble
//! consume the raw reading as-is.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Flag character marking the start of a symbology identifier preamble.
pub const SYMBOLOGY_FLAG: char = ']';

/// Errors arising while locating the symbology identifier within the leading
/// characters of a raw reading.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PreambleError {
    /// The raw reading was empty
    Empty,
    /// The raw reading ended before the full identifier
    TooShort { required: usize, actual: usize },
}

impl Display for PreambleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PreambleError::Empty => write!(f, "cannot extract symbology identifier from empty reading"),
            PreambleError::TooShort { required, actual } => {
                write!(
                    f,
                    "reading of {actual} characters is shorter than the {required} required for a symbology identifier"
                )
            }
        }
    }
}

impl Error for PreambleError {}

/// Errors arising when an extracted identifier is matched against the finite
/// set of identifier values a concrete format recognizes.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SymbologyError {
    /// The preamble itself could not be extracted
    Preamble(PreambleError),
    /// The identifier is well-formed but not in the recognized set
    Unrecognized { identifier: String },
}

impl From<PreambleError> for SymbologyError {
    fn from(err: PreambleError) -> Self {
        Self::Preamble(err)
    }
}

impl Display for SymbologyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SymbologyError::Preamble(err) => Display::fmt(err, f),
            SymbologyError::Unrecognized { identifier } => {
                write!(f, "unrecognized symbology identifier `{identifier}`")
            }
        }
    }
}

impl Error for SymbologyError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            SymbologyError::Preamble(err) => Some(err),
            SymbologyError::Unrecognized { .. } => None,
        }
    }
}

/// Immutable symbology identifier extracted from the front of a raw reading.
///
/// The identifier is invariably the two characters following the
/// [`SYMBOLOGY_FLAG`] when the flag is present, or the two leading characters
/// of the reading otherwise. The first is the code character, the remainder
/// are the modifier characters.
///
/// Equality, ordering and hashing are all defined over the identifier string.
///
/// # Examples
///
/// ```
/// # use scansion::symbology::SymbologyIdentifier;
/// let id = SymbologyIdentifier::parse("]C10112345").unwrap();
/// assert_eq!(id.identifier(), "C1");
/// assert_eq!(id.code_character(), 'C');
/// assert_eq!(id.modifier_characters(), "1");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct SymbologyIdentifier {
    identifier: String,
}

impl SymbologyIdentifier {
    /// Extracts the symbology identifier from the leading characters of a raw
    /// reading.
    ///
    /// # Errors
    ///
    /// Returns [`PreambleError::Empty`] for an empty reading, and
    /// [`PreambleError::TooShort`] when the reading holds fewer than 3
    /// characters (flagged) or fewer than 2 (unflagged).
    pub fn parse(raw_reading: &str) -> Result<Self, PreambleError> {
        if raw_reading.is_empty() {
            return Err(PreambleError::Empty);
        }
        let flagged = raw_reading.starts_with(SYMBOLOGY_FLAG);
        let required = if flagged { 3 } else { 2 };
        let skip = usize::from(flagged);
        let identifier: String = raw_reading.chars().skip(skip).take(2).collect();
        if identifier.chars().count() < 2 {
            return Err(PreambleError::TooShort {
                required,
                actual: raw_reading.chars().count(),
            });
        }
        Ok(Self { identifier })
    }

    /// Extracts the identifier and checks it against the finite set of
    /// identifier values recognized by one concrete format.
    ///
    /// # Errors
    ///
    /// Returns [`SymbologyError::Unrecognized`] when the extracted identifier
    /// is not a member of `recognized`, and propagates any [`PreambleError`]
    /// from extraction itself.
    pub fn from_reading(
        raw_reading: &str,
        recognized: &[&str],
    ) -> Result<Self, SymbologyError> {
        let id = Self::parse(raw_reading)?;
        if recognized.contains(&id.identifier()) {
            Ok(id)
        } else {
            Err(SymbologyError::Unrecognized {
                identifier: id.identifier,
            })
        }
    }

    /// Returns the full two-character identifier string.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the code character: the first character of the identifier,
    /// naming the symbology the reading originated from.
    #[must_use]
    pub fn code_character(&self) -> char {
        // parse admits only two-character identifiers
        self.identifier.chars().next().unwrap_or_default()
    }

    /// Returns the modifier characters: everything after the code character.
    #[must_use]
    pub fn modifier_characters(&self) -> &str {
        match self.identifier.char_indices().nth(1) {
            Some((idx, _)) => &self.identifier[idx..],
            None => "",
        }
    }

    /// Tests membership of this identifier in a recognized set.
    #[must_use]
    pub fn is_one_of(&self, recognized: &[&str]) -> bool {
        recognized.contains(&self.identifier())
    }
}

impl Display for SymbologyIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.identifier)
    }
}

#[cfg(feature = "serde_impls")]
impl serde::Serialize for SymbologyIdentifier {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.identifier)
    }
}

/// Removes the flag and two-character identifier from the front of a reading.
///
/// When the reading does not start with the [`SYMBOLOGY_FLAG`], or is too
/// short to hold both a preamble and a payload, the input is returned
/// unchanged. Stripping is therefore idempotent: a second application is a
/// no-op because the flag is gone.
///
/// # Examples
///
/// ```
/// # use scansion::symbology::strip_identifier;
/// assert_eq!(strip_identifier("]C10195012345678903"), "0195012345678903");
/// assert_eq!(strip_identifier("0195012345678903"), "0195012345678903");
/// ```
#[must_use]
pub fn strip_identifier(raw_reading: &str) -> &str {
    if !raw_reading.starts_with(SYMBOLOGY_FLAG) {
        return raw_reading;
    }
    match raw_reading.char_indices().nth(3) {
        Some((idx, _)) => &raw_reading[idx..],
        None => raw_reading,
    }
}

/// Informational record of reader-side processing applied to a scan, such as
/// whether a trailing check character was verified or stripped before
/// transmission.
///
/// A reader modifier is not a barcode field. It may be attached to a decoded
/// record as a decoding-time hint, but it never participates in the equality
/// of the record it is attached to.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ReaderModifier {
    value: String,
}

impl ReaderModifier {
    /// Wraps a modifier-character string as transmitted by the reader.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Returns the modifier-character string.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for ReaderModifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

#[cfg(test)]
mod symbology_tests {
    use super::*;

    #[test]
    fn flagged_reading_yields_inner_characters() {
        let id = SymbologyIdentifier::parse("]d201034531200000111719112510ABCD1234").unwrap();
        assert_eq!(id.identifier(), "d2");
        assert_eq!(id.code_character(), 'd');
        assert_eq!(id.modifier_characters(), "2");
    }

    #[test]
    fn unflagged_reading_yields_leading_characters() {
        let id = SymbologyIdentifier::parse("E0123456").unwrap();
        assert_eq!(id.identifier(), "E0");
    }

    #[test]
    fn empty_reading_is_rejected() {
        assert_eq!(SymbologyIdentifier::parse(""), Err(PreambleError::Empty));
    }

    #[test]
    fn short_readings_are_rejected() {
        assert_eq!(
            SymbologyIdentifier::parse("]C"),
            Err(PreambleError::TooShort {
                required: 3,
                actual: 2
            })
        );
        assert_eq!(
            SymbologyIdentifier::parse("X"),
            Err(PreambleError::TooShort {
                required: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn flagged_reading_of_exactly_three_characters_parses() {
        let id = SymbologyIdentifier::parse("]A0").unwrap();
        assert_eq!(id.identifier(), "A0");
    }

    #[test]
    fn recognized_set_is_enforced() {
        let err = SymbologyIdentifier::from_reading("]X912345", &["C1", "E0"]).unwrap_err();
        assert_eq!(
            err,
            SymbologyError::Unrecognized {
                identifier: "X9".to_owned()
            }
        );
        assert!(SymbologyIdentifier::from_reading("]C112345", &["C1", "E0"]).is_ok());
    }

    #[test]
    fn strip_removes_flag_and_identifier_once() {
        let stripped = strip_identifier("]C10105449000000996");
        assert_eq!(stripped, "0105449000000996");
        assert_eq!(strip_identifier(stripped), stripped);
    }

    #[test]
    fn strip_leaves_short_or_unflagged_readings_alone() {
        assert_eq!(strip_identifier("]C1"), "]C1");
        assert_eq!(strip_identifier("]C"), "]C");
        assert_eq!(strip_identifier("0105"), "0105");
        assert_eq!(strip_identifier(""), "");
    }

    #[test]
    fn identifier_equality_is_by_string() {
        let a = SymbologyIdentifier::parse("]C1rest-of-payload").unwrap();
        let b = SymbologyIdentifier::parse("]C1other-payload").unwrap();
        assert_eq!(a, b);
        assert!(a < SymbologyIdentifier::parse("]E0x").unwrap());
    }
}
