//! Core of the per-field parse/validate/build API
//!
//! Every field a concrete barcode format declares is transcoded through one
//! implementor of the [`FieldCodec`] trait. A codec supplies three things:
//! the character-set/grammar predicate over raw strings, the conversion from
//! an in-bounds raw string to the field's semantic type, and the reverse
//! serialization. Everything else — length-bound enforcement, the
//! empty-means-absent rule, re-validation on the build path, and the
//! re-admission of already-typed values — is provided once, here, and reused
//! identically by every codec.
//!
//! Running the same validation on both the decode and the encode path is what
//! guarantees the round-trip property: [`FieldCodec::build_field`] can never
//! emit a string that [`FieldCodec::parse_field`] would reject.
//!
//! Because one decoded record mixes fields of several semantic types, field
//! slots store the closed sum [`FieldValue`] rather than a generic parameter;
//! admitting a value of the wrong variant into a slot is a [`TypeError`].

pub mod collection;

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::date::BarcodeDate;
use crate::error::{LengthError, ValidateError};
use crate::product::ProductCode;

/// Optional lower/upper bounds on the serialized character-count of a field.
///
/// Bounds are checked before any character-set or grammar validation, and
/// only against non-empty raw values: emptiness denotes absence, which the
/// bounds do not constrain.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct LengthBounds {
    pub min: Option<usize>,
    pub max: Option<usize>,
}

impl LengthBounds {
    /// Bounds that admit any length.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            min: None,
            max: None,
        }
    }

    /// An upper bound only.
    #[must_use]
    pub const fn at_most(max: usize) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    /// Both bounds, inclusive.
    #[must_use]
    pub const fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    /// A single admissible length.
    #[must_use]
    pub const fn exactly(len: usize) -> Self {
        Self::between(len, len)
    }

    /// Checks a character-count against these bounds.
    ///
    /// # Errors
    ///
    /// [`LengthError::TooLong`] or [`LengthError::TooShort`] on violation;
    /// the upper bound is checked first.
    pub fn check(&self, actual: usize) -> Result<(), LengthError> {
        if let Some(limit) = self.max {
            if actual > limit {
                return Err(LengthError::TooLong { limit, actual });
            }
        }
        if let Some(limit) = self.min {
            if actual < limit {
                return Err(LengthError::TooShort { limit, actual });
            }
        }
        Ok(())
    }
}

/// Discriminant of the semantic types a field slot can hold.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum FieldKind {
    ProductCode,
    Date,
    Text,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldKind::ProductCode => "product code",
            FieldKind::Date => "date",
            FieldKind::Text => "text",
        };
        f.write_str(name)
    }
}

/// Closed sum over the semantic types the supported formats use for their
/// fields.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FieldValue {
    ProductCode(ProductCode),
    Date(BarcodeDate),
    Text(String),
}

impl FieldValue {
    /// Returns the discriminant of this value.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::ProductCode(_) => FieldKind::ProductCode,
            FieldValue::Date(_) => FieldKind::Date,
            FieldValue::Text(_) => FieldKind::Text,
        }
    }
}

impl From<ProductCode> for FieldValue {
    fn from(value: ProductCode) -> Self {
        Self::ProductCode(value)
    }
}

impl From<BarcodeDate> for FieldValue {
    fn from(value: BarcodeDate) -> Self {
        Self::Date(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Error reported when a [`FieldValue`] of one variant is admitted into a
/// context expecting another.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TypeError {
    pub expected: FieldKind,
    pub actual: FieldKind,
}

impl Display for TypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "received a {} value but expected a {} value",
            self.actual, self.expected
        )
    }
}

impl Error for TypeError {}

impl TryFrom<FieldValue> for ProductCode {
    type Error = TypeError;

    fn try_from(value: FieldValue) -> Result<Self, Self::Error> {
        match value {
            FieldValue::ProductCode(code) => Ok(code),
            other => Err(TypeError {
                expected: FieldKind::ProductCode,
                actual: other.kind(),
            }),
        }
    }
}

impl TryFrom<FieldValue> for BarcodeDate {
    type Error = TypeError;

    fn try_from(value: FieldValue) -> Result<Self, Self::Error> {
        match value {
            FieldValue::Date(date) => Ok(date),
            other => Err(TypeError {
                expected: FieldKind::Date,
                actual: other.kind(),
            }),
        }
    }
}

impl TryFrom<FieldValue> for String {
    type Error = TypeError;

    fn try_from(value: FieldValue) -> Result<Self, Self::Error> {
        match value {
            FieldValue::Text(text) => Ok(text),
            other => Err(TypeError {
                expected: FieldKind::Text,
                actual: other.kind(),
            }),
        }
    }
}

/// Enumeration over everything that can go wrong while admitting a value
/// into, or serializing a value out of, a single field slot.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FieldError {
    /// Declared length bounds were violated
    Length(LengthError),
    /// The codec's character-set or grammar check rejected the value
    Invalid(ValidateError),
    /// An already-typed value had the wrong variant for the slot
    Type(TypeError),
}

impl From<LengthError> for FieldError {
    fn from(err: LengthError) -> Self {
        Self::Length(err)
    }
}

impl From<ValidateError> for FieldError {
    fn from(err: ValidateError) -> Self {
        Self::Invalid(err)
    }
}

impl From<TypeError> for FieldError {
    fn from(err: TypeError) -> Self {
        Self::Type(err)
    }
}

impl Display for FieldError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldError::Length(err) => Display::fmt(err, f),
            FieldError::Invalid(err) => Display::fmt(err, f),
            FieldError::Type(err) => Display::fmt(err, f),
        }
    }
}

impl Error for FieldError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FieldError::Length(err) => Some(err),
            FieldError::Invalid(err) => Some(err),
            FieldError::Type(err) => Some(err),
        }
    }
}

/// The parse/validate/build contract each concrete field type implements.
///
/// Implementors provide only the format-specific pieces: [`validate`] (the
/// character-set/grammar predicate), [`parse`] (raw string to semantic
/// value), [`build`] (semantic value back to its canonical raw string), and
/// optionally [`validate_value`]/[`validate_value_length`] for constraints
/// that apply to already-typed values. The provided methods compose these
/// with the shared length and emptiness rules and are not meant to be
/// overridden.
///
/// [`validate`]: FieldCodec::validate
/// [`parse`]: FieldCodec::parse
/// [`build`]: FieldCodec::build
/// [`validate_value`]: FieldCodec::validate_value
/// [`validate_value_length`]: FieldCodec::validate_value_length
pub trait FieldCodec {
    /// The field's semantic type.
    type Value: Into<FieldValue> + TryFrom<FieldValue, Error = TypeError>;

    /// Character-set/grammar predicate over a non-empty raw value.
    fn validate(&self, raw: &str) -> Result<(), ValidateError>;

    /// Converts an in-bounds, charset-valid raw value into the semantic type.
    ///
    /// May still fail for structural reasons the flat charset check cannot
    /// see, such as an unresolvable date or a check-digit mismatch.
    fn parse(&self, raw: &str) -> Result<Self::Value, ValidateError>;

    /// Serializes a semantic value into its canonical raw form.
    fn build(&self, value: &Self::Value) -> String;

    /// Semantic re-validation of an already-typed value.
    fn validate_value(&self, _value: &Self::Value) -> Result<(), ValidateError> {
        Ok(())
    }

    /// Length re-validation of an already-typed value against declared
    /// bounds, phrased over the value's own semantic constraints rather than
    /// a serialized string.
    fn validate_value_length(
        &self,
        _value: &Self::Value,
        _bounds: &LengthBounds,
    ) -> Result<(), LengthError> {
        Ok(())
    }

    /// Parses one raw field occurrence.
    ///
    /// Length bounds are enforced first, then emptiness is resolved
    /// (`None` for an empty or all-whitespace raw value), then the codec's
    /// own validation and conversion run.
    ///
    /// # Errors
    ///
    /// [`FieldError::Length`] on a bounds violation, [`FieldError::Invalid`]
    /// on charset/grammar rejection.
    fn parse_field(
        &self,
        raw: Option<&str>,
        bounds: &LengthBounds,
    ) -> Result<Option<Self::Value>, FieldError> {
        let raw = raw.unwrap_or_default();
        if !raw.is_empty() {
            bounds.check(raw.chars().count())?;
        }
        if raw.trim().is_empty() {
            return Ok(None);
        }
        self.validate(raw)?;
        Ok(Some(self.parse(raw)?))
    }

    /// Re-admits an already-typed value coming from another layer, re-running
    /// the codec's semantic checks.
    ///
    /// # Errors
    ///
    /// [`FieldError::Type`] when the value's variant does not match
    /// [`Self::Value`], otherwise the same validity checks as
    /// [`parse_field`](FieldCodec::parse_field) applied to the typed value's
    /// own constraints.
    fn accept_value(
        &self,
        value: Option<FieldValue>,
        bounds: &LengthBounds,
    ) -> Result<Option<Self::Value>, FieldError> {
        let Some(value) = value else {
            return Ok(None);
        };
        let typed = Self::Value::try_from(value)?;
        self.validate_value(&typed)?;
        self.validate_value_length(&typed, bounds)?;
        Ok(Some(typed))
    }

    /// Serializes one field occurrence, re-validating first so that the
    /// output is guaranteed to be re-parseable by this same codec.
    ///
    /// Absent values (and values that serialize to the empty string) yield
    /// `None`.
    ///
    /// # Errors
    ///
    /// [`FieldError::Invalid`] when re-validation rejects the value.
    fn build_field(&self, value: Option<&Self::Value>) -> Result<Option<String>, FieldError> {
        let Some(value) = value else {
            return Ok(None);
        };
        self.validate_value(value)?;
        let raw = self.build(value);
        if raw.is_empty() {
            return Ok(None);
        }
        self.validate(&raw)?;
        Ok(Some(raw))
    }
}

/// Generic text codec over the alphanumeric character set `[0-9A-Za-z]`.
///
/// Used for free-text fields such as batch and serial numbers, and as the
/// reference codec for the crate's charset-rejection behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlphanumericCodec;

impl FieldCodec for AlphanumericCodec {
    type Value = String;

    fn validate(&self, raw: &str) -> Result<(), ValidateError> {
        if raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Ok(())
        } else {
            Err(ValidateError::Charset {
                value: raw.to_owned(),
            })
        }
    }

    fn parse(&self, raw: &str) -> Result<Self::Value, ValidateError> {
        Ok(raw.to_owned())
    }

    fn build(&self, value: &Self::Value) -> String {
        value.clone()
    }

    fn validate_value(&self, value: &Self::Value) -> Result<(), ValidateError> {
        if value.is_empty() {
            return Ok(());
        }
        self.validate(value)
    }

    fn validate_value_length(
        &self,
        value: &Self::Value,
        bounds: &LengthBounds,
    ) -> Result<(), LengthError> {
        if value.is_empty() {
            return Ok(());
        }
        bounds.check(value.chars().count())
    }
}

#[cfg(test)]
mod codec_tests {
    use super::*;

    const FULL_ALPHABET: &str =
        "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

    #[test]
    fn alphanumeric_accepts_entire_alphabet_and_builds_back() {
        let codec = AlphanumericCodec;
        let parsed = codec
            .parse_field(Some(FULL_ALPHABET), &LengthBounds::none())
            .unwrap()
            .unwrap();
        assert_eq!(parsed, FULL_ALPHABET);
        let rebuilt = codec.build_field(Some(&parsed)).unwrap().unwrap();
        assert_eq!(rebuilt, FULL_ALPHABET);
    }

    #[test]
    fn alphanumeric_rejects_foreign_characters() {
        let codec = AlphanumericCodec;
        let rejected = format!("!\"$012^3456789ABCDEF{}KL#MTU Vh\ni", '\u{1}');
        let err = codec
            .parse_field(Some(&rejected), &LengthBounds::none())
            .unwrap_err();
        assert!(matches!(err, FieldError::Invalid(ValidateError::Charset { .. })));
    }

    #[test]
    fn bounds_are_checked_before_charset() {
        let codec = AlphanumericCodec;
        // four characters, all illegal: the length violation must win
        let err = codec
            .parse_field(Some("!!!!"), &LengthBounds::at_most(3))
            .unwrap_err();
        assert_eq!(
            err,
            FieldError::Length(LengthError::TooLong {
                limit: 3,
                actual: 4
            })
        );
        let err = codec
            .parse_field(Some("!"), &LengthBounds::between(2, 3))
            .unwrap_err();
        assert_eq!(
            err,
            FieldError::Length(LengthError::TooShort {
                limit: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn empty_and_whitespace_raw_values_are_absent() {
        let codec = AlphanumericCodec;
        assert_eq!(codec.parse_field(None, &LengthBounds::none()).unwrap(), None);
        assert_eq!(
            codec.parse_field(Some(""), &LengthBounds::none()).unwrap(),
            None
        );
        assert_eq!(
            codec
                .parse_field(Some("   "), &LengthBounds::none())
                .unwrap(),
            None
        );
    }

    #[test]
    fn typed_readmission_rejects_wrong_variant() {
        let codec = AlphanumericCodec;
        let date = crate::date::BarcodeDate::parse_yymmdd("230630").unwrap();
        let err = codec
            .accept_value(Some(FieldValue::Date(date)), &LengthBounds::none())
            .unwrap_err();
        assert_eq!(
            err,
            FieldError::Type(TypeError {
                expected: FieldKind::Text,
                actual: FieldKind::Date
            })
        );
    }

    #[test]
    fn typed_readmission_reapplies_semantic_checks() {
        let codec = AlphanumericCodec;
        let err = codec
            .accept_value(
                Some(FieldValue::Text("not ok".to_owned())),
                &LengthBounds::none(),
            )
            .unwrap_err();
        assert!(matches!(err, FieldError::Invalid(ValidateError::Charset { .. })));
        let err = codec
            .accept_value(
                Some(FieldValue::Text("toolong".to_owned())),
                &LengthBounds::at_most(3),
            )
            .unwrap_err();
        assert!(matches!(err, FieldError::Length(LengthError::TooLong { .. })));
    }

    #[test]
    fn absent_values_build_to_nothing() {
        let codec = AlphanumericCodec;
        assert_eq!(codec.build_field(None).unwrap(), None);
        assert_eq!(codec.build_field(Some(&String::new())).unwrap(), None);
    }
}
