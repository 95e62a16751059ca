//! Code 39 alphanumeric labels
//!
//! Code 39 readings always arrive with a symbology identifier: the bare
//! character set is permissive enough that a flagless reading could shadow
//! almost any other format during dispatch. The identifier's modifier
//! character doubles as the reader modifier, describing whether the reader
//! verified a mod-43 check character, whether it stripped it, and whether
//! full-ASCII interpretation was applied.
//!
//! When the modifier says the check character was verified but still
//! transmitted, it is stripped here before the label is stored; re-encoding
//! deliberately leaves it off, since reader-stripped elements are outside
//! the round-trip contract.

use crate::barcode::Barcode;
use crate::error::ValidateError;
use crate::field::collection::{Field, FieldCollection};
use crate::field::{FieldCodec, FieldError, FieldKind, FieldValue, LengthBounds};
use crate::product::{ProductCode, ProductCodeKind, CODE39_CHARSET};
use crate::symbology::{strip_identifier, ReaderModifier, SymbologyIdentifier};

use super::{DecodeError, EncodeError, Format};

/// Symbology identifier values for Code 39 readings.
pub const CODE39_IDENTIFIERS: &[&str] = &["A0", "A1", "A2", "A3", "A4", "A5"];

/// Modifier: no check character, no full-ASCII interpretation.
pub const MODIFIER_PLAIN: &str = "0";
/// Modifier: mod-43 check character verified and transmitted.
pub const MODIFIER_CHECKED: &str = "1";
/// Modifier: mod-43 check character verified and stripped by the reader.
pub const MODIFIER_STRIPPED: &str = "2";
/// Modifier: full-ASCII interpretation, no check character.
pub const MODIFIER_FULL_ASCII: &str = "3";
/// Modifier: full-ASCII interpretation, check character verified and
/// transmitted.
pub const MODIFIER_FULL_ASCII_CHECKED: &str = "4";
/// Modifier: full-ASCII interpretation, check character verified and
/// stripped by the reader.
pub const MODIFIER_FULL_ASCII_STRIPPED: &str = "5";

pub(crate) const FORMAT_NAME: &str = "Code 39";

const KEY_PRODUCT_CODE: &str = "ProductCode";

/// True when the reading still ends with the verified check character.
#[must_use]
pub fn check_character_transmitted(modifier: &ReaderModifier) -> bool {
    matches!(
        modifier.value(),
        MODIFIER_CHECKED | MODIFIER_FULL_ASCII_CHECKED
    )
}

/// Removes the trailing check character from a reading when the reader
/// modifier says one was verified and transmitted. Readings too short to
/// carry both a label and a check character pass through unchanged.
#[must_use]
pub fn strip_check_character<'a>(reading: &'a str, modifier: &ReaderModifier) -> &'a str {
    if !check_character_transmitted(modifier) || reading.chars().count() < 2 {
        return reading;
    }
    match reading.char_indices().last() {
        Some((idx, _)) => &reading[..idx],
        None => reading,
    }
}

/// Codec for the Code 39 label text.
#[derive(Clone, Copy, Debug, Default)]
pub struct Code39ProductCodeCodec;

impl FieldCodec for Code39ProductCodeCodec {
    type Value = ProductCode;

    fn validate(&self, raw: &str) -> Result<(), ValidateError> {
        if raw.chars().all(|c| CODE39_CHARSET.contains(c)) {
            Ok(())
        } else {
            Err(ValidateError::Charset {
                value: raw.to_owned(),
            })
        }
    }

    fn parse(&self, raw: &str) -> Result<Self::Value, ValidateError> {
        ProductCode::code39(raw)
    }

    fn build(&self, value: &Self::Value) -> String {
        value.code().to_owned()
    }

    fn validate_value(&self, value: &Self::Value) -> Result<(), ValidateError> {
        match value.kind() {
            ProductCodeKind::Code39 => Ok(()),
            ProductCodeKind::Gtin | ProductCodeKind::Ean => Err(ValidateError::Malformed {
                value: value.code().to_owned(),
                expected: "Code 39 product code",
            }),
        }
    }

    fn validate_value_length(
        &self,
        value: &Self::Value,
        bounds: &LengthBounds,
    ) -> Result<(), crate::error::LengthError> {
        bounds.check(value.code().chars().count())
    }
}

/// One decoded Code 39 record.
#[derive(Clone, Debug)]
pub struct Code39Barcode {
    fields: FieldCollection,
    reader_modifier: Option<ReaderModifier>,
}

impl PartialEq for Code39Barcode {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Code39Barcode {}

impl Default for Code39Barcode {
    fn default() -> Self {
        Self::new()
    }
}

impl Code39Barcode {
    /// Constructs an empty record with the single Code 39 field.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: FieldCollection::new(vec![Field::new(
                KEY_PRODUCT_CODE,
                FieldKind::ProductCode,
                LengthBounds::between(2, 55),
            )]),
            reader_modifier: None,
        }
    }

    /// Constructs an empty record carrying the reader modifier extracted
    /// from the scan's preamble.
    #[must_use]
    pub fn with_modifier(modifier: ReaderModifier) -> Self {
        Self {
            reader_modifier: Some(modifier),
            ..Self::new()
        }
    }

    #[must_use]
    pub fn fields(&self) -> &FieldCollection {
        &self.fields
    }

    #[must_use]
    pub fn reader_modifier(&self) -> Option<&ReaderModifier> {
        self.reader_modifier.as_ref()
    }

    #[must_use]
    pub fn product_code(&self) -> Option<&ProductCode> {
        match self.fields.value(KEY_PRODUCT_CODE) {
            Some(FieldValue::ProductCode(code)) => Some(code),
            _ => None,
        }
    }

    /// Admits a typed product code through the Code 39 codec.
    ///
    /// # Errors
    ///
    /// Any [`FieldError`] the codec reports while re-validating.
    pub fn set_product_code(&mut self, value: Option<ProductCode>) -> Result<(), FieldError> {
        let bounds = self
            .fields
            .get(KEY_PRODUCT_CODE)
            .map(|field| *field.bounds())
            .unwrap_or_default();
        let admitted =
            Code39ProductCodeCodec.accept_value(value.map(Into::into), &bounds)?;
        self.fields
            .set(KEY_PRODUCT_CODE, admitted.map(Into::into))?;
        Ok(())
    }
}

/// The Code 39 format singleton.
#[derive(Clone, Copy, Debug, Default)]
pub struct Code39Format;

impl Format for Code39Format {
    fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn identifiers(&self) -> &'static [&'static str] {
        CODE39_IDENTIFIERS
    }

    fn decode(
        &self,
        raw: &str,
        identifier: Option<&SymbologyIdentifier>,
    ) -> Result<Barcode, DecodeError> {
        let identifier = identifier.ok_or_else(|| {
            DecodeError::grammar("Code 39 readings require a symbology identifier")
        })?;
        if !identifier.is_one_of(CODE39_IDENTIFIERS) {
            return Err(crate::symbology::SymbologyError::Unrecognized {
                identifier: identifier.identifier().to_owned(),
            }
            .into());
        }
        let modifier = ReaderModifier::new(identifier.modifier_characters());
        let payload = strip_check_character(strip_identifier(raw), &modifier);

        let mut barcode = Code39Barcode::with_modifier(modifier);
        let bounds = barcode
            .fields
            .get(KEY_PRODUCT_CODE)
            .map(|field| *field.bounds())
            .unwrap_or_default();
        let value = Code39ProductCodeCodec
            .parse_field(Some(payload), &bounds)?
            .ok_or_else(|| DecodeError::grammar("reading carries no label text"))?;
        barcode
            .fields
            .set(KEY_PRODUCT_CODE, Some(value.into()))?;
        Ok(Barcode::Code39(barcode))
    }

    fn owns(&self, barcode: &Barcode) -> bool {
        matches!(barcode, Barcode::Code39(_))
    }

    fn encode(&self, barcode: &Barcode) -> Result<String, EncodeError> {
        let Barcode::Code39(record) = barcode else {
            return Err(EncodeError::ForeignVariant {
                format: FORMAT_NAME,
            });
        };
        Ok(Code39ProductCodeCodec
            .build_field(record.product_code())?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod code39_tests {
    use super::*;
    use crate::error::LengthError;
    use crate::symbology::SymbologyError;

    fn decode(raw: &str) -> Result<Barcode, DecodeError> {
        let identifier = SymbologyIdentifier::parse(raw)
            .ok()
            .filter(|_| raw.starts_with(']'));
        Code39Format.decode(raw, identifier.as_ref())
    }

    fn code39(barcode: &Barcode) -> &Code39Barcode {
        match barcode {
            Barcode::Code39(record) => record,
            other => panic!("expected a Code 39 record, got {other:?}"),
        }
    }

    #[test]
    fn plain_modifier_keeps_the_whole_label() {
        let decoded = decode("]A0ABC-123").unwrap();
        let record = code39(&decoded);
        assert_eq!(record.product_code().unwrap().code(), "ABC-123");
        assert_eq!(record.reader_modifier().unwrap().value(), "0");
    }

    #[test]
    fn transmitted_check_character_is_stripped() {
        let decoded = decode("]A1ABC123K").unwrap();
        assert_eq!(code39(&decoded).product_code().unwrap().code(), "ABC123");
        let decoded = decode("]A4ABC123K").unwrap();
        assert_eq!(code39(&decoded).product_code().unwrap().code(), "ABC123");
    }

    #[test]
    fn reader_stripped_check_character_is_left_alone() {
        let decoded = decode("]A2ABC123").unwrap();
        assert_eq!(code39(&decoded).product_code().unwrap().code(), "ABC123");
    }

    #[test]
    fn flagless_readings_are_rejected() {
        assert!(matches!(
            decode("ABC-123").unwrap_err(),
            DecodeError::Grammar { .. }
        ));
    }

    #[test]
    fn foreign_identifier_is_rejected() {
        assert!(matches!(
            decode("]C1ABC123").unwrap_err(),
            DecodeError::Symbology(SymbologyError::Unrecognized { .. })
        ));
    }

    #[test]
    fn length_band_is_enforced() {
        let err = decode("]A0A").unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Field(FieldError::Length(LengthError::TooShort {
                limit: 2,
                actual: 1
            }))
        ));
    }

    #[test]
    fn lowercase_labels_are_rejected() {
        assert!(matches!(
            decode("]A0abc123").unwrap_err(),
            DecodeError::Field(FieldError::Invalid(ValidateError::Charset { .. }))
        ));
    }

    #[test]
    fn encode_leaves_the_stripped_check_character_off() {
        let decoded = decode("]A1ABC123K").unwrap();
        assert_eq!(Code39Format.encode(&decoded).unwrap(), "ABC123");
    }

    #[test]
    fn roundtrip_preserves_field_values() {
        let first = decode("]A0HELLO WORLD-42").unwrap();
        let rebuilt = Code39Format.encode(&first).unwrap();
        // the rebuilt reading has no preamble; re-decode under the same identifier
        let identifier = SymbologyIdentifier::parse("]A0xx").unwrap();
        let second = Code39Format
            .decode(&rebuilt, Some(&identifier))
            .unwrap();
        assert_eq!(first, second);
    }
}
