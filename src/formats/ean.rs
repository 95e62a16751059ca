//! EAN/UPC retail article numbers
//!
//! An EAN/UPC reading is a single all-digit article number of 6 to 13
//! digits whose trailing mod-10 check digit must verify. The record carries
//! exactly one field; none of the date, batch or serial properties exist for
//! this format.

use crate::barcode::Barcode;
use crate::error::ValidateError;
use crate::field::collection::{Field, FieldCollection};
use crate::field::{FieldCodec, FieldError, FieldKind, FieldValue, LengthBounds};
use crate::product::{ProductCode, ProductCodeKind};
use crate::symbology::{ReaderModifier, SymbologyIdentifier};

use super::{payload_of, DecodeError, EncodeError, Format};

/// Symbology identifier values for EAN-13/UPC-A (`]E0`) and EAN-8 (`]E4`).
pub const EAN_IDENTIFIERS: &[&str] = &["E0", "E4"];

pub(crate) const FORMAT_NAME: &str = "EAN";

const KEY_PRODUCT_CODE: &str = "ProductCode";

/// Codec for the article number itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct EanProductCodeCodec;

impl FieldCodec for EanProductCodeCodec {
    type Value = ProductCode;

    fn validate(&self, raw: &str) -> Result<(), ValidateError> {
        if raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(())
        } else {
            Err(ValidateError::Charset {
                value: raw.to_owned(),
            })
        }
    }

    fn parse(&self, raw: &str) -> Result<Self::Value, ValidateError> {
        ProductCode::ean(raw)
    }

    fn build(&self, value: &Self::Value) -> String {
        value.code().to_owned()
    }

    fn validate_value(&self, value: &Self::Value) -> Result<(), ValidateError> {
        match value.kind() {
            ProductCodeKind::Ean | ProductCodeKind::Gtin => Ok(()),
            ProductCodeKind::Code39 => Err(ValidateError::Malformed {
                value: value.code().to_owned(),
                expected: "EAN or GTIN product code",
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

/// One decoded EAN/UPC record.
#[derive(Clone, Debug)]
pub struct EanBarcode {
    fields: FieldCollection,
    reader_modifier: Option<ReaderModifier>,
}

impl PartialEq for EanBarcode {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for EanBarcode {}

impl Default for EanBarcode {
    fn default() -> Self {
        Self::new()
    }
}

impl EanBarcode {
    /// Constructs an empty record with the single EAN field.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: FieldCollection::new(vec![Field::new(
                KEY_PRODUCT_CODE,
                FieldKind::ProductCode,
                LengthBounds::between(6, 13),
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

    /// Admits a typed product code through the EAN codec.
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
            EanProductCodeCodec.accept_value(value.map(Into::into), &bounds)?;
        self.fields
            .set(KEY_PRODUCT_CODE, admitted.map(Into::into))?;
        Ok(())
    }
}

/// The EAN/UPC format singleton.
#[derive(Clone, Copy, Debug, Default)]
pub struct EanFormat;

impl Format for EanFormat {
    fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn identifiers(&self) -> &'static [&'static str] {
        EAN_IDENTIFIERS
    }

    fn decode(
        &self,
        raw: &str,
        identifier: Option<&SymbologyIdentifier>,
    ) -> Result<Barcode, DecodeError> {
        let payload = payload_of(raw, identifier, EAN_IDENTIFIERS)?;
        let mut barcode = match identifier {
            Some(id) => EanBarcode::with_modifier(ReaderModifier::new(id.modifier_characters())),
            None => EanBarcode::new(),
        };
        let bounds = barcode
            .fields
            .get(KEY_PRODUCT_CODE)
            .map(|field| *field.bounds())
            .unwrap_or_default();
        let value = EanProductCodeCodec
            .parse_field(Some(payload), &bounds)?
            .ok_or_else(|| DecodeError::grammar("reading carries no article number"))?;
        barcode
            .fields
            .set(KEY_PRODUCT_CODE, Some(value.into()))?;
        Ok(Barcode::Ean(barcode))
    }

    fn owns(&self, barcode: &Barcode) -> bool {
        matches!(barcode, Barcode::Ean(_))
    }

    fn encode(&self, barcode: &Barcode) -> Result<String, EncodeError> {
        let Barcode::Ean(record) = barcode else {
            return Err(EncodeError::ForeignVariant {
                format: FORMAT_NAME,
            });
        };
        Ok(EanProductCodeCodec
            .build_field(record.product_code())?
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod ean_tests {
    use super::*;
    use crate::error::LengthError;

    fn decode(raw: &str) -> Result<Barcode, DecodeError> {
        let identifier = SymbologyIdentifier::parse(raw)
            .ok()
            .filter(|_| raw.starts_with(']'));
        EanFormat.decode(raw, identifier.as_ref())
    }

    #[test]
    fn bare_article_number_decodes() {
        let decoded = decode("5449000000996").unwrap();
        let Barcode::Ean(record) = &decoded else {
            panic!("expected an EAN record");
        };
        assert_eq!(record.product_code().unwrap().code(), "5449000000996");
        assert!(record.reader_modifier().is_none());
    }

    #[test]
    fn preambled_ean8_decodes() {
        let decoded = decode("]E496385074").unwrap();
        let Barcode::Ean(record) = &decoded else {
            panic!("expected an EAN record");
        };
        assert_eq!(record.product_code().unwrap().code(), "96385074");
        assert_eq!(record.reader_modifier().unwrap().value(), "4");
    }

    #[test]
    fn corrupt_check_digit_rejects() {
        assert!(matches!(
            decode("5449000000997").unwrap_err(),
            DecodeError::Field(FieldError::Invalid(ValidateError::Checksum { .. }))
        ));
    }

    #[test]
    fn length_band_is_enforced_before_grammar() {
        assert!(matches!(
            decode("12345").unwrap_err(),
            DecodeError::Field(FieldError::Length(LengthError::TooShort {
                limit: 6,
                actual: 5
            }))
        ));
    }

    #[test]
    fn non_digit_payload_rejects() {
        assert!(matches!(
            decode("54490ABC99").unwrap_err(),
            DecodeError::Field(FieldError::Invalid(ValidateError::Charset { .. }))
        ));
    }

    #[test]
    fn roundtrip_reproduces_the_reading() {
        let decoded = decode("96385074").unwrap();
        assert_eq!(EanFormat.encode(&decoded).unwrap(), "96385074");
    }
}
