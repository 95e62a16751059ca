//! GS1 element strings (GS1-128, GS1 DataBar, GS1 Data Matrix, GS1 QR)
//!
//! A GS1 payload is a sequence of element strings, each introduced by a
//! two-digit application identifier (AI). Fixed-length AIs are followed by
//! exactly their declared number of characters; variable-length AIs run to
//! the next GS control character (`0x1D`) or to the end of the payload.
//!
//! The supported AI set is the pharmaceutical/logistics core: GTIN (`01`),
//! production date (`11`), expiration date (`17`), batch number (`10`) and
//! serial number (`21`). Readings may carry the element strings in any
//! order; encoding always emits them in the canonical order above.

use crate::barcode::Barcode;
use crate::date::BarcodeDate;
use crate::error::ValidateError;
use crate::field::collection::{Field, FieldCollection};
use crate::field::{FieldCodec, FieldError, FieldKind, FieldValue, LengthBounds};
use crate::product::{ProductCode, ProductCodeKind};
use crate::symbology::{ReaderModifier, SymbologyIdentifier};

use super::{payload_of, DecodeError, EncodeError, Format};

/// Group separator terminating a variable-length element string.
pub const GROUP_SEPARATOR: char = '\u{1d}';

/// Symbology identifier values carried by GS1 readings: GS1-128, GS1
/// DataBar, GS1 Data Matrix and GS1 QR Code.
pub const GS1_IDENTIFIERS: &[&str] = &["C1", "e0", "d2", "Q3"];

pub(crate) const FORMAT_NAME: &str = "GS1";

const AI_GTIN: &str = "01";
const AI_PRODUCTION_DATE: &str = "11";
const AI_EXPIRATION_DATE: &str = "17";
const AI_BATCH_NUMBER: &str = "10";
const AI_SERIAL_NUMBER: &str = "21";

/// AIs whose element strings have a fixed width (AI excluded).
const FIXED_WIDTH_AIS: &[(&str, usize)] = &[
    (AI_GTIN, 14),
    (AI_PRODUCTION_DATE, 6),
    (AI_EXPIRATION_DATE, 6),
];

/// AIs whose element strings run to the next group separator.
const VARIABLE_WIDTH_AIS: &[&str] = &[AI_BATCH_NUMBER, AI_SERIAL_NUMBER];

/// Codec for the GTIN carried behind AI `01`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Gs1GtinCodec;

impl FieldCodec for Gs1GtinCodec {
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
        ProductCode::gtin(raw)
    }

    fn build(&self, value: &Self::Value) -> String {
        value.code().to_owned()
    }

    fn validate_value(&self, value: &Self::Value) -> Result<(), ValidateError> {
        match value.kind() {
            ProductCodeKind::Gtin | ProductCodeKind::Ean => Ok(()),
            ProductCodeKind::Code39 => Err(ValidateError::Malformed {
                value: value.code().to_owned(),
                expected: "GTIN or EAN product code",
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

/// Codec for `YYMMDD` dates carried behind AIs `11` and `17`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Gs1DateCodec;

impl FieldCodec for Gs1DateCodec {
    type Value = BarcodeDate;

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
        BarcodeDate::parse_yymmdd(raw)
    }

    fn build(&self, value: &Self::Value) -> String {
        value.raw().to_owned()
    }
}

/// One decoded GS1 record.
///
/// Equality is over field values only; the reader modifier is a
/// decoding-time hint and never participates.
#[derive(Clone, Debug)]
pub struct Gs1Barcode {
    fields: FieldCollection,
    reader_modifier: Option<ReaderModifier>,
}

impl PartialEq for Gs1Barcode {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

impl Eq for Gs1Barcode {}

impl Default for Gs1Barcode {
    fn default() -> Self {
        Self::new()
    }
}

impl Gs1Barcode {
    /// Constructs an empty record with the canonical GS1 field set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fields: FieldCollection::new(vec![
                Field::new(AI_GTIN, FieldKind::ProductCode, LengthBounds::exactly(14)),
                Field::new(AI_PRODUCTION_DATE, FieldKind::Date, LengthBounds::exactly(6)),
                Field::new(AI_EXPIRATION_DATE, FieldKind::Date, LengthBounds::exactly(6)),
                Field::new(AI_BATCH_NUMBER, FieldKind::Text, LengthBounds::at_most(20)),
                Field::new(AI_SERIAL_NUMBER, FieldKind::Text, LengthBounds::at_most(20)),
            ]),
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

    /// Read-only view of the record's fields, in canonical order.
    #[must_use]
    pub fn fields(&self) -> &FieldCollection {
        &self.fields
    }

    /// Reader-side processing hint, when the scan carried a preamble.
    #[must_use]
    pub fn reader_modifier(&self) -> Option<&ReaderModifier> {
        self.reader_modifier.as_ref()
    }

    #[must_use]
    pub fn product_code(&self) -> Option<&ProductCode> {
        match self.fields.value(AI_GTIN) {
            Some(FieldValue::ProductCode(code)) => Some(code),
            _ => None,
        }
    }

    #[must_use]
    pub fn production_date(&self) -> Option<&BarcodeDate> {
        self.date_value(AI_PRODUCTION_DATE)
    }

    #[must_use]
    pub fn expiration_date(&self) -> Option<&BarcodeDate> {
        self.date_value(AI_EXPIRATION_DATE)
    }

    #[must_use]
    pub fn batch_number(&self) -> Option<&str> {
        self.text_value(AI_BATCH_NUMBER)
    }

    #[must_use]
    pub fn serial_number(&self) -> Option<&str> {
        self.text_value(AI_SERIAL_NUMBER)
    }

    /// Admits a typed product code through the GTIN codec.
    ///
    /// # Errors
    ///
    /// Any [`FieldError`] the codec reports while re-validating.
    pub fn set_product_code(&mut self, value: Option<ProductCode>) -> Result<(), FieldError> {
        self.set_typed(AI_GTIN, &Gs1GtinCodec, value)
    }

    /// Admits a typed production date.
    ///
    /// # Errors
    ///
    /// Any [`FieldError`] the codec reports while re-validating.
    pub fn set_production_date(&mut self, value: Option<BarcodeDate>) -> Result<(), FieldError> {
        self.set_typed(AI_PRODUCTION_DATE, &Gs1DateCodec, value)
    }

    /// Admits a typed expiration date.
    ///
    /// # Errors
    ///
    /// Any [`FieldError`] the codec reports while re-validating.
    pub fn set_expiration_date(&mut self, value: Option<BarcodeDate>) -> Result<(), FieldError> {
        self.set_typed(AI_EXPIRATION_DATE, &Gs1DateCodec, value)
    }

    /// Admits a batch number through the alphanumeric codec.
    ///
    /// # Errors
    ///
    /// Any [`FieldError`] the codec reports while re-validating.
    pub fn set_batch_number(&mut self, value: Option<String>) -> Result<(), FieldError> {
        self.set_typed(AI_BATCH_NUMBER, &crate::field::AlphanumericCodec, value)
    }

    /// Admits a serial number through the alphanumeric codec.
    ///
    /// # Errors
    ///
    /// Any [`FieldError`] the codec reports while re-validating.
    pub fn set_serial_number(&mut self, value: Option<String>) -> Result<(), FieldError> {
        self.set_typed(AI_SERIAL_NUMBER, &crate::field::AlphanumericCodec, value)
    }

    fn date_value(&self, ai: &str) -> Option<&BarcodeDate> {
        match self.fields.value(ai) {
            Some(FieldValue::Date(date)) => Some(date),
            _ => None,
        }
    }

    fn text_value(&self, ai: &str) -> Option<&str> {
        match self.fields.value(ai) {
            Some(FieldValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    fn bounds_of(&self, ai: &str) -> LengthBounds {
        self.fields
            .get(ai)
            .map(|field| *field.bounds())
            .unwrap_or_default()
    }

    fn set_typed<C: FieldCodec>(
        &mut self,
        ai: &'static str,
        codec: &C,
        value: Option<C::Value>,
    ) -> Result<(), FieldError> {
        let bounds = self.bounds_of(ai);
        let admitted = codec.accept_value(value.map(Into::into), &bounds)?;
        self.fields.set(ai, admitted.map(Into::into))?;
        Ok(())
    }

    /// Parses one raw element string into the field behind `ai`.
    fn apply_element(&mut self, ai: &'static str, raw: &str) -> Result<(), FieldError> {
        let bounds = self.bounds_of(ai);
        let value: Option<FieldValue> = match ai {
            AI_GTIN => Gs1GtinCodec
                .parse_field(Some(raw), &bounds)?
                .map(Into::into),
            AI_PRODUCTION_DATE | AI_EXPIRATION_DATE => Gs1DateCodec
                .parse_field(Some(raw), &bounds)?
                .map(Into::into),
            _ => crate::field::AlphanumericCodec
                .parse_field(Some(raw), &bounds)?
                .map(Into::into),
        };
        self.fields.set(ai, value)?;
        Ok(())
    }
}

/// The GS1 format singleton.
#[derive(Clone, Copy, Debug, Default)]
pub struct Gs1Format;

impl Format for Gs1Format {
    fn name(&self) -> &'static str {
        FORMAT_NAME
    }

    fn identifiers(&self) -> &'static [&'static str] {
        GS1_IDENTIFIERS
    }

    fn decode(
        &self,
        raw: &str,
        identifier: Option<&SymbologyIdentifier>,
    ) -> Result<Barcode, DecodeError> {
        let payload = payload_of(raw, identifier, GS1_IDENTIFIERS)?;
        let mut barcode = match identifier {
            Some(id) => Gs1Barcode::with_modifier(ReaderModifier::new(id.modifier_characters())),
            None => Gs1Barcode::new(),
        };

        let mut rest = payload;
        let mut decoded_any = false;
        while !rest.is_empty() {
            if let Some(stripped) = rest.strip_prefix(GROUP_SEPARATOR) {
                rest = stripped;
                continue;
            }
            let ai = rest
                .get(..2)
                .ok_or_else(|| DecodeError::grammar("truncated application identifier"))?;
            let (ai, element, remainder) = split_element(ai, rest)?;
            if barcode.fields.is_set(ai) {
                return Err(DecodeError::grammar(format!(
                    "application identifier `{ai}` occurs twice"
                )));
            }
            barcode.apply_element(ai, element)?;
            decoded_any = true;
            rest = remainder;
        }
        if !decoded_any {
            return Err(DecodeError::grammar("payload carries no element strings"));
        }
        Ok(Barcode::Gs1(barcode))
    }

    fn owns(&self, barcode: &Barcode) -> bool {
        matches!(barcode, Barcode::Gs1(_))
    }

    fn encode(&self, barcode: &Barcode) -> Result<String, EncodeError> {
        let Barcode::Gs1(record) = barcode else {
            return Err(EncodeError::ForeignVariant {
                format: FORMAT_NAME,
            });
        };

        // (ai, serialized element, variable-width) in canonical field order
        let mut elements: Vec<(&str, String, bool)> = Vec::new();
        for field in record.fields() {
            let ai = field.key();
            let serialized = match ai {
                AI_GTIN => Gs1GtinCodec.build_field(record.product_code())?,
                AI_PRODUCTION_DATE => Gs1DateCodec.build_field(record.production_date())?,
                AI_EXPIRATION_DATE => Gs1DateCodec.build_field(record.expiration_date())?,
                AI_BATCH_NUMBER => crate::field::AlphanumericCodec
                    .build_field(record.batch_number().map(str::to_owned).as_ref())?,
                _ => crate::field::AlphanumericCodec
                    .build_field(record.serial_number().map(str::to_owned).as_ref())?,
            };
            if let Some(serialized) = serialized {
                elements.push((ai, serialized, VARIABLE_WIDTH_AIS.contains(&ai)));
            }
        }

        let mut out = String::new();
        let last = elements.len().saturating_sub(1);
        for (position, (ai, serialized, variable)) in elements.iter().enumerate() {
            out.push_str(ai);
            out.push_str(serialized);
            if *variable && position != last {
                out.push(GROUP_SEPARATOR);
            }
        }
        Ok(out)
    }
}

/// Splits the next element string off the front of `rest`, returning the
/// interned AI, the element characters, and the unconsumed remainder.
fn split_element<'a>(
    ai: &str,
    rest: &'a str,
) -> Result<(&'static str, &'a str, &'a str), DecodeError> {
    if let Some(&(known, width)) = FIXED_WIDTH_AIS.iter().find(|(known, _)| *known == ai) {
        let element = rest.get(2..2 + width).ok_or_else(|| {
            DecodeError::grammar(format!("element string for AI `{known}` is truncated"))
        })?;
        if element.contains(GROUP_SEPARATOR) {
            return Err(DecodeError::grammar(format!(
                "element string for AI `{known}` is truncated"
            )));
        }
        Ok((known, element, &rest[2 + width..]))
    } else if let Some(&known) = VARIABLE_WIDTH_AIS.iter().find(|known| **known == ai) {
        let body = &rest[2..];
        let end = body.find(GROUP_SEPARATOR).unwrap_or(body.len());
        Ok((known, &body[..end], &body[end..]))
    } else {
        Err(DecodeError::grammar(format!(
            "unrecognized application identifier `{ai}`"
        )))
    }
}
