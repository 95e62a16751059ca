//! The polymorphic decoded-record type
//!
//! [`Barcode`] is a closed sum over the supported format variants. Every
//! variant exposes the same set of common properties — product code,
//! expiration date, production date, batch number, serial number — but a
//! given format either backs a property with one of its declared fields or
//! does not define it at all. The latter is a structural fact about the
//! format, not an empty value, and reads as [`UnsupportedProperty`]: a
//! format without an expiration-date field reports the incapability on
//! every access instead of silently yielding nothing.
//!
//! Records are created only by a successful format decode (or assembled
//! manually through a variant's typed setters); their field sets are fixed
//! at construction and their equality ignores the reader modifier.

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::date::BarcodeDate;
use crate::field::collection::FieldCollection;
use crate::formats::code39::Code39Barcode;
use crate::formats::ean::EanBarcode;
use crate::formats::gs1::Gs1Barcode;
use crate::product::ProductCode;
use crate::symbology::ReaderModifier;

/// Error signalled when a common property is read on a format variant that
/// does not define it.
///
/// Deliberately distinct from an absent value: `Ok(None)` means "the format
/// has this field and the reading did not populate it", while this error
/// means "the format has no such field at all".
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct UnsupportedProperty {
    pub format: &'static str,
    pub property: &'static str,
}

impl Display for UnsupportedProperty {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "the {} format does not define the {} property",
            self.format, self.property
        )
    }
}

impl Error for UnsupportedProperty {}

/// One decoded barcode record, tagged by the format that produced it.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Barcode {
    Gs1(Gs1Barcode),
    Ean(EanBarcode),
    Code39(Code39Barcode),
}

impl Barcode {
    /// Name of the format that produced this record.
    #[must_use]
    pub fn format_name(&self) -> &'static str {
        match self {
            Barcode::Gs1(_) => crate::formats::gs1::FORMAT_NAME,
            Barcode::Ean(_) => crate::formats::ean::FORMAT_NAME,
            Barcode::Code39(_) => crate::formats::code39::FORMAT_NAME,
        }
    }

    /// Read-only view of the record's fields, in the owning format's
    /// canonical (= serialization) order.
    #[must_use]
    pub fn fields(&self) -> &FieldCollection {
        match self {
            Barcode::Gs1(record) => record.fields(),
            Barcode::Ean(record) => record.fields(),
            Barcode::Code39(record) => record.fields(),
        }
    }

    /// Reader-side processing hint attached during decode, when the scan
    /// carried a preamble.
    #[must_use]
    pub fn reader_modifier(&self) -> Option<&ReaderModifier> {
        match self {
            Barcode::Gs1(record) => record.reader_modifier(),
            Barcode::Ean(record) => record.reader_modifier(),
            Barcode::Code39(record) => record.reader_modifier(),
        }
    }

    /// The product code. Every supported format defines this property.
    ///
    /// # Errors
    ///
    /// Never, for the current format set; the signature matches the other
    /// common properties so consumers can treat all five uniformly.
    pub fn product_code(&self) -> Result<Option<&ProductCode>, UnsupportedProperty> {
        match self {
            Barcode::Gs1(record) => Ok(record.product_code()),
            Barcode::Ean(record) => Ok(record.product_code()),
            Barcode::Code39(record) => Ok(record.product_code()),
        }
    }

    /// The expiration date; GS1 only.
    ///
    /// # Errors
    ///
    /// [`UnsupportedProperty`] for formats without an expiration-date field.
    pub fn expiration_date(&self) -> Result<Option<&BarcodeDate>, UnsupportedProperty> {
        match self {
            Barcode::Gs1(record) => Ok(record.expiration_date()),
            other => Err(other.unsupported("expiration date")),
        }
    }

    /// The production date; GS1 only.
    ///
    /// # Errors
    ///
    /// [`UnsupportedProperty`] for formats without a production-date field.
    pub fn production_date(&self) -> Result<Option<&BarcodeDate>, UnsupportedProperty> {
        match self {
            Barcode::Gs1(record) => Ok(record.production_date()),
            other => Err(other.unsupported("production date")),
        }
    }

    /// The batch number; GS1 only.
    ///
    /// # Errors
    ///
    /// [`UnsupportedProperty`] for formats without a batch-number field.
    pub fn batch_number(&self) -> Result<Option<&str>, UnsupportedProperty> {
        match self {
            Barcode::Gs1(record) => Ok(record.batch_number()),
            other => Err(other.unsupported("batch number")),
        }
    }

    /// The serial number; GS1 only.
    ///
    /// # Errors
    ///
    /// [`UnsupportedProperty`] for formats without a serial-number field.
    pub fn serial_number(&self) -> Result<Option<&str>, UnsupportedProperty> {
        match self {
            Barcode::Gs1(record) => Ok(record.serial_number()),
            other => Err(other.unsupported("serial number")),
        }
    }

    fn unsupported(&self, property: &'static str) -> UnsupportedProperty {
        UnsupportedProperty {
            format: self.format_name(),
            property,
        }
    }
}

impl From<Gs1Barcode> for Barcode {
    fn from(record: Gs1Barcode) -> Self {
        Self::Gs1(record)
    }
}

impl From<EanBarcode> for Barcode {
    fn from(record: EanBarcode) -> Self {
        Self::Ean(record)
    }
}

impl From<Code39Barcode> for Barcode {
    fn from(record: Code39Barcode) -> Self {
        Self::Code39(record)
    }
}

#[cfg(test)]
mod barcode_tests {
    use super::*;
    use crate::product::ProductCode;

    fn ean_record() -> Barcode {
        let mut record = EanBarcode::new();
        record
            .set_product_code(Some(ProductCode::ean("96385074").unwrap()))
            .unwrap();
        Barcode::Ean(record)
    }

    #[test]
    fn unsupported_properties_signal_on_every_access() {
        let record = ean_record();
        let err = record.expiration_date().unwrap_err();
        assert_eq!(
            err,
            UnsupportedProperty {
                format: "EAN",
                property: "expiration date"
            }
        );
        // repeated access signals again rather than degrading to a default
        assert!(record.expiration_date().is_err());
        assert!(record.batch_number().is_err());
        assert!(record.serial_number().is_err());
        assert!(record.production_date().is_err());
    }

    #[test]
    fn supported_but_unset_reads_as_absent() {
        let record = Barcode::Ean(EanBarcode::new());
        assert_eq!(record.product_code().unwrap(), None);
    }

    #[test]
    fn supported_property_reads_through() {
        let record = ean_record();
        assert_eq!(record.product_code().unwrap().unwrap().code(), "96385074");
    }

    #[test]
    fn format_name_follows_the_variant() {
        assert_eq!(ean_record().format_name(), "EAN");
        assert_eq!(
            Barcode::Code39(crate::formats::code39::Code39Barcode::new()).format_name(),
            "Code 39"
        );
    }
}
