//! Concrete barcode formats and the contract they plug into
//!
//! Each supported symbology lives in its own sub-module and exposes two
//! types: the format singleton implementing [`Format`] (the decoder/encoder
//! pair the registry dispatches to) and the record type the decoder
//! produces. The [`Format`] trait replaces any runtime discovery of
//! decoders with an explicit, statically-checked seam: a registry holds
//! trait objects, and nothing is located by name or type inspection.
//!
//! A format's [`decode`](Format::decode) receives the *full* raw reading,
//! preamble included, together with the pre-extracted symbology identifier
//! when one was present; each format strips what it needs. Any error a
//! decode attempt returns means only "this candidate rejects" — the
//! dispatcher treats it as control flow, never as a fault.

pub mod code39;
pub mod ean;
pub mod gs1;

use std::error::Error;
use std::fmt::{Display, Formatter};

use crate::barcode::Barcode;
use crate::field::{FieldError, TypeError};
use crate::symbology::{
    strip_identifier, PreambleError, SymbologyError, SymbologyIdentifier, SYMBOLOGY_FLAG,
};

/// Reasons a single format's decode attempt rejects a raw reading.
///
/// These surface to direct callers (and unit tests) only; the dispatcher
/// converts every one of them into "try the next candidate".
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DecodeError {
    /// The symbology identifier was absent, malformed, or not one this
    /// format recognizes
    Symbology(SymbologyError),
    /// A field-level validation failure
    Field(FieldError),
    /// The payload does not follow this format's layout
    Grammar { detail: String },
}

impl DecodeError {
    pub(crate) fn grammar(detail: impl Into<String>) -> Self {
        Self::Grammar {
            detail: detail.into(),
        }
    }
}

impl From<SymbologyError> for DecodeError {
    fn from(err: SymbologyError) -> Self {
        Self::Symbology(err)
    }
}

impl From<PreambleError> for DecodeError {
    fn from(err: PreambleError) -> Self {
        Self::Symbology(SymbologyError::Preamble(err))
    }
}

impl From<FieldError> for DecodeError {
    fn from(err: FieldError) -> Self {
        Self::Field(err)
    }
}

impl From<TypeError> for DecodeError {
    fn from(err: TypeError) -> Self {
        Self::Field(FieldError::Type(err))
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Symbology(err) => Display::fmt(err, f),
            DecodeError::Field(err) => Display::fmt(err, f),
            DecodeError::Grammar { detail } => f.write_str(detail),
        }
    }
}

impl Error for DecodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            DecodeError::Symbology(err) => Some(err),
            DecodeError::Field(err) => Some(err),
            DecodeError::Grammar { .. } => None,
        }
    }
}

/// Reasons a single format's encode attempt fails.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum EncodeError {
    /// A field value failed re-validation while serializing
    Field(FieldError),
    /// The record was produced by a different format
    ForeignVariant { format: &'static str },
}

impl From<FieldError> for EncodeError {
    fn from(err: FieldError) -> Self {
        Self::Field(err)
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            EncodeError::Field(err) => Display::fmt(err, f),
            EncodeError::ForeignVariant { format } => {
                write!(f, "record was not produced by the {format} format")
            }
        }
    }
}

impl Error for EncodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EncodeError::Field(err) => Some(err),
            EncodeError::ForeignVariant { .. } => None,
        }
    }
}

/// One registered symbology: a name, the identifier values it recognizes,
/// and its decode/encode pair.
///
/// Implementors are stateless singletons; the registry stores them as shared
/// trait objects, so `Send + Sync` is part of the contract.
pub trait Format: Send + Sync {
    /// Human-readable format name, used in diagnostics.
    fn name(&self) -> &'static str;

    /// The finite set of symbology identifier values this format recognizes.
    /// Empty when the format never uses a preamble.
    fn identifiers(&self) -> &'static [&'static str];

    /// Attempts to decode a full raw reading (preamble included) into this
    /// format's record type.
    ///
    /// # Errors
    ///
    /// Any [`DecodeError`]; to the dispatcher every error uniformly means
    /// this candidate rejects the reading.
    fn decode(
        &self,
        raw: &str,
        identifier: Option<&SymbologyIdentifier>,
    ) -> Result<Barcode, DecodeError>;

    /// True when this format produced the given record.
    fn owns(&self, barcode: &Barcode) -> bool;

    /// Reassembles the canonical serialized string from a record of this
    /// format, in the format's field order.
    ///
    /// # Errors
    ///
    /// [`EncodeError::ForeignVariant`] for a record of another format,
    /// [`EncodeError::Field`] when a field value fails re-validation.
    fn encode(&self, barcode: &Barcode) -> Result<String, EncodeError>;
}

/// Resolves the payload of a reading for a format with a recognized
/// identifier set: strips the preamble when the extracted identifier belongs
/// to the set, rejects identifiers outside it, and rejects flagged readings
/// whose preamble could not be extracted at all.
pub(crate) fn payload_of<'a>(
    raw: &'a str,
    identifier: Option<&SymbologyIdentifier>,
    recognized: &'static [&'static str],
) -> Result<&'a str, DecodeError> {
    match identifier {
        Some(id) if id.is_one_of(recognized) => Ok(strip_identifier(raw)),
        Some(id) => Err(SymbologyError::Unrecognized {
            identifier: id.identifier().to_owned(),
        }
        .into()),
        None if raw.starts_with(SYMBOLOGY_FLAG) => {
            Err(DecodeError::grammar("reading carries an unextractable symbology preamble"))
        }
        None => Ok(raw),
    }
}

#[cfg(test)]
mod format_tests {
    use super::*;

    #[test]
    fn payload_resolution_strips_recognized_preambles() {
        let id = SymbologyIdentifier::parse("]C10196385074").unwrap();
        assert_eq!(
            payload_of("]C10196385074", Some(&id), &["C1"]).unwrap(),
            "0196385074"
        );
    }

    #[test]
    fn payload_resolution_rejects_foreign_identifiers() {
        let id = SymbologyIdentifier::parse("]X9data").unwrap();
        let err = payload_of("]X9data", Some(&id), &["C1"]).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::Symbology(SymbologyError::Unrecognized { .. })
        ));
    }

    #[test]
    fn payload_resolution_passes_bare_readings_through() {
        assert_eq!(payload_of("0196385074", None, &["C1"]).unwrap(), "0196385074");
    }

    #[test]
    fn flagged_reading_without_identifier_is_rejected() {
        let err = payload_of("]C", None, &["C1"]).unwrap_err();
        assert!(matches!(err, DecodeError::Grammar { .. }));
    }
}
