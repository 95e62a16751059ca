//! Format registry and dispatch
//!
//! A [`FormatRegistry`] holds the known formats in a fixed priority order
//! and routes raw readings to them. Dispatch is deliberately simple:
//! candidates are tried in registration order and the first decoder that
//! accepts wins, so more restrictive grammars must be registered ahead of
//! permissive ones. A candidate's failure — any failure — is control flow,
//! not a fault; only exhaustion of every candidate surfaces, as
//! [`DispatchError::NoMatchingFormat`].
//!
//! The registry is populated once and never mutated afterwards, so a single
//! instance (such as [`struct@DEFAULT_REGISTRY`]) may serve unlimited
//! concurrent decode and encode calls without locking.
//!
//! The free functions [`try_parse`] and [`build`] are the crate's outward
//! face: a deliberately blunt API where empty input is not an error and
//! every failure is reported as human-readable text rather than a
//! structured error, so callers cannot grow control flow on error details.

use std::error::Error;
use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;

use crate::barcode::Barcode;
use crate::formats::code39::Code39Format;
use crate::formats::ean::EanFormat;
use crate::formats::gs1::Gs1Format;
use crate::formats::{EncodeError, Format};
use crate::symbology::{SymbologyIdentifier, SYMBOLOGY_FLAG};

/// Failure of a full dispatch pass: every registered candidate rejected the
/// reading.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DispatchError {
    NoMatchingFormat { raw: String },
}

impl Display for DispatchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchError::NoMatchingFormat { raw } => {
                write!(f, "no registered format accepts the reading `{raw}`")
            }
        }
    }
}

impl Error for DispatchError {}

/// Failure to re-serialize a decoded record.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum BuildError {
    /// No registered format claims the record's variant. Unreachable for
    /// records produced by the same registry, but reachable for manually
    /// assembled records handed to a differently-populated registry.
    UnknownFormat { format: &'static str },
    /// The owning format failed while serializing
    Encode(EncodeError),
}

impl From<EncodeError> for BuildError {
    fn from(err: EncodeError) -> Self {
        Self::Encode(err)
    }
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::UnknownFormat { format } => {
                write!(f, "no registered format claims {format} records")
            }
            BuildError::Encode(err) => Display::fmt(err, f),
        }
    }
}

impl Error for BuildError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            BuildError::UnknownFormat { .. } => None,
            BuildError::Encode(err) => Some(err),
        }
    }
}

/// Human-readable diagnostic returned by [`FormatRegistry::try_parse`].
///
/// The text is for people, not programs: its wording is unstable by design
/// and must not be parsed for control flow.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseFeedback(String);

impl ParseFeedback {
    /// The diagnostic text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl Display for ParseFeedback {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered, write-once collection of barcode formats.
pub struct FormatRegistry {
    formats: Vec<Box<dyn Format>>,
}

impl FormatRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            formats: Vec::new(),
        }
    }

    /// Appends a format at the lowest priority so far. Registration order is
    /// dispatch order.
    #[must_use]
    pub fn register(mut self, format: impl Format + 'static) -> Self {
        self.formats.push(Box::new(format));
        self
    }

    /// Names of the registered formats, in priority order.
    pub fn format_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.formats.iter().map(|format| format.name())
    }

    /// Dispatches a non-empty raw reading to the first accepting format.
    ///
    /// The symbology identifier is extracted once, up front, when the
    /// reading starts with the preamble flag; every candidate still receives
    /// the full reading and strips what it needs.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NoMatchingFormat`] when every candidate rejects.
    pub fn decode(&self, raw: &str) -> Result<Barcode, DispatchError> {
        let identifier = if raw.starts_with(SYMBOLOGY_FLAG) {
            SymbologyIdentifier::parse(raw).ok()
        } else {
            None
        };
        self.decode_with(raw, identifier.as_ref())
    }

    /// As [`FormatRegistry::decode`], with the symbology identifier supplied
    /// by the caller instead of extracted from the reading. Candidates still
    /// receive the full reading and strip what they need.
    ///
    /// # Errors
    ///
    /// [`DispatchError::NoMatchingFormat`] when every candidate rejects.
    pub fn decode_with(
        &self,
        raw: &str,
        identifier: Option<&SymbologyIdentifier>,
    ) -> Result<Barcode, DispatchError> {
        for format in &self.formats {
            if let Ok(barcode) = format.decode(raw, identifier) {
                return Ok(barcode);
            }
        }
        Err(DispatchError::NoMatchingFormat {
            raw: raw.to_owned(),
        })
    }

    /// Re-serializes a record through the format that claims it.
    ///
    /// # Errors
    ///
    /// [`BuildError::UnknownFormat`] when no registered format claims the
    /// record, [`BuildError::Encode`] when the owning format fails.
    pub fn encode(&self, barcode: &Barcode) -> Result<String, BuildError> {
        let format = self
            .formats
            .iter()
            .find(|format| format.owns(barcode))
            .ok_or(BuildError::UnknownFormat {
                format: barcode.format_name(),
            })?;
        Ok(format.encode(barcode)?)
    }

    /// Boundary API: decodes a reading, treating empty input as "no barcode"
    /// rather than an error.
    ///
    /// # Errors
    ///
    /// [`ParseFeedback`] with diagnostic text when no format accepts a
    /// non-empty reading.
    pub fn try_parse(&self, raw: &str) -> Result<Option<Barcode>, ParseFeedback> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match self.decode(raw) {
            Ok(barcode) => Ok(Some(barcode)),
            Err(err) => Err(ParseFeedback(err.to_string())),
        }
    }

    /// As [`FormatRegistry::try_parse`], with a caller-supplied symbology
    /// identifier.
    ///
    /// # Errors
    ///
    /// [`ParseFeedback`] with diagnostic text when no format accepts a
    /// non-empty reading.
    pub fn try_parse_with(
        &self,
        raw: &str,
        identifier: Option<&SymbologyIdentifier>,
    ) -> Result<Option<Barcode>, ParseFeedback> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        match self.decode_with(raw, identifier) {
            Ok(barcode) => Ok(Some(barcode)),
            Err(err) => Err(ParseFeedback(err.to_string())),
        }
    }

    /// Boundary API: re-serializes a record, flattening every failure to
    /// `None`. Absent input yields absent output.
    #[must_use]
    pub fn build(&self, barcode: Option<&Barcode>) -> Option<String> {
        self.encode(barcode?).ok()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

lazy_static! {
    /// The crate's stock registry: GS1 first (its element-string grammar is
    /// the most restrictive), then EAN, then Code 39 (which requires an
    /// explicit symbology identifier precisely because its character set is
    /// so permissive).
    pub static ref DEFAULT_REGISTRY: FormatRegistry = FormatRegistry::new()
        .register(Gs1Format)
        .register(EanFormat)
        .register(Code39Format);
}

/// Decodes a raw reading against the stock registry. See
/// [`FormatRegistry::try_parse`].
///
/// # Errors
///
/// [`ParseFeedback`] with diagnostic text when no format accepts a
/// non-empty reading.
pub fn try_parse(raw: &str) -> Result<Option<Barcode>, ParseFeedback> {
    DEFAULT_REGISTRY.try_parse(raw)
}

/// Re-serializes a record through the stock registry. See
/// [`FormatRegistry::build`].
#[must_use]
pub fn build(barcode: Option<&Barcode>) -> Option<String> {
    DEFAULT_REGISTRY.build(barcode)
}

#[cfg(test)]
mod registry_tests {
    use super::*;
    use crate::formats::code39::Code39Barcode;
    use crate::formats::DecodeError;
    use crate::product::ProductCode;

    #[test]
    fn empty_and_whitespace_input_is_no_barcode() {
        assert_eq!(try_parse("").unwrap(), None);
        assert_eq!(try_parse("   \t ").unwrap(), None);
    }

    #[test]
    fn unmatchable_reading_yields_feedback() {
        let err = try_parse("\u{1}\u{2}not a barcode\u{3}").unwrap_err();
        assert!(!err.message().is_empty());
    }

    #[test]
    fn dispatch_is_deterministic() {
        let raw = "]C10105449000000996";
        let first = try_parse(raw).unwrap().unwrap();
        let second = try_parse(raw).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.format_name(), second.format_name());
    }

    #[test]
    fn readings_route_to_their_formats() {
        assert_eq!(
            try_parse("0105449000000996").unwrap().unwrap().format_name(),
            "GS1"
        );
        assert_eq!(
            try_parse("5449000000996").unwrap().unwrap().format_name(),
            "EAN"
        );
        assert_eq!(
            try_parse("]A0ABC-123").unwrap().unwrap().format_name(),
            "Code 39"
        );
    }

    #[test]
    fn caller_supplied_identifier_steers_dispatch() {
        let identifier = SymbologyIdentifier::parse("]E0").unwrap();
        let decoded = DEFAULT_REGISTRY
            .try_parse_with("5449000000996", Some(&identifier))
            .unwrap()
            .unwrap();
        assert_eq!(decoded.format_name(), "EAN");
    }

    #[test]
    fn roundtrip_through_the_boundary_api() {
        let decoded = try_parse("0105449000000996").unwrap();
        let rebuilt = build(decoded.as_ref()).unwrap();
        assert_eq!(try_parse(&rebuilt).unwrap(), decoded);
    }

    #[test]
    fn absent_record_builds_to_nothing() {
        assert_eq!(build(None), None);
    }

    #[test]
    fn unclaimed_record_is_unknown_format() {
        let mut record = Code39Barcode::new();
        record
            .set_product_code(Some(ProductCode::code39("ABCD").unwrap()))
            .unwrap();
        let record = Barcode::Code39(record);

        let gs1_only = FormatRegistry::new().register(Gs1Format);
        assert_eq!(
            gs1_only.encode(&record),
            Err(BuildError::UnknownFormat { format: "Code 39" })
        );
        assert_eq!(gs1_only.build(Some(&record)), None);
    }

    /// Toy format accepting every reading, used to pin down ordering.
    struct AcceptAll {
        label: &'static str,
    }

    impl Format for AcceptAll {
        fn name(&self) -> &'static str {
            self.label
        }

        fn identifiers(&self) -> &'static [&'static str] {
            &[]
        }

        fn decode(
            &self,
            _raw: &str,
            _identifier: Option<&SymbologyIdentifier>,
        ) -> Result<Barcode, DecodeError> {
            let mut record = Code39Barcode::new();
            record
                .set_product_code(Some(
                    ProductCode::code39(self.label).map_err(crate::field::FieldError::from)?,
                ))
                .map_err(DecodeError::from)?;
            Ok(Barcode::Code39(record))
        }

        fn owns(&self, _barcode: &Barcode) -> bool {
            false
        }

        fn encode(&self, _barcode: &Barcode) -> Result<String, crate::formats::EncodeError> {
            Ok(String::new())
        }
    }

    #[test]
    fn first_registered_format_wins_overlaps() {
        let registry = FormatRegistry::new()
            .register(AcceptAll { label: "FIRST" })
            .register(AcceptAll { label: "SECOND" });
        let decoded = registry.decode("anything").unwrap();
        assert_eq!(
            decoded.product_code().unwrap().unwrap().code(),
            "FIRST"
        );

        let reversed = FormatRegistry::new()
            .register(AcceptAll { label: "SECOND" })
            .register(AcceptAll { label: "FIRST" });
        let decoded = reversed.decode("anything").unwrap();
        assert_eq!(
            decoded.product_code().unwrap().unwrap().code(),
            "SECOND"
        );
    }

    #[test]
    fn default_registry_is_shareable_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    try_parse("5449000000996")
                        .unwrap()
                        .unwrap()
                        .format_name()
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), "EAN");
        }
    }
}
