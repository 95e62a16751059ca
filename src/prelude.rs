//! Common import module
//!
//! Blanket-imports the types and functions that almost every consumer of
//! this crate ends up needing, so that downstream code can begin with
//! `use scansion::prelude::*;` and have the whole working vocabulary in
//! scope: the record union, the per-format record types, the stock
//! registry entry points, and the error types those surface.

pub use crate::barcode::{Barcode, UnsupportedProperty};
pub use crate::date::{BarcodeDate, DatePrecision};
pub use crate::error::{LengthError, ValidateError};
pub use crate::field::collection::{Field, FieldCollection};
pub use crate::field::{FieldCodec, FieldError, FieldKind, FieldValue, LengthBounds, TypeError};
pub use crate::formats::code39::{Code39Barcode, Code39Format};
pub use crate::formats::ean::{EanBarcode, EanFormat};
pub use crate::formats::gs1::{Gs1Barcode, Gs1Format};
pub use crate::formats::{DecodeError, EncodeError, Format};
pub use crate::product::{ProductCode, ProductCodeKind};
pub use crate::registry::{
    build, try_parse, BuildError, DispatchError, FormatRegistry, ParseFeedback, DEFAULT_REGISTRY,
};
pub use crate::symbology::{ReaderModifier, SymbologyIdentifier};
