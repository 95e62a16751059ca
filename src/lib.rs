pub mod barcode;
pub mod date;
pub mod error;
pub mod field;
pub mod formats;
pub mod prelude;
pub mod product;
pub mod registry;
pub mod symbology;

pub use crate::barcode::{Barcode, UnsupportedProperty};
pub use crate::date::{BarcodeDate, DatePrecision};
pub use crate::error::{LengthError, ValidateError};
pub use crate::field::{
    collection::{Field, FieldCollection},
    FieldCodec, FieldError, FieldKind, FieldValue, LengthBounds, TypeError,
};
pub use crate::formats::{
    code39::{Code39Barcode, Code39Format},
    ean::{EanBarcode, EanFormat},
    gs1::{Gs1Barcode, Gs1Format},
    DecodeError, EncodeError, Format,
};
pub use crate::product::{ProductCode, ProductCodeKind};
pub use crate::registry::{
    build, try_parse, BuildError, DispatchError, FormatRegistry, ParseFeedback, DEFAULT_REGISTRY,
};
pub use crate::symbology::{ReaderModifier, SymbologyIdentifier};
