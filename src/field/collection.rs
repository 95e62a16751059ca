//! Ordered, uniquely-keyed field storage for one decoded record
//!
//! A [`FieldCollection`] holds the fixed set of field slots a concrete
//! barcode format declares, in the format's canonical order. The order is
//! semantically significant: it is also the serialization order on the
//! encode path. Keys are unique; the declared set never changes after
//! construction, only the values held in the slots do.

use std::fmt::{self, Debug};

use super::{FieldKind, FieldValue, LengthBounds, TypeError};

/// One named field slot: a unique key, the expected value kind, the declared
/// serialized-length bounds, and the current value (if any).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Field {
    key: &'static str,
    kind: FieldKind,
    bounds: LengthBounds,
    value: Option<FieldValue>,
}

impl Field {
    /// Declares an empty field slot.
    #[must_use]
    pub const fn new(key: &'static str, kind: FieldKind, bounds: LengthBounds) -> Self {
        Self {
            key,
            kind,
            bounds,
            value: None,
        }
    }

    /// Returns the unique key of this field within its collection.
    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Returns the value kind this slot admits.
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    /// Returns the declared serialized-length bounds.
    #[must_use]
    pub fn bounds(&self) -> &LengthBounds {
        &self.bounds
    }

    /// Returns the current value, if one has been set.
    #[must_use]
    pub fn value(&self) -> Option<&FieldValue> {
        self.value.as_ref()
    }

    /// Replaces the value held in this slot.
    ///
    /// # Errors
    ///
    /// [`TypeError`] when the incoming value's variant does not match the
    /// slot's declared kind. The slot is left unchanged on error.
    pub fn set(&mut self, value: Option<FieldValue>) -> Result<(), TypeError> {
        if let Some(ref value) = value {
            if value.kind() != self.kind {
                return Err(TypeError {
                    expected: self.kind,
                    actual: value.kind(),
                });
            }
        }
        self.value = value;
        Ok(())
    }
}

/// The ordered field set of one decoded record.
///
/// Owned exclusively by the record it backs; external consumers reach it
/// read-only, and mutation happens only through the owning record's typed
/// setters.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldCollection {
    fields: Vec<Field>,
}

impl FieldCollection {
    /// Builds a collection from a format's declared field set.
    ///
    /// # Panics
    ///
    /// Panics when two declared fields share a key. Field sets are written
    /// once, by the format author, so a duplicate key is a programming error
    /// rather than a runtime condition.
    #[must_use]
    pub fn new(fields: Vec<Field>) -> Self {
        for (i, field) in fields.iter().enumerate() {
            assert!(
                !fields[..i].iter().any(|prior| prior.key == field.key),
                "duplicate field key `{}` in declared field set",
                field.key
            );
        }
        Self { fields }
    }

    /// Looks a field up by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.key == key)
    }

    /// Returns the current value of the keyed field, flattening the
    /// slot-missing and value-absent cases together.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.get(key).and_then(Field::value)
    }

    /// True when the keyed field holds a value.
    #[must_use]
    pub fn is_set(&self, key: &str) -> bool {
        self.value(key).is_some()
    }

    /// Replaces the value of the keyed field.
    ///
    /// # Errors
    ///
    /// [`TypeError`] when the value's variant does not match the slot's kind.
    ///
    /// # Panics
    ///
    /// Panics when `key` was never declared; typed setters only ever name
    /// declared keys, so an unknown key is a programming error.
    pub fn set(&mut self, key: &str, value: Option<FieldValue>) -> Result<(), TypeError> {
        let field = self
            .fields
            .iter_mut()
            .find(|field| field.key == key)
            .unwrap_or_else(|| panic!("field key `{key}` was never declared"));
        field.set(value)
    }

    /// Iterates the fields in declaration (= serialization) order.
    pub fn iter(&self) -> std::slice::Iter<'_, Field> {
        self.fields.iter()
    }

    /// Number of declared fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when the format declares no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<'a> IntoIterator for &'a FieldCollection {
    type Item = &'a Field;
    type IntoIter = std::slice::Iter<'a, Field>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

impl Debug for FieldCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.fields.iter().map(|field| (field.key, &field.value)))
            .finish()
    }
}

#[cfg(test)]
mod collection_tests {
    use super::*;

    fn sample() -> FieldCollection {
        FieldCollection::new(vec![
            Field::new("01", FieldKind::ProductCode, LengthBounds::exactly(14)),
            Field::new("10", FieldKind::Text, LengthBounds::at_most(20)),
            Field::new("21", FieldKind::Text, LengthBounds::at_most(20)),
        ])
    }

    #[test]
    fn iteration_preserves_declaration_order() {
        let keys: Vec<_> = sample().iter().map(Field::key).collect();
        assert_eq!(keys, vec!["01", "10", "21"]);
    }

    #[test]
    #[should_panic(expected = "duplicate field key")]
    fn duplicate_keys_are_a_declaration_error() {
        let _ = FieldCollection::new(vec![
            Field::new("01", FieldKind::ProductCode, LengthBounds::none()),
            Field::new("01", FieldKind::Text, LengthBounds::none()),
        ]);
    }

    #[test]
    fn set_enforces_declared_kind() {
        let mut fields = sample();
        let err = fields
            .set("10", Some(FieldValue::ProductCode(
                crate::product::ProductCode::ean("96385074").unwrap(),
            )))
            .unwrap_err();
        assert_eq!(err.expected, FieldKind::Text);
        assert_eq!(err.actual, FieldKind::ProductCode);
        assert!(!fields.is_set("10"));

        fields
            .set("10", Some(FieldValue::Text("LOT1".to_owned())))
            .unwrap();
        assert!(fields.is_set("10"));
        fields.set("10", None).unwrap();
        assert!(!fields.is_set("10"));
    }

    #[test]
    fn lookup_distinguishes_missing_slot_from_absent_value() {
        let fields = sample();
        assert!(fields.get("10").is_some());
        assert!(fields.value("10").is_none());
        assert!(fields.get("unknown").is_none());
    }
}
