//! Schema field descriptors and the pluggable type-predicate contract.
//!
//! A [`FieldDescriptor`] captures one schema field: what values it accepts
//! ([`FieldKind`]), whether it holds one value or an ordered list
//! ([`Cardinality`]), and whether it is required. Primitive kinds delegate
//! value checking to a [`TypePredicate`], a pass/fail contract that may also
//! coerce the value into its canonical stored form. Stock predicates cover
//! strings (with optional maximum length), numbers, booleans, and dates;
//! anything else plugs in through [`FieldKind::predicate`].
//!
//! # Example
//!
//! ```ignore
//! use docmap::field::FieldKind;
//!
//! let name = FieldKind::string_max(64);
//! let tags = FieldKind::reference("tags");
//! let address = FieldKind::embedded("addresses");
//! ```

use bson::Bson;
use chrono::Utc;
use std::{fmt::Debug, sync::Arc};

/// Pass/fail check applied to a primitive field value.
///
/// `check` returns the value to store on pass — usually the input itself, but
/// a predicate may coerce it into a canonical representation (the stock date
/// predicate turns an RFC 3339 string into a BSON datetime). A `None` return
/// fails validation and the offending input is reported to the caller.
pub trait TypePredicate: Send + Sync + Debug {
    /// Checks `value`, returning the (possibly coerced) value on pass.
    fn check(&self, value: &Bson) -> Option<Bson>;
}

/// Whether a field holds a single value or an ordered list of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Exactly one value.
    Single,
    /// An ordered list of values; order is preserved through storage.
    List,
}

/// The closed set of value shapes a schema field can declare.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// A plain value checked by a [`TypePredicate`].
    Primitive(Arc<dyn TypePredicate>),
    /// The identity of a document in the named target collection. Stored as
    /// an identifier only; hydrated on demand by a join.
    Reference(String),
    /// A full sub-document of the named target collection's shape, stored
    /// inline in the owning document's body.
    Embedded(String),
}

impl FieldKind {
    /// A string field of any length.
    pub fn string() -> Self {
        FieldKind::Primitive(Arc::new(StringPredicate { max_length: None }))
    }

    /// A string field of at most `max` characters.
    pub fn string_max(max: usize) -> Self {
        FieldKind::Primitive(Arc::new(StringPredicate { max_length: Some(max) }))
    }

    /// A numeric field (any BSON integer or double).
    pub fn number() -> Self {
        FieldKind::Primitive(Arc::new(NumberPredicate))
    }

    /// A boolean field.
    pub fn boolean() -> Self {
        FieldKind::Primitive(Arc::new(BooleanPredicate))
    }

    /// A datetime field. Accepts BSON datetimes directly and coerces RFC 3339
    /// strings.
    pub fn date() -> Self {
        FieldKind::Primitive(Arc::new(DatePredicate))
    }

    /// A primitive field checked by a caller-supplied predicate.
    pub fn predicate(predicate: Arc<dyn TypePredicate>) -> Self {
        FieldKind::Primitive(predicate)
    }

    /// A by-identity reference to a document in `target`.
    pub fn reference(target: impl Into<String>) -> Self {
        FieldKind::Reference(target.into())
    }

    /// An inline sub-document shaped by the schema registered for `target`.
    pub fn embedded(target: impl Into<String>) -> Self {
        FieldKind::Embedded(target.into())
    }

    /// The target collection name for reference and embedded kinds.
    pub fn target(&self) -> Option<&str> {
        match self {
            FieldKind::Reference(target) | FieldKind::Embedded(target) => Some(target),
            FieldKind::Primitive(_) => None,
        }
    }
}

/// A single schema field: name, kind, cardinality, and presence requirement.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    kind: FieldKind,
    cardinality: Cardinality,
    required: bool,
}

impl FieldDescriptor {
    /// A required single-valued field.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            cardinality: Cardinality::Single,
            required: true,
        }
    }

    /// A required list-valued field.
    pub fn list(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            cardinality: Cardinality::List,
            ..Self::new(name, kind)
        }
    }

    /// Marks this field as optional; a missing or null value passes
    /// validation.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// The field's name, unique within its schema.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's value shape.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether the field holds one value or a list.
    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    /// Whether a value must be present for validation to pass.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Whether this field relates to another collection's documents.
    pub fn is_relation(&self) -> bool {
        self.kind.target().is_some()
    }
}

#[derive(Debug)]
struct StringPredicate {
    max_length: Option<usize>,
}

impl TypePredicate for StringPredicate {
    fn check(&self, value: &Bson) -> Option<Bson> {
        match value {
            Bson::String(s)
                if self
                    .max_length
                    .is_none_or(|max| s.chars().count() <= max) =>
            {
                Some(value.clone())
            }
            _ => None,
        }
    }
}

#[derive(Debug)]
struct NumberPredicate;

impl TypePredicate for NumberPredicate {
    fn check(&self, value: &Bson) -> Option<Bson> {
        match value {
            Bson::Int32(_) | Bson::Int64(_) | Bson::Double(_) => Some(value.clone()),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct BooleanPredicate;

impl TypePredicate for BooleanPredicate {
    fn check(&self, value: &Bson) -> Option<Bson> {
        match value {
            Bson::Boolean(_) => Some(value.clone()),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct DatePredicate;

impl TypePredicate for DatePredicate {
    fn check(&self, value: &Bson) -> Option<Bson> {
        match value {
            Bson::DateTime(_) => Some(value.clone()),
            Bson::String(s) => chrono::DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|parsed| {
                    Bson::DateTime(bson::DateTime::from_chrono(parsed.with_timezone(&Utc)))
                }),
            _ => None,
        }
    }
}
