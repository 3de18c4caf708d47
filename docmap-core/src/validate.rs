//! Schema validation of instance values.
//!
//! Validation is a pure pass over an instance's current values: every field
//! descriptor is checked and every failure is collected, so a failing save
//! surfaces all invalid fields in one round trip instead of stopping at the
//! first. The failure map preserves schema declaration order and carries the
//! offending value itself as the diagnostic (null for a required field that
//! was missing), keeping the failing input available to the caller.
//!
//! Reference and embedded fields are only checked for shape here: an
//! identifier or inline sub-document of the right cardinality. Inline
//! sub-documents are validated against their own schema at save time, since
//! an embedding may attach to a sub-document that has not been saved yet.

use bson::{Bson, Document};

use crate::{
    error::{MapperError, MapperResult},
    field::{Cardinality, FieldDescriptor, FieldKind},
    instance::Instance,
};

/// Checks every schema field against the instance's current values.
///
/// Returns `Ok(())` when all fields pass, or [`MapperError::Validation`]
/// mapping each failing field to its diagnostic value. Performs no backend
/// access and never mutates the instance.
pub fn validate(instance: &Instance) -> MapperResult<()> {
    let mut failing = Document::new();

    for field in instance.schema().fields() {
        check_field(field, instance.get(field.name()), &mut failing);
    }

    if failing.is_empty() {
        Ok(())
    } else {
        Err(MapperError::Validation(failing))
    }
}

fn check_field(field: &FieldDescriptor, value: Option<&Bson>, failing: &mut Document) {
    let value = match value {
        None | Some(Bson::Null) => {
            if field.is_required() {
                failing.insert(field.name(), Bson::Null);
            }
            return;
        }
        Some(value) => value,
    };

    match field.cardinality() {
        Cardinality::Single => {
            if let Some(offender) = offending_value(field.kind(), value) {
                failing.insert(field.name(), offender);
            }
        }
        Cardinality::List => match value {
            Bson::Array(items) => {
                for item in items {
                    if let Some(offender) = offending_value(field.kind(), item) {
                        failing.insert(field.name(), offender);
                        break;
                    }
                }
            }
            other => {
                failing.insert(field.name(), other.clone());
            }
        },
    }
}

fn offending_value(kind: &FieldKind, value: &Bson) -> Option<Bson> {
    match kind {
        FieldKind::Primitive(predicate) => match predicate.check(value) {
            Some(_) => None,
            None => Some(value.clone()),
        },
        // an identifier, or an inline sub-document awaiting a cascading save
        FieldKind::Reference(_) => match value {
            Bson::String(_) | Bson::Document(_) => None,
            other => Some(other.clone()),
        },
        FieldKind::Embedded(_) => match value {
            Bson::Document(_) => None,
            other => Some(other.clone()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{field::FieldKind, schema::Schema};
    use bson::doc;
    use std::sync::Arc;

    fn instance(values: Document) -> Instance {
        let schema = Arc::new(
            Schema::builder("items")
                .field("string", FieldKind::string_max(5))
                .field("number", FieldKind::number())
                .list("tags", FieldKind::reference("tags"))
                .optional("note", FieldKind::string())
                .build(),
        );
        Instance::new(schema, values)
    }

    fn failing_fields(result: MapperResult<()>) -> Document {
        match result {
            Err(MapperError::Validation(fields)) => fields,
            other => panic!("expected a validation failure, got {other:?}"),
        }
    }

    #[test]
    fn collects_every_missing_required_field() {
        let fields = failing_fields(validate(&instance(doc! {})));
        assert_eq!(
            fields,
            doc! { "string": null, "number": null, "tags": null }
        );
    }

    #[test]
    fn reports_the_offending_value_itself() {
        let fields = failing_fields(validate(&instance(doc! {
            "string": "too long string",
            "number": 0,
            "tags": ["a"],
        })));
        assert_eq!(fields, doc! { "string": "too long string" });
    }

    #[test]
    fn failure_order_follows_schema_declaration_order() {
        let fields = failing_fields(validate(&instance(doc! {
            "string": 9,
            "number": "nine",
        })));
        let names: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["string", "number", "tags"]);
    }

    #[test]
    fn reference_lists_accept_ids_and_inline_documents() {
        assert!(
            validate(&instance(doc! {
                "string": "ok",
                "number": 1,
                "tags": ["id-1", { "name": "inline" }],
            }))
            .is_ok()
        );

        let fields = failing_fields(validate(&instance(doc! {
            "string": "ok",
            "number": 1,
            "tags": [42],
        })));
        assert_eq!(fields, doc! { "tags": 42 });
    }

    #[test]
    fn optional_fields_may_be_absent_or_null() {
        assert!(
            validate(&instance(doc! {
                "string": "ok",
                "number": 1,
                "tags": [],
                "note": null,
            }))
            .is_ok()
        );
    }
}
