//! Flat-equality matching of raw documents against query criteria.

use bson::{Bson, Document};

/// Whether `document` satisfies every criterion in `criteria`. An empty
/// criteria document matches everything.
pub(crate) fn matches(document: &Document, criteria: &Document) -> bool {
    criteria.iter().all(|(field, expected)| {
        document
            .get(field)
            .is_some_and(|actual| bson_eq(actual, expected))
    })
}

// integers and doubles compare across widths, since callers mix numeric
// literal types freely
fn bson_eq(left: &Bson, right: &Bson) -> bool {
    match (numeric(left), numeric(right)) {
        (Some(l), Some(r)) => l == r,
        _ => left == right,
    }
}

fn numeric(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}
