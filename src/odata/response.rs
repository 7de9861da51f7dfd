//! OData response envelopes
//!
//! Wraps stored records in the OData v2 `d` envelope:
//! `{ "d": { "results": [...] } }` for collections and `{ "d": {...} }` for
//! single records. Output field order mirrors the entity type declaration,
//! restricted to the projection when one was given; undeclared stored fields
//! pass through after the declared ones on unprojected reads. Date-time
//! fields are normalized to UTC millisecond ISO-8601 text.

use serde_json::{Map, Value};

use super::time::{format_instant, parse_instant};
use crate::schema::{EntityType, FieldType};

/// Envelope for a collection query
pub fn collection_envelope(
    records: Vec<Value>,
    entity: &EntityType,
    projection: Option<&[String]>,
) -> Value {
    let results: Vec<Value> = records
        .into_iter()
        .map(|record| shape_record(record, entity, projection))
        .collect();

    serde_json::json!({ "d": { "results": results } })
}

/// Envelope for a single record
pub fn singleton_envelope(
    record: Value,
    entity: &EntityType,
    projection: Option<&[String]>,
) -> Value {
    serde_json::json!({ "d": shape_record(record, entity, projection) })
}

/// Project and reorder one stored record for output
fn shape_record(record: Value, entity: &EntityType, projection: Option<&[String]>) -> Value {
    let Value::Object(stored) = record else {
        // Storage hands back objects; anything else passes through untouched.
        return record;
    };

    let mut shaped = Map::new();

    for field in &entity.fields {
        if let Some(projected) = projection {
            if !projected.iter().any(|name| name == &field.name) {
                continue;
            }
        }
        if let Some(value) = stored.get(&field.name) {
            shaped.insert(field.name.clone(), render_value(value, field.field_type));
        }
    }

    // Undeclared stored fields pass through on unprojected reads.
    if projection.is_none() {
        for (name, value) in &stored {
            if entity.field(name).is_none() {
                shaped.insert(name.clone(), value.clone());
            }
        }
    }

    Value::Object(shaped)
}

fn render_value(value: &Value, field_type: FieldType) -> Value {
    match (field_type, value) {
        (FieldType::DateTime, Value::String(text)) => match parse_instant(text) {
            Some(instant) => Value::String(format_instant(instant)),
            // Unparseable stored text is passed through as-is.
            None => value.clone(),
        },
        _ => value.clone(),
    }
}
