//! Mutation handling
//!
//! Validates create/update/delete payloads against the entity type before
//! any storage call, then performs exactly one storage mutation. Validation
//! failures never leave partial writes behind.

use serde_json::{Map, Value};
use uuid::Uuid;

use super::errors::{GatewayError, GatewayResult};
use super::time::{format_instant, parse_instant};
use crate::schema::{EntityType, FieldType};
use crate::storage::DocumentStore;

/// Create a record, assigning a key when the client omitted one
///
/// Returns the stored record.
pub async fn create(
    entity: &EntityType,
    collection: &str,
    store: &dyn DocumentStore,
    payload: Value,
) -> GatewayResult<Value> {
    let mut fields = validate_payload(entity, payload)?;

    let key_field = entity.key_field();
    if !fields.contains_key(key_field) {
        fields.insert(
            key_field.to_string(),
            Value::String(Uuid::new_v4().to_string()),
        );
    }

    let record = Value::Object(fields);
    store.insert(collection, record.clone()).await?;
    Ok(record)
}

/// Merge the payload fields over an existing record
///
/// The payload key, when present, must equal the path key; the key itself is
/// never rewritten.
pub async fn update(
    entity: &EntityType,
    collection: &str,
    store: &dyn DocumentStore,
    key: &str,
    payload: Value,
) -> GatewayResult<()> {
    let mut changes = validate_payload(entity, payload)?;

    let key_field = entity.key_field();
    if let Some(payload_key) = changes.remove(key_field) {
        if payload_key.as_str() != Some(key) {
            return Err(GatewayError::Conflict(format!(
                "payload key '{}' does not match path key '{}'",
                payload_key.as_str().unwrap_or_default(),
                key
            )));
        }
    }

    let matched = store.update(collection, key_field, key, &changes).await?;
    if !matched {
        return Err(GatewayError::NotFound);
    }
    Ok(())
}

/// Remove a record; a missing key is an error, never a silent success
pub async fn remove(
    entity: &EntityType,
    collection: &str,
    store: &dyn DocumentStore,
    key: &str,
) -> GatewayResult<()> {
    let matched = store.remove(collection, entity.key_field(), key).await?;
    if !matched {
        return Err(GatewayError::NotFound);
    }
    Ok(())
}

/// Validate payload fields and values against the entity type
///
/// Rejects non-object payloads, undeclared fields, non-string values, and
/// date-time text that does not parse as an instant. Date-time values are
/// normalized to the fixed wire form before storage.
fn validate_payload(entity: &EntityType, payload: Value) -> GatewayResult<Map<String, Value>> {
    let Value::Object(supplied) = payload else {
        return Err(GatewayError::Payload("payload must be a JSON object".into()));
    };

    let mut validated = Map::new();
    for (name, value) in supplied {
        let field = entity.field(&name).ok_or_else(|| {
            GatewayError::Payload(format!(
                "unknown field '{}' for entity type '{}'",
                name, entity.name
            ))
        })?;

        let Value::String(text) = &value else {
            return Err(GatewayError::Payload(format!(
                "field '{}' must be a {} value",
                name,
                field.field_type.type_name()
            )));
        };

        let normalized = match field.field_type {
            FieldType::String => value.clone(),
            FieldType::DateTime => {
                let instant = parse_instant(text).ok_or_else(|| {
                    GatewayError::Payload(format!(
                        "field '{name}' must be an ISO-8601 date-time, got '{text}'"
                    ))
                })?;
                Value::String(format_instant(instant))
            }
        };
        validated.insert(name, normalized);
    }

    Ok(validated)
}
