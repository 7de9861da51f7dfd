//! Entity model type definitions
//!
//! An entity type is a named, ordered list of field definitions with exactly
//! one key field. An entity set binds an entity type to a physical
//! collection. Both are declared once at startup and never mutated.

use serde::{Deserialize, Serialize};

/// Primitive field types supported by the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// Instant in time, transported as ISO-8601 text, compared as an instant
    DateTime,
}

impl FieldType {
    /// Returns the type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::DateTime => "datetime",
        }
    }
}

/// A single field declaration within an entity type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field name as it appears in payloads and query options
    pub name: String,

    /// Field data type
    pub field_type: FieldType,

    /// Whether this field is the entity key
    pub is_key: bool,
}

impl FieldDef {
    /// Create a string key field
    pub fn key(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::String,
            is_key: true,
        }
    }

    /// Create a plain string field
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::String,
            is_key: false,
        }
    }

    /// Create a date-time field
    pub fn date_time(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::DateTime,
            is_key: false,
        }
    }
}

/// A named record shape with one key field
///
/// Field order is the declaration order and is preserved in responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityType {
    /// Entity type name
    pub name: String,

    /// Ordered field declarations
    pub fields: Vec<FieldDef>,
}

impl EntityType {
    /// Create a new entity type
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Returns the name of the key field
    ///
    /// Registry validation guarantees exactly one key field exists.
    pub fn key_field(&self) -> &str {
        self.fields
            .iter()
            .find(|f| f.is_key)
            .map(|f| f.name.as_str())
            .unwrap_or("_id")
    }

    /// Iterate declared field names
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

/// A named binding of an entity type to a physical collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySet {
    /// Entity set name as it appears in request paths
    pub name: String,

    /// Name of the bound entity type
    pub entity_type: String,

    /// Physical collection identifier in storage
    pub collection: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event_type() -> EntityType {
        EntityType::new(
            "event",
            vec![
                FieldDef::key("_id"),
                FieldDef::string("project_id"),
                FieldDef::date_time("triggered_at"),
            ],
        )
    }

    #[test]
    fn test_field_lookup() {
        let entity = event_type();
        assert!(entity.field("project_id").is_some());
        assert!(entity.field("unknown").is_none());
    }

    #[test]
    fn test_key_field() {
        let entity = event_type();
        assert_eq!(entity.key_field(), "_id");
    }

    #[test]
    fn test_field_order_preserved() {
        let entity = event_type();
        let names: Vec<&str> = entity.field_names().collect();
        assert_eq!(names, vec!["_id", "project_id", "triggered_at"]);
    }

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::String.type_name(), "string");
        assert_eq!(FieldType::DateTime.type_name(), "datetime");
    }
}
