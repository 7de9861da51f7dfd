//! Entity schema registry
//!
//! Holds the declared entity types and entity sets. Built once at startup,
//! validated during registration, and read-only afterwards, shared across
//! request tasks behind an `Arc` with no synchronization.

use std::collections::HashMap;

use super::errors::{SchemaError, SchemaResult};
use super::types::{EntitySet, EntityType};

/// Registry of declared entity types and sets
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    namespace: String,
    types: HashMap<String, EntityType>,
    sets: HashMap<String, EntitySet>,
    set_order: Vec<String>,
}

impl EntityRegistry {
    /// Create an empty registry under the given model namespace
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            types: HashMap::new(),
            sets: HashMap::new(),
            set_order: Vec::new(),
        }
    }

    /// Returns the model namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Declare an entity type
    ///
    /// Validates that the name is unused, field names are unique, and exactly
    /// one field is marked as key.
    pub fn register_entity_type(&mut self, entity: EntityType) -> SchemaResult<()> {
        if self.types.contains_key(&entity.name) {
            return Err(SchemaError::DuplicateEntityType(entity.name));
        }

        let mut seen = Vec::with_capacity(entity.fields.len());
        for field in &entity.fields {
            if seen.contains(&field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    entity_type: entity.name.clone(),
                    field: field.name.clone(),
                });
            }
            seen.push(field.name.as_str());
        }

        let key_count = entity.fields.iter().filter(|f| f.is_key).count();
        if key_count != 1 {
            return Err(SchemaError::KeyFieldCount {
                entity_type: entity.name.clone(),
                count: key_count,
            });
        }

        self.types.insert(entity.name.clone(), entity);
        Ok(())
    }

    /// Declare an entity set bound to a previously declared entity type
    pub fn register_entity_set(
        &mut self,
        name: impl Into<String>,
        entity_type: impl Into<String>,
        collection: impl Into<String>,
    ) -> SchemaResult<()> {
        let name = name.into();
        let entity_type = entity_type.into();

        if self.sets.contains_key(&name) {
            return Err(SchemaError::DuplicateEntitySet(name));
        }
        if !self.types.contains_key(&entity_type) {
            return Err(SchemaError::UndeclaredEntityType {
                set: name,
                entity_type,
            });
        }

        self.set_order.push(name.clone());
        self.sets.insert(
            name.clone(),
            EntitySet {
                name,
                entity_type,
                collection: collection.into(),
            },
        );
        Ok(())
    }

    /// Resolve an entity set name to its entity type
    pub fn resolve(&self, set_name: &str) -> SchemaResult<&EntityType> {
        let set = self
            .sets
            .get(set_name)
            .ok_or_else(|| SchemaError::UnknownEntitySet(set_name.to_string()))?;
        // Registration guarantees the type exists.
        self.types
            .get(&set.entity_type)
            .ok_or_else(|| SchemaError::UnknownEntitySet(set_name.to_string()))
    }

    /// Returns the physical collection identifier for an entity set
    pub fn collection(&self, set_name: &str) -> SchemaResult<&str> {
        self.sets
            .get(set_name)
            .map(|s| s.collection.as_str())
            .ok_or_else(|| SchemaError::UnknownEntitySet(set_name.to_string()))
    }

    /// Declared entity set names in declaration order
    pub fn set_names(&self) -> &[String] {
        &self.set_order
    }
}
