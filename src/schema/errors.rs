//! Schema declaration errors
//!
//! All schema errors are startup-fatal: the entity model is declared once at
//! process start and a misdeclared model must abort boot.

use thiserror::Error;

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while declaring or resolving the entity model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// An entity type with this name is already registered
    #[error("entity type '{0}' is already registered")]
    DuplicateEntityType(String),

    /// An entity set with this name is already registered
    #[error("entity set '{0}' is already registered")]
    DuplicateEntitySet(String),

    /// An entity set references a type that was never declared
    #[error("entity set '{set}' references undeclared entity type '{entity_type}'")]
    UndeclaredEntityType { set: String, entity_type: String },

    /// An entity type declares a field name twice
    #[error("entity type '{entity_type}' declares field '{field}' more than once")]
    DuplicateField { entity_type: String, field: String },

    /// An entity type must declare exactly one key field
    #[error("entity type '{entity_type}' declares {count} key fields, expected exactly one")]
    KeyFieldCount { entity_type: String, count: usize },

    /// Lookup of an entity set that was never declared
    #[error("unknown entity set '{0}'")]
    UnknownEntitySet(String),
}
