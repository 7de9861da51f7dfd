//! Entity schema subsystem
//!
//! Declares the entity model served by the gateway: typed entity shapes,
//! their key fields, and the entity sets that bind them to collections.
//! The registry is constructed once at startup and injected read-only into
//! the request pipeline.

mod errors;
mod model;
mod registry;
mod types;

pub use errors::{SchemaError, SchemaResult};
pub use model::iot_event_model;
pub use registry::EntityRegistry;
pub use types::{EntitySet, EntityType, FieldDef, FieldType};
