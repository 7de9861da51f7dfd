//! Built-in IoT event model
//!
//! Declares the three collections served by the gateway. The model is fixed
//! at build time; the namespace comes from configuration.

use super::errors::SchemaResult;
use super::registry::EntityRegistry;
use super::types::{EntityType, FieldDef};

/// Build the registry for the IoT event model
pub fn iot_event_model(namespace: &str) -> SchemaResult<EntityRegistry> {
    let mut registry = EntityRegistry::new(namespace);

    registry.register_entity_type(EntityType::new(
        "event",
        vec![
            FieldDef::key("_id"),
            FieldDef::string("project_id"),
            FieldDef::string("group_id"),
            FieldDef::string("device_id"),
            FieldDef::string("type"),
            FieldDef::string("text"),
            FieldDef::string("dismissed"),
            FieldDef::string("user_id"),
            FieldDef::string("rule_id"),
            FieldDef::string("rawdata_id"),
            FieldDef::date_time("triggered_at"),
        ],
    ))?;

    registry.register_entity_type(EntityType::new(
        "event_rule",
        vec![
            FieldDef::key("_id"),
            FieldDef::string("project_id"),
            FieldDef::string("group_id"),
            FieldDef::string("device_id"),
            FieldDef::string("rule_name"),
            FieldDef::string("operator"),
            FieldDef::string("operator_reference"),
        ],
    ))?;

    registry.register_entity_type(EntityType::new(
        "command",
        vec![
            FieldDef::key("_id"),
            FieldDef::string("project_id"),
            FieldDef::string("group_id"),
            FieldDef::string("device_id"),
            FieldDef::string("type"),
            FieldDef::string("command"),
            FieldDef::date_time("created_at"),
            FieldDef::date_time("confirmed_at"),
        ],
    ))?;

    registry.register_entity_set("event", "event", "event")?;
    registry.register_entity_set("event_rule", "event_rule", "event_rule")?;
    registry.register_entity_set("command", "command", "command")?;

    Ok(registry)
}
