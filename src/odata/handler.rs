//! Request dispatch
//!
//! The façade the transport layer calls into. Resolves the addressed entity
//! set, picks the operation from method and key presence, and sequences
//! query translation, storage access and response shaping. Unknown entity
//! sets fail before any query parsing.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::errors::{GatewayError, GatewayResult};
use super::query::translate;
use super::response::{collection_envelope, singleton_envelope};
use super::{mutation, QuerySpec};
use crate::schema::{EntityRegistry, EntityType};
use crate::storage::DocumentStore;

/// Entity set plus optional key parsed from a request path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourcePath {
    /// Addressed entity set
    pub entity_set: String,

    /// Key from the `('...')` suffix, when present
    pub key: Option<String>,
}

/// Parse a path segment of the form `set` or `set('key')`
pub fn parse_resource_path(segment: &str) -> GatewayResult<ResourcePath> {
    match segment.find("('") {
        None => {
            if segment.contains(['(', ')']) {
                return Err(GatewayError::Query(format!(
                    "malformed resource path '{segment}'"
                )));
            }
            Ok(ResourcePath {
                entity_set: segment.to_string(),
                key: None,
            })
        }
        Some(open) => {
            let set = &segment[..open];
            let rest = &segment[open + 2..];
            let key = rest.strip_suffix("')").ok_or_else(|| {
                GatewayError::Query(format!("malformed resource path '{segment}'"))
            })?;
            if set.is_empty() || key.is_empty() {
                return Err(GatewayError::Query(format!(
                    "malformed resource path '{segment}'"
                )));
            }
            Ok(ResourcePath {
                entity_set: set.to_string(),
                key: Some(key.to_string()),
            })
        }
    }
}

/// Protocol façade over the registry and the storage handle
///
/// One instance serves all requests; it holds only read-only shared state.
#[derive(Clone)]
pub struct ODataGateway {
    registry: Arc<EntityRegistry>,
    store: Arc<dyn DocumentStore>,
}

impl ODataGateway {
    /// Create the gateway from its collaborators
    pub fn new(registry: Arc<EntityRegistry>, store: Arc<dyn DocumentStore>) -> Self {
        Self { registry, store }
    }

    /// Declared entity set names, for the service document
    pub fn entity_sets(&self) -> &[String] {
        self.registry.set_names()
    }

    fn resolve(&self, entity_set: &str) -> GatewayResult<(&EntityType, &str)> {
        let entity = self.registry.resolve(entity_set)?;
        let collection = self.registry.collection(entity_set)?;
        Ok((entity, collection))
    }

    /// `GET /{set}`: list records under the given query options
    pub async fn list(
        &self,
        entity_set: &str,
        options: &HashMap<String, String>,
    ) -> GatewayResult<Value> {
        let (entity, collection) = self.resolve(entity_set)?;
        let spec: QuerySpec = translate(options, entity)?;
        let records = self.store.find(collection, &spec).await?;
        Ok(collection_envelope(records, entity, spec.select.as_deref()))
    }

    /// `GET /{set}('{key}')`: fetch one record
    pub async fn get(&self, entity_set: &str, key: &str) -> GatewayResult<Value> {
        let (entity, collection) = self.resolve(entity_set)?;
        let record = self
            .store
            .find_one(collection, entity.key_field(), key)
            .await?
            .ok_or(GatewayError::NotFound)?;
        Ok(singleton_envelope(record, entity, None))
    }

    /// `POST /{set}`: create a record, returning the stored form
    pub async fn create(&self, entity_set: &str, payload: Value) -> GatewayResult<Value> {
        let (entity, collection) = self.resolve(entity_set)?;
        let record = mutation::create(entity, collection, self.store.as_ref(), payload).await?;
        Ok(singleton_envelope(record, entity, None))
    }

    /// `PUT or MERGE /{set}('{key}')`: merge fields over an existing record
    pub async fn update(&self, entity_set: &str, key: &str, payload: Value) -> GatewayResult<()> {
        let (entity, collection) = self.resolve(entity_set)?;
        mutation::update(entity, collection, self.store.as_ref(), key, payload).await
    }

    /// `DELETE /{set}('{key}')`: remove a record
    pub async fn delete(&self, entity_set: &str, key: &str) -> GatewayResult<()> {
        let (entity, collection) = self.resolve(entity_set)?;
        mutation::remove(entity, collection, self.store.as_ref(), key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::iot_event_model;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn gateway() -> ODataGateway {
        let registry = Arc::new(iot_event_model("iothub").unwrap());
        ODataGateway::new(registry, Arc::new(MemoryStore::new()))
    }

    #[test]
    fn test_parse_plain_set() {
        let path = parse_resource_path("event").unwrap();
        assert_eq!(path.entity_set, "event");
        assert_eq!(path.key, None);
    }

    #[test]
    fn test_parse_keyed_set() {
        let path = parse_resource_path("event('abc-123')").unwrap();
        assert_eq!(path.entity_set, "event");
        assert_eq!(path.key.as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_parse_malformed_paths() {
        for bad in ["event('abc'", "event(abc)", "('abc')", "event('')"] {
            assert!(parse_resource_path(bad).is_err(), "path: {bad}");
        }
    }

    #[tokio::test]
    async fn test_unknown_set_fails_before_query_parsing() {
        let gateway = gateway();
        // The $filter is invalid, but the unknown set wins.
        let options: HashMap<String, String> =
            [("$filter".to_string(), "!!!".to_string())].into();
        let err = gateway.list("widgets", &options).await.unwrap_err();
        assert!(matches!(err, GatewayError::UnknownEntitySet(_)));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_not_found() {
        let gateway = gateway();
        let err = gateway.get("event", "zz").await.unwrap_err();
        assert!(matches!(err, GatewayError::NotFound));
    }

    #[tokio::test]
    async fn test_create_then_list_with_filter() {
        let gateway = gateway();
        let created = gateway
            .create(
                "event",
                json!({"project_id": "p1", "type": "alert", "text": "disk full"}),
            )
            .await
            .unwrap();
        let key = created["d"]["_id"].as_str().unwrap().to_string();

        let options: HashMap<String, String> =
            [("$filter".to_string(), "project_id eq 'p1'".to_string())].into();
        let listed = gateway.list("event", &options).await.unwrap();
        let results = listed["d"]["results"].as_array().unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["_id"], key.as_str());
        assert_eq!(results[0]["text"], "disk full");
    }
}
