//! In-process document store
//!
//! Keeps collections as vectors of JSON objects behind an `RwLock`. Used by
//! the test suites and for self-hosted single-node deployments; a networked
//! backend plugs in through the same [`DocumentStore`] trait.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::errors::{StorageError, StorageResult};
use super::DocumentStore;
use crate::odata::time::parse_instant;
use crate::odata::{OrderKey, QuerySpec};
use crate::schema::FieldType;

/// In-memory [`DocumentStore`] implementation
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StorageResult<std::sync::RwLockReadGuard<'_, HashMap<String, Vec<Value>>>> {
        self.collections.read().map_err(|_| StorageError::LockPoisoned)
    }

    fn write(&self) -> StorageResult<std::sync::RwLockWriteGuard<'_, HashMap<String, Vec<Value>>>> {
        self.collections.write().map_err(|_| StorageError::LockPoisoned)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, query: &QuerySpec) -> StorageResult<Vec<Value>> {
        let guard = self.read()?;
        let records = guard.get(collection).map(Vec::as_slice).unwrap_or(&[]);

        let mut matched: Vec<Value> = records
            .iter()
            .filter(|record| match &query.filter {
                Some(filter) => filter.matches(record),
                None => true,
            })
            .cloned()
            .collect();
        drop(guard);

        sort_records(&mut matched, &query.order);

        let skipped = query.skip.unwrap_or(0);
        let mut page: Vec<Value> = matched.into_iter().skip(skipped).collect();
        if let Some(top) = query.top {
            page.truncate(top);
        }
        Ok(page)
    }

    async fn find_one(
        &self,
        collection: &str,
        key_field: &str,
        key: &str,
    ) -> StorageResult<Option<Value>> {
        let guard = self.read()?;
        Ok(guard
            .get(collection)
            .and_then(|records| records.iter().find(|r| key_matches(r, key_field, key)))
            .cloned())
    }

    async fn insert(&self, collection: &str, record: Value) -> StorageResult<()> {
        let mut guard = self.write()?;
        guard.entry(collection.to_string()).or_default().push(record);
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        key_field: &str,
        key: &str,
        changes: &Map<String, Value>,
    ) -> StorageResult<bool> {
        let mut guard = self.write()?;
        let Some(records) = guard.get_mut(collection) else {
            return Ok(false);
        };
        let Some(record) = records.iter_mut().find(|r| key_matches(r, key_field, key)) else {
            return Ok(false);
        };
        if let Value::Object(fields) = record {
            for (name, value) in changes {
                fields.insert(name.clone(), value.clone());
            }
        }
        Ok(true)
    }

    async fn remove(&self, collection: &str, key_field: &str, key: &str) -> StorageResult<bool> {
        let mut guard = self.write()?;
        let Some(records) = guard.get_mut(collection) else {
            return Ok(false);
        };
        let before = records.len();
        records.retain(|r| !key_matches(r, key_field, key));
        Ok(records.len() < before)
    }
}

fn key_matches(record: &Value, key_field: &str, key: &str) -> bool {
    record.get(key_field).and_then(Value::as_str) == Some(key)
}

/// Sort records by the compiled order keys
///
/// Missing fields sort before present ones; instants compare as points in
/// time, everything else as text.
fn sort_records(records: &mut [Value], order: &[OrderKey]) {
    if order.is_empty() {
        return;
    }

    records.sort_by(|a, b| {
        for key in order {
            let ordering = compare_field(a, b, key);
            let ordering = if key.ascending { ordering } else { ordering.reverse() };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

fn compare_field(a: &Value, b: &Value, key: &OrderKey) -> Ordering {
    let a_text = a.get(&key.field).and_then(Value::as_str);
    let b_text = b.get(&key.field).and_then(Value::as_str);

    match key.field_type {
        FieldType::DateTime => {
            let a_instant = a_text.and_then(parse_instant);
            let b_instant = b_text.and_then(parse_instant);
            a_instant.cmp(&b_instant)
        }
        FieldType::String => a_text.cmp(&b_text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::odata::filter::{CompareOp, FilterExpr, FilterValue};
    use serde_json::json;

    fn spec() -> QuerySpec {
        QuerySpec::default()
    }

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        for record in [
            json!({"_id": "a", "project_id": "p1", "triggered_at": "2021-03-01T00:00:00Z"}),
            json!({"_id": "b", "project_id": "p2", "triggered_at": "2021-01-01T00:00:00Z"}),
            json!({"_id": "c", "project_id": "p1", "triggered_at": "2021-02-01T00:00:00Z"}),
        ] {
            store.insert("event", record).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_find_all() {
        let store = seeded_store().await;
        let records = store.find("event", &spec()).await.unwrap();
        assert_eq!(records.len(), 3);
    }

    #[tokio::test]
    async fn test_find_with_filter() {
        let store = seeded_store().await;
        let query = QuerySpec {
            filter: Some(FilterExpr::compare(
                "project_id",
                CompareOp::Eq,
                FilterValue::String("p1".to_string()),
            )),
            ..QuerySpec::default()
        };
        let records = store.find("event", &query).await.unwrap();
        assert_eq!(records.len(), 2);
    }

    #[tokio::test]
    async fn test_find_sorts_instants_not_text() {
        let store = seeded_store().await;
        let query = QuerySpec {
            order: vec![OrderKey {
                field: "triggered_at".to_string(),
                ascending: true,
                field_type: FieldType::DateTime,
            }],
            ..QuerySpec::default()
        };
        let records = store.find("event", &query).await.unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r["_id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_find_skip_and_top() {
        let store = seeded_store().await;
        let query = QuerySpec {
            order: vec![OrderKey {
                field: "_id".to_string(),
                ascending: true,
                field_type: FieldType::String,
            }],
            skip: Some(1),
            top: Some(1),
            ..QuerySpec::default()
        };
        let records = store.find("event", &query).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["_id"], "b");
    }

    #[tokio::test]
    async fn test_top_zero_returns_empty() {
        let store = seeded_store().await;
        let query = QuerySpec {
            top: Some(0),
            ..QuerySpec::default()
        };
        let records = store.find("event", &query).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_find_one() {
        let store = seeded_store().await;
        let record = store.find_one("event", "_id", "b").await.unwrap().unwrap();
        assert_eq!(record["project_id"], "p2");

        assert!(store.find_one("event", "_id", "zz").await.unwrap().is_none());
        assert!(store.find_one("empty", "_id", "a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_merges_fields() {
        let store = seeded_store().await;
        let mut changes = Map::new();
        changes.insert("project_id".to_string(), json!("p9"));

        let matched = store.update("event", "_id", "a", &changes).await.unwrap();
        assert!(matched);

        let record = store.find_one("event", "_id", "a").await.unwrap().unwrap();
        assert_eq!(record["project_id"], "p9");
        // Untouched fields survive the merge.
        assert_eq!(record["triggered_at"], "2021-03-01T00:00:00Z");
    }

    #[tokio::test]
    async fn test_update_missing_key() {
        let store = seeded_store().await;
        let matched = store.update("event", "_id", "zz", &Map::new()).await.unwrap();
        assert!(!matched);
    }

    #[tokio::test]
    async fn test_remove_twice() {
        let store = seeded_store().await;
        assert!(store.remove("event", "_id", "a").await.unwrap());
        assert!(!store.remove("event", "_id", "a").await.unwrap());
    }
}
