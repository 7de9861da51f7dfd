//! Storage collaborator
//!
//! The gateway core holds a [`DocumentStore`] handle and never manages
//! connection lifecycle itself. Each mutation is a single storage call; the
//! store's own atomicity guarantees are relied on, with no multi-record
//! transactions and no retries.

mod errors;
mod memory;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::odata::QuerySpec;

pub use errors::{StorageError, StorageResult};
pub use memory::MemoryStore;

/// Document collection operations required by the gateway
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Execute a compiled query against a collection
    ///
    /// Applies filter, sort, skip and top; projection is left to the
    /// response formatter.
    async fn find(&self, collection: &str, query: &QuerySpec) -> StorageResult<Vec<Value>>;

    /// Fetch a single record by its key field
    async fn find_one(
        &self,
        collection: &str,
        key_field: &str,
        key: &str,
    ) -> StorageResult<Option<Value>>;

    /// Persist a new record
    async fn insert(&self, collection: &str, record: Value) -> StorageResult<()>;

    /// Merge `changes` into the record under `key`
    ///
    /// Returns `false` when no record matched.
    async fn update(
        &self,
        collection: &str,
        key_field: &str,
        key: &str,
        changes: &Map<String, Value>,
    ) -> StorageResult<bool>;

    /// Remove the record under `key`
    ///
    /// Returns `false` when no record matched.
    async fn remove(&self, collection: &str, key_field: &str, key: &str) -> StorageResult<bool>;
}
