//! The generic entity-store surface.
//!
//! One [`EntityStore`] instance serves one collection (cases, managers,
//! options, ...). Backends implement it directly; the scoping layer wraps a
//! backend in a decorator implementing the same trait, so calling code is
//! written once against this surface and cannot tell a scoped handle from a
//! raw one.
//!
//! All methods have default implementations that return
//! "method not implemented", so a backend can override only what it
//! actually supports.

use std::fmt;

use async_trait::async_trait;

use crate::errors::{StoreError, StoreResult};
use crate::query::{Aggregate, GroupRow, Query};
use crate::record::Record;

impl fmt::Debug for dyn EntityStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityStore")
            .field("collection", &self.collection())
            .finish()
    }
}

#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Name of the collection this store serves.
    fn collection(&self) -> &str;

    /// Find records matching the query filter, sorted and paginated.
    async fn find(&self, _query: Query) -> StoreResult<Vec<Record>> {
        Err(StoreError::Unsupported("find"))
    }

    /// First record matching the query, if any. Absence is not an error.
    async fn find_one(&self, _query: Query) -> StoreResult<Option<Record>> {
        Err(StoreError::Unsupported("find_one"))
    }

    /// Fetch a single record by primary key.
    async fn get(&self, _id: &str) -> StoreResult<Record> {
        Err(StoreError::Unsupported("get"))
    }

    /// Number of records matching the query filter.
    async fn count(&self, _query: Query) -> StoreResult<u64> {
        Err(StoreError::Unsupported("count"))
    }

    /// Group records matching the query filter and count each bucket.
    async fn aggregate(&self, _agg: Aggregate, _query: Query) -> StoreResult<Vec<GroupRow>> {
        Err(StoreError::Unsupported("aggregate"))
    }

    /// Persist a new record, generating an id when the payload has none.
    async fn create(&self, _data: Record) -> StoreResult<Record> {
        Err(StoreError::Unsupported("create"))
    }

    /// Replace the record with the given key, but only if it also matches
    /// the guard filter. Guard evaluation and the write happen as one
    /// operation; a non-matching guard is a plain not-found.
    async fn update(&self, _id: &str, _data: Record, _guard: Query) -> StoreResult<Record> {
        Err(StoreError::Unsupported("update"))
    }

    /// Merge fields into the record with the given key, guarded like
    /// [`update`](EntityStore::update).
    async fn patch(&self, _id: &str, _data: Record, _guard: Query) -> StoreResult<Record> {
        Err(StoreError::Unsupported("patch"))
    }

    /// Merge fields into every record matching the query filter.
    /// Returns the number of rows affected.
    async fn patch_many(&self, _data: Record, _query: Query) -> StoreResult<u64> {
        Err(StoreError::Unsupported("patch_many"))
    }

    /// Delete the record with the given key, guarded like
    /// [`update`](EntityStore::update). Returns the removed record.
    async fn remove(&self, _id: &str, _guard: Query) -> StoreResult<Record> {
        Err(StoreError::Unsupported("remove"))
    }

    /// Delete every record matching the query filter.
    /// Returns the number of rows removed.
    async fn remove_many(&self, _query: Query) -> StoreResult<u64> {
        Err(StoreError::Unsupported("remove_many"))
    }
}
