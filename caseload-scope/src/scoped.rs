//! The scoped store decorator.
//!
//! [`ScopedStore`] wraps one registered collection's backend with a tenant
//! binding captured at construction. It implements the same
//! [`EntityStore`] trait as the backend, so the two are interchangeable to
//! calling code, except that every operation through the scoped variant is
//! tenant-constrained:
//!
//! - reads, counts and aggregates get the tenant condition ANDed into their
//!   filter, replacing any tenant value the caller supplied;
//! - key lookups post-check the owner and report a foreign record with the
//!   exact not-found the backend produces for an absent key;
//! - creates stamp the binding into the payload (after verifying a declared
//!   parent through the same binding);
//! - keyed mutations carry the tenant condition in their guard filter, so
//!   the backend checks ownership and writes in one critical section.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use caseload_core::errors::{StoreError, StoreResult};
use caseload_core::query::{Aggregate, GroupRow, Query};
use caseload_core::record::{self, Record};
use caseload_core::registry::{CollectionSpec, ParentLink, StoreRegistry};
use caseload_core::store::EntityStore;
use caseload_core::tenant::TenantId;

/// Pagination defaults applied to scoped finds, from gateway configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageLimits {
    pub default: Option<usize>,
    pub max: Option<usize>,
}

/// One collection, bound to one tenant.
///
/// Cheap, request-scoped value: the binding is immutable for the life of
/// the wrapper and never shared across units of work.
pub struct ScopedStore {
    inner: Arc<dyn EntityStore>,
    tenant: TenantId,
    tenant_field: String,
    parent: Option<ParentLink>,
    registry: Arc<StoreRegistry>,
    limits: PageLimits,
}

impl ScopedStore {
    pub(crate) fn from_spec(
        spec: &CollectionSpec,
        tenant: TenantId,
        registry: Arc<StoreRegistry>,
        limits: PageLimits,
    ) -> Self {
        Self {
            inner: spec.store.clone(),
            tenant,
            tenant_field: spec.tenant_field.clone(),
            parent: spec.parent.clone(),
            registry,
            limits,
        }
    }

    /// AND the binding into the filter. The binding is authoritative:
    /// a caller-supplied tenant value is discarded, not honored.
    fn inject(&self, mut query: Query) -> Query {
        query
            .filter
            .insert(self.tenant_field.clone(), Value::String(self.tenant.0.clone()));
        query
    }

    fn clamp(&self, mut query: Query) -> Query {
        if query.limit.is_none() {
            query.limit = self.limits.default;
        }
        if let (Some(limit), Some(max)) = (query.limit, self.limits.max) {
            query.limit = Some(limit.min(max));
        }
        query
    }

    /// Creates that attach to a declared parent derive their tenant from a
    /// parent proven to live in the binding: the parent is fetched through
    /// a handle bound to the same tenant, so an absent or foreign parent is
    /// the same not-found and nothing gets persisted.
    async fn verify_parent(&self, data: &Record) -> StoreResult<()> {
        let Some(ParentLink { field, collection }) = &self.parent else {
            return Ok(());
        };
        let Some(parent_id) = data.get(field).and_then(Value::as_str) else {
            return Ok(());
        };

        let spec = self
            .registry
            .get(collection)
            .ok_or_else(|| StoreError::UnknownCollection(collection.clone()))?;
        let parent_store =
            ScopedStore::from_spec(spec, self.tenant.clone(), self.registry.clone(), self.limits);
        parent_store.get(parent_id).await?;
        Ok(())
    }
}

#[async_trait]
impl EntityStore for ScopedStore {
    fn collection(&self) -> &str {
        self.inner.collection()
    }

    async fn find(&self, query: Query) -> StoreResult<Vec<Record>> {
        self.inner.find(self.clamp(self.inject(query))).await
    }

    async fn find_one(&self, query: Query) -> StoreResult<Option<Record>> {
        self.inner.find_one(self.inject(query)).await
    }

    async fn get(&self, id: &str) -> StoreResult<Record> {
        let found = self.inner.get(id).await?;
        match record::tenant_of(&found, &self.tenant_field) {
            Some(owner) if owner == self.tenant.as_str() => Ok(found),
            _ => {
                debug!(collection = %self.inner.collection(), %id, "record outside binding, reported as not found");
                Err(StoreError::not_found(self.inner.collection(), id))
            }
        }
    }

    async fn count(&self, query: Query) -> StoreResult<u64> {
        self.inner.count(self.inject(query)).await
    }

    async fn aggregate(&self, agg: Aggregate, query: Query) -> StoreResult<Vec<GroupRow>> {
        self.inner.aggregate(agg, self.inject(query)).await
    }

    async fn create(&self, mut data: Record) -> StoreResult<Record> {
        self.verify_parent(&data).await?;
        record::stamp_tenant(&mut data, &self.tenant_field, &self.tenant);
        self.inner.create(data).await
    }

    async fn update(&self, id: &str, mut data: Record, guard: Query) -> StoreResult<Record> {
        record::stamp_tenant(&mut data, &self.tenant_field, &self.tenant);
        self.inner.update(id, data, self.inject(guard)).await
    }

    async fn patch(&self, id: &str, mut data: Record, guard: Query) -> StoreResult<Record> {
        record::stamp_tenant(&mut data, &self.tenant_field, &self.tenant);
        self.inner.patch(id, data, self.inject(guard)).await
    }

    async fn patch_many(&self, mut data: Record, query: Query) -> StoreResult<u64> {
        record::stamp_tenant(&mut data, &self.tenant_field, &self.tenant);
        self.inner.patch_many(data, self.inject(query)).await
    }

    async fn remove(&self, id: &str, guard: Query) -> StoreResult<Record> {
        self.inner.remove(id, self.inject(guard)).await
    }

    async fn remove_many(&self, query: Query) -> StoreResult<u64> {
        self.inner.remove_many(self.inject(query)).await
    }
}
