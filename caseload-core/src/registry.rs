//! Collection registry.
//!
//! Maps collection names to their backend store plus the scoping metadata
//! the enforcement layer needs: which attribute carries the tenant id, and
//! an optional parent link for creates that attach a child to an
//! already-tenant-assigned parent.

use std::collections::HashMap;
use std::sync::Arc;

use crate::record::DEFAULT_TENANT_FIELD;
use crate::store::EntityStore;

/// Declares that records of a collection reference a parent record whose
/// tenant governs creation: `field` on the child holds the parent's key in
/// `collection`.
#[derive(Debug, Clone)]
pub struct ParentLink {
    pub field: String,
    pub collection: String,
}

/// One registered collection: its backend and scoping metadata.
#[derive(Clone)]
pub struct CollectionSpec {
    pub store: Arc<dyn EntityStore>,
    pub tenant_field: String,
    pub parent: Option<ParentLink>,
}

impl CollectionSpec {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self {
            store,
            tenant_field: DEFAULT_TENANT_FIELD.to_string(),
            parent: None,
        }
    }

    pub fn with_tenant_field(mut self, field: impl Into<String>) -> Self {
        self.tenant_field = field.into();
        self
    }

    pub fn with_parent(mut self, field: impl Into<String>, collection: impl Into<String>) -> Self {
        self.parent = Some(ParentLink {
            field: field.into(),
            collection: collection.into(),
        });
        self
    }
}

/// A registry that maps collection names to their [`CollectionSpec`].
pub struct StoreRegistry {
    collections: HashMap<String, CollectionSpec>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self {
            collections: HashMap::new(),
        }
    }

    /// Register a collection with default scoping metadata.
    pub fn register<S>(&mut self, name: S, store: Arc<dyn EntityStore>)
    where
        S: Into<String>,
    {
        self.register_spec(name, CollectionSpec::new(store));
    }

    /// Register a collection with explicit scoping metadata.
    pub fn register_spec<S>(&mut self, name: S, spec: CollectionSpec)
    where
        S: Into<String>,
    {
        self.collections.insert(name.into(), spec);
    }

    /// Look up a collection by name.
    pub fn get(&self, name: &str) -> Option<&CollectionSpec> {
        self.collections.get(name)
    }

    pub fn len(&self) -> usize {
        self.collections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }
}

impl Default for StoreRegistry {
    fn default() -> Self {
        Self::new()
    }
}
