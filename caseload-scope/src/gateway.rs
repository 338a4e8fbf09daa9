//! The data gateway: factory for scoped and unscoped handles.
//!
//! Built once at startup with the registered collections and configuration;
//! per unit of work it hands out cheap [`DataHandle`] values. The scoped
//! variant wraps every collection in a [`ScopedStore`]; the unscoped
//! variant exposes the registered backends directly and is reserved for
//! genuinely cross-tenant operations (global counts, migrations,
//! pre-tenant identity lookups) whose authorization happened upstream.

use std::sync::Arc;

use tracing::info;

use caseload_core::config::{Config, ConfigSnapshot};
use caseload_core::errors::{ResolveError, StoreError, StoreResult};
use caseload_core::identity::CallerIdentity;
use caseload_core::record::DEFAULT_TENANT_FIELD;
use caseload_core::registry::{CollectionSpec, StoreRegistry};
use caseload_core::store::EntityStore;
use caseload_core::tenant::TenantId;

use crate::resolver::TenantResolver;
use crate::scoped::{PageLimits, ScopedStore};

enum Pending {
    Store(Arc<dyn EntityStore>),
    Spec(CollectionSpec),
}

/// Builder for [`DataGateway`].
pub struct GatewayBuilder {
    config: Config,
    pending: Vec<(String, Pending)>,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::new(),
            pending: Vec::new(),
        }
    }

    /// Set a configuration key (see `caseload_core::config` for the keys
    /// the data layer reads).
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.set(key, value);
        self
    }

    /// Register a collection with default scoping metadata. The tenant
    /// attribute defaults to the `scope.tenant_field` configuration key,
    /// then to `"tenantId"`.
    pub fn collection(mut self, name: impl Into<String>, store: Arc<dyn EntityStore>) -> Self {
        self.pending.push((name.into(), Pending::Store(store)));
        self
    }

    /// Register a collection with explicit scoping metadata, taken
    /// verbatim (the configured default tenant field does not apply).
    pub fn collection_spec(mut self, name: impl Into<String>, spec: CollectionSpec) -> Self {
        self.pending.push((name.into(), Pending::Spec(spec)));
        self
    }

    pub fn build(self) -> DataGateway {
        let snapshot = self.config.snapshot();
        let tenant_field = snapshot
            .get_string("scope.tenant_field")
            .unwrap_or_else(|| DEFAULT_TENANT_FIELD.to_string());
        let limits = PageLimits {
            default: snapshot.get_usize("paginate.default"),
            max: snapshot.get_usize("paginate.max"),
        };

        let mut registry = StoreRegistry::new();
        for (name, pending) in self.pending {
            let spec = match pending {
                Pending::Store(store) => {
                    CollectionSpec::new(store).with_tenant_field(tenant_field.clone())
                }
                Pending::Spec(spec) => spec,
            };
            registry.register_spec(name, spec);
        }

        info!(collections = registry.len(), "data gateway ready");
        DataGateway {
            registry: Arc::new(registry),
            limits,
            config: snapshot,
        }
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide factory for per-request data handles.
pub struct DataGateway {
    registry: Arc<StoreRegistry>,
    limits: PageLimits,
    config: ConfigSnapshot,
}

impl DataGateway {
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }

    /// A handle bound to one tenant; every operation through it is
    /// tenant-constrained.
    pub fn scoped(&self, tenant: impl Into<TenantId>) -> DataHandle {
        DataHandle {
            registry: self.registry.clone(),
            binding: Binding::Tenant(tenant.into()),
            limits: self.limits,
        }
    }

    /// The explicit escape hatch: same operation surface, no tenant
    /// constraint. Obtain only after a cross-tenant operation has been
    /// authorized upstream.
    pub fn unscoped(&self) -> DataHandle {
        tracing::debug!("unscoped data handle issued");
        DataHandle {
            registry: self.registry.clone(),
            binding: Binding::Unscoped,
            limits: self.limits,
        }
    }

    /// Resolve the caller's tenant and return a handle bound to it.
    /// This is the common route-handler path.
    pub async fn begin(
        &self,
        resolver: &TenantResolver,
        identity: &CallerIdentity,
    ) -> Result<DataHandle, ResolveError> {
        let tenant = resolver.resolve(identity).await?;
        Ok(self.scoped(tenant))
    }

    pub fn config(&self) -> &ConfigSnapshot {
        &self.config
    }
}

#[derive(Clone)]
enum Binding {
    Tenant(TenantId),
    Unscoped,
}

/// A per-unit-of-work view over the registered collections.
pub struct DataHandle {
    registry: Arc<StoreRegistry>,
    binding: Binding,
    limits: PageLimits,
}

impl DataHandle {
    /// The bound tenant, or `None` for the unscoped handle.
    pub fn tenant(&self) -> Option<&TenantId> {
        match &self.binding {
            Binding::Tenant(tenant) => Some(tenant),
            Binding::Unscoped => None,
        }
    }

    pub fn is_scoped(&self) -> bool {
        matches!(self.binding, Binding::Tenant(_))
    }

    /// Look up a collection under this handle's binding.
    pub fn collection(&self, name: &str) -> StoreResult<Arc<dyn EntityStore>> {
        let spec = self
            .registry
            .get(name)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))?;

        match &self.binding {
            Binding::Unscoped => Ok(spec.store.clone()),
            Binding::Tenant(tenant) => Ok(Arc::new(ScopedStore::from_spec(
                spec,
                tenant.clone(),
                self.registry.clone(),
                self.limits,
            ))),
        }
    }
}
