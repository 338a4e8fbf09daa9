//! Tenant resolution.
//!
//! Exactly one tenant id per unit of work. Ordinary members are pinned to
//! their session tenant; elevated identities may carry a durable
//! active-tenant override, read fresh on every call so a switch performed
//! between two requests takes effect on the very next one.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use caseload_core::errors::ResolveError;
use caseload_core::identity::{ActiveTenantStore, CallerIdentity};
use caseload_core::store::EntityStore;
use caseload_core::tenant::{SubjectId, TenantId};

/// Resolves the tenant id governing the current unit of work.
///
/// Holds only the override store handle, never a resolved value: caching a
/// resolution across requests would let a switched administrator keep
/// operating on the previous tenant.
pub struct TenantResolver {
    overrides: Arc<dyn ActiveTenantStore>,
}

impl TenantResolver {
    pub fn new(overrides: Arc<dyn ActiveTenantStore>) -> Self {
        Self { overrides }
    }

    /// Produce the single tenant id for this unit of work.
    ///
    /// Fail-closed: a lookup that cannot complete is an error, never a
    /// fallback to a guessed tenant.
    pub async fn resolve(&self, identity: &CallerIdentity) -> Result<TenantId, ResolveError> {
        if !identity.role.is_elevated() {
            // Ordinary members cannot act outside their assigned tenant,
            // whatever override state may exist for their subject id.
            return Ok(identity.session_tenant.clone());
        }

        match self.overrides.active_tenant(&identity.subject).await? {
            Some(tenant) => {
                debug!(subject = %identity.subject, %tenant, "active-tenant override applied");
                Ok(tenant)
            }
            None => Ok(identity.session_tenant.clone()),
        }
    }
}

/// Default name of the override attribute on identity records.
pub const DEFAULT_OVERRIDE_FIELD: &str = "activeTenantId";

/// Active-tenant override lookups backed by an identity collection.
///
/// Reads the subject's identity record on every call. This is by nature a
/// pre-tenant, unscoped read: it happens before any tenant is known.
/// A record that exists without the override attribute means "no override";
/// a subject with no identity record at all fails resolution.
pub struct EntityOverrides {
    identities: Arc<dyn EntityStore>,
    field: String,
}

impl EntityOverrides {
    pub fn new(identities: Arc<dyn EntityStore>) -> Self {
        Self {
            identities,
            field: DEFAULT_OVERRIDE_FIELD.to_string(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

#[async_trait]
impl ActiveTenantStore for EntityOverrides {
    async fn active_tenant(&self, subject: &SubjectId) -> Result<Option<TenantId>, ResolveError> {
        match self.identities.get(subject.as_str()).await {
            Ok(record) => Ok(record
                .get(&self.field)
                .and_then(Value::as_str)
                .map(TenantId::new)),
            Err(err) if err.is_not_found() => Err(ResolveError::UnknownIdentity {
                subject: subject.clone(),
            }),
            Err(err) => Err(ResolveError::LookupFailed {
                subject: subject.clone(),
                source: anyhow::Error::new(err),
            }),
        }
    }
}
