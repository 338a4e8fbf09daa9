//! Tenant resolution: pinning, override freshness, fail-closed lookups.

use std::sync::Arc;

use serde_json::json;

use caseload_core::errors::ResolveError;
use caseload_core::identity::{ActiveTenantStore, CallerIdentity, Role};
use caseload_core::query::Query;
use caseload_core::store::EntityStore;
use caseload_core::tenant::{SubjectId, TenantId};
use caseload_memory::{MemoryOverrides, MemoryStore};
use caseload_scope::{DataGateway, EntityOverrides, TenantResolver};

fn admin(subject: &str, session_tenant: &str) -> CallerIdentity {
    CallerIdentity::new(subject, Role::Admin, session_tenant)
}

#[tokio::test]
async fn member_is_pinned_to_the_session_tenant() {
    let overrides = Arc::new(MemoryOverrides::new());
    // Even with override state recorded for the same subject id...
    overrides.switch_to("worker-1", "svc-b");

    let resolver = TenantResolver::new(overrides);
    let member = CallerIdentity::new("worker-1", Role::Member, "svc-a");

    // ...an ordinary member always resolves to the session tenant.
    assert_eq!(resolver.resolve(&member).await.unwrap(), TenantId::new("svc-a"));
}

#[tokio::test]
async fn admin_override_is_read_fresh_every_time() {
    let overrides = Arc::new(MemoryOverrides::new());
    let resolver = TenantResolver::new(overrides.clone());
    let identity = admin("admin-1", "svc-a");

    // No override recorded: session tenant.
    assert_eq!(resolver.resolve(&identity).await.unwrap(), TenantId::new("svc-a"));

    overrides.switch_to("admin-1", "svc-a");
    assert_eq!(resolver.resolve(&identity).await.unwrap(), TenantId::new("svc-a"));

    // The switch between two units of work takes effect on the next one,
    // without any restart.
    overrides.switch_to("admin-1", "svc-b");
    assert_eq!(resolver.resolve(&identity).await.unwrap(), TenantId::new("svc-b"));

    overrides.clear(&SubjectId::new("admin-1"));
    assert_eq!(resolver.resolve(&identity).await.unwrap(), TenantId::new("svc-a"));
}

struct UnreachableOverrides;

#[async_trait::async_trait]
impl ActiveTenantStore for UnreachableOverrides {
    async fn active_tenant(&self, subject: &SubjectId) -> Result<Option<TenantId>, ResolveError> {
        Err(ResolveError::LookupFailed {
            subject: subject.clone(),
            source: anyhow::anyhow!("store unreachable"),
        })
    }
}

#[tokio::test]
async fn resolution_fails_closed_when_the_lookup_cannot_complete() {
    let resolver = TenantResolver::new(Arc::new(UnreachableOverrides));

    let err = resolver.resolve(&admin("admin-1", "svc-a")).await.unwrap_err();
    assert!(matches!(err, ResolveError::LookupFailed { .. }));

    // Members never hit the lookup at all.
    let member = CallerIdentity::new("worker-1", Role::Member, "svc-a");
    assert_eq!(resolver.resolve(&member).await.unwrap(), TenantId::new("svc-a"));
}

#[tokio::test]
async fn entity_backed_overrides_follow_the_identity_record() {
    let managers: Arc<MemoryStore> = Arc::new(MemoryStore::new("managers"));
    managers
        .create(json!({"id": "admin-1", "email": "a@example.org", "activeTenantId": "svc-b"}))
        .await
        .unwrap();
    managers
        .create(json!({"id": "admin-2", "email": "b@example.org"}))
        .await
        .unwrap();

    let resolver = TenantResolver::new(Arc::new(EntityOverrides::new(managers.clone())));

    // Override attribute present: it wins over the session tenant.
    assert_eq!(
        resolver.resolve(&admin("admin-1", "svc-a")).await.unwrap(),
        TenantId::new("svc-b")
    );

    // Record present, no override attribute: session tenant.
    assert_eq!(
        resolver.resolve(&admin("admin-2", "svc-a")).await.unwrap(),
        TenantId::new("svc-a")
    );

    // The durable record is re-read per unit of work: a switch written to
    // the store shows up on the next resolution.
    managers
        .patch("admin-1", json!({"activeTenantId": "svc-c"}), Query::new())
        .await
        .unwrap();
    assert_eq!(
        resolver.resolve(&admin("admin-1", "svc-a")).await.unwrap(),
        TenantId::new("svc-c")
    );

    // No identity record at all: fail-closed, not a fallback.
    let err = resolver.resolve(&admin("ghost", "svc-a")).await.unwrap_err();
    assert!(matches!(err, ResolveError::UnknownIdentity { .. }));
}

#[tokio::test]
async fn begin_resolves_then_scopes_in_one_step() {
    let overrides = Arc::new(MemoryOverrides::new());
    overrides.switch_to("admin-1", "svc-b");
    let resolver = TenantResolver::new(overrides);

    let gateway = DataGateway::builder()
        .collection("cases", Arc::new(MemoryStore::new("cases")))
        .build();

    let handle = gateway
        .begin(&resolver, &admin("admin-1", "svc-a"))
        .await
        .unwrap();
    assert_eq!(handle.tenant(), Some(&TenantId::new("svc-b")));

    let created = handle
        .collection("cases")
        .unwrap()
        .create(json!({"name": "X"}))
        .await
        .unwrap();
    assert_eq!(created["tenantId"], "svc-b");
}
