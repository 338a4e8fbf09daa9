use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use caseload_core::errors::ResolveError;
use caseload_core::identity::ActiveTenantStore;
use caseload_core::tenant::{SubjectId, TenantId};

/// In-process active-tenant override store.
///
/// `switch_to` / `clear` are the mutation entry points invoked by the
/// explicit tenant-switch action; the resolver only ever reads.
#[derive(Default)]
pub struct MemoryOverrides {
    active: Mutex<HashMap<SubjectId, TenantId>>,
}

impl MemoryOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `subject` is now acting as `tenant`.
    pub fn switch_to(&self, subject: impl Into<SubjectId>, tenant: impl Into<TenantId>) {
        self.active.lock().insert(subject.into(), tenant.into());
    }

    /// Drop the override; the subject falls back to its session tenant.
    pub fn clear(&self, subject: &SubjectId) {
        self.active.lock().remove(subject);
    }
}

#[async_trait]
impl ActiveTenantStore for MemoryOverrides {
    async fn active_tenant(&self, subject: &SubjectId) -> Result<Option<TenantId>, ResolveError> {
        Ok(self.active.lock().get(subject).cloned())
    }
}
