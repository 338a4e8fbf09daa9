//! Caller identity and the active-tenant override lookup seam.
//!
//! Authentication (out of scope here) produces a [`CallerIdentity`] per
//! request: a stable subject id, a role, and the tenant the session was
//! issued for. Elevated identities may additionally carry a durable
//! "active tenant" override, switched explicitly between requests; the
//! [`ActiveTenantStore`] trait is the read side of that record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ResolveError;
use crate::tenant::{SubjectId, TenantId};

/// Caller role, as produced by authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Ordinary member: pinned to the session tenant, always.
    Member,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Whether this role may act under an active-tenant override.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }
}

/// The authenticated caller of the current unit of work.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallerIdentity {
    pub subject: SubjectId,
    pub role: Role,
    /// Tenant the session was issued for.
    pub session_tenant: TenantId,
}

impl CallerIdentity {
    pub fn new(subject: impl Into<SubjectId>, role: Role, session_tenant: impl Into<TenantId>) -> Self {
        Self {
            subject: subject.into(),
            role,
            session_tenant: session_tenant.into(),
        }
    }
}

/// Read side of the durable active-tenant override record.
///
/// `Ok(None)` means "no override recorded" and the resolver falls back to
/// the session tenant. `Err` means the lookup could not complete; the unit
/// of work must fail rather than guess a tenant.
#[async_trait]
pub trait ActiveTenantStore: Send + Sync {
    async fn active_tenant(&self, subject: &SubjectId) -> Result<Option<TenantId>, ResolveError>;
}
