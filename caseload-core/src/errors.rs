//! Error taxonomy for the data layer.
//!
//! Two rules shape this module:
//! - a record that exists under another tenant is reported with the exact
//!   same [`StoreError::NotFound`] an absent key produces, for reads and
//!   writes alike; there is deliberately no "forbidden" variant that would
//!   reveal existence across tenants;
//! - backend failures pass through as [`StoreError::Backend`], unmasked and
//!   unretried, so the orchestration layer can decide what to do with them.

use thiserror::Error;

use crate::tenant::SubjectId;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by entity stores and the scoping layer around them.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("duplicate id: {collection}/{id}")]
    Duplicate { collection: String, id: String },

    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("method not implemented: {0}")]
    Unsupported(&'static str),

    #[error("storage backend error")]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Duplicate {
            collection: collection.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Errors from tenant resolution.
///
/// Resolution never falls back to a guessed or default tenant: any lookup
/// that cannot complete fails the whole unit of work.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("active-tenant lookup failed for subject {subject}")]
    LookupFailed {
        subject: SubjectId,
        #[source]
        source: anyhow::Error,
    },

    #[error("unknown identity: {subject}")]
    UnknownIdentity { subject: SubjectId },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_carries_no_tenant_detail() {
        let absent = StoreError::not_found("cases", "case_42");
        let cross_tenant = StoreError::not_found("cases", "case_42");
        assert_eq!(absent.to_string(), cross_tenant.to_string());
        assert_eq!(absent.to_string(), "record not found: cases/case_42");
    }

    #[test]
    fn backend_errors_keep_their_source() {
        let err = StoreError::Backend(anyhow::anyhow!("connection reset"));
        assert!(err.to_string().contains("backend"));
        assert!(!err.is_not_found());
    }
}
