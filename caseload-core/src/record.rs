//! JSON record helpers.
//!
//! Entity records cross this layer as `serde_json::Value` objects, the same
//! specialization the store adapters use. Tenant-owned records carry their
//! partition key as a plain string attribute (default `"tenantId"`); these
//! helpers are the only place that attribute is read or written.

use serde_json::Value;

use crate::tenant::TenantId;

/// Records are JSON objects.
pub type Record = Value;

/// Default name of the tenant attribute on tenant-owned records.
pub const DEFAULT_TENANT_FIELD: &str = "tenantId";

/// Name of the primary key attribute.
pub const ID_FIELD: &str = "id";

/// The record's primary key, when present.
pub fn id_of(record: &Record) -> Option<&str> {
    record.get(ID_FIELD).and_then(Value::as_str)
}

/// The record's tenant attribute, when present.
pub fn tenant_of<'a>(record: &'a Record, tenant_field: &str) -> Option<&'a str> {
    record.get(tenant_field).and_then(Value::as_str)
}

/// Stamp the tenant attribute, overriding any caller-supplied value.
/// Non-object payloads are left alone; the store rejects them anyway.
pub fn stamp_tenant(record: &mut Record, tenant_field: &str, tenant: &TenantId) {
    if let Some(obj) = record.as_object_mut() {
        obj.insert(tenant_field.to_string(), Value::String(tenant.0.clone()));
    }
}

/// Shallow-merge `patch` into `target` (object fields only).
pub fn merge_into(target: &mut Record, patch: &Record) {
    if let (Some(target_obj), Some(patch_obj)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch_obj {
            target_obj.insert(key.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stamp_overrides_forged_tenant() {
        let mut record = json!({"name": "Y", "tenantId": "svc-b"});
        stamp_tenant(&mut record, DEFAULT_TENANT_FIELD, &TenantId::new("svc-a"));
        assert_eq!(tenant_of(&record, DEFAULT_TENANT_FIELD), Some("svc-a"));
    }

    #[test]
    fn stamp_ignores_non_objects() {
        let mut record = json!("not an object");
        stamp_tenant(&mut record, DEFAULT_TENANT_FIELD, &TenantId::new("svc-a"));
        assert_eq!(record, json!("not an object"));
    }

    #[test]
    fn merge_is_shallow_and_overwrites() {
        let mut target = json!({"id": "u1", "name": "X", "city": "Lyon"});
        merge_into(&mut target, &json!({"city": "Nantes", "zip": "44000"}));
        assert_eq!(target, json!({"id": "u1", "name": "X", "city": "Nantes", "zip": "44000"}));
    }
}
