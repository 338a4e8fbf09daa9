//! Query and aggregation parameters.
//!
//! A [`Query`] is the params object carried by every store operation:
//! an equality filter over top-level record fields, an optional sort, and
//! skip/limit pagination. Filters are conjunctions; a record matches when
//! every named field equals the given value.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

#[derive(Debug, Clone)]
pub struct Sort {
    pub field: String,
    pub order: Order,
}

/// Filter, sort, and pagination for a store operation.
///
/// On mutations the filter acts as a guard: the mutation applies only to
/// rows the filter matches, evaluated by the backend in the same critical
/// section as the write.
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Map<String, Value>,
    pub sort: Option<Sort>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality condition on a top-level field.
    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filter.insert(field.into(), value.into());
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: Order) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            order,
        });
        self
    }

    pub fn skip(mut self, skip: usize) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Group-by aggregation request: bucket rows by one field, count each
/// bucket, optionally summing a numeric field.
#[derive(Debug, Clone)]
pub struct Aggregate {
    pub group_by: String,
    pub sum: Option<String>,
}

impl Aggregate {
    pub fn group_by(field: impl Into<String>) -> Self {
        Self {
            group_by: field.into(),
            sum: None,
        }
    }

    pub fn summing(mut self, field: impl Into<String>) -> Self {
        self.sum = Some(field.into());
        self
    }
}

/// One aggregation bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRow {
    pub key: Value,
    pub count: u64,
    pub sum: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builder_collects_conditions() {
        let q = Query::new()
            .filter("status", "open")
            .filter("year", 2025)
            .sort("name", Order::Asc)
            .limit(10);

        assert_eq!(q.filter.get("status"), Some(&json!("open")));
        assert_eq!(q.filter.get("year"), Some(&json!(2025)));
        assert_eq!(q.limit, Some(10));
        assert!(q.skip.is_none());
    }

    #[test]
    fn later_filter_on_same_field_wins() {
        let q = Query::new().filter("tenantId", "svc-a").filter("tenantId", "svc-b");
        assert_eq!(q.filter.get("tenantId"), Some(&json!("svc-b")));
    }
}
