use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use caseload_core::errors::{StoreError, StoreResult};
use caseload_core::query::{Aggregate, GroupRow, Order, Query};
use caseload_core::record::{self, Record, ID_FIELD};
use caseload_core::store::EntityStore;

/// An in-process entity store over a `BTreeMap` keyed by record id.
///
/// Guarded mutations (update/patch/remove) evaluate their guard filter and
/// apply the write under a single write lock, so a guard check can never be
/// separated from its mutation.
pub struct MemoryStore {
    collection: String,
    rows: RwLock<BTreeMap<String, Record>>,
}

impl MemoryStore {
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            rows: RwLock::new(BTreeMap::new()),
        }
    }

    fn matches(record: &Record, filter: &Map<String, Value>) -> bool {
        filter
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }

    fn compare(a: &Value, b: &Value) -> Ordering {
        fn rank(v: &Value) -> u8 {
            match v {
                Value::Null => 0,
                Value::Bool(_) => 1,
                Value::Number(_) => 2,
                Value::String(_) => 3,
                Value::Array(_) | Value::Object(_) => 4,
            }
        }

        match (a, b) {
            (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
            (Value::Number(x), Value::Number(y)) => {
                let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
            (Value::String(x), Value::String(y)) => x.cmp(y),
            _ => rank(a).cmp(&rank(b)),
        }
    }

    /// Filter, sort, and paginate under one read lock.
    fn select(&self, query: &Query) -> Vec<Record> {
        let rows = self.rows.read();
        let mut selected: Vec<Record> = rows
            .values()
            .filter(|record| Self::matches(record, &query.filter))
            .cloned()
            .collect();
        drop(rows);

        if let Some(sort) = &query.sort {
            selected.sort_by(|a, b| {
                let ordering = Self::compare(
                    a.get(&sort.field).unwrap_or(&Value::Null),
                    b.get(&sort.field).unwrap_or(&Value::Null),
                );
                match sort.order {
                    Order::Asc => ordering,
                    Order::Desc => ordering.reverse(),
                }
            });
        }

        let skip = query.skip.unwrap_or(0);
        let mut selected: Vec<Record> = selected.into_iter().skip(skip).collect();
        if let Some(limit) = query.limit {
            selected.truncate(limit);
        }
        selected
    }

    fn require_object(&self, data: &Record, method: &str) -> StoreResult<()> {
        if data.is_object() {
            Ok(())
        } else {
            Err(StoreError::InvalidQuery(format!(
                "{method} payload for '{}' must be a JSON object",
                self.collection
            )))
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    fn collection(&self) -> &str {
        &self.collection
    }

    async fn find(&self, query: Query) -> StoreResult<Vec<Record>> {
        Ok(self.select(&query))
    }

    async fn find_one(&self, mut query: Query) -> StoreResult<Option<Record>> {
        query.limit = Some(1);
        Ok(self.select(&query).into_iter().next())
    }

    async fn get(&self, id: &str) -> StoreResult<Record> {
        self.rows
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::not_found(&self.collection, id))
    }

    async fn count(&self, query: Query) -> StoreResult<u64> {
        let rows = self.rows.read();
        let count = rows
            .values()
            .filter(|record| Self::matches(record, &query.filter))
            .count();
        Ok(count as u64)
    }

    async fn aggregate(&self, agg: Aggregate, query: Query) -> StoreResult<Vec<GroupRow>> {
        let rows = self.rows.read();
        // Keyed by the JSON rendering of the group value for deterministic order.
        let mut buckets: BTreeMap<String, GroupRow> = BTreeMap::new();

        for row in rows.values().filter(|r| Self::matches(r, &query.filter)) {
            let key = row.get(&agg.group_by).cloned().unwrap_or(Value::Null);
            let bucket = buckets.entry(key.to_string()).or_insert_with(|| GroupRow {
                key,
                count: 0,
                sum: agg.sum.as_ref().map(|_| 0.0),
            });
            bucket.count += 1;
            if let (Some(total), Some(field)) = (bucket.sum.as_mut(), agg.sum.as_ref()) {
                *total += row.get(field).and_then(Value::as_f64).unwrap_or(0.0);
            }
        }

        Ok(buckets.into_values().collect())
    }

    async fn create(&self, mut data: Record) -> StoreResult<Record> {
        self.require_object(&data, "create")?;

        let id = match record::id_of(&data) {
            Some(id) => id.to_string(),
            None => format!("{}_{}", self.collection, Uuid::new_v4()),
        };

        let mut rows = self.rows.write();
        if rows.contains_key(&id) {
            return Err(StoreError::duplicate(&self.collection, id));
        }

        data[ID_FIELD] = Value::String(id.clone());
        rows.insert(id.clone(), data.clone());
        debug!(collection = %self.collection, %id, "record created");
        Ok(data)
    }

    async fn update(&self, id: &str, mut data: Record, guard: Query) -> StoreResult<Record> {
        self.require_object(&data, "update")?;

        let mut rows = self.rows.write();
        let existing = rows
            .get(id)
            .ok_or_else(|| StoreError::not_found(&self.collection, id))?;
        if !Self::matches(existing, &guard.filter) {
            return Err(StoreError::not_found(&self.collection, id));
        }

        data[ID_FIELD] = Value::String(id.to_string());
        rows.insert(id.to_string(), data.clone());
        Ok(data)
    }

    async fn patch(&self, id: &str, data: Record, guard: Query) -> StoreResult<Record> {
        self.require_object(&data, "patch")?;

        let mut rows = self.rows.write();
        let existing = rows
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found(&self.collection, id))?;
        if !Self::matches(existing, &guard.filter) {
            return Err(StoreError::not_found(&self.collection, id));
        }

        record::merge_into(existing, &data);
        existing[ID_FIELD] = Value::String(id.to_string());
        Ok(existing.clone())
    }

    async fn patch_many(&self, data: Record, query: Query) -> StoreResult<u64> {
        self.require_object(&data, "patch_many")?;

        let mut rows = self.rows.write();
        let mut affected = 0u64;
        for (id, row) in rows.iter_mut() {
            if Self::matches(row, &query.filter) {
                record::merge_into(row, &data);
                row[ID_FIELD] = Value::String(id.clone());
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn remove(&self, id: &str, guard: Query) -> StoreResult<Record> {
        let mut rows = self.rows.write();
        if !rows.get(id).is_some_and(|r| Self::matches(r, &guard.filter)) {
            return Err(StoreError::not_found(&self.collection, id));
        }

        let removed = rows
            .remove(id)
            .ok_or_else(|| StoreError::not_found(&self.collection, id))?;
        debug!(collection = %self.collection, %id, "record removed");
        Ok(removed)
    }

    async fn remove_many(&self, query: Query) -> StoreResult<u64> {
        let mut rows = self.rows.write();
        let doomed: Vec<String> = rows
            .iter()
            .filter(|(_, record)| Self::matches(record, &query.filter))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &doomed {
            rows.remove(id);
        }
        Ok(doomed.len() as u64)
    }
}
