//! In-memory record store.
//!
//! Rows live in per-table vectors in insertion order; an upsert replaces the
//! row whose conflict column renders to the same text.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::RecordStore;
use crate::error::{StoreError, StoreResult};
use crate::transform::coerce::scalar_text;

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<BTreeMap<String, Vec<Value>>>,
    failing: Mutex<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a table.
    pub fn with_rows(self, table: &str, rows: Vec<Value>) -> Self {
        self.lock_tables().entry(table.to_string()).or_default().extend(rows);
        self
    }

    /// Make every later call on `table` fail with HTTP 503.
    pub fn fail_table(&self, table: &str) {
        self.failing
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(table.to_string());
    }

    /// Current rows of a table.
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock_tables().get(table).cloned().unwrap_or_default()
    }

    pub fn row_count(&self, table: &str) -> usize {
        self.lock_tables().get(table).map_or(0, Vec::len)
    }

    /// Copy of every table.
    pub fn snapshot(&self) -> BTreeMap<String, Vec<Value>> {
        self.lock_tables().clone()
    }

    fn lock_tables(&self) -> MutexGuard<'_, BTreeMap<String, Vec<Value>>> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_available(&self, table: &str) -> StoreResult<()> {
        let failing = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if failing.contains(table) {
            return Err(StoreError::Status {
                table: table.to_string(),
                status: 503,
                body: "table unavailable".to_string(),
            });
        }
        Ok(())
    }
}

fn key_of(row: &Value, column: &str) -> Option<String> {
    row.get(column).and_then(scalar_text)
}

impl RecordStore for MemoryStore {
    async fn upsert(&self, table: &str, rows: &[Value], on_conflict: &str) -> StoreResult<usize> {
        self.check_available(table)?;

        // All keys first so a bad row leaves the table untouched.
        let keyed: Vec<(String, &Value)> = rows
            .iter()
            .map(|row| {
                key_of(row, on_conflict)
                    .map(|key| (key, row))
                    .ok_or_else(|| StoreError::MissingKey {
                        table: table.to_string(),
                        key: on_conflict.to_string(),
                    })
            })
            .collect::<StoreResult<_>>()?;

        let mut tables = self.lock_tables();
        let stored = tables.entry(table.to_string()).or_default();
        for (key, row) in keyed {
            let existing = stored
                .iter_mut()
                .find(|r| key_of(r, on_conflict).as_deref() == Some(key.as_str()));
            match existing {
                Some(existing) => *existing = row.clone(),
                None => stored.push(row.clone()),
            }
        }
        Ok(rows.len())
    }

    async fn select_eq(
        &self,
        table: &str,
        columns: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Vec<Value>> {
        self.check_available(table)?;

        let wanted: Vec<&str> = columns.split(',').map(str::trim).collect();
        let all = wanted.iter().any(|c| *c == "*");

        Ok(self
            .rows(table)
            .into_iter()
            .filter(|row| key_of(row, field).as_deref() == Some(value))
            .map(|row| {
                if all {
                    return row;
                }
                let projected: Map<String, Value> = wanted
                    .iter()
                    .filter_map(|c| row.get(*c).map(|v| (c.to_string(), v.clone())))
                    .collect();
                Value::Object(projected)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_upsert_replaces_by_key() {
        let store = MemoryStore::new();
        store
            .upsert(
                "products",
                &[json!({"bind_id": "a", "v": 1}), json!({"bind_id": "b", "v": 1})],
                "bind_id",
            )
            .await
            .unwrap();
        store
            .upsert("products", &[json!({"bind_id": "a", "v": 2})], "bind_id")
            .await
            .unwrap();

        let rows = store.rows("products");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], json!({"bind_id": "a", "v": 2}));
    }

    #[tokio::test]
    async fn test_upsert_without_key_is_atomic() {
        let store = MemoryStore::new();
        let err = store
            .upsert("products", &[json!({"bind_id": "a"}), json!({"sku": "x"})], "bind_id")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingKey { .. }));
        assert_eq!(store.row_count("products"), 0);
    }

    #[tokio::test]
    async fn test_select_eq_projects_columns() {
        let store = MemoryStore::new().with_rows(
            "profiles",
            vec![
                json!({"id": "u1", "company_id": "c1", "name": "Ana"}),
                json!({"id": "u2", "company_id": "c2", "name": "Luis"}),
            ],
        );
        let rows = store.select_eq("profiles", "id", "company_id", "c1").await.unwrap();
        assert_eq!(rows, vec![json!({"id": "u1"})]);

        let all = store.select_eq("profiles", "*", "company_id", "c2").await.unwrap();
        assert_eq!(all[0]["name"], "Luis");
    }

    #[tokio::test]
    async fn test_failing_table() {
        let store = MemoryStore::new();
        store.fail_table("requisitions");
        assert!(store.upsert("requisitions", &[json!({"k": 1})], "k").await.is_err());
        assert!(store.upsert("products", &[json!({"k": 1})], "k").await.is_ok());
    }
}
