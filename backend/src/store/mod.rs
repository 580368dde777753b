//! Record store seam.
//!
//! The pipeline only needs two operations from the backend: upsert a batch
//! keyed by one column, and a single-column equality select. [`SupabaseStore`]
//! talks to the Supabase REST API; [`MemoryStore`] keeps tables in memory for
//! dry runs and tests.

pub mod memory;
pub mod supabase;

use serde::Serialize;
use serde_json::Value;

use crate::error::StoreResult;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

/// A table-oriented store with upsert-by-key semantics.
///
/// Each call is atomic on its own; nothing spans two calls.
#[allow(async_fn_in_trait)]
pub trait RecordStore {
    /// Insert `rows`, replacing existing rows with the same `on_conflict` value.
    /// Returns the number of rows sent.
    async fn upsert(&self, table: &str, rows: &[Value], on_conflict: &str) -> StoreResult<usize>;

    /// Rows of `table` whose `field` equals `value`, projected to `columns`
    /// (comma separated, `*` for all).
    async fn select_eq(
        &self,
        table: &str,
        columns: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Vec<Value>>;
}

/// Encode typed records as JSON rows.
pub fn to_rows<T: Serialize>(records: &[T]) -> StoreResult<Vec<Value>> {
    records
        .iter()
        .map(|r| serde_json::to_value(r).map_err(Into::into))
        .collect()
}
