//! Supabase (PostgREST) client.
//!
//! ```text
//! upsert  POST {url}/rest/v1/{table}?on_conflict={key}
//!         Prefer: resolution=merge-duplicates,return=minimal
//! select  GET  {url}/rest/v1/{table}?select={cols}&{field}=eq.{value}
//! ```

use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::RecordStore;
use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};

/// Upsert preference understood by PostgREST.
const UPSERT_PREFER: &str = "resolution=merge-duplicates,return=minimal";

/// Error bodies are cut to this many bytes in messages.
const MAX_ERROR_BODY: usize = 500;

/// REST client authenticated with the project's API key.
#[derive(Clone)]
pub struct SupabaseStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl SupabaseStore {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// REST endpoint of a table.
    pub fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn check(table: &str, response: Response) -> StoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Status {
            table: table.to_string(),
            status: status.as_u16(),
            body: clip(&body, MAX_ERROR_BODY),
        })
    }
}

impl RecordStore for SupabaseStore {
    async fn upsert(&self, table: &str, rows: &[Value], on_conflict: &str) -> StoreResult<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let request = self
            .client
            .post(self.table_url(table))
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", UPSERT_PREFER)
            .json(rows);
        let response = self.authorized(request).send().await?;
        Self::check(table, response).await?;

        Ok(rows.len())
    }

    async fn select_eq(
        &self,
        table: &str,
        columns: &str,
        field: &str,
        value: &str,
    ) -> StoreResult<Vec<Value>> {
        let filter = format!("eq.{}", value);
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", columns), (field, filter.as_str())]);
        let response = self.authorized(request).send().await?;
        let response = Self::check(table, response).await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Cut `text` to at most `max` bytes on a char boundary.
fn clip(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
