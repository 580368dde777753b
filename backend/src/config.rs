//! Run configuration: store credentials, tenant and input location.

use std::env;
use std::path::PathBuf;
use uuid::Uuid;

use crate::error::{ConfigError, ConfigResult};

/// Export location used when no `--input` is given.
pub const DEFAULT_INPUT_PATH: &str = "integrations/n8n/api-docs/schemas/file.json";

/// Tenant that receives the seed data when none is configured.
pub const DEFAULT_COMPANY_ID: &str = "cac090e5-0457-4093-a4fd-bd9a060b48f1";

/// Environment variable overriding [`DEFAULT_COMPANY_ID`].
pub const COMPANY_ID_VAR: &str = "BIND_COMPANY_ID";

const URL_VARS: [&str; 2] = ["VITE_SUPABASE_URL", "SUPABASE_URL"];
const KEY_VARS: [&str; 2] = ["VITE_SUPABASE_ANON_KEY", "SUPABASE_KEY"];

/// Endpoint and key for the Supabase REST API.
#[derive(Clone)]
pub struct StoreConfig {
    pub url: String,
    pub api_key: String,
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl StoreConfig {
    /// Read credentials from the environment (after loading `.env`).
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read credentials through an arbitrary key-value source.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = first_set(&lookup, &URL_VARS)?;
        let api_key = first_set(&lookup, &KEY_VARS)?;
        Ok(Self { url, api_key })
    }
}

fn first_set<F>(lookup: &F, names: &[&str]) -> ConfigResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingVar(names[0].to_string()))
}

/// Per-category caps applied by the selectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionLimits {
    /// Clients whose name contains "soluciones".
    pub priority_clients: usize,
    /// Remaining clients.
    pub other_clients: usize,
    /// Products with an image.
    pub products_with_image: usize,
    /// Products without an image.
    pub products_without_image: usize,
    /// Orders per distinct status code.
    pub orders_per_status: usize,
}

impl Default for SelectionLimits {
    fn default() -> Self {
        Self {
            priority_clients: 15,
            other_clients: 5,
            products_with_image: 40,
            products_without_image: 10,
            orders_per_status: 10,
        }
    }
}

/// Inputs to one pipeline run.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Tenant stamped on every written record.
    pub company_id: Uuid,
    /// Exported JSON document.
    pub input: PathBuf,
    pub limits: SelectionLimits,
}

impl LoadOptions {
    pub fn new(company_id: Uuid, input: impl Into<PathBuf>) -> Self {
        Self {
            company_id,
            input: input.into(),
            limits: SelectionLimits::default(),
        }
    }

    /// Resolve options from optional CLI values, then the environment, then defaults.
    pub fn resolve(company_id: Option<String>, input: Option<PathBuf>) -> ConfigResult<Self> {
        let raw = company_id
            .or_else(|| env::var(COMPANY_ID_VAR).ok().filter(|v| !v.trim().is_empty()))
            .unwrap_or_else(|| DEFAULT_COMPANY_ID.to_string());
        let company_id = parse_company_id(&raw)?;
        let input = input.unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_PATH));
        Ok(Self::new(company_id, input))
    }
}

/// Parse a tenant id, accepting surrounding whitespace.
pub fn parse_company_id(raw: &str) -> ConfigResult<Uuid> {
    Uuid::parse_str(raw.trim()).map_err(|source| ConfigError::InvalidCompanyId {
        value: raw.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_store_config_prefers_vite_names() {
        let cfg = StoreConfig::from_lookup(lookup(&[
            ("VITE_SUPABASE_URL", "https://a.supabase.co"),
            ("SUPABASE_URL", "https://b.supabase.co"),
            ("VITE_SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap();
        assert_eq!(cfg.url, "https://a.supabase.co");
        assert_eq!(cfg.api_key, "anon");
    }

    #[test]
    fn test_store_config_falls_back_to_plain_names() {
        let cfg = StoreConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://b.supabase.co"),
            ("SUPABASE_KEY", "service"),
        ]))
        .unwrap();
        assert_eq!(cfg.url, "https://b.supabase.co");
        assert_eq!(cfg.api_key, "service");
    }

    #[test]
    fn test_missing_key_is_reported() {
        let vars = lookup(&[("VITE_SUPABASE_URL", "https://a.supabase.co")]);
        let err = StoreConfig::from_lookup(vars).unwrap_err();
        assert!(err.to_string().contains("VITE_SUPABASE_ANON_KEY"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let err = StoreConfig::from_lookup(lookup(&[
            ("VITE_SUPABASE_URL", "   "),
            ("VITE_SUPABASE_ANON_KEY", "anon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(ref v) if v == "VITE_SUPABASE_URL"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let cfg = StoreConfig { url: "u".into(), api_key: "secret".into() };
        assert!(!format!("{:?}", cfg).contains("secret"));
    }

    #[test]
    fn test_parse_company_id() {
        assert!(parse_company_id(DEFAULT_COMPANY_ID).is_ok());
        assert!(parse_company_id(" cac090e5-0457-4093-a4fd-bd9a060b48f1 ").is_ok());
        assert!(matches!(
            parse_company_id("growpals"),
            Err(ConfigError::InvalidCompanyId { .. })
        ));
    }

    #[test]
    fn test_resolve_explicit_values() {
        let opts = LoadOptions::resolve(
            Some("2ea0aa65-6319-415e-a153-31c9804c352f".into()),
            Some(PathBuf::from("snapshot.json")),
        )
        .unwrap();
        assert_eq!(opts.company_id.to_string(), "2ea0aa65-6319-415e-a153-31c9804c352f");
        assert_eq!(opts.input, PathBuf::from("snapshot.json"));
        assert_eq!(opts.limits, SelectionLimits::default());
    }
}
