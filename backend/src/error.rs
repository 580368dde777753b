//! Error types for the Bind snapshot loader.
//!
//! - [`ConfigError`] - Environment / CLI configuration errors
//! - [`SourceError`] - Reading and decoding the exported JSON document
//! - [`StoreError`] - Backend store (Supabase REST) errors
//! - [`RecordError`] - A single source record that cannot be mapped
//! - [`PipelineError`] - Top-level orchestration errors
//!
//! Only [`PipelineError`] ever aborts a run. Record and store errors are
//! caught by the pipeline, logged, and the affected record or table skipped.

use thiserror::Error;

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors while assembling the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set (or is empty).
    #[error("Missing environment variable {0}")]
    MissingVar(String),

    /// The tenant identifier is not a UUID.
    #[error("Invalid company id '{value}': {source}")]
    InvalidCompanyId {
        value: String,
        #[source]
        source: uuid::Error,
    },
}

// =============================================================================
// Source Document Errors
// =============================================================================

/// Errors while loading the exported JSON document.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read the file.
    #[error("Cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON.
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document parsed but its top level is not an array.
    #[error("Expected a top-level JSON array, found {0}")]
    NotAnArray(&'static str),
}

// =============================================================================
// Store Errors
// =============================================================================

/// Errors from the backend record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure (DNS, TLS, connection reset...).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("{table}: HTTP {status}: {body}")]
    Status {
        table: String,
        status: u16,
        body: String,
    },

    /// A record could not be encoded, or a response decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A record has no usable value under the conflict key.
    #[error("{table}: record has no value for conflict key '{key}'")]
    MissingKey { table: String, key: String },
}

// =============================================================================
// Record Errors
// =============================================================================

/// A source record that cannot be turned into a target record.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    /// A field the target shape cannot default is absent.
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    /// A field is present but cannot be coerced to a number.
    #[error("field '{field}' is not numeric: {value}")]
    NotNumeric { field: &'static str, value: String },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Fatal errors: any of these aborts the run with exit code 1.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input document error.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Store error that could not be contained to one table.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Writing the dry-run output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Encoding the dry-run output failed.
    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result type for loading the source document.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result type for mapping a single record.
pub type RecordResult<T> = Result<T, RecordError>;

/// Result type for the whole run.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        let src = SourceError::NotAnArray("object");
        let err: PipelineError = src.into();
        assert!(err.to_string().contains("top-level JSON array"));

        let cfg = ConfigError::MissingVar("VITE_SUPABASE_URL".into());
        let err: PipelineError = cfg.into();
        assert!(err.to_string().contains("VITE_SUPABASE_URL"));
    }

    #[test]
    fn test_record_error_format() {
        let err = RecordError::NotNumeric {
            field: "Price",
            value: "\"abc\"".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("Price"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_store_status_format() {
        let err = StoreError::Status {
            table: "products".into(),
            status: 409,
            body: "duplicate key".into(),
        };
        assert_eq!(err.to_string(), "products: HTTP 409: duplicate key");
    }
}
