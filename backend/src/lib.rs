//! # Bindload - Bind ERP snapshot loader
//!
//! Bindload reads a JSON export of a Bind ERP account, picks a representative
//! sample of clients, products and orders, maps them to the platform's schema
//! and upserts them into Supabase.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  file.json  │────▶│   Parser    │────▶│  Classify   │────▶│  Transform  │
//! │  (sections) │     │  (envelope) │     │ (signature) │     │ (sample+map)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                                    │
//!                     ┌─────────────┐     ┌─────────────┐            │
//!                     │    Store    │◀────│ Validation  │◀───────────┘
//!                     │ (Supabase)  │     │(schema+dup) │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use bindload::{load_snapshot, print_summary, LoadOptions, StoreConfig, SupabaseStore};
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = SupabaseStore::new(&StoreConfig::from_env().unwrap());
//!     let options = LoadOptions::resolve(None, None).unwrap();
//!     let summary = load_snapshot(&store, &options).await.unwrap();
//!     print_summary(&summary);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`logs`] - Console run log
//! - [`config`] - Environment and run options
//! - [`models`] - Target rows (mappings, products, requisitions)
//! - [`parser`] - Export envelope decoding
//! - [`classify`] - Section classification
//! - [`transform`] - Selection, mapping and the load pipeline
//! - [`validation`] - Row schemas and in-batch uniqueness
//! - [`store`] - Record store seam (Supabase, in-memory)

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Reading
pub mod classify;
pub mod parser;

// Transformation
pub mod transform;

// Validation
pub mod validation;

// Persistence
pub mod store;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    ConfigError, ConfigResult, PipelineError, PipelineResult, RecordError, RecordResult,
    SourceError, SourceResult, StoreError, StoreResult,
};

// =============================================================================
// Re-exports - Configuration
// =============================================================================

pub use config::{LoadOptions, SelectionLimits, StoreConfig};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    BindMapping, BusinessStatus, IntegrationStatus, MappingType, OrderRecord, ProductRecord,
};

// =============================================================================
// Re-exports - Reading
// =============================================================================

pub use classify::{classify_sections, Category, ClassifiedBuckets};
pub use parser::{load_sections, parse_sections, RawRecord, RawSection};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{
    dedupe, is_valid, validate, validate_batch, validate_record, Rejection, Schema,
};

// =============================================================================
// Re-exports - Store
// =============================================================================

pub use store::{MemoryStore, RecordStore, SupabaseStore};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    load_buckets, load_clients, load_orders, load_products, load_snapshot, print_summary,
    resolve_default_user, CategoryReport, LoadSummary,
};
