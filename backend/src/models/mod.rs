//! Target records written to the backend store.
//!
//! - [`BindMapping`] - External-id linkage (`bind_mappings` table)
//! - [`ProductRecord`] - Catalog product (`products` table)
//! - [`OrderRecord`] - Requisition imported from a Bind order (`requisitions` table)
//! - [`BusinessStatus`] / [`IntegrationStatus`] - Requisition state columns

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::parser::RawRecord;

// =============================================================================
// Tables
// =============================================================================

pub const MAPPINGS_TABLE: &str = "bind_mappings";
pub const PRODUCTS_TABLE: &str = "products";
pub const REQUISITIONS_TABLE: &str = "requisitions";
pub const PROFILES_TABLE: &str = "profiles";

// =============================================================================
// Bind Mapping
// =============================================================================

/// Kind of Bind entity a mapping points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MappingType {
    Client,
    Product,
}

/// Links a Bind ERP id to the tenant, keeping the source record verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BindMapping {
    pub company_id: Uuid,
    pub mapping_type: MappingType,
    pub bind_id: String,
    /// Untouched source record.
    pub bind_data: RawRecord,
    pub is_active: bool,
}

impl BindMapping {
    pub fn new(
        company_id: Uuid,
        mapping_type: MappingType,
        bind_id: String,
        bind_data: RawRecord,
    ) -> Self {
        Self {
            company_id,
            mapping_type,
            bind_id,
            bind_data,
            is_active: true,
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductRecord {
    pub company_id: Uuid,
    pub bind_id: String,
    pub sku: String,
    /// At most 200 characters.
    pub name: String,
    /// At most 500 characters.
    pub description: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub unit: String,
    /// At most 100 characters.
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_active: bool,
    pub bind_sync_enabled: bool,
    pub bind_last_synced_at: DateTime<Utc>,
}

// =============================================================================
// Requisition (order)
// =============================================================================

/// Requisition state as seen by the business.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BusinessStatus {
    Draft,
    Approved,
    Cancelled,
}

impl BusinessStatus {
    /// Map a Bind order status code. Unknown codes are drafts.
    pub fn from_bind_code(code: Option<i64>) -> Self {
        match code {
            Some(1) => Self::Approved,
            Some(2) => Self::Cancelled,
            _ => Self::Draft,
        }
    }
}

/// Whether the requisition is in sync with Bind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IntegrationStatus {
    Synced,
    Draft,
}

impl IntegrationStatus {
    pub fn from_bind_code(code: Option<i64>) -> Self {
        if code == Some(1) {
            Self::Synced
        } else {
            Self::Draft
        }
    }
}

/// A requisition imported from a Bind order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderRecord {
    pub company_id: Uuid,
    pub internal_folio: String,
    pub total_amount: f64,
    pub comments: Option<String>,
    pub bind_order_id: String,
    pub bind_status: String,
    pub bind_folio: String,
    pub business_status: BusinessStatus,
    pub integration_status: IntegrationStatus,
    pub created_by: Option<String>,
    pub created_at: DateTime<FixedOffset>,
    pub bind_synced_at: Option<DateTime<FixedOffset>>,
    /// Line items are not imported.
    pub items: Vec<Value>,
}
