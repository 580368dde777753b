//! End-to-end load of a Bind export into the record store.
//!
//! ```text
//! file.json → parser → classify → { clients, products, orders } → store
//! ```
//!
//! Stages run one after another. Only reading and decoding the export can
//! abort the run; a record that cannot be mapped is skipped, and a table whose
//! upsert fails is reported while the next category still loads.
//!
//! # Example
//!
//! ```rust,ignore
//! use bindload::{load_snapshot, LoadOptions, MemoryStore};
//!
//! let store = MemoryStore::new();
//! let options = LoadOptions::new(company_id, "file.json");
//! let summary = load_snapshot(&store, &options).await?;
//! println!("{} products", summary.products.transformed);
//! ```

use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use super::clients::{client_mapping, select_clients};
use super::coerce::scalar_text;
use super::orders::{group_by_status, order_number, select_orders, to_order, OrderContext};
use super::products::{product_label, product_mapping, select_products, to_product};
use crate::classify::{classify_sections, ClassifiedBuckets};
use crate::config::LoadOptions;
use crate::error::PipelineResult;
use crate::logs::{
    log_error, log_info, log_stage, log_success, log_warning, log_warning_indent, RUN_LOG,
};
use crate::models::{
    BindMapping, OrderRecord, ProductRecord, MAPPINGS_TABLE, PRODUCTS_TABLE, PROFILES_TABLE,
    REQUISITIONS_TABLE,
};
use crate::parser::{load_sections, RawRecord};
use crate::store::{to_rows, RecordStore};
use crate::validation::{dedupe, validate_batch, Rejection, Schema, UniqueKey};

/// Conflict column of `bind_mappings` and `products`.
pub const BIND_ID_KEY: &str = "bind_id";

/// Conflict column of `requisitions`.
pub const BIND_ORDER_ID_KEY: &str = "bind_order_id";

/// Counters for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryReport {
    /// Records classified into the category.
    pub found: usize,
    /// Records kept by the selection caps.
    pub selected: usize,
    /// Selected records mapped to a target record.
    pub transformed: usize,
    /// Rows accepted by the store.
    pub written: usize,
}

/// Outcome of a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub clients: CategoryReport,
    pub products: CategoryReport,
    /// `bind_mappings` rows written for products.
    pub product_mappings_written: usize,
    pub orders: CategoryReport,
    /// Price lists are classified and counted but not loaded.
    pub price_lists: usize,
    pub discarded_sections: usize,
    /// Warnings and errors logged during the run.
    pub warnings: usize,
    pub errors: usize,
}

/// Read the export at `options.input` and load it into `store`.
///
/// Fails only when the export cannot be read or decoded.
pub async fn load_snapshot<S: RecordStore>(
    store: &S,
    options: &LoadOptions,
) -> PipelineResult<LoadSummary> {
    log_stage("📂 Reading JSON file...");
    let sections = load_sections(&options.input)?;
    log_success(format!("File loaded: {} sections", sections.len()));

    log_stage("🔍 Classifying sections...");
    let buckets = classify_sections(sections);
    log_info(format!("Clients: {}", buckets.clients.len()));
    log_info(format!("Products: {}", buckets.products.len()));
    log_info(format!("Orders: {}", buckets.orders.len()));
    log_info(format!("Price lists: {}", buckets.price_lists.len()));
    if buckets.discarded_sections > 0 {
        log_info(format!("Unrecognised sections: {}", buckets.discarded_sections));
    }

    Ok(load_buckets(store, &buckets, options).await)
}

/// Load already classified records. Never fails; problems are logged and counted.
pub async fn load_buckets<S: RecordStore>(
    store: &S,
    buckets: &ClassifiedBuckets,
    options: &LoadOptions,
) -> LoadSummary {
    let warnings_before = RUN_LOG.warnings();
    let errors_before = RUN_LOG.errors();

    let clients = load_clients(store, &buckets.clients, options).await;
    let (products, product_mappings_written) =
        load_products(store, &buckets.products, options).await;
    let orders = load_orders(store, &buckets.orders, options).await;

    LoadSummary {
        clients,
        products,
        product_mappings_written,
        orders,
        price_lists: buckets.price_lists.len(),
        discarded_sections: buckets.discarded_sections,
        warnings: RUN_LOG.warnings().saturating_sub(warnings_before),
        errors: RUN_LOG.errors().saturating_sub(errors_before),
    }
}

// =============================================================================
// Clients
// =============================================================================

/// Select clients and upsert their mappings.
pub async fn load_clients<S: RecordStore>(
    store: &S,
    clients: &[RawRecord],
    options: &LoadOptions,
) -> CategoryReport {
    log_stage("📋 Loading clients...");

    let selection = select_clients(clients, &options.limits);
    log_info(format!("Clients found: {}", clients.len()));
    log_info(format!("Clients matching 'Soluciones': {}", selection.priority_found));
    log_info(format!("Clients to load: {}", selection.selected.len()));

    let mut mappings = Vec::with_capacity(selection.selected.len());
    for client in &selection.selected {
        match client_mapping(client, options.company_id) {
            Ok(mapping) => mappings.push(mapping),
            Err(e) => log_warning(format!("Skipping client {}: {}", client_label(client), e)),
        }
    }
    let transformed = mappings.len();

    let mappings = screen_mappings(mappings);
    let written = write_batch(store, MAPPINGS_TABLE, &mappings, BIND_ID_KEY).await;
    if let Some(n) = written {
        log_success(format!("{} clients mapped in {}", n, MAPPINGS_TABLE));
    }

    CategoryReport {
        found: clients.len(),
        selected: selection.selected.len(),
        transformed,
        written: written.unwrap_or(0),
    }
}

fn client_label(client: &RawRecord) -> String {
    client
        .get("ClientName")
        .and_then(scalar_text)
        .unwrap_or_else(|| "N/A".to_string())
}

// =============================================================================
// Products
// =============================================================================

/// Select, map and upsert products, then their mappings.
///
/// Mappings are only written after the products upsert succeeded. Returns the
/// product report and the number of mapping rows written.
pub async fn load_products<S: RecordStore>(
    store: &S,
    products: &[RawRecord],
    options: &LoadOptions,
) -> (CategoryReport, usize) {
    log_stage("📦 Loading products...");

    let selection = select_products(products, &options.limits);
    log_info(format!("Products found: {}", products.len()));
    log_info(format!("Products with images: {}", selection.with_image_found));
    log_info(format!("Products to load: {}", selection.selected.len()));

    let now = Utc::now();
    let mut records: Vec<ProductRecord> = Vec::with_capacity(selection.selected.len());
    let mut sources: HashMap<String, &RawRecord> = HashMap::new();
    for product in &selection.selected {
        match to_product(product, options.company_id, now) {
            Ok(record) => {
                sources.entry(record.bind_id.clone()).or_insert(*product);
                records.push(record);
            }
            Err(e) => log_warning(format!(
                "Error processing product {}: {}",
                product_label(product),
                e
            )),
        }
    }

    let mut report = CategoryReport {
        found: products.len(),
        selected: selection.selected.len(),
        transformed: records.len(),
        written: 0,
    };

    let product_keys: [UniqueKey<ProductRecord>; 1] = [("bind_id", |p| p.bind_id.clone())];
    let (records, rejected) = validate_batch(records, Schema::Product, |p| p.bind_id.clone());
    report_rejections("product", &rejected);
    let (records, rejected) = dedupe(records, &product_keys);
    report_rejections("product", &rejected);

    let Some(written) = write_batch(store, PRODUCTS_TABLE, &records, BIND_ID_KEY).await else {
        if !records.is_empty() {
            log_warning("Product mappings skipped because the products upsert failed");
        }
        return (report, 0);
    };
    report.written = written;
    if written > 0 {
        log_success(format!("{} products loaded", written));
    }

    let mappings: Vec<BindMapping> = records
        .iter()
        .filter_map(|p| {
            sources
                .get(&p.bind_id)
                .map(|raw| product_mapping(raw, &p.bind_id, options.company_id))
        })
        .collect();
    let mappings = screen_mappings(mappings);
    let mappings_written = write_batch(store, MAPPINGS_TABLE, &mappings, BIND_ID_KEY).await;
    if let Some(n) = mappings_written.filter(|n| *n > 0) {
        log_success(format!("{} products mapped", n));
    }

    (report, mappings_written.unwrap_or(0))
}

// =============================================================================
// Orders
// =============================================================================

/// First profile of the tenant, used as creator of imported requisitions.
///
/// Any lookup failure yields `None`.
pub async fn resolve_default_user<S: RecordStore>(store: &S, company_id: Uuid) -> Option<String> {
    match store
        .select_eq(PROFILES_TABLE, "id", "company_id", &company_id.to_string())
        .await
    {
        Ok(rows) => {
            let user = rows.iter().find_map(|row| row.get("id").and_then(scalar_text));
            if user.is_none() {
                log_warning("No profile found for the company; requisitions will have no creator");
            }
            user
        }
        Err(e) => {
            log_warning(format!(
                "Could not look up profiles ({}); requisitions will have no creator",
                e
            ));
            None
        }
    }
}

/// Select up to N orders per status, map and upsert them as requisitions.
pub async fn load_orders<S: RecordStore>(
    store: &S,
    orders: &[RawRecord],
    options: &LoadOptions,
) -> CategoryReport {
    log_stage("📝 Loading orders...");

    let groups = group_by_status(orders);
    let statuses: Vec<String> = groups.iter().map(|g| g.status.to_string()).collect();
    log_info(format!("Orders found: {}", orders.len()));
    log_info(format!("Statuses found: [{}]", statuses.join(", ")));

    let selected = select_orders(&groups, &options.limits);
    log_info(format!("Orders to load: {}", selected.len()));

    let mut report = CategoryReport {
        found: orders.len(),
        selected: selected.len(),
        ..CategoryReport::default()
    };
    if selected.is_empty() {
        return report;
    }

    let ctx = OrderContext {
        company_id: options.company_id,
        created_by: resolve_default_user(store, options.company_id).await,
        now: Utc::now(),
    };

    let mut records: Vec<OrderRecord> = Vec::with_capacity(selected.len());
    for order in &selected {
        let number = order_number(order).unwrap_or_else(|| "N/A".to_string());
        match to_order(order, &ctx) {
            Ok(mapped) => {
                if mapped.date_fallback {
                    log_warning_indent(
                        format!("Order {}: no usable OrderDate, using current time", number),
                        1,
                    );
                }
                records.push(mapped.record);
            }
            Err(e) => log_warning(format!("Error processing order {}: {}", number, e)),
        }
    }
    report.transformed = records.len();

    let order_keys: [UniqueKey<OrderRecord>; 1] = [("bind_order_id", |o| o.bind_order_id.clone())];
    let (records, rejected) =
        validate_batch(records, Schema::Requisition, |o| o.bind_order_id.clone());
    report_rejections("order", &rejected);
    let (records, rejected) = dedupe(records, &order_keys);
    report_rejections("order", &rejected);

    if let Some(written) =
        write_batch(store, REQUISITIONS_TABLE, &records, BIND_ORDER_ID_KEY).await
    {
        report.written = written;
        if written > 0 {
            log_success(format!("{} orders loaded", written));
        }
    }
    report
}

// =============================================================================
// Shared helpers
// =============================================================================

fn screen_mappings(mappings: Vec<BindMapping>) -> Vec<BindMapping> {
    let keys: [UniqueKey<BindMapping>; 1] = [("bind_id", |m| m.bind_id.clone())];
    let (mappings, rejected) = validate_batch(mappings, Schema::BindMapping, |m| m.bind_id.clone());
    report_rejections("mapping", &rejected);
    let (mappings, rejected) = dedupe(mappings, &keys);
    report_rejections("mapping", &rejected);
    mappings
}

fn report_rejections(kind: &str, rejected: &[Rejection]) {
    for r in rejected {
        log_warning(format!("Skipping {} {}: {}", kind, r.key, r.reasons.join("; ")));
    }
}

/// Upsert a batch. `None` when the store rejected it (already logged).
async fn write_batch<S, T>(
    store: &S,
    table: &str,
    records: &[T],
    on_conflict: &str,
) -> Option<usize>
where
    S: RecordStore,
    T: Serialize,
{
    if records.is_empty() {
        return Some(0);
    }
    let result = match to_rows(records) {
        Ok(rows) => store.upsert(table, &rows, on_conflict).await,
        Err(e) => Err(e),
    };
    match result {
        Ok(n) => Some(n),
        Err(e) => {
            log_error(format!("Error loading {}: {}", table, e));
            None
        }
    }
}

/// Print the closing report.
pub fn print_summary(summary: &LoadSummary) {
    let rule = "=".repeat(50);
    println!("\n{}", rule);
    println!("📊 LOAD SUMMARY");
    println!("{}", rule);
    println!(
        "✅ Clients loaded: {} ({} written)",
        summary.clients.selected, summary.clients.written
    );
    println!(
        "✅ Products loaded: {} ({} written, {} mapped)",
        summary.products.transformed, summary.products.written, summary.product_mappings_written
    );
    println!(
        "✅ Orders loaded: {} ({} written)",
        summary.orders.transformed, summary.orders.written
    );
    println!("ℹ️  Price lists found (not loaded): {}", summary.price_lists);
    if summary.warnings > 0 || summary.errors > 0 {
        println!("⚠️  {} warnings, {} errors", summary.warnings, summary.errors);
    }
    println!("{}", rule);
}
