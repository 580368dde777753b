//! Product selection and mapping.
//!
//! Products with a picture are preferred; the downstream catalog looks empty
//! without them. Each transformed product also yields a [`BindMapping`].

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::coerce::{
    integer_or, number_or, present, required_id, scalar_text, truncate, truthy, truthy_text,
};
use crate::config::SelectionLimits;
use crate::error::RecordResult;
use crate::models::{BindMapping, MappingType, ProductRecord};
use crate::parser::RawRecord;

pub const NAME_MAX: usize = 200;
pub const DESCRIPTION_MAX: usize = 500;
pub const CATEGORY_MAX: usize = 100;

pub const DEFAULT_NAME: &str = "Sin nombre";
pub const DEFAULT_UNIT: &str = "Pieza";
pub const DEFAULT_CATEGORY: &str = "Sin categoría";

/// Image field spellings seen in Bind exports, in lookup order.
const IMAGE_FIELDS: [&str; 2] = ["ImageURL", "ImageUrl"];

/// First non-empty image URL of a product.
pub fn image_url(product: &RawRecord) -> Option<String> {
    IMAGE_FIELDS
        .iter()
        .find_map(|key| truthy_text(product, key))
}

/// Outcome of product selection.
#[derive(Debug, Clone, Default)]
pub struct ProductSelection<'a> {
    /// Products with image first, then without.
    pub selected: Vec<&'a RawRecord>,
    pub with_image_found: usize,
}

/// Pick up to `products_with_image` pictured products, then up to
/// `products_without_image` others. Missing pictured products are not
/// backfilled from the other side.
pub fn select_products<'a>(
    products: &'a [RawRecord],
    limits: &SelectionLimits,
) -> ProductSelection<'a> {
    let (with_image, without_image): (Vec<&RawRecord>, Vec<&RawRecord>) = products
        .iter()
        .partition(|p| IMAGE_FIELDS.iter().any(|key| truthy(p, key).is_some()));

    let with_image_found = with_image.len();
    let selected = with_image
        .into_iter()
        .take(limits.products_with_image)
        .chain(without_image.into_iter().take(limits.products_without_image))
        .collect();

    ProductSelection { selected, with_image_found }
}

/// `Code`, or `BIND-{Number}` when the code is empty.
pub fn sku_for(product: &RawRecord) -> String {
    match truthy_text(product, "Code") {
        Some(code) => code,
        None => {
            let number = present(product, "Number")
                .and_then(scalar_text)
                .unwrap_or_else(|| "N/A".to_string());
            format!("BIND-{}", number)
        }
    }
}

/// Category name, only for products linked to a category.
fn category_for(product: &RawRecord) -> Option<String> {
    truthy(product, "Cat1ID")?;
    let name = match product.get("Cat1Name") {
        None => Some(DEFAULT_CATEGORY.to_string()),
        Some(value) => scalar_text(value).filter(|s| !s.is_empty()),
    };
    name.map(|n| truncate(&n, CATEGORY_MAX))
}

/// Map one Bind product to a catalog product.
///
/// Fails when `ID` is missing or `Price` / `Inventory` hold non-numeric values.
pub fn to_product(
    product: &RawRecord,
    company_id: Uuid,
    now: DateTime<Utc>,
) -> RecordResult<ProductRecord> {
    let bind_id = required_id(product, "ID")?;
    let price = number_or(product, "Price", 0.0)?;
    let stock = integer_or(product, "Inventory", 0)?;

    let name = match present(product, "Title").and_then(scalar_text) {
        Some(title) => truncate(&title, NAME_MAX),
        None => DEFAULT_NAME.to_string(),
    };

    Ok(ProductRecord {
        company_id,
        bind_id,
        sku: sku_for(product),
        name,
        description: truthy_text(product, "Descripcion").map(|d| truncate(&d, DESCRIPTION_MAX)),
        price,
        stock,
        unit: truthy_text(product, "Unit").unwrap_or_else(|| DEFAULT_UNIT.to_string()),
        category: category_for(product),
        image_url: image_url(product),
        is_active: true,
        bind_sync_enabled: true,
        bind_last_synced_at: now,
    })
}

/// Mapping record for a transformed product.
pub fn product_mapping(product: &RawRecord, bind_id: &str, company_id: Uuid) -> BindMapping {
    BindMapping::new(company_id, MappingType::Product, bind_id.to_string(), product.clone())
}

/// Display label for log lines.
pub fn product_label(product: &RawRecord) -> String {
    product
        .get("Title")
        .and_then(Value::as_str)
        .unwrap_or("N/A")
        .to_string()
}
