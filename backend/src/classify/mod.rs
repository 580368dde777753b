//! Section classification.
//!
//! Each export section is assigned to one [`Category`] by looking at the keys
//! of its first record only. Sections are assumed homogeneous: a section that
//! mixes shapes is classified entirely by its first element.
//!
//! ```text
//! ClientName + RFC            → clients
//! Title + Price + Code        → products
//! OrderDate + Status          → orders
//! PriceListID | PriceListName → price_lists
//! anything else               → discarded
//! ```

use serde_json::Value;

use crate::logs::log_warning;
use crate::parser::{RawRecord, RawSection};

/// Semantic category of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Clients,
    Products,
    Orders,
    PriceLists,
}

impl Category {
    /// Signature rules, checked in this order; first match wins.
    pub const PRIORITY: [Category; 4] = [
        Category::Clients,
        Category::Products,
        Category::Orders,
        Category::PriceLists,
    ];

    /// Whether a sample record carries this category's distinguishing keys.
    pub fn matches(&self, sample: &RawRecord) -> bool {
        let has = |key: &str| sample.contains_key(key);
        match self {
            Category::Clients => has("ClientName") && has("RFC"),
            Category::Products => has("Title") && has("Price") && has("Code"),
            Category::Orders => has("OrderDate") && has("Status"),
            Category::PriceLists => has("PriceListID") || has("PriceListName"),
        }
    }

    /// Classify a sample record.
    pub fn of(sample: &RawRecord) -> Option<Category> {
        Self::PRIORITY.into_iter().find(|c| c.matches(sample))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Clients => "clients",
            Category::Products => "products",
            Category::Orders => "orders",
            Category::PriceLists => "price_lists",
        }
    }
}

/// Flattened records per category, in export order.
#[derive(Debug, Clone, Default)]
pub struct ClassifiedBuckets {
    pub clients: Vec<RawRecord>,
    pub products: Vec<RawRecord>,
    pub orders: Vec<RawRecord>,
    pub price_lists: Vec<RawRecord>,
    /// Non-empty sections that matched no signature.
    pub discarded_sections: usize,
}

impl ClassifiedBuckets {
    pub fn bucket(&self, category: Category) -> &[RawRecord] {
        match category {
            Category::Clients => &self.clients,
            Category::Products => &self.products,
            Category::Orders => &self.orders,
            Category::PriceLists => &self.price_lists,
        }
    }

    fn bucket_mut(&mut self, category: Category) -> &mut Vec<RawRecord> {
        match category {
            Category::Clients => &mut self.clients,
            Category::Products => &mut self.products,
            Category::Orders => &mut self.orders,
            Category::PriceLists => &mut self.price_lists,
        }
    }
}

/// Classify every section and flatten the buckets.
///
/// Sections with an empty, absent or non-array `value` contribute nothing.
pub fn classify_sections(sections: Vec<RawSection>) -> ClassifiedBuckets {
    let mut buckets = ClassifiedBuckets::default();

    for section in sections {
        let category = match section.records() {
            None => continue,
            Some(records) if records.is_empty() => continue,
            Some(_) => section.sample().and_then(Category::of),
        };

        let Some(category) = category else {
            buckets.discarded_sections += 1;
            continue;
        };

        let Some(Value::Array(records)) = section.value else {
            continue;
        };
        let bucket = buckets.bucket_mut(category);
        for (i, record) in records.into_iter().enumerate() {
            match record {
                Value::Object(record) => bucket.push(record),
                _ => log_warning(format!(
                    "Section {} ({}): element {} is not an object, ignored",
                    section.tag,
                    category.as_str(),
                    i
                )),
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn section(i: usize, value: Value) -> RawSection {
        RawSection { tag: format!("#{}", i), value: Some(value) }
    }

    fn record(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_signatures() {
        assert_eq!(
            Category::of(&record(json!({"ClientName": "A", "RFC": "X"}))),
            Some(Category::Clients)
        );
        assert_eq!(
            Category::of(&record(json!({"Title": "A", "Price": 1, "Code": "C"}))),
            Some(Category::Products)
        );
        assert_eq!(
            Category::of(&record(json!({"OrderDate": "2024-01-01", "Status": 0}))),
            Some(Category::Orders)
        );
        assert_eq!(
            Category::of(&record(json!({"PriceListName": "Mayoreo"}))),
            Some(Category::PriceLists)
        );
        assert_eq!(Category::of(&record(json!({"Title": "A", "Price": 1}))), None);
    }

    #[test]
    fn test_first_match_wins() {
        let both = record(json!({
            "ClientName": "A", "RFC": "X",
            "Title": "T", "Price": 1, "Code": "C"
        }));
        assert_eq!(Category::of(&both), Some(Category::Clients));
    }

    #[test]
    fn test_partition_and_flatten() {
        let sections = vec![
            section(0, json!([{"ClientName": "A", "RFC": "1"}, {"ClientName": "B", "RFC": "2"}])),
            section(1, json!([{"Title": "P", "Price": 1, "Code": "c1"}])),
            section(2, json!([{"ClientName": "C", "RFC": "3"}])),
            section(3, json!([{"OrderDate": "2024-01-01", "Status": 1}])),
            section(4, json!([{"PriceListID": 7}])),
            section(5, json!([{"Warehouse": "Norte"}])),
        ];

        let buckets = classify_sections(sections);

        let names: Vec<_> = buckets.clients.iter().map(|c| c["ClientName"].clone()).collect();
        assert_eq!(names, vec![json!("A"), json!("B"), json!("C")]);
        assert_eq!(buckets.products.len(), 1);
        assert_eq!(buckets.orders.len(), 1);
        assert_eq!(buckets.price_lists.len(), 1);
        assert_eq!(buckets.discarded_sections, 1);
    }

    #[test]
    fn test_sample_decides_whole_section() {
        // Second element looks like a product but rides along with the clients.
        let sections = vec![section(
            0,
            json!([{"ClientName": "A", "RFC": "1"}, {"Title": "P", "Price": 1, "Code": "c"}]),
        )];
        let buckets = classify_sections(sections);
        assert_eq!(buckets.clients.len(), 2);
        assert!(buckets.products.is_empty());
    }

    #[test]
    fn test_empty_and_malformed_sections_are_ignored() {
        let sections = vec![
            section(0, json!([])),
            section(1, json!({"ClientName": "A", "RFC": "1"})),
            section(2, json!("nope")),
            RawSection { tag: "#3".into(), value: None },
            section(4, json!([1, 2, 3])),
        ];
        let buckets = classify_sections(sections);
        for category in Category::PRIORITY {
            assert!(buckets.bucket(category).is_empty());
        }
        // only the non-empty array with an unrecognised sample counts as discarded
        assert_eq!(buckets.discarded_sections, 1);
    }

    #[test]
    fn test_non_object_elements_dropped() {
        let sections = vec![section(0, json!([{"ClientName": "A", "RFC": "1"}, "junk"]))];
        let buckets = classify_sections(sections);
        assert_eq!(buckets.clients.len(), 1);
    }
}
