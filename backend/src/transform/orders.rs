//! Order selection and mapping to requisitions.
//!
//! Orders are grouped by their Bind `Status` so every state is represented
//! in the seed data, up to a fixed number per state.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::coerce::{
    datetime_or_now, number_or, present, required_id, scalar_text, status_code, truncate,
    truthy_text,
};
use crate::config::SelectionLimits;
use crate::error::RecordResult;
use crate::models::{BusinessStatus, IntegrationStatus, OrderRecord};
use crate::parser::RawRecord;

pub const COMMENTS_MAX: usize = 500;

/// Prefix of the internal folio given to imported orders.
pub const FOLIO_PREFIX: &str = "REQ-";

/// Orders sharing one `Status` value.
#[derive(Debug, Clone)]
pub struct StatusGroup<'a> {
    pub status: Value,
    pub orders: Vec<&'a RawRecord>,
}

/// `Status` of an order, 0 when absent.
pub fn order_status(order: &RawRecord) -> Value {
    order.get("Status").cloned().unwrap_or_else(|| Value::from(0))
}

/// Group orders by status, groups in first-seen order, orders in input order.
pub fn group_by_status(orders: &[RawRecord]) -> Vec<StatusGroup<'_>> {
    let mut groups: Vec<StatusGroup<'_>> = Vec::new();

    for order in orders {
        let status = order_status(order);
        match groups.iter_mut().find(|g| same_status(&g.status, &status)) {
            Some(group) => group.orders.push(order),
            None => groups.push(StatusGroup { status, orders: vec![order] }),
        }
    }

    groups
}

/// Numeric statuses compare by value (`1` and `1.0` are the same group).
fn same_status(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Take up to `orders_per_status` orders from every status group.
pub fn select_orders<'a>(
    groups: &[StatusGroup<'a>],
    limits: &SelectionLimits,
) -> Vec<&'a RawRecord> {
    groups
        .iter()
        .flat_map(|g| g.orders.iter().take(limits.orders_per_status).copied())
        .collect()
}

/// Order number for log lines and folios.
pub fn order_number(order: &RawRecord) -> Option<String> {
    present(order, "Number").and_then(scalar_text)
}

/// Per-run values shared by every mapped order.
#[derive(Debug, Clone)]
pub struct OrderContext {
    pub company_id: Uuid,
    /// Profile that appears as creator of every imported requisition.
    pub created_by: Option<String>,
    /// Fallback when an order has no usable date.
    pub now: DateTime<Utc>,
}

/// A mapped order and whether its date fell back to `now`.
#[derive(Debug, Clone, PartialEq)]
pub struct MappedOrder {
    pub record: OrderRecord,
    pub date_fallback: bool,
}

/// Map one Bind order to a requisition.
pub fn to_order(order: &RawRecord, ctx: &OrderContext) -> RecordResult<MappedOrder> {
    let bind_order_id = required_id(order, "ID")?;
    let total_amount = number_or(order, "Total", 0.0)?;

    let status = order_status(order);
    let code = status_code(&status);
    let bind_status = scalar_text(&status).unwrap_or_else(|| status.to_string());

    let number = order_number(order);
    let (created_at, date_fallback) = datetime_or_now(order, "OrderDate", ctx.now);

    let record = OrderRecord {
        company_id: ctx.company_id,
        internal_folio: format!("{}{}", FOLIO_PREFIX, number.as_deref().unwrap_or("N/A")),
        total_amount,
        comments: truthy_text(order, "Comments").map(|c| truncate(&c, COMMENTS_MAX)),
        bind_order_id,
        bind_status,
        bind_folio: number.unwrap_or_default(),
        business_status: BusinessStatus::from_bind_code(code),
        integration_status: IntegrationStatus::from_bind_code(code),
        created_by: ctx.created_by.clone(),
        created_at,
        bind_synced_at: (code == Some(1)).then_some(created_at),
        items: Vec::new(),
    };

    Ok(MappedOrder { record, date_fallback })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;
    use chrono::TimeZone;
    use serde_json::json;

    fn order(value: Value) -> RawRecord {
        value.as_object().cloned().unwrap()
    }

    fn ctx() -> OrderContext {
        OrderContext {
            company_id: Uuid::nil(),
            created_by: Some("7c9e6679-7425-40de-944b-e07fc1f90ae7".into()),
            now: Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        }
    }

    fn orders_with(statuses: &[(i64, usize)]) -> Vec<RawRecord> {
        let mut out = Vec::new();
        for (status, count) in statuses {
            for i in 0..*count {
                out.push(order(json!({
                    "ID": format!("o-{}-{}", status, i),
                    "Number": i,
                    "OrderDate": "2024-05-01T10:00:00Z",
                    "Status": status
                })));
            }
        }
        out
    }

    #[test]
    fn test_grouping_total() {
        let orders = orders_with(&[(0, 25), (1, 4), (2, 10), (3, 11)]);
        let groups = group_by_status(&orders);
        assert_eq!(groups.len(), 4);

        let selected = select_orders(&groups, &SelectionLimits::default());
        assert_eq!(selected.len(), 10 + 4 + 10 + 10);
    }

    #[test]
    fn test_groups_in_first_seen_order() {
        let orders = vec![
            order(json!({"ID": "a", "Status": 2})),
            order(json!({"ID": "b", "Status": 0})),
            order(json!({"ID": "c", "Status": 2.0})),
            order(json!({"ID": "d"})),
        ];
        let groups = group_by_status(&orders);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].status, json!(2));
        assert_eq!(groups[0].orders.len(), 2);
        // missing status joins the 0 group
        assert_eq!(groups[1].orders.len(), 2);

        let ids: Vec<_> = select_orders(&groups, &SelectionLimits::default())
            .iter()
            .map(|o| o["ID"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "c", "b", "d"]);
    }

    #[test]
    fn test_approved_order() {
        let o = order(json!({
            "ID": "9a1", "Number": 1042, "Status": 1,
            "OrderDate": "2024-05-01T10:00:00Z", "Total": 1520.5,
            "Comments": "Entrega en bodega"
        }));
        let mapped = to_order(&o, &ctx()).unwrap();
        let rec = mapped.record;
        let expected = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();

        assert!(!mapped.date_fallback);
        assert_eq!(rec.business_status, BusinessStatus::Approved);
        assert_eq!(rec.integration_status, IntegrationStatus::Synced);
        assert_eq!(rec.created_at, expected);
        assert_eq!(rec.bind_synced_at, Some(rec.created_at));
        assert_eq!(rec.internal_folio, "REQ-1042");
        assert_eq!(rec.bind_folio, "1042");
        assert_eq!(rec.bind_status, "1");
        assert_eq!(rec.bind_order_id, "9a1");
        assert_eq!(rec.total_amount, 1520.5);
        assert_eq!(rec.comments.as_deref(), Some("Entrega en bodega"));
        assert_eq!(rec.created_by.as_deref(), Some("7c9e6679-7425-40de-944b-e07fc1f90ae7"));
        assert!(rec.items.is_empty());
    }

    #[test]
    fn test_other_statuses() {
        let cancelled = to_order(&order(json!({"ID": "x", "Status": 2})), &ctx()).unwrap().record;
        assert_eq!(cancelled.business_status, BusinessStatus::Cancelled);
        assert_eq!(cancelled.integration_status, IntegrationStatus::Draft);
        assert_eq!(cancelled.bind_synced_at, None);

        let unknown = to_order(&order(json!({"ID": "x", "Status": 5})), &ctx()).unwrap().record;
        assert_eq!(unknown.business_status, BusinessStatus::Draft);
        assert_eq!(unknown.bind_status, "5");

        let textual = to_order(&order(json!({"ID": "x", "Status": "1"})), &ctx()).unwrap().record;
        assert_eq!(textual.business_status, BusinessStatus::Draft);
        assert_eq!(textual.integration_status, IntegrationStatus::Draft);
    }

    #[test]
    fn test_defaults_and_date_fallback() {
        let mapped =
            to_order(&order(json!({"ID": "x", "OrderDate": "no es fecha"})), &ctx()).unwrap();
        assert!(mapped.date_fallback);
        let rec = mapped.record;
        assert_eq!(rec.created_at, ctx().now);
        assert_eq!(rec.internal_folio, "REQ-N/A");
        assert_eq!(rec.bind_folio, "");
        assert_eq!(rec.bind_status, "0");
        assert_eq!(rec.total_amount, 0.0);
        assert_eq!(rec.comments, None);
        assert_eq!(rec.business_status, BusinessStatus::Draft);
    }

    #[test]
    fn test_comments_truncated() {
        let o = order(json!({"ID": "x", "Comments": "c".repeat(700)}));
        let rec = to_order(&o, &ctx()).unwrap().record;
        assert_eq!(rec.comments.unwrap().chars().count(), COMMENTS_MAX);
    }

    #[test]
    fn test_record_errors() {
        assert_eq!(
            to_order(&order(json!({"Number": 3})), &ctx()),
            Err(RecordError::MissingField("ID"))
        );
        assert!(matches!(
            to_order(&order(json!({"ID": "x", "Total": "mucho"})), &ctx()),
            Err(RecordError::NotNumeric { field: "Total", .. })
        ));
    }

    #[test]
    fn test_items_serialize_as_empty_array() {
        let rec = to_order(&order(json!({"ID": "x"})), &ctx()).unwrap().record;
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["items"], json!([]));
        assert_eq!(value["bind_synced_at"], Value::Null);
        assert_eq!(value["business_status"], "draft");
    }
}
