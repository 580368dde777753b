//! Best-effort readers for loosely typed export fields.
//!
//! Everything here is total except the numeric coercions, which report a
//! [`RecordError`] for values that are present but not numbers.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

use crate::error::{RecordError, RecordResult};
use crate::parser::RawRecord;

/// Field present with a non-null value.
pub fn present<'a>(record: &'a RawRecord, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|v| !v.is_null())
}

/// Truthiness of a JSON value: null, false, 0, "" and empty containers are false.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Field present and truthy.
pub fn truthy<'a>(record: &'a RawRecord, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|v| is_truthy(v))
}

/// Scalar rendered as text: strings as-is, numbers and booleans formatted.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Text of a field, `None` when absent, null or structured.
pub fn text(record: &RawRecord, key: &str) -> Option<String> {
    present(record, key).and_then(scalar_text)
}

/// Text of a field when it is truthy.
pub fn truthy_text(record: &RawRecord, key: &str) -> Option<String> {
    truthy(record, key).and_then(scalar_text)
}

/// First `max` characters (not bytes).
pub fn truncate(value: &str, max: usize) -> String {
    match value.char_indices().nth(max) {
        Some((idx, _)) => value[..idx].to_string(),
        None => value.to_string(),
    }
}

/// Required external id, as text.
pub fn required_id(record: &RawRecord, key: &'static str) -> RecordResult<String> {
    text(record, key)
        .filter(|id| !id.trim().is_empty())
        .ok_or(RecordError::MissingField(key))
}

/// Decimal value of a field; absent or null yields `default`.
pub fn number_or(record: &RawRecord, key: &'static str, default: f64) -> RecordResult<f64> {
    let Some(value) = present(record, key) else {
        return Ok(default);
    };
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    };
    parsed.ok_or_else(|| not_numeric(key, value))
}

/// Integer value of a field; decimals are truncated toward zero.
pub fn integer_or(record: &RawRecord, key: &'static str, default: i64) -> RecordResult<i64> {
    let Some(value) = present(record, key) else {
        return Ok(default);
    };
    let parsed = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    };
    parsed.ok_or_else(|| not_numeric(key, value))
}

fn not_numeric(field: &'static str, value: &Value) -> RecordError {
    RecordError::NotNumeric {
        field,
        value: value.to_string(),
    }
}

/// Integral status code of a value, if it is one.
pub fn status_code(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// Parse an ISO-8601 timestamp.
///
/// A trailing `Z` means UTC. Values without an offset are taken as UTC, and a
/// bare date as midnight UTC.
pub fn parse_iso_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    let normalized = match raw.strip_suffix('Z').or_else(|| raw.strip_suffix('z')) {
        Some(stem) => format!("{}+00:00", stem),
        None => raw.to_string(),
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(&normalized) {
        return Some(dt);
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"] {
        if let Ok(dt) = DateTime::parse_from_str(&normalized, fmt) {
            return Some(dt);
        }
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(&normalized, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(&normalized, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Timestamp of a field, or `now` when absent or unparseable.
///
/// The boolean tells whether the fallback was used.
pub fn datetime_or_now(
    record: &RawRecord,
    key: &str,
    now: DateTime<Utc>,
) -> (DateTime<FixedOffset>, bool) {
    match truthy(record, key).and_then(Value::as_str).and_then(parse_iso_datetime) {
        Some(dt) => (dt, false),
        None => (now.fixed_offset(), true),
    }
}
