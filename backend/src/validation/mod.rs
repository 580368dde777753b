//! Pre-write checks for target records.
//!
//! Two checks run on every batch before it is upserted:
//!
//! - JSON Schema (draft 7) validation against the row schemas embedded from
//!   `schemas/` (`product.json`, `requisition.json`, `bind-mapping.json`)
//! - In-batch key uniqueness: PostgREST rejects a whole upsert when two rows
//!   of the same request share the conflict key, so later duplicates are
//!   dropped
//!
//! Rejected records are reported back, never fatal.

use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Embedded row schemas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Product,
    Requisition,
    BindMapping,
}

impl Schema {
    fn source(&self) -> &'static str {
        match self {
            Schema::Product => include_str!("../../schemas/product.json"),
            Schema::Requisition => include_str!("../../schemas/requisition.json"),
            Schema::BindMapping => include_str!("../../schemas/bind-mapping.json"),
        }
    }

    /// Parsed schema document.
    pub fn document(&self) -> Result<Value, Vec<String>> {
        serde_json::from_str(self.source())
            .map_err(|e| vec![format!("Invalid embedded schema: {}", e)])
    }
}

/// Validate a JSON value against a JSON schema.
///
/// # Returns
/// * `Ok(())` when valid
/// * `Err(Vec<String>)` with one message per violation
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Quick boolean check.
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate one serializable record against an embedded schema.
pub fn validate_record<T: Serialize>(schema: Schema, record: &T) -> Result<(), Vec<String>> {
    let document = schema.document()?;
    let data = serde_json::to_value(record)
        .map_err(|e| vec![format!("Cannot encode record: {}", e)])?;
    validate(&document, &data)
}

/// A record left out of a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Key of the rejected record (for log lines).
    pub key: String,
    pub reasons: Vec<String>,
}

/// Keep the records that satisfy `schema`.
pub fn validate_batch<T, K>(records: Vec<T>, schema: Schema, key_of: K) -> (Vec<T>, Vec<Rejection>)
where
    T: Serialize,
    K: Fn(&T) -> String,
{
    let document = match schema.document() {
        Ok(doc) => doc,
        Err(reasons) => {
            let rejected = records
                .iter()
                .map(|r| Rejection { key: key_of(r), reasons: reasons.clone() })
                .collect();
            return (Vec::new(), rejected);
        }
    };
    let validator = match jsonschema::draft7::new(&document) {
        Ok(v) => v,
        Err(e) => {
            let reason = format!("Invalid schema: {}", e);
            let rejected = records
                .iter()
                .map(|r| Rejection { key: key_of(r), reasons: vec![reason.clone()] })
                .collect();
            return (Vec::new(), rejected);
        }
    };

    let mut accepted = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();
    for record in records {
        let reasons: Vec<String> = match serde_json::to_value(&record) {
            Ok(data) => validator.iter_errors(&data).map(|e| e.to_string()).collect(),
            Err(e) => vec![format!("Cannot encode record: {}", e)],
        };
        if reasons.is_empty() {
            accepted.push(record);
        } else {
            rejected.push(Rejection { key: key_of(&record), reasons });
        }
    }
    (accepted, rejected)
}

/// A uniqueness rule: name plus key extractor.
pub type UniqueKey<T> = (&'static str, fn(&T) -> String);

/// Keep the first record for every value of every unique key.
pub fn dedupe<T>(records: Vec<T>, keys: &[UniqueKey<T>]) -> (Vec<T>, Vec<Rejection>) {
    let mut seen: Vec<HashSet<String>> = keys.iter().map(|_| HashSet::new()).collect();
    let mut accepted = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for record in records {
        let values: Vec<String> = keys.iter().map(|(_, key_of)| key_of(&record)).collect();
        let clashes: Vec<String> = keys
            .iter()
            .zip(&values)
            .zip(&seen)
            .filter(|((_, value), seen)| seen.contains(*value))
            .map(|(((name, _), value), _)| format!("duplicate {}: {}", name, value))
            .collect();

        if clashes.is_empty() {
            for (set, value) in seen.iter_mut().zip(values) {
                set.insert(value);
            }
            accepted.push(record);
        } else {
            let key = keys.first().map(|(_, key_of)| key_of(&record)).unwrap_or_default();
            rejected.push(Rejection { key, reasons: clashes });
        }
    }
    (accepted, rejected)
}
