//! Reader for the Bind ERP export document.
//!
//! The export is a top-level JSON array of OData-style envelopes, each with an
//! optional `value` array holding one batch of records. Nothing here knows
//! about clients or products; see [`crate::classify`].

use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{SourceError, SourceResult};

/// A single source record with its export-defined keys.
pub type RawRecord = Map<String, Value>;

/// One envelope of the export.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSection {
    /// Position label used in log lines (`#0`, `#1`, ...).
    pub tag: String,
    /// Content of the envelope's `value` key, if any.
    pub value: Option<Value>,
}

impl RawSection {
    /// Records of the batch, or `None` when `value` is absent or not an array.
    pub fn records(&self) -> Option<&Vec<Value>> {
        self.value.as_ref().and_then(Value::as_array)
    }

    /// First record of the batch when it is a JSON object.
    pub fn sample(&self) -> Option<&RawRecord> {
        self.records()
            .and_then(|records| records.first())
            .and_then(Value::as_object)
    }
}

/// Read and parse the export file.
pub fn load_sections<P: AsRef<Path>>(path: P) -> SourceResult<Vec<RawSection>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_sections(&bytes)
}

/// Parse export bytes into sections.
///
/// Elements of the top-level array that are not objects become sections
/// without a `value`.
pub fn parse_sections(bytes: &[u8]) -> SourceResult<Vec<RawSection>> {
    let document: Value = serde_json::from_slice(bytes)?;
    let elements = match document {
        Value::Array(elements) => elements,
        other => return Err(SourceError::NotAnArray(kind_of(&other))),
    };

    Ok(elements
        .into_iter()
        .enumerate()
        .map(|(i, element)| RawSection {
            tag: format!("#{}", i),
            value: match element {
                Value::Object(mut envelope) => envelope.remove("value"),
                _ => None,
            },
        })
        .collect())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
