//! Client selection.
//!
//! Clients whose name mentions "soluciones" go first, then a handful of
//! others. Each selected client becomes a [`BindMapping`] carrying the whole
//! source record.

use uuid::Uuid;

use super::coerce::{required_id, text};
use crate::config::SelectionLimits;
use crate::error::RecordResult;
use crate::models::{BindMapping, MappingType};
use crate::parser::RawRecord;

/// Substring (lowercase) that marks a priority client.
pub const PRIORITY_MARKER: &str = "soluciones";

/// Whether a client's `ClientName` contains [`PRIORITY_MARKER`], ignoring case.
///
/// A missing name is the empty string.
pub fn is_priority_client(client: &RawRecord) -> bool {
    text(client, "ClientName")
        .unwrap_or_default()
        .to_lowercase()
        .contains(PRIORITY_MARKER)
}

/// Outcome of client selection.
#[derive(Debug, Clone, Default)]
pub struct ClientSelection<'a> {
    /// Priority clients first, then the rest.
    pub selected: Vec<&'a RawRecord>,
    /// How many input clients matched the marker.
    pub priority_found: usize,
}

/// Pick up to `priority_clients` marked clients followed by up to `other_clients` others.
pub fn select_clients<'a>(
    clients: &'a [RawRecord],
    limits: &SelectionLimits,
) -> ClientSelection<'a> {
    let (priority, others): (Vec<&RawRecord>, Vec<&RawRecord>) =
        clients.iter().partition(|c| is_priority_client(c));

    let priority_found = priority.len();
    let selected = priority
        .into_iter()
        .take(limits.priority_clients)
        .chain(others.into_iter().take(limits.other_clients))
        .collect();

    ClientSelection { selected, priority_found }
}

/// Build the mapping record for one client.
pub fn client_mapping(client: &RawRecord, company_id: Uuid) -> RecordResult<BindMapping> {
    let bind_id = required_id(client, "ID")?;
    Ok(BindMapping::new(company_id, MappingType::Client, bind_id, client.clone()))
}
