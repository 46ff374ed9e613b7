use crate::models::Record;
use crate::normalize::normalize_identifier;
use serde::Deserialize;
use std::collections::HashSet;

/// Locality selection supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Option<Vec<String>>")]
pub enum LocalitySelection {
    /// Every available locality (the default).
    #[default]
    All,
    /// Only these localities. An empty list is the empty selection.
    Only(Vec<String>),
}

impl From<Option<Vec<String>>> for LocalitySelection {
    fn from(value: Option<Vec<String>>) -> Self {
        match value {
            Some(localities) => LocalitySelection::Only(localities),
            None => LocalitySelection::All,
        }
    }
}

/// Every record whose trimmed identifier equals `normalized_id`.
///
/// An empty result means the identifier was not found; it is not an error.
pub fn lookup<'a>(records: &'a [Record], normalized_id: &str) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| normalize_identifier(&r.identifier) == normalized_id)
        .collect()
}

/// Distinct localities of the subset, in first-seen order.
pub fn locality_options(subset: &[&Record]) -> Vec<String> {
    distinct_in_order(subset.iter().map(|r| r.locality.as_str()))
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Keep only records whose locality was selected.
pub fn filter_by_locality<'a>(
    subset: &[&'a Record],
    selection: &LocalitySelection,
) -> Vec<&'a Record> {
    match selection {
        LocalitySelection::All => subset.to_vec(),
        LocalitySelection::Only(selected) => {
            let selected: HashSet<&str> = selected.iter().map(String::as_str).collect();
            subset
                .iter()
                .copied()
                .filter(|r| selected.contains(r.locality.as_str()))
                .collect()
        }
    }
}

/// Distinct values in first-seen order.
pub(crate) fn distinct_in_order<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    values.into_iter().filter(|v| seen.insert(*v)).collect()
}
