use serde::{Deserialize, Serialize};

use crate::extract::FlatRow;
use crate::normalize::normalize;

/// Header substrings that point at the columns holding identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchMarkers {
    /// Marks the toy number column (default: "toy")
    #[serde(default = "default_identifier_marker")]
    pub identifier: String,
    /// Marks the collector/catalog number column (default: "col")
    #[serde(default = "default_catalog_marker")]
    pub catalog: String,
}

fn default_identifier_marker() -> String {
    "toy".to_string()
}

fn default_catalog_marker() -> String {
    "col".to_string()
}

impl Default for MatchMarkers {
    fn default() -> Self {
        Self {
            identifier: default_identifier_marker(),
            catalog: default_catalog_marker(),
        }
    }
}

/// First value whose key contains `marker`, compared case-insensitively
fn first_cell_marked<'a>(row: &'a FlatRow, marker: &str) -> Option<&'a str> {
    let marker = marker.to_lowercase();
    if marker.is_empty() {
        return None;
    }
    row.iter()
        .find(|(k, _)| k.to_lowercase().contains(&marker))
        .map(|(_, v)| v)
}

/// Whether `row` belongs to `target`.
///
/// Looks at the first toy-number column and the first catalog-number column;
/// either one containing the normalized identifier is a match. This is a
/// substring test, so "GJT6" also matches "GJT68".
pub fn matches(row: &FlatRow, target: &str, markers: &MatchMarkers) -> bool {
    let needle = normalize(target);
    if needle.is_empty() {
        return false;
    }

    [&markers.identifier, &markers.catalog]
        .into_iter()
        .filter_map(|marker| first_cell_marked(row, marker))
        .any(|cell| normalize(cell).contains(&needle))
}
