use std::collections::{BTreeMap, BTreeSet};

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::canonical::{canonicalize, CanonicalSchema};
use crate::extract::FlatRow;

/// Separator between distinct variant values of one field
pub const VALUE_SEPARATOR: &str = "; ";

/// Merged catalog data for one identifier, keyed by canonical field name.
///
/// Fields are kept in schema order; fields no matching row had a value for
/// are absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciledRecord {
    fields: Vec<(String, String)>,
}

impl ReconciledRecord {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == field)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for ReconciledRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (k, v) in &self.fields {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Merge the rows matched for one identifier into a single record.
///
/// Each key is canonicalized against `schema`; keys outside the schema and
/// blank values are dropped. Every field collects its distinct values, which
/// are sorted and joined with `"; "`. Returns `None` when there are no rows
/// at all, so "nothing matched" stays distinct from "matched but empty".
pub fn aggregate(rows: &[FlatRow], schema: &CanonicalSchema, cutoff: f32) -> Option<ReconciledRecord> {
    if rows.is_empty() {
        return None;
    }

    // Keyed by schema position so output order is independent of row order
    let mut merged: BTreeMap<usize, (String, BTreeSet<String>)> = BTreeMap::new();

    for row in rows {
        for (key, value) in row.iter() {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let field = canonicalize(key.trim(), schema, cutoff);
            let Some(pos) = schema.position(&field) else {
                continue;
            };
            merged
                .entry(pos)
                .or_insert_with(|| (field, BTreeSet::new()))
                .1
                .insert(value.to_string());
        }
    }

    let fields = merged
        .into_values()
        .map(|(field, values)| {
            let joined = values.into_iter().collect::<Vec<_>>().join(VALUE_SEPARATOR);
            (field, joined)
        })
        .collect();

    Some(ReconciledRecord { fields })
}
