//! Rowspan-aware flattening of raw tables.
//!
//! Wiki catalog tables merge cells vertically (`rowspan`) so that one casting
//! or toy number heads several variant rows. Flattening copies the merged
//! value down into every row it covers, giving one self-contained
//! [`FlatRow`] per source row.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::table::{Cell, RawTable};

/// One table row after rowspan propagation, as an ordered key -> text mapping.
///
/// Keys are raw header strings (or `Extra_<i>` placeholders for cells beyond
/// the header count) in column order, followed by keys filled in from
/// earlier spanning cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatRow {
    entries: Vec<(String, String)>,
}

impl FlatRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, overwriting an existing entry in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FlatRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = FlatRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for FlatRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug)]
struct SpanEntry {
    key: String,
    value: String,
    /// Rows still to cover after the current one
    remaining: usize,
}

/// Values of spanning cells still covering upcoming rows of one table.
///
/// Create one per table; it must not outlive the table it was built for.
#[derive(Debug, Default)]
pub struct RowspanCache {
    entries: Vec<SpanEntry>,
}

impl RowspanCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop exhausted spans and let the live ones cover the row about to start
    fn begin_row(&mut self) {
        self.entries.retain(|e| e.remaining > 0);
        for entry in &mut self.entries {
            entry.remaining -= 1;
        }
    }

    /// Cover the next `rows` rows at `key` with `value`
    fn cover(&mut self, key: &str, value: &str, rows: usize) {
        self.release(key);
        self.entries.push(SpanEntry {
            key: key.to_string(),
            value: value.to_string(),
            remaining: rows,
        });
    }

    fn release(&mut self, key: &str) {
        self.entries.retain(|e| e.key != key);
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.value.as_str())
    }

    /// Copy every covering value whose key the row does not have yet
    fn fill(&self, row: &mut FlatRow) {
        for entry in &self.entries {
            if !row.contains_key(&entry.key) {
                row.insert(entry.key.as_str(), entry.value.as_str());
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Column key for cell index `i`
pub fn column_key(headers: &[String], i: usize) -> String {
    headers
        .get(i)
        .cloned()
        .unwrap_or_else(|| format!("Extra_{}", i))
}

/// Flatten every data row of `table`, resolving rowspans.
///
/// A value spanning `r` rows is present in its own row and the `r - 1` rows
/// after it, unless a non-empty cell in the same column appears first.
pub fn extract(table: &RawTable) -> Vec<FlatRow> {
    let mut cache = RowspanCache::new();
    table
        .rows
        .iter()
        .map(|cells| extract_row(cells, &table.headers, &mut cache))
        .collect()
}

/// Flatten one row against the spans recorded so far in `cache`
pub fn extract_row(cells: &[Cell], headers: &[String], cache: &mut RowspanCache) -> FlatRow {
    cache.begin_row();
    let mut row = FlatRow::new();

    for (i, cell) in cells.iter().enumerate() {
        let key = column_key(headers, i);

        // An empty cell under a live span is a placeholder, not content
        if cell.text.is_empty() && cell.rowspan <= 1 {
            let value = cache.get(&key).unwrap_or_default().to_string();
            row.insert(key, value);
            continue;
        }

        cache.release(&key);
        if cell.rowspan > 1 {
            cache.cover(&key, &cell.text, cell.rowspan - 1);
        }
        row.insert(key, cell.text.as_str());
    }

    cache.fill(&mut row);
    row
}
