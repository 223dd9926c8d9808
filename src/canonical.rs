//! Header canonicalization: maps the free-form column headers found on wiki
//! pages onto a fixed set of field names using character-sequence similarity.

use serde::{Deserialize, Serialize};
use similar::TextDiff;

use crate::error::{DiecastError, Result};

/// Default similarity a header needs to be mapped onto a schema field
pub const DEFAULT_CUTOFF: f32 = 0.8;

/// Ordered set of recognized output field names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct CanonicalSchema {
    fields: Vec<String>,
}

impl CanonicalSchema {
    /// Build a schema, rejecting empty or duplicated field names
    pub fn new<I, S>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if field.trim().is_empty() {
                return Err(DiecastError::ConfigError(
                    "Schema field names must not be empty".into(),
                ));
            }
            if out.contains(&field) {
                return Err(DiecastError::ConfigError(format!(
                    "Schema field '{}' is listed twice",
                    field
                )));
            }
            out.push(field);
        }
        if out.is_empty() {
            return Err(DiecastError::ConfigError("Schema has no fields".into()));
        }
        Ok(Self { fields: out })
    }

    /// Exact membership test
    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f == name)
    }

    /// Position of a field in schema order
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl TryFrom<Vec<String>> for CanonicalSchema {
    type Error = DiecastError;

    fn try_from(fields: Vec<String>) -> Result<Self> {
        Self::new(fields)
    }
}

impl From<CanonicalSchema> for Vec<String> {
    fn from(schema: CanonicalSchema) -> Self {
        schema.fields
    }
}

/// Character-sequence similarity of two strings in `[0, 1]`
///
/// Computed as `2 * M / T` where `M` is the number of matched characters and
/// `T` the combined length. Two empty strings are fully similar.
pub fn similarity(a: &str, b: &str) -> f32 {
    TextDiff::from_chars(a, b).ratio()
}

/// Map `header` onto the most similar schema field.
///
/// Returns the best-scoring field if its score reaches `cutoff`, otherwise the
/// header unchanged. Ties go to the field listed first in the schema.
pub fn canonicalize(header: &str, schema: &CanonicalSchema, cutoff: f32) -> String {
    let mut best: Option<(&str, f32)> = None;

    for field in schema.iter() {
        let score = similarity(header, field);
        if score < cutoff {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((field, score)),
        }
    }

    best.map(|(field, _)| field.to_string())
        .unwrap_or_else(|| header.to_string())
}
